use crate::model::article::{Article, ArticlePatch, ArticleStatus};
use crate::model::category::Category;
use crate::model::collection::{filter_by_category, find_by_slug, latest};
use crate::model::seed::default_articles;
use crate::repo::{ArticleRepository, ArticleScope, Backend, RepoError, RepoResult};
use crate::search::SearchIndex;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of a store operation. The wrapped cause is the repository error.
#[derive(Debug)]
pub enum StoreError {
    FetchFailed(RepoError),
    CreateFailed(RepoError),
    UpdateFailed(RepoError),
    DeleteFailed(RepoError),
}

impl StoreError {
    /// Repository error behind this failure.
    pub fn cause(&self) -> &RepoError {
        match self {
            Self::FetchFailed(err)
            | Self::CreateFailed(err)
            | Self::UpdateFailed(err)
            | Self::DeleteFailed(err) => err,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FetchFailed(err) => write!(f, "failed to fetch articles: {err}"),
            Self::CreateFailed(err) => write!(f, "failed to create article: {err}"),
            Self::UpdateFailed(err) => write!(f, "failed to update article: {err}"),
            Self::DeleteFailed(err) => write!(f, "failed to delete article: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.cause())
    }
}

/// Handle returned by [`ArticleStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn() + Send + Sync>;

struct StoreState {
    articles: Arc<Vec<Article>>,
    /// Refreshes started and not yet finished, including ones waiting on the
    /// write gate.
    refreshes_in_flight: usize,
}

/// Cache of the article collection with change notification.
///
/// Construct one per application at the composition point and share it by
/// reference; the store is `Send + Sync` when its repository is.
pub struct ArticleStore<R: ArticleRepository> {
    repo: R,
    state: RwLock<StoreState>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_subscription: AtomicU64,
    // Serializes mutations so two overlapping writers cannot both start from
    // the same snapshot.
    write_gate: Mutex<()>,
}

impl<R: ArticleRepository> ArticleStore<R> {
    /// Creates the store and loads the initial collection.
    ///
    /// Never fails: a repository that cannot produce a collection leaves the
    /// store on the default articles and logs the failure.
    pub fn open(repo: R) -> Self {
        let started_at = Instant::now();
        let backend = repo.backend();
        info!(
            "event=store_init module=store status=start backend={}",
            backend.as_str()
        );

        let articles = match repo.load() {
            Ok(articles) => {
                info!(
                    "event=store_init module=store status=ok backend={} count={} duration_ms={}",
                    backend.as_str(),
                    articles.len(),
                    started_at.elapsed().as_millis()
                );
                articles
            }
            Err(err) => {
                error!(
                    "event=store_init module=store status=error backend={} duration_ms={} error_code=fetch_failed error={}",
                    backend.as_str(),
                    started_at.elapsed().as_millis(),
                    err
                );
                default_articles()
            }
        };

        Self {
            repo,
            state: RwLock::new(StoreState {
                articles: Arc::new(articles),
                refreshes_in_flight: 0,
            }),
            listeners: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
            write_gate: Mutex::new(()),
        }
    }

    pub fn backend(&self) -> Backend {
        self.repo.backend()
    }

    /// Current collection. The same `Arc` is returned until the next change.
    pub fn snapshot(&self) -> Arc<Vec<Article>> {
        Arc::clone(&self.read_state().articles)
    }

    /// Whether any refresh is in flight.
    pub fn is_loading(&self) -> bool {
        self.read_state().refreshes_in_flight > 0
    }

    /// Registers `listener` for change notifications.
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.lock_listeners().push((id, Arc::new(listener)));
        id
    }

    /// Removes exactly the registration `id`. Returns whether it existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.lock_listeners();
        match listeners.iter().position(|(current, _)| *current == id) {
            Some(position) => {
                listeners.remove(position);
                true
            }
            None => false,
        }
    }

    /// First article whose slug equals `slug`.
    pub fn article_by_slug(&self, slug: &str) -> Option<Article> {
        find_by_slug(&self.snapshot(), slug).cloned()
    }

    /// Articles in `category`; `Home` or `None` yields the whole collection.
    pub fn articles_in(&self, category: Option<Category>) -> Vec<Article> {
        filter_by_category(&self.snapshot(), category)
    }

    /// Newest-first articles, at most `limit`.
    pub fn latest(&self, limit: usize) -> Vec<Article> {
        latest(&self.snapshot(), limit)
    }

    /// Fuzzy search over the current snapshot with default options.
    pub fn search(&self, query: &str) -> Vec<Article> {
        SearchIndex::new(self.snapshot()).search(query)
    }

    /// Adds `article` at the front of the collection.
    ///
    /// Remote mode stores the server's representation; fallback mode stores
    /// `article` verbatim and persists.
    ///
    /// # Errors
    /// - `CreateFailed` when the repository rejects the write; the snapshot is
    ///   unchanged and no notification is sent.
    pub fn add_article(&self, article: Article) -> StoreResult<()> {
        let slug = article.slug.clone();
        self.mutate("article_create", &slug, |current| {
            self.repo.create(current, article)
        })
        .map_err(StoreError::CreateFailed)
    }

    /// Applies `patch` to the article matching `slug`.
    ///
    /// In fallback mode an unknown slug is a silent no-op that still counts as
    /// a successful mutation.
    ///
    /// # Errors
    /// - `UpdateFailed` when the repository rejects the write.
    pub fn update_article(&self, slug: &str, patch: &ArticlePatch) -> StoreResult<()> {
        self.mutate("article_update", slug, |current| {
            self.repo.update(current, slug, patch)
        })
        .map_err(StoreError::UpdateFailed)
    }

    /// Removes the first article matching `slug`. Unknown slugs leave the
    /// collection unchanged without error in fallback mode.
    ///
    /// # Errors
    /// - `DeleteFailed` when the repository rejects the delete.
    pub fn delete_article(&self, slug: &str) -> StoreResult<()> {
        self.mutate("article_delete", slug, |current| {
            self.repo.delete(current, slug)
        })
        .map_err(StoreError::DeleteFailed)
    }

    /// Moves the article matching `slug` to `status`.
    ///
    /// Remote mode stores the server's representation returned by the
    /// moderation endpoint.
    ///
    /// # Errors
    /// - `UpdateFailed` when the repository rejects the change.
    pub fn set_article_status(&self, slug: &str, status: ArticleStatus) -> StoreResult<()> {
        self.mutate("article_status", slug, |current| {
            self.repo.set_status(current, slug, status)
        })
        .map_err(StoreError::UpdateFailed)
    }

    /// Role-gated listing. The snapshot is neither read from nor replaced in
    /// remote mode; fallback mode answers from the snapshot.
    ///
    /// # Errors
    /// - `FetchFailed` when the backend rejects the listing.
    pub fn articles_for(&self, scope: ArticleScope) -> StoreResult<Vec<Article>> {
        let started_at = Instant::now();
        match self.repo.scoped(&self.snapshot(), scope) {
            Ok(articles) => {
                info!(
                    "event=articles_scoped module=store status=ok scope={} count={} duration_ms={}",
                    scope.as_str(),
                    articles.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(articles)
            }
            Err(err) => {
                warn!(
                    "event=articles_scoped module=store status=error scope={} duration_ms={} error={}",
                    scope.as_str(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(StoreError::FetchFailed(err))
            }
        }
    }

    /// Re-reads the whole collection in remote mode; no-op in fallback mode.
    ///
    /// Subscribers are notified when this refresh starts and again when it
    /// ends. Loading stays set until every overlapping refresh has finished.
    ///
    /// # Errors
    /// - `FetchFailed` when neither the backend nor its local fallback could
    ///   produce a collection. The previous snapshot is kept.
    pub fn refresh(&self) -> StoreResult<()> {
        if self.repo.backend() == Backend::Fallback {
            debug!("event=store_refresh module=store status=skipped backend=fallback");
            return Ok(());
        }

        let started_at = Instant::now();
        self.begin_refresh();
        self.notify();

        let result = {
            let _gate = self.write_gate.lock().unwrap_or_else(PoisonError::into_inner);
            match self.repo.refresh() {
                Ok(Some(articles)) => {
                    self.publish(articles);
                    Ok(())
                }
                Ok(None) => Ok(()),
                Err(err) => Err(StoreError::FetchFailed(err)),
            }
        };

        self.end_refresh();
        match &result {
            Ok(()) => info!(
                "event=store_refresh module=store status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=store_refresh module=store status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        self.notify();
        result
    }

    fn mutate(
        &self,
        event: &'static str,
        slug: &str,
        op: impl FnOnce(&[Article]) -> RepoResult<Vec<Article>>,
    ) -> RepoResult<()> {
        let started_at = Instant::now();
        let backend = self.repo.backend().as_str();
        {
            let _gate = self.write_gate.lock().unwrap_or_else(PoisonError::into_inner);
            let current = self.snapshot();
            match op(current.as_slice()) {
                Ok(next) => self.publish(next),
                Err(err) => {
                    warn!(
                        "event={event} module=store status=error backend={backend} slug={slug} duration_ms={} error={}",
                        started_at.elapsed().as_millis(),
                        err
                    );
                    return Err(err);
                }
            }
        }

        info!(
            "event={event} module=store status=ok backend={backend} slug={slug} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        self.notify();
        Ok(())
    }

    /// Installs `next` as the snapshot. An equal collection keeps the current
    /// `Arc` so readers holding it stay current.
    fn publish(&self, next: Vec<Article>) {
        let mut state = self.write_state();
        if *state.articles != next {
            state.articles = Arc::new(next);
        }
    }

    fn begin_refresh(&self) {
        self.write_state().refreshes_in_flight += 1;
    }

    fn end_refresh(&self) {
        let mut state = self.write_state();
        state.refreshes_in_flight = state.refreshes_in_flight.saturating_sub(1);
    }

    fn notify(&self) {
        let listeners: Vec<Listener> = self
            .lock_listeners()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener();
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listeners(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Listener)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
