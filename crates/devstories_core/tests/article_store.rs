use devstories_core::storage::{open_storage, ARTICLES_KEY};
use devstories_core::{
    default_articles, ApiError, ApiResult, Article, ArticleApi, ArticlePatch, ArticleScope,
    ArticleStatus, ArticleStore, Backend, Category, KeyValueStore, LocalArticleRepository,
    RemoteArticleRepository, RepoError, StoreError,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

const DEFAULT_SLUGS: [&str; 6] = [
    "au-dela-du-hype-ia",
    "grokipedia-encyclopedie",
    "recruteur-tech-7-cles",
    "principe-de-peter",
    "abort-controller-javascript",
    "kubernetes-2026",
];

/// In-process stand-in for the REST backend.
#[derive(Default)]
struct FakeApi {
    articles: Mutex<Vec<Article>>,
    fail_with: Mutex<Option<u16>>,
    list_calls: AtomicUsize,
}

impl FakeApi {
    fn with_articles(articles: Vec<Article>) -> Arc<Self> {
        Arc::new(Self {
            articles: Mutex::new(articles),
            ..Self::default()
        })
    }

    fn fail_with(&self, code: u16) {
        *self.fail_with.lock().unwrap() = Some(code);
    }

    fn check(&self) -> ApiResult<()> {
        match *self.fail_with.lock().unwrap() {
            Some(code) => Err(ApiError::Status {
                code,
                reason: "Internal Server Error".to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl ArticleApi for FakeApi {
    fn list_articles(&self) -> ApiResult<Vec<Article>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.articles.lock().unwrap().clone())
    }

    fn create_article(&self, article: &Article) -> ApiResult<Article> {
        self.check()?;
        let mut created = article.clone();
        created.id = Some(42);
        created.author_id = Some(7);
        self.articles.lock().unwrap().insert(0, created.clone());
        Ok(created)
    }

    fn update_article(&self, slug: &str, patch: &ArticlePatch) -> ApiResult<Article> {
        self.check()?;
        let mut articles = self.articles.lock().unwrap();
        let article = articles
            .iter_mut()
            .find(|article| article.slug == slug)
            .ok_or(ApiError::Status {
                code: 404,
                reason: "Not Found".to_string(),
            })?;
        patch.apply_to(article);
        Ok(article.clone())
    }

    fn delete_article(&self, slug: &str) -> ApiResult<()> {
        self.check()?;
        self.articles.lock().unwrap().retain(|article| article.slug != slug);
        Ok(())
    }

    fn my_articles(&self) -> ApiResult<Vec<Article>> {
        self.check()?;
        let articles = self.articles.lock().unwrap();
        Ok(articles
            .iter()
            .filter(|article| article.author_id == Some(7))
            .cloned()
            .collect())
    }

    fn pending_articles(&self) -> ApiResult<Vec<Article>> {
        self.check()?;
        let articles = self.articles.lock().unwrap();
        Ok(articles
            .iter()
            .filter(|article| article.effective_status() == ArticleStatus::Pending)
            .cloned()
            .collect())
    }

    fn all_articles(&self) -> ApiResult<Vec<Article>> {
        self.check()?;
        Ok(self.articles.lock().unwrap().clone())
    }

    fn update_article_status(&self, slug: &str, status: ArticleStatus) -> ApiResult<Article> {
        let patch = ArticlePatch {
            status: Some(status),
            ..ArticlePatch::default()
        };
        self.update_article(slug, &patch)
    }
}

/// Backend whose list call, once gated, reports entry and waits for release.
struct GatedApi {
    gated: AtomicBool,
    entered: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl ArticleApi for GatedApi {
    fn list_articles(&self) -> ApiResult<Vec<Article>> {
        if self.gated.load(Ordering::SeqCst) {
            self.entered.lock().unwrap().send(()).unwrap();
            self.release.lock().unwrap().recv().unwrap();
        }
        Ok(vec![sample("gated")])
    }

    fn create_article(&self, article: &Article) -> ApiResult<Article> {
        Ok(article.clone())
    }

    fn update_article(&self, _slug: &str, _patch: &ArticlePatch) -> ApiResult<Article> {
        Err(ApiError::Status {
            code: 404,
            reason: "Not Found".to_string(),
        })
    }

    fn delete_article(&self, _slug: &str) -> ApiResult<()> {
        Ok(())
    }

    fn my_articles(&self) -> ApiResult<Vec<Article>> {
        Ok(Vec::new())
    }

    fn pending_articles(&self) -> ApiResult<Vec<Article>> {
        Ok(Vec::new())
    }

    fn all_articles(&self) -> ApiResult<Vec<Article>> {
        Ok(Vec::new())
    }

    fn update_article_status(&self, _slug: &str, _status: ArticleStatus) -> ApiResult<Article> {
        Err(ApiError::Status {
            code: 404,
            reason: "Not Found".to_string(),
        })
    }
}

fn sample(slug: &str) -> Article {
    Article {
        title: format!("Title {slug}"),
        slug: slug.to_string(),
        author: "Tester".to_string(),
        date: "2026-02-01".to_string(),
        category: Category::Back,
        image: "/images/default-cover.jpg".to_string(),
        excerpt: "Excerpt".to_string(),
        content: "Body".to_string(),
        id: None,
        status: None,
        author_id: None,
    }
}

fn fallback_store(storage: &Arc<dyn KeyValueStore>) -> ArticleStore<LocalArticleRepository> {
    ArticleStore::open(LocalArticleRepository::new(Arc::clone(storage)))
}

fn remote_store(
    api: &Arc<FakeApi>,
    storage: &Arc<dyn KeyValueStore>,
) -> ArticleStore<RemoteArticleRepository<Arc<FakeApi>>> {
    ArticleStore::open(RemoteArticleRepository::new(
        Arc::clone(api),
        LocalArticleRepository::new(Arc::clone(storage)),
    ))
}

fn counter<R: devstories_core::ArticleRepository>(store: &ArticleStore<R>) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);
    store.subscribe(move || {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    count
}

fn slugs(articles: &[Article]) -> Vec<&str> {
    articles.iter().map(|article| article.slug.as_str()).collect()
}

#[test]
fn fallback_store_seeds_defaults_into_empty_storage() {
    let storage = open_storage(None).unwrap();
    let store = fallback_store(&storage);

    assert_eq!(store.backend(), Backend::Fallback);
    assert_eq!(slugs(&store.snapshot()), DEFAULT_SLUGS);

    let persisted: Vec<Article> =
        serde_json::from_str(&storage.get(ARTICLES_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(persisted, *store.snapshot());
}

#[test]
fn snapshot_is_shared_until_a_change() {
    let storage = open_storage(None).unwrap();
    let store = fallback_store(&storage);

    let first = store.snapshot();
    let second = store.snapshot();
    assert!(Arc::ptr_eq(&first, &second));

    store.add_article(sample("fresh")).unwrap();
    let third = store.snapshot();
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(first.len(), DEFAULT_SLUGS.len());
}

#[test]
fn fallback_add_is_persisted_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blog.db");
    {
        let storage = open_storage(Some(&path)).unwrap();
        let store = fallback_store(&storage);
        store.add_article(sample("persisted")).unwrap();
        assert_eq!(store.snapshot()[0].slug, "persisted");
    }

    let storage = open_storage(Some(&path)).unwrap();
    let reopened = fallback_store(&storage);
    assert_eq!(reopened.snapshot().len(), DEFAULT_SLUGS.len() + 1);
    assert_eq!(reopened.snapshot()[0].slug, "persisted");
}

#[test]
fn article_by_slug_finds_exact_match_only() {
    let storage = open_storage(None).unwrap();
    let store = fallback_store(&storage);

    let found = store.article_by_slug("principe-de-peter").unwrap();
    assert_eq!(found.category, Category::Story);
    assert!(store.article_by_slug("Principe-De-Peter").is_none());
    assert!(store.article_by_slug("missing").is_none());
}

#[test]
fn fallback_delete_removes_one_and_ignores_unknown_slug() {
    let storage = open_storage(None).unwrap();
    let store = fallback_store(&storage);
    let notifications = counter(&store);

    store.delete_article("kubernetes-2026").unwrap();
    assert_eq!(store.snapshot().len(), DEFAULT_SLUGS.len() - 1);
    assert!(store.article_by_slug("kubernetes-2026").is_none());

    let before = store.snapshot();
    store.delete_article("does-not-exist").unwrap();
    assert_eq!(*store.snapshot(), *before);
    assert_eq!(notifications.load(Ordering::SeqCst), 2);
}

#[test]
fn fallback_update_merges_patch_and_notifies_once() {
    let storage = open_storage(None).unwrap();
    let store = fallback_store(&storage);
    let notifications = counter(&store);

    let patch = ArticlePatch {
        title: Some("Nouveau titre".to_string()),
        ..ArticlePatch::default()
    };
    store.update_article("grokipedia-encyclopedie", &patch).unwrap();

    let updated = store.article_by_slug("grokipedia-encyclopedie").unwrap();
    assert_eq!(updated.title, "Nouveau titre");
    assert_eq!(updated.author, "ABEL R.");
    assert_eq!(notifications.load(Ordering::SeqCst), 1);
}

#[test]
fn fallback_update_with_unknown_slug_is_silent() {
    let storage = open_storage(None).unwrap();
    let store = fallback_store(&storage);
    let notifications = counter(&store);

    let patch = ArticlePatch {
        title: Some("x".to_string()),
        ..ArticlePatch::default()
    };
    store.update_article("missing", &patch).unwrap();

    assert_eq!(slugs(&store.snapshot()), DEFAULT_SLUGS);
    assert_eq!(notifications.load(Ordering::SeqCst), 1);
}

#[test]
fn unsubscribe_stops_notifications() {
    let storage = open_storage(None).unwrap();
    let store = fallback_store(&storage);

    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);
    let id = store.subscribe(move || {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    let other = counter(&store);

    store.add_article(sample("one")).unwrap();
    assert!(store.unsubscribe(id));
    assert!(!store.unsubscribe(id));
    store.add_article(sample("two")).unwrap();

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(other.load(Ordering::SeqCst), 2);
}

#[test]
fn listener_sees_new_snapshot_and_may_reenter() {
    let storage = open_storage(None).unwrap();
    let store = Arc::new(fallback_store(&storage));

    let observed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&observed);
    let weak = Arc::downgrade(&store);
    store.subscribe(move || {
        if let Some(store) = weak.upgrade() {
            sink.lock().unwrap().push(store.snapshot()[0].slug.clone());
        }
    });

    store.add_article(sample("first-seen")).unwrap();
    assert_eq!(*observed.lock().unwrap(), ["first-seen"]);
}

#[test]
fn concurrent_adds_are_all_kept() {
    let storage = open_storage(None).unwrap();
    let store = Arc::new(fallback_store(&storage));

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || store.add_article(sample(&format!("parallel-{n}"))))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), DEFAULT_SLUGS.len() + 8);
    for n in 0..8 {
        assert!(snapshot.iter().any(|a| a.slug == format!("parallel-{n}")));
    }
}

#[test]
fn remote_store_loads_from_api() {
    let storage = open_storage(None).unwrap();
    let api = FakeApi::with_articles(vec![sample("remote-one"), sample("remote-two")]);
    let store = remote_store(&api, &storage);

    assert_eq!(store.backend(), Backend::Remote);
    assert_eq!(slugs(&store.snapshot()), ["remote-one", "remote-two"]);
}

#[test]
fn remote_init_failure_falls_back_to_local_storage() {
    let storage = open_storage(None).unwrap();
    let api = FakeApi::with_articles(vec![sample("remote-one")]);
    api.fail_with(503);
    let store = remote_store(&api, &storage);

    assert_eq!(slugs(&store.snapshot()), DEFAULT_SLUGS);
}

#[test]
fn remote_create_uses_server_representation() {
    let storage = open_storage(None).unwrap();
    let api = FakeApi::with_articles(Vec::new());
    let store = remote_store(&api, &storage);

    store.add_article(sample("created")).unwrap();

    let created = store.article_by_slug("created").unwrap();
    assert_eq!(created.id, Some(42));
    assert_eq!(created.author_id, Some(7));
}

#[test]
fn remote_create_failure_leaves_snapshot_and_listeners_untouched() {
    let storage = open_storage(None).unwrap();
    let api = FakeApi::with_articles(vec![sample("existing")]);
    let store = remote_store(&api, &storage);
    let notifications = counter(&store);
    let before = store.snapshot();

    api.fail_with(500);
    let err = store.add_article(sample("rejected")).unwrap_err();

    assert!(matches!(err, StoreError::CreateFailed(_)));
    match err.cause() {
        RepoError::Api(api_err) => assert_eq!(api_err.status_code(), Some(500)),
        other => panic!("unexpected cause: {other}"),
    }
    assert!(Arc::ptr_eq(&before, &store.snapshot()));
    assert_eq!(notifications.load(Ordering::SeqCst), 0);
}

#[test]
fn remote_update_and_delete_failures_map_to_their_kinds() {
    let storage = open_storage(None).unwrap();
    let api = FakeApi::with_articles(vec![sample("existing")]);
    let store = remote_store(&api, &storage);
    api.fail_with(500);

    let patch = ArticlePatch {
        title: Some("x".to_string()),
        ..ArticlePatch::default()
    };
    assert!(matches!(
        store.update_article("existing", &patch),
        Err(StoreError::UpdateFailed(_))
    ));
    assert!(matches!(
        store.delete_article("existing"),
        Err(StoreError::DeleteFailed(_))
    ));
    assert_eq!(slugs(&store.snapshot()), ["existing"]);
}

#[test]
fn remote_update_replaces_entry_with_server_copy() {
    let storage = open_storage(None).unwrap();
    let api = FakeApi::with_articles(vec![sample("a"), sample("b")]);
    let store = remote_store(&api, &storage);

    let patch = ArticlePatch {
        excerpt: Some("Server side".to_string()),
        ..ArticlePatch::default()
    };
    store.update_article("b", &patch).unwrap();

    assert_eq!(store.article_by_slug("b").unwrap().excerpt, "Server side");
    assert_eq!(slugs(&store.snapshot()), ["a", "b"]);
}

#[test]
fn remote_scoped_listings_leave_snapshot_alone() {
    let storage = open_storage(None).unwrap();
    let mut published = sample("published");
    published.status = Some(ArticleStatus::Published);
    let mut mine = sample("mine");
    mine.author_id = Some(7);
    let api = FakeApi::with_articles(vec![published, mine, sample("queued")]);
    let store = remote_store(&api, &storage);
    let before = store.snapshot();

    assert_eq!(slugs(&store.articles_for(ArticleScope::Mine).unwrap()), ["mine"]);
    assert_eq!(
        slugs(&store.articles_for(ArticleScope::Pending).unwrap()),
        ["mine", "queued"]
    );
    assert_eq!(store.articles_for(ArticleScope::All).unwrap().len(), 3);
    assert!(Arc::ptr_eq(&before, &store.snapshot()));

    api.fail_with(403);
    assert!(matches!(
        store.articles_for(ArticleScope::Pending),
        Err(StoreError::FetchFailed(RepoError::Api(ApiError::Status { code: 403, .. })))
    ));
}

#[test]
fn remote_status_change_stores_server_copy_and_notifies() {
    let storage = open_storage(None).unwrap();
    let api = FakeApi::with_articles(vec![sample("a"), sample("b")]);
    let store = remote_store(&api, &storage);
    let notifications = counter(&store);

    store
        .set_article_status("b", ArticleStatus::Rejected)
        .unwrap();
    assert_eq!(
        store.article_by_slug("b").unwrap().status,
        Some(ArticleStatus::Rejected)
    );
    assert_eq!(notifications.load(Ordering::SeqCst), 1);

    api.fail_with(500);
    assert!(matches!(
        store.set_article_status("a", ArticleStatus::Published),
        Err(StoreError::UpdateFailed(_))
    ));
    assert_eq!(store.article_by_slug("a").unwrap().status, None);
    assert_eq!(notifications.load(Ordering::SeqCst), 1);
}

#[test]
fn fallback_status_change_persists_and_shrinks_pending_queue() {
    let storage = open_storage(None).unwrap();
    let store = fallback_store(&storage);
    assert_eq!(
        store.articles_for(ArticleScope::Pending).unwrap().len(),
        DEFAULT_SLUGS.len()
    );

    store
        .set_article_status("kubernetes-2026", ArticleStatus::Published)
        .unwrap();

    let pending = store.articles_for(ArticleScope::Pending).unwrap();
    assert_eq!(pending.len(), DEFAULT_SLUGS.len() - 1);
    assert!(pending.iter().all(|article| article.slug != "kubernetes-2026"));
    assert_eq!(
        store.articles_for(ArticleScope::All).unwrap().len(),
        DEFAULT_SLUGS.len()
    );

    let reopened = fallback_store(&storage);
    assert_eq!(
        reopened.article_by_slug("kubernetes-2026").unwrap().effective_status(),
        ArticleStatus::Published
    );
}

#[test]
fn refresh_in_remote_mode_reloads_and_toggles_loading() {
    let storage = open_storage(None).unwrap();
    let api = FakeApi::with_articles(vec![sample("a")]);
    let store = Arc::new(remote_store(&api, &storage));

    let loading_seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&loading_seen);
    let weak = Arc::downgrade(&store);
    store.subscribe(move || {
        if let Some(store) = weak.upgrade() {
            sink.lock().unwrap().push(store.is_loading());
        }
    });

    api.articles.lock().unwrap().push(sample("b"));
    store.refresh().unwrap();

    assert_eq!(slugs(&store.snapshot()), ["a", "b"]);
    assert_eq!(*loading_seen.lock().unwrap(), [true, false]);
    assert!(!store.is_loading());
    assert_eq!(api.list_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn loading_stays_set_while_an_overlapping_refresh_is_fetching() {
    let storage = open_storage(None).unwrap();
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let api = Arc::new(GatedApi {
        gated: AtomicBool::new(false),
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    });
    let store = Arc::new(ArticleStore::open(RemoteArticleRepository::new(
        Arc::clone(&api),
        LocalArticleRepository::new(Arc::clone(&storage)),
    )));
    api.gated.store(true, Ordering::SeqCst);

    let first = {
        let store = Arc::clone(&store);
        thread::spawn(move || store.refresh())
    };
    entered_rx.recv().unwrap();

    let second = {
        let store = Arc::clone(&store);
        thread::spawn(move || store.refresh())
    };
    // Let the second refresh register and queue behind the first.
    thread::sleep(Duration::from_millis(50));

    release_tx.send(()).unwrap();
    first.join().unwrap().unwrap();
    entered_rx.recv().unwrap();
    assert!(store.is_loading());

    release_tx.send(()).unwrap();
    second.join().unwrap().unwrap();
    assert!(!store.is_loading());
    assert_eq!(slugs(&store.snapshot()), ["gated"]);
}

#[test]
fn refresh_failure_falls_back_to_local_collection() {
    let storage = open_storage(None).unwrap();
    let api = FakeApi::with_articles(vec![sample("a")]);
    let store = remote_store(&api, &storage);

    api.fail_with(502);
    store.refresh().unwrap();

    assert_eq!(slugs(&store.snapshot()), DEFAULT_SLUGS);
}

#[test]
fn refresh_in_fallback_mode_is_a_noop() {
    let storage = open_storage(None).unwrap();
    let store = fallback_store(&storage);
    let notifications = counter(&store);
    let before = store.snapshot();

    store.refresh().unwrap();

    assert!(Arc::ptr_eq(&before, &store.snapshot()));
    assert_eq!(notifications.load(Ordering::SeqCst), 0);
}

#[test]
fn category_and_latest_views() {
    let storage = open_storage(None).unwrap();
    let store = fallback_store(&storage);

    assert_eq!(store.articles_in(Some(Category::Home)).len(), DEFAULT_SLUGS.len());
    assert_eq!(store.articles_in(None).len(), DEFAULT_SLUGS.len());
    assert_eq!(
        slugs(&store.articles_in(Some(Category::Front))),
        ["abort-controller-javascript"]
    );
    assert_eq!(
        slugs(&store.latest(2)),
        ["au-dela-du-hype-ia", "grokipedia-encyclopedie"]
    );
}

#[test]
fn search_respects_minimum_query_length() {
    let storage = open_storage(None).unwrap();
    let store = fallback_store(&storage);

    assert_eq!(store.search("").len(), DEFAULT_SLUGS.len());
    assert_eq!(store.search("k").len(), DEFAULT_SLUGS.len());

    let hits = store.search("kubernetes");
    assert_eq!(hits[0].slug, "kubernetes-2026");
}

#[test]
fn default_collection_is_stable() {
    assert_eq!(slugs(&default_articles()), DEFAULT_SLUGS);
}
