//! Repository contract, error type and backend factory.

use crate::api::{ApiClient, ApiError};
use crate::config::StoreConfig;
use crate::model::article::{Article, ArticlePatch, ArticleStatus};
use crate::repo::local_repo::LocalArticleRepository;
use crate::repo::remote_repo::RemoteArticleRepository;
use crate::storage::{KeyValueStore, StorageError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository failure for either backend.
#[derive(Debug)]
pub enum RepoError {
    Api(ApiError),
    Storage(StorageError),
    /// The collection could not be serialized for persistence.
    Serialization(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Api(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Serialization(message) => {
                write!(f, "failed to serialize article collection: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Api(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Serialization(_) => None,
        }
    }
}

impl From<ApiError> for RepoError {
    fn from(value: ApiError) -> Self {
        Self::Api(value)
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Which backend a repository talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Remote,
    Fallback,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Fallback => "fallback",
        }
    }
}

/// Role-gated listing served outside the cached collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleScope {
    /// The caller's own submissions, any status.
    Mine,
    /// Moderation queue.
    Pending,
    /// Administrative listing.
    All,
}

impl ArticleScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mine => "mine",
            Self::Pending => "pending",
            Self::All => "all",
        }
    }
}

/// Collection-level persistence contract used by `ArticleStore`.
pub trait ArticleRepository: Send + Sync {
    fn backend(&self) -> Backend;

    /// Initial collection.
    fn load(&self) -> RepoResult<Vec<Article>>;

    /// Adds `article` in front of `current`.
    fn create(&self, current: &[Article], article: Article) -> RepoResult<Vec<Article>>;

    /// Applies `patch` to the entry matching `slug`.
    fn update(
        &self,
        current: &[Article],
        slug: &str,
        patch: &ArticlePatch,
    ) -> RepoResult<Vec<Article>>;

    /// Removes the first entry matching `slug`.
    fn delete(&self, current: &[Article], slug: &str) -> RepoResult<Vec<Article>>;

    /// Re-reads the whole collection. `None` when the backend has nothing to
    /// refresh from.
    fn refresh(&self) -> RepoResult<Option<Vec<Article>>>;

    /// Articles visible under `scope`. Never changes the collection.
    fn scoped(&self, current: &[Article], scope: ArticleScope) -> RepoResult<Vec<Article>>;

    /// Moves the entry matching `slug` to `status`.
    fn set_status(
        &self,
        current: &[Article],
        slug: &str,
        status: ArticleStatus,
    ) -> RepoResult<Vec<Article>>;
}

impl<R: ArticleRepository + ?Sized> ArticleRepository for Box<R> {
    fn backend(&self) -> Backend {
        (**self).backend()
    }

    fn load(&self) -> RepoResult<Vec<Article>> {
        (**self).load()
    }

    fn create(&self, current: &[Article], article: Article) -> RepoResult<Vec<Article>> {
        (**self).create(current, article)
    }

    fn update(
        &self,
        current: &[Article],
        slug: &str,
        patch: &ArticlePatch,
    ) -> RepoResult<Vec<Article>> {
        (**self).update(current, slug, patch)
    }

    fn delete(&self, current: &[Article], slug: &str) -> RepoResult<Vec<Article>> {
        (**self).delete(current, slug)
    }

    fn refresh(&self) -> RepoResult<Option<Vec<Article>>> {
        (**self).refresh()
    }

    fn scoped(&self, current: &[Article], scope: ArticleScope) -> RepoResult<Vec<Article>> {
        (**self).scoped(current, scope)
    }

    fn set_status(
        &self,
        current: &[Article],
        slug: &str,
        status: ArticleStatus,
    ) -> RepoResult<Vec<Article>> {
        (**self).set_status(current, slug, status)
    }
}

/// Builds the repository selected by `config`.
///
/// Remote mode still receives a fallback repository over `storage`, used when
/// the initial fetch fails, and reads the bearer token from the same storage.
///
/// # Errors
/// - `RepoError::Api` when the configured API URL cannot be used.
pub fn open_repository(
    config: &StoreConfig,
    storage: Arc<dyn KeyValueStore>,
) -> RepoResult<Box<dyn ArticleRepository>> {
    let fallback = LocalArticleRepository::new(Arc::clone(&storage));
    if !config.use_api {
        info!("event=repo_open module=repo status=ok backend=fallback");
        return Ok(Box::new(fallback));
    }

    let client = ApiClient::with_timeout(&config.api_url, config.request_timeout)?
        .with_credentials(storage);
    info!(
        "event=repo_open module=repo status=ok backend=remote api_url={}",
        client.base_url()
    );
    Ok(Box::new(RemoteArticleRepository::new(client, fallback)))
}
