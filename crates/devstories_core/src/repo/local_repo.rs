//! Fallback-mode repository persisting the whole collection to key/value storage.
//!
//! # Invariants
//! - The collection lives under `ARTICLES_KEY` as one JSON array.
//! - Absent or unparseable data is replaced by the default collection, which
//!   is written back immediately.
//! - Every successful mutation persists before returning.
//! - Without a backend there are no roles: `Mine` and `All` see the whole
//!   collection and `Pending` filters on the effective status.

use crate::model::article::{Article, ArticlePatch, ArticleStatus};
use crate::model::collection::{merge_by_slug, prepend, remove_first_by_slug};
use crate::model::seed::default_articles;
use crate::repo::article_repo::{
    ArticleRepository, ArticleScope, Backend, RepoError, RepoResult,
};
use crate::storage::{KeyValueStore, ARTICLES_KEY};
use log::{info, warn};
use std::sync::Arc;

/// Article repository over local key/value storage.
pub struct LocalArticleRepository {
    storage: Arc<dyn KeyValueStore>,
}

impl LocalArticleRepository {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Writes `articles` as the persisted collection.
    pub fn save(&self, articles: &[Article]) -> RepoResult<()> {
        let payload = serde_json::to_string(articles)
            .map_err(|err| RepoError::Serialization(err.to_string()))?;
        self.storage.set(ARTICLES_KEY, &payload)?;
        Ok(())
    }

    fn seed(&self) -> RepoResult<Vec<Article>> {
        let articles = default_articles();
        self.save(&articles)?;
        info!(
            "event=storage_seed module=repo status=ok count={}",
            articles.len()
        );
        Ok(articles)
    }
}

impl ArticleRepository for LocalArticleRepository {
    fn backend(&self) -> Backend {
        Backend::Fallback
    }

    fn load(&self) -> RepoResult<Vec<Article>> {
        let Some(stored) = self.storage.get(ARTICLES_KEY)? else {
            return self.seed();
        };

        match serde_json::from_str::<Vec<Article>>(&stored) {
            Ok(articles) => Ok(articles),
            Err(err) => {
                warn!(
                    "event=storage_load module=repo status=error error_code=corrupt_collection error={err}"
                );
                self.seed()
            }
        }
    }

    fn create(&self, current: &[Article], article: Article) -> RepoResult<Vec<Article>> {
        let next = prepend(current, article);
        self.save(&next)?;
        Ok(next)
    }

    fn update(
        &self,
        current: &[Article],
        slug: &str,
        patch: &ArticlePatch,
    ) -> RepoResult<Vec<Article>> {
        let next = merge_by_slug(current, slug, patch);
        self.save(&next)?;
        Ok(next)
    }

    fn delete(&self, current: &[Article], slug: &str) -> RepoResult<Vec<Article>> {
        let next = remove_first_by_slug(current, slug).unwrap_or_else(|| current.to_vec());
        self.save(&next)?;
        Ok(next)
    }

    fn refresh(&self) -> RepoResult<Option<Vec<Article>>> {
        Ok(None)
    }

    fn scoped(&self, current: &[Article], scope: ArticleScope) -> RepoResult<Vec<Article>> {
        Ok(match scope {
            ArticleScope::Mine | ArticleScope::All => current.to_vec(),
            ArticleScope::Pending => current
                .iter()
                .filter(|article| article.effective_status() == ArticleStatus::Pending)
                .cloned()
                .collect(),
        })
    }

    fn set_status(
        &self,
        current: &[Article],
        slug: &str,
        status: ArticleStatus,
    ) -> RepoResult<Vec<Article>> {
        let patch = ArticlePatch {
            status: Some(status),
            ..ArticlePatch::default()
        };
        self.update(current, slug, &patch)
    }
}
