//! Remote-mode repository delegating to the REST backend.
//!
//! # Invariants
//! - The server representation returned by create/update replaces local data.
//! - Remote failures on mutation are returned unchanged; no collection is
//!   produced, so the caller's snapshot stays as it was.
//! - A failed fetch falls back to local persisted state and is not surfaced.

use crate::api::ArticleApi;
use crate::model::article::{Article, ArticlePatch, ArticleStatus};
use crate::model::collection::{prepend, remove_first_by_slug, replace_by_slug};
use crate::repo::article_repo::{ArticleRepository, ArticleScope, Backend, RepoResult};
use crate::repo::local_repo::LocalArticleRepository;
use log::{info, warn};

/// Article repository over an [`ArticleApi`] with a local fallback for reads.
pub struct RemoteArticleRepository<A: ArticleApi> {
    api: A,
    fallback: LocalArticleRepository,
}

impl<A: ArticleApi> RemoteArticleRepository<A> {
    pub fn new(api: A, fallback: LocalArticleRepository) -> Self {
        Self { api, fallback }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    fn fetch_or_fallback(&self) -> RepoResult<Vec<Article>> {
        match self.api.list_articles() {
            Ok(articles) => {
                info!(
                    "event=articles_fetch module=repo status=ok count={}",
                    articles.len()
                );
                Ok(articles)
            }
            Err(err) => {
                warn!(
                    "event=articles_fetch module=repo status=fallback error_code=fetch_failed error={err}"
                );
                self.fallback.load()
            }
        }
    }
}

impl<A: ArticleApi> ArticleRepository for RemoteArticleRepository<A> {
    fn backend(&self) -> Backend {
        Backend::Remote
    }

    fn load(&self) -> RepoResult<Vec<Article>> {
        self.fetch_or_fallback()
    }

    fn create(&self, current: &[Article], article: Article) -> RepoResult<Vec<Article>> {
        let created = self.api.create_article(&article)?;
        Ok(prepend(current, created))
    }

    fn update(
        &self,
        current: &[Article],
        slug: &str,
        patch: &ArticlePatch,
    ) -> RepoResult<Vec<Article>> {
        let updated = self.api.update_article(slug, patch)?;
        Ok(replace_by_slug(current, slug, &updated))
    }

    fn delete(&self, current: &[Article], slug: &str) -> RepoResult<Vec<Article>> {
        self.api.delete_article(slug)?;
        Ok(remove_first_by_slug(current, slug).unwrap_or_else(|| current.to_vec()))
    }

    fn refresh(&self) -> RepoResult<Option<Vec<Article>>> {
        self.fetch_or_fallback().map(Some)
    }

    fn scoped(&self, _current: &[Article], scope: ArticleScope) -> RepoResult<Vec<Article>> {
        let articles = match scope {
            ArticleScope::Mine => self.api.my_articles()?,
            ArticleScope::Pending => self.api.pending_articles()?,
            ArticleScope::All => self.api.all_articles()?,
        };
        Ok(articles)
    }

    fn set_status(
        &self,
        current: &[Article],
        slug: &str,
        status: ArticleStatus,
    ) -> RepoResult<Vec<Article>> {
        let updated = self.api.update_article_status(slug, status)?;
        Ok(replace_by_slug(current, slug, &updated))
    }
}
