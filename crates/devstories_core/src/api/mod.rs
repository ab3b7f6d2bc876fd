//! Remote REST client for the articles backend.
//!
//! # Responsibility
//! - Translate store operations into HTTP requests against a base URL.
//! - Attach the bearer credential from local storage when one is present.
//! - Collapse every non-2xx response into one `ApiError::Status` kind.
//!
//! # Invariants
//! - Authorization is the backend's job; the client only routes and attaches
//!   credentials.
//! - Error bodies are never parsed; only status code and reason survive.

use crate::model::article::{Article, ArticlePatch, ArticleStatus};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod client;

pub use client::{ApiClient, DEFAULT_API_URL, DEFAULT_TIMEOUT};

pub type ApiResult<T> = Result<T, ApiError>;

/// Uniform remote failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Non-success HTTP status with its canonical reason phrase.
    Status { code: u16, reason: String },
    /// Connection, timeout or request-building failure.
    Transport(String),
    /// Success response whose body did not decode.
    Decode(String),
}

impl ApiError {
    /// HTTP status code, when the failure came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status { code, reason } => write!(f, "API Error: {code} {reason}"),
            Self::Transport(message) => write!(f, "API transport error: {message}"),
            Self::Decode(message) => write!(f, "API response decode error: {message}"),
        }
    }
}

impl Error for ApiError {}

/// Store-facing subset of the remote endpoints.
pub trait ArticleApi: Send + Sync {
    /// `GET /articles`
    fn list_articles(&self) -> ApiResult<Vec<Article>>;
    /// `POST /articles`; returns the server representation.
    fn create_article(&self, article: &Article) -> ApiResult<Article>;
    /// `PUT /articles/{slug}`; returns the server representation.
    fn update_article(&self, slug: &str, patch: &ArticlePatch) -> ApiResult<Article>;
    /// `DELETE /articles/{slug}`
    fn delete_article(&self, slug: &str) -> ApiResult<()>;
    /// `GET /articles/my`: the caller's own submissions, any status.
    fn my_articles(&self) -> ApiResult<Vec<Article>>;
    /// `GET /articles/pending`: moderation queue.
    fn pending_articles(&self) -> ApiResult<Vec<Article>>;
    /// `GET /articles/all`: administrative listing.
    fn all_articles(&self) -> ApiResult<Vec<Article>>;
    /// `PUT /articles/{slug}/status`; returns the server representation.
    fn update_article_status(&self, slug: &str, status: ArticleStatus) -> ApiResult<Article>;
}

impl<A: ArticleApi + ?Sized> ArticleApi for std::sync::Arc<A> {
    fn list_articles(&self) -> ApiResult<Vec<Article>> {
        (**self).list_articles()
    }

    fn create_article(&self, article: &Article) -> ApiResult<Article> {
        (**self).create_article(article)
    }

    fn update_article(&self, slug: &str, patch: &ArticlePatch) -> ApiResult<Article> {
        (**self).update_article(slug, patch)
    }

    fn delete_article(&self, slug: &str) -> ApiResult<()> {
        (**self).delete_article(slug)
    }

    fn my_articles(&self) -> ApiResult<Vec<Article>> {
        (**self).my_articles()
    }

    fn pending_articles(&self) -> ApiResult<Vec<Article>> {
        (**self).pending_articles()
    }

    fn all_articles(&self) -> ApiResult<Vec<Article>> {
        (**self).all_articles()
    }

    fn update_article_status(&self, slug: &str, status: ArticleStatus) -> ApiResult<Article> {
        (**self).update_article_status(slug, status)
    }
}
