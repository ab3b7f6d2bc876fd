//! Blocking HTTP implementation of the articles API.

use super::{ApiError, ApiResult, ArticleApi};
use crate::model::article::{Article, ArticlePatch, ArticleStatus, StatusUpdate};
use crate::model::category::Category;
use crate::storage::{KeyValueStore, TOKEN_KEY};
use log::{debug, info, warn};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Base URL used when configuration does not provide one.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
/// Per-request timeout applied by [`ApiClient::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the articles backend.
pub struct ApiClient {
    http: Client,
    base_url: Url,
    credentials: Option<Arc<dyn KeyValueStore>>,
}

impl ApiClient {
    /// Creates a client rooted at `base_url` with [`DEFAULT_TIMEOUT`].
    ///
    /// # Errors
    /// - `ApiError::Transport` when `base_url` is not an absolute http(s) URL
    ///   or the HTTP backend cannot be initialized.
    pub fn new(base_url: &str) -> ApiResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client with an explicit per-request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let base_url = parse_base_url(base_url)?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        Ok(Self {
            http,
            base_url,
            credentials: None,
        })
    }

    /// Reads the bearer token from `store` (key `token`) on every request.
    pub fn with_credentials(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.credentials = Some(store);
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// `GET /articles/{slug}`
    pub fn get_article(&self, slug: &str) -> ApiResult<Article> {
        self.fetch(Method::GET, &["articles", slug], None)
    }

    /// `GET /articles/search?q=`
    pub fn search_articles(&self, query: &str) -> ApiResult<Vec<Article>> {
        self.fetch(Method::GET, &["articles", "search"], Some(("q", query)))
    }

    /// `GET /articles?category=`
    pub fn articles_by_category(&self, category: Category) -> ApiResult<Vec<Article>> {
        self.fetch(
            Method::GET,
            &["articles"],
            Some(("category", category.as_str())),
        )
    }

    /// Builds the absolute URL for `segments` below the base path. Segments
    /// are percent-encoded individually.
    pub fn endpoint_url(&self, segments: &[&str], query: Option<(&str, &str)>) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Transport(format!("base url `{}` cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        if let Some((key, value)) = query {
            url.query_pairs_mut().append_pair(key, value);
        }
        Ok(url)
    }

    fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        query: Option<(&str, &str)>,
    ) -> ApiResult<T> {
        let builder = self.request(method, segments, query)?;
        decode(self.execute(builder)?)
    }

    fn request(
        &self,
        method: Method,
        segments: &[&str],
        query: Option<(&str, &str)>,
    ) -> ApiResult<RequestBuilder> {
        let url = self.endpoint_url(segments, query)?;
        let mut builder = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = self.bearer_token() {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    fn execute(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let request = builder
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        let started_at = Instant::now();

        let response = self.http.execute(request).map_err(|err| {
            warn!(
                "event=api_request module=api status=error method={method} path={path} duration_ms={} error_code=transport",
                started_at.elapsed().as_millis()
            );
            ApiError::Transport(err.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                "event=api_request module=api status=error method={method} path={path} http_status={} duration_ms={}",
                status.as_u16(),
                started_at.elapsed().as_millis()
            );
            return Err(ApiError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        info!(
            "event=api_request module=api status=ok method={method} path={path} http_status={} duration_ms={}",
            status.as_u16(),
            started_at.elapsed().as_millis()
        );
        Ok(response)
    }

    fn bearer_token(&self) -> Option<String> {
        let store = self.credentials.as_ref()?;
        match store.get(TOKEN_KEY) {
            Ok(token) => token.filter(|value| !value.trim().is_empty()),
            Err(err) => {
                // Unauthenticated requests are still sent; the backend rejects them.
                debug!("event=api_token module=api status=error error={err}");
                None
            }
        }
    }
}

impl ArticleApi for ApiClient {
    fn list_articles(&self) -> ApiResult<Vec<Article>> {
        self.fetch(Method::GET, &["articles"], None)
    }

    fn create_article(&self, article: &Article) -> ApiResult<Article> {
        let builder = self.request(Method::POST, &["articles"], None)?.json(article);
        decode(self.execute(builder)?)
    }

    fn update_article(&self, slug: &str, patch: &ArticlePatch) -> ApiResult<Article> {
        let builder = self
            .request(Method::PUT, &["articles", slug], None)?
            .json(patch);
        decode(self.execute(builder)?)
    }

    fn delete_article(&self, slug: &str) -> ApiResult<()> {
        let builder = self.request(Method::DELETE, &["articles", slug], None)?;
        self.execute(builder)?;
        Ok(())
    }

    fn my_articles(&self) -> ApiResult<Vec<Article>> {
        self.fetch(Method::GET, &["articles", "my"], None)
    }

    fn pending_articles(&self) -> ApiResult<Vec<Article>> {
        self.fetch(Method::GET, &["articles", "pending"], None)
    }

    fn all_articles(&self) -> ApiResult<Vec<Article>> {
        self.fetch(Method::GET, &["articles", "all"], None)
    }

    fn update_article_status(&self, slug: &str, status: ArticleStatus) -> ApiResult<Article> {
        let builder = self
            .request(Method::PUT, &["articles", slug, "status"], None)?
            .json(&StatusUpdate { status });
        decode(self.execute(builder)?)
    }
}

fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    response
        .json::<T>()
        .map_err(|err| ApiError::Decode(err.to_string()))
}

fn parse_base_url(raw: &str) -> ApiResult<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed)
        .map_err(|err| ApiError::Transport(format!("invalid api url `{trimmed}`: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::Transport(format!(
            "unsupported api url scheme `{}`",
            url.scheme()
        )));
    }
    Ok(url)
}
