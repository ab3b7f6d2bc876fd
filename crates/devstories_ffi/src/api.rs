//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the article store to Dart via FRB as flat, use-case-level calls.
//! - Own the single process-wide `ArticleStore` instance.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - The first successful `store_open` (or first lazy open from the
//!   environment) fixes the backend for the process lifetime.
//! - Return values are UTF-8 strings or plain envelopes with stable meaning.

use devstories_core::{
    categories as categories_inner, core_version as core_version_inner,
    init_logging as init_logging_inner, open_repository, open_storage, ping as ping_inner,
    Article, ArticleDraft, ArticlePatch, ArticleRepository, ArticleScope, ArticleStatus,
    ArticleStore, Category, StoreConfig,
};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};

const SEARCH_DEFAULT_LIMIT: u32 = 20;
const SEARCH_LIMIT_MAX: u32 = 50;

type SharedStore = ArticleStore<Box<dyn ArticleRepository>>;

static STORE: OnceLock<SharedStore> = OnceLock::new();
// Held while a store is being built so concurrent first calls build only one.
static STORE_INIT: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Article projection handed to Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleItem {
    pub slug: String,
    pub title: String,
    pub author: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Category wire name, e.g. `IA`.
    pub category: String,
    pub image: String,
    pub excerpt: String,
    /// Markdown body.
    pub content: String,
    /// `pending|published|rejected`; absent status reads as `pending`.
    pub status: String,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleListResponse {
    pub items: Vec<ArticleItem>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleActionResponse {
    pub ok: bool,
    /// Slug affected by the action, when there is one.
    pub slug: Option<String>,
    pub message: String,
}

impl ArticleActionResponse {
    fn success(message: impl Into<String>, slug: Option<String>) -> Self {
        Self {
            ok: true,
            slug,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            slug: None,
            message: message.into(),
        }
    }
}

/// Category display metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryItem {
    pub name: String,
    pub label: String,
    pub color: String,
    pub bg_color: String,
}

/// Opens the process-wide store.
///
/// Input semantics:
/// - `use_api`: remote mode when `true`, local fallback otherwise.
/// - `api_url`: base URL for remote mode; `None` keeps the default.
/// - `storage_path`: absolute SQLite file for local state; `None` keeps it in memory.
///
/// # FFI contract
/// - Sync call; may perform network and file-system work.
/// - A second call after success is a no-op reporting the active backend.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn store_open(
    use_api: bool,
    api_url: Option<String>,
    storage_path: Option<String>,
) -> ArticleActionResponse {
    if let Some(store) = STORE.get() {
        return ArticleActionResponse::success(
            format!("Store already open ({}).", store.backend().as_str()),
            None,
        );
    }

    let mut config = StoreConfig {
        use_api,
        ..StoreConfig::default()
    };
    if let Some(url) = api_url.filter(|url| !url.trim().is_empty()) {
        config.api_url = url.trim().trim_end_matches('/').to_string();
    }
    if let Some(path) = storage_path.filter(|path| !path.trim().is_empty()) {
        let path = PathBuf::from(path.trim());
        if !path.is_absolute() {
            return ArticleActionResponse::failure(format!(
                "store_open failed: storage_path must be absolute, got `{}`",
                path.display()
            ));
        }
        config.storage_path = Some(path);
    }

    match install_store(&config) {
        Ok(store) => ArticleActionResponse::success(
            format!("Store open ({}).", store.backend().as_str()),
            None,
        ),
        Err(err) => ArticleActionResponse::failure(format!("store_open failed: {err}")),
    }
}

/// Lists articles in `category` (`HOME` or `None` for everything).
///
/// # FFI contract
/// - Sync call, served from the in-memory snapshot.
/// - Unknown category names return an empty list with a message.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn articles_list(category: Option<String>) -> ArticleListResponse {
    let category = match category.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(name) => match Category::parse(name) {
            Some(category) => Some(category),
            None => return list_failure(format!("unknown category `{name}`")),
        },
    };

    match shared_store() {
        Ok(store) => list_success(store.articles_in(category)),
        Err(err) => list_failure(format!("articles_list failed: {err}")),
    }
}

/// Newest-first articles, at most `limit` (default 3).
#[flutter_rust_bridge::frb(sync)]
pub fn articles_latest(limit: Option<u32>) -> ArticleListResponse {
    let limit = limit.filter(|value| *value > 0).unwrap_or(3) as usize;
    match shared_store() {
        Ok(store) => list_success(store.latest(limit)),
        Err(err) => list_failure(format!("articles_latest failed: {err}")),
    }
}

/// Returns the article with exactly `slug`, if any.
///
/// # FFI contract
/// - Sync call, served from the in-memory snapshot.
/// - Never panics; store failures read as `None`.
#[flutter_rust_bridge::frb(sync)]
pub fn article_get(slug: String) -> Option<ArticleItem> {
    match shared_store() {
        Ok(store) => store.article_by_slug(slug.trim()).map(to_article_item),
        Err(err) => {
            warn!("event=ffi_call module=ffi call=article_get status=error error={err}");
            None
        }
    }
}

/// Fuzzy search over the current snapshot.
///
/// # FFI contract
/// - Queries shorter than two characters return the whole collection.
/// - `limit` is clamped to `1..=50`; `None` or `0` uses 20.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn article_search(query: String, limit: Option<u32>) -> ArticleListResponse {
    let limit = normalize_search_limit(limit) as usize;
    match shared_store() {
        Ok(store) => {
            let mut hits = store.search(&query);
            hits.truncate(limit);
            list_success(hits)
        }
        Err(err) => list_failure(format!("article_search failed: {err}")),
    }
}

/// Creates an article from author input.
///
/// Slug, excerpt, date, author and cover image are derived when absent.
///
/// # FFI contract
/// - Sync call; remote mode performs a network request.
/// - Never panics; returns the created slug on success.
#[flutter_rust_bridge::frb(sync)]
pub fn article_create(
    title: String,
    content: String,
    category: String,
    author: Option<String>,
    image: Option<String>,
    excerpt: Option<String>,
) -> ArticleActionResponse {
    let title = title.trim().to_string();
    if title.is_empty() {
        return ArticleActionResponse::failure("article_create failed: title is required");
    }
    let Some(category) = Category::parse(&category) else {
        return ArticleActionResponse::failure(format!(
            "article_create failed: unknown category `{category}`"
        ));
    };

    let mut draft = ArticleDraft::new(title, content, category);
    draft.author = author;
    draft.image = image;
    draft.excerpt = excerpt;
    let article = draft.into_article();
    if article.slug.is_empty() {
        return ArticleActionResponse::failure(
            "article_create failed: title produces an empty slug",
        );
    }
    let slug = article.slug.clone();

    match shared_store().and_then(|store| store.add_article(article).map_err(|err| err.to_string()))
    {
        Ok(()) => ArticleActionResponse::success("Article created.", Some(slug)),
        Err(err) => ArticleActionResponse::failure(format!("article_create failed: {err}")),
    }
}

/// Applies the present fields to the article matching `slug`.
///
/// # FFI contract
/// - `None` fields are left untouched.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn article_update(
    slug: String,
    title: Option<String>,
    excerpt: Option<String>,
    content: Option<String>,
    category: Option<String>,
    image: Option<String>,
    author: Option<String>,
) -> ArticleActionResponse {
    let category = match category.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(name) => match Category::parse(name) {
            Some(category) => Some(category),
            None => {
                return ArticleActionResponse::failure(format!(
                    "article_update failed: unknown category `{name}`"
                ))
            }
        },
    };
    let patch = ArticlePatch {
        title,
        excerpt,
        content,
        category,
        image,
        author,
        ..ArticlePatch::default()
    };
    if patch.is_empty() {
        return ArticleActionResponse::failure("article_update failed: nothing to update");
    }

    let slug = slug.trim().to_string();
    match shared_store()
        .and_then(|store| store.update_article(&slug, &patch).map_err(|err| err.to_string()))
    {
        Ok(()) => ArticleActionResponse::success("Article updated.", Some(slug)),
        Err(err) => ArticleActionResponse::failure(format!("article_update failed: {err}")),
    }
}

/// Deletes the first article matching `slug`.
///
/// # FFI contract
/// - Unknown slugs succeed without change in local mode.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn article_delete(slug: String) -> ArticleActionResponse {
    let slug = slug.trim().to_string();
    match shared_store().and_then(|store| store.delete_article(&slug).map_err(|err| err.to_string()))
    {
        Ok(()) => ArticleActionResponse::success("Article deleted.", Some(slug)),
        Err(err) => ArticleActionResponse::failure(format!("article_delete failed: {err}")),
    }
}

/// The caller's own submissions, any status.
///
/// # FFI contract
/// - Sync call; remote mode performs a network request with the stored token.
/// - Local mode has no roles and lists the whole collection.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn articles_mine() -> ArticleListResponse {
    scoped_list("articles_mine", ArticleScope::Mine)
}

/// Moderation queue: articles whose status is `pending`.
///
/// # FFI contract
/// - Remote mode requires a privileged token; rejection is reported in `message`.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn articles_pending() -> ArticleListResponse {
    scoped_list("articles_pending", ArticleScope::Pending)
}

/// Administrative listing of every article, any status.
#[flutter_rust_bridge::frb(sync)]
pub fn articles_all() -> ArticleListResponse {
    scoped_list("articles_all", ArticleScope::All)
}

/// Moves the article matching `slug` to `status` (`pending|published|rejected`).
///
/// # FFI contract
/// - Unknown status names are rejected before any store access.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn article_set_status(slug: String, status: String) -> ArticleActionResponse {
    let Some(status) = ArticleStatus::parse(status.trim()) else {
        return ArticleActionResponse::failure(format!(
            "article_set_status failed: unknown status `{}`",
            status.trim()
        ));
    };

    let slug = slug.trim().to_string();
    match shared_store().and_then(|store| {
        store
            .set_article_status(&slug, status)
            .map_err(|err| err.to_string())
    }) {
        Ok(()) => ArticleActionResponse::success(
            format!("Article status set to {}.", status.as_str()),
            Some(slug),
        ),
        Err(err) => ArticleActionResponse::failure(format!("article_set_status failed: {err}")),
    }
}

/// Reloads the collection from the backend (no-op in local mode).
///
/// # FFI contract
/// - Sync call; remote mode performs a network request.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn store_refresh() -> ArticleActionResponse {
    match shared_store().and_then(|store| store.refresh().map_err(|err| err.to_string())) {
        Ok(()) => ArticleActionResponse::success("Store refreshed.", None),
        Err(err) => ArticleActionResponse::failure(format!("store_refresh failed: {err}")),
    }
}

/// Category table in navigation order.
#[flutter_rust_bridge::frb(sync)]
pub fn categories() -> Vec<CategoryItem> {
    categories_inner()
        .iter()
        .map(|info| CategoryItem {
            name: info.name.as_str().to_string(),
            label: info.label.to_string(),
            color: info.color.to_string(),
            bg_color: info.bg_color.to_string(),
        })
        .collect()
}

/// Returns the open store, opening it from the environment on first use.
fn shared_store() -> Result<&'static SharedStore, String> {
    if let Some(store) = STORE.get() {
        return Ok(store);
    }
    let config = StoreConfig::from_env().map_err(|err| err.to_string())?;
    install_store(&config)
}

fn install_store(config: &StoreConfig) -> Result<&'static SharedStore, String> {
    let _init = STORE_INIT.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(store) = STORE.get() {
        info!("event=ffi_store_open module=ffi status=skipped reason=already_open");
        return Ok(store);
    }

    let storage = open_storage(config.storage_path.as_deref()).map_err(|err| err.to_string())?;
    let repo = open_repository(config, storage).map_err(|err| err.to_string())?;
    Ok(STORE.get_or_init(|| ArticleStore::open(repo)))
}

fn scoped_list(call: &str, scope: ArticleScope) -> ArticleListResponse {
    match shared_store().and_then(|store| store.articles_for(scope).map_err(|err| err.to_string()))
    {
        Ok(articles) => list_success(articles),
        Err(err) => list_failure(format!("{call} failed: {err}")),
    }
}

fn normalize_search_limit(limit: Option<u32>) -> u32 {
    match limit {
        None | Some(0) => SEARCH_DEFAULT_LIMIT,
        Some(value) => value.min(SEARCH_LIMIT_MAX),
    }
}

fn list_success(articles: Vec<Article>) -> ArticleListResponse {
    let items: Vec<ArticleItem> = articles.into_iter().map(to_article_item).collect();
    let message = if items.is_empty() {
        "No articles.".to_string()
    } else {
        format!("Found {} article(s).", items.len())
    };
    ArticleListResponse { items, message }
}

fn list_failure(message: String) -> ArticleListResponse {
    ArticleListResponse {
        items: Vec::new(),
        message,
    }
}

fn to_article_item(article: Article) -> ArticleItem {
    ArticleItem {
        status: article.effective_status().as_str().to_string(),
        category: article.category.as_str().to_string(),
        slug: article.slug,
        title: article.title,
        author: article.author,
        date: article.date,
        image: article.image,
        excerpt: article.excerpt,
        content: article.content,
    }
}
