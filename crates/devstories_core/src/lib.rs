//! Core article store for DevStories.
//! This crate owns the article collection, its persistence backends and search.

pub mod api;
pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod storage;
pub mod store;

pub use api::{ApiClient, ApiError, ApiResult, ArticleApi};
pub use config::{ConfigError, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::article::{Article, ArticlePatch, ArticleStatus};
pub use model::category::{categories, category_info, Category, CategoryInfo};
pub use model::seed::default_articles;
pub use repo::{
    open_repository, ArticleRepository, ArticleScope, Backend, LocalArticleRepository,
    RemoteArticleRepository, RepoError, RepoResult,
};
pub use search::{CachedSearch, SearchHit, SearchIndex, SearchKey, SearchOptions};
pub use service::authoring::{extract_excerpt, slugify, ArticleDraft};
pub use storage::{
    open_storage, KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError,
};
pub use store::{ArticleStore, StoreError, StoreResult, SubscriptionId};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
