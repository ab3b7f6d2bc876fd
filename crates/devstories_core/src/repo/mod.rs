//! Article repository capability and its two backends.
//!
//! # Responsibility
//! - Define the collection-level contract the store mutates through.
//! - Isolate remote-vs-fallback behavior behind one trait selected at
//!   construction time.
//!
//! # Invariants
//! - Mutations take the current collection and return the next one; a failed
//!   call returns an error and no collection, so callers never see partial state.
//! - `load` always yields a collection for the fallback backend (reseeding on
//!   absent or corrupt data).

pub mod article_repo;
pub mod local_repo;
pub mod remote_repo;

pub use article_repo::{
    open_repository, ArticleRepository, ArticleScope, Backend, RepoError, RepoResult,
};
pub use local_repo::LocalArticleRepository;
pub use remote_repo::RemoteArticleRepository;
