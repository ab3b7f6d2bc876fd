//! Article store: the one owner of the in-memory article collection.
//!
//! # Responsibility
//! - Hold the current snapshot and hand it to readers without copying.
//! - Route every mutation through the configured repository.
//! - Notify subscribers exactly once after each successful mutation.
//!
//! # Invariants
//! - Subscribers are never notified before the new snapshot is readable.
//! - Failed mutations leave the snapshot untouched and notify nobody.
//! - Listeners run with no store lock held, so they may read or mutate.

mod article_store;

pub use article_store::{ArticleStore, StoreError, StoreResult, SubscriptionId};
