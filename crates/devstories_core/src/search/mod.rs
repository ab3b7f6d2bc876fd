//! Client-side fuzzy search over article snapshots.
//!
//! # Responsibility
//! - Build a per-snapshot index over a fixed set of article fields.
//! - Rank approximate matches best-first by a similarity threshold.
//!
//! # Invariants
//! - A blank query, or one shorter than `min_match_chars`, is "not searching"
//!   and returns the whole collection unfiltered.
//! - The index is never shared across snapshots; `CachedSearch` rebuilds when
//!   the snapshot pointer changes.

pub mod fuzzy;

pub use fuzzy::{CachedSearch, SearchHit, SearchIndex, SearchKey, SearchOptions};
