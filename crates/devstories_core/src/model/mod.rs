//! Article domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by the store, adapters and search.
//! - Provide pure collection helpers shared by both repository backends.
//!
//! # Invariants
//! - Every article is identified by its `slug`.
//! - Category metadata is a fixed table, never mutated at runtime.

pub mod article;
pub mod category;
pub mod collection;
pub mod seed;
