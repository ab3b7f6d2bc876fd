//! Use-case helpers layered over the model.
//!
//! # Responsibility
//! - Turn author input into complete articles (slug, excerpt, defaults).

pub mod authoring;
