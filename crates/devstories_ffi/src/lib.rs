//! Flutter-facing bindings for the DevStories article store.

pub mod api;
