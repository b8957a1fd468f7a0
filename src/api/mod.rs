//! HTTP collaborators: dataset fetch, row mutation, saved-view persistence
//!
//! All calls are asynchronous and non-blocking; the UI loop is never
//! suspended on the network. Failures come back as `ExplorerError` values,
//! never panics.

pub mod client;
pub mod saved_views;

pub use client::ApiClient;
pub use saved_views::{NewSavedView, SavedView, SavedViewPatch, SavedViewStore, ViewKind};
