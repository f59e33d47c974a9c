//! Read-only HTTP API gateway.
//!
//! Each sibling module exports a subrouter; this gateway merges them and
//! attaches the shared `(store, config)` state so `main.rs` only sees one
//! `router` call.

use axum::Router;

use crate::{Config, ReadingStore};

mod health;
mod summaries;

// ---

pub fn router<S>(store: S, config: Config) -> Router
where
    S: ReadingStore + Clone + Send + Sync + 'static,
{
    // ---
    Router::new()
        .merge(summaries::router::<S>())
        .merge(health::router())
        .with_state((store, config))
}
