//! Storage Node Module
//!
//! One storage node: the local engine exposed over the action-multiplexed
//! RPC endpoint, the peer-to-peer internal scan surface, and the startup
//! synchronization that pulls a fresh node's tables from a peer before it
//! serves traffic.
//!
//! ## Submodules
//! - **`handlers`**: HTTP handlers for the public endpoint, the internal
//!   scan and the stats surface.
//! - **`bootstrap`**: registration-time table synchronization.

pub mod bootstrap;
pub mod handlers;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Extension;

use crate::storage::engine::TableStore;
use crate::storage::protocol::INTERNAL_SCAN_PATH;

/// Shared state of one node process.
pub struct NodeContext {
    /// Stable id of this node for the lifetime of the process.
    pub id: String,
    /// Address this node's RPC endpoint listens on.
    pub addr: String,
    /// The node-local storage engine.
    pub store: Arc<TableStore>,
}

/// Builds the node's HTTP application: the public action endpoint, the
/// internal scan surface and a small stats endpoint.
pub fn app(ctx: Arc<NodeContext>, max_body_bytes: usize) -> axum::Router {
    axum::Router::new()
        .route("/", post(handlers::handle_action))
        .route(INTERNAL_SCAN_PATH, post(handlers::handle_internal_scan))
        .route("/health/stats", get(handlers::handle_stats))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(Extension(ctx))
}
