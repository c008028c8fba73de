//! Routing Module
//!
//! The single entry point clients talk to. Owns the cluster topology and
//! forwards every operation to the storage node(s) responsible for it.
//!
//! ## Core Concepts
//! - **Consistent-hash ring**: each node id is hashed onto the ring at
//!   several virtual points; a table's owner is the first ring member at
//!   or past `hash(tableName)`, wrapping around. Adding or removing one
//!   node only moves the tables between it and its ring neighbors.
//! - **Topology atomicity**: the ring, the `id → node` map and the
//!   `id → client` map are mutated together under one readers-writer
//!   lock, so dispatch never observes a torn view.
//! - **Dispatch**: item operations go to the single owner of their table;
//!   table lifecycle and listing fan out to every member.
//!
//! ## Submodules
//! - **`ring`**: the consistent-hash ring.
//! - **`service`**: topology state and operation dispatch.
//! - **`handlers`**: HTTP handlers for the public surface and the
//!   membership control plane.
//! - **`protocol`**: control-plane DTOs.

pub mod handlers;
pub mod protocol;
pub mod ring;
pub mod service;


use std::sync::Arc;

use axum::routing::{get, post};
use axum::Extension;

/// Builds the router's HTTP application: the action-multiplexed public
/// endpoint, the membership control plane and a small health surface.
pub fn app(service: Arc<service::Router>) -> axum::Router {
    axum::Router::new()
        .route("/", post(handlers::handle_action))
        .route("/register-node", post(handlers::handle_register_node))
        .route("/deregister-node", post(handlers::handle_deregister_node))
        .route("/health/routes", get(handlers::handle_routes))
        .layer(Extension(service))
}
