//! Distributed Key-Value Database Library
//!
//! This library crate defines the core modules of a small distributed
//! database speaking a subset of the DynamoDB wire protocol. It serves as
//! the foundation for the two binaries (`dynastore-node` and
//! `dynastore-router`).
//!
//! ## Architecture Modules
//! The system is composed of loosely coupled subsystems:
//!
//! - **`model`**: The data model. Typed attribute values, table key
//!   schemas, and the composite primary-key codec that gives each table an
//!   ordered key space.
//! - **`expression`**: The SET/REMOVE/ADD/DELETE update-expression
//!   interpreter behind UpdateItem.
//! - **`storage`**: The node-local storage engine. One embedded B+tree
//!   file per node, one bucket per table plus a metadata bucket, and the
//!   table/item operations with paginated scans.
//! - **`node`**: The storage node service. Exposes the engine over a
//!   single action-multiplexed RPC endpoint, plus the internal scan
//!   surface and the startup synchronization that pulls owned tables from
//!   a peer.
//! - **`router`**: The cluster entry point. Consistent-hash ring,
//!   membership, per-node RPC clients, and dispatch of item operations to
//!   owners and table-lifecycle operations to every member.
//! - **`client`**: HTTP clients for the storage protocol and the router's
//!   control plane.
//! - **`api`**: Shared HTTP plumbing for the wire contract (target-header
//!   demultiplexing, error envelope).
//! - **`error`**: The crate-wide error kinds and their wire envelope.

pub mod api;
pub mod client;
pub mod error;
pub mod expression;
pub mod model;
pub mod node;
pub mod router;
pub mod storage;
