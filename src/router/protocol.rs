//! Router Control-Plane Protocol
//!
//! DTOs for node registration and deregistration. The storage operations
//! themselves reuse `crate::storage::protocol` unchanged; the router's
//! public surface is wire-compatible with a single node.

use serde::{Deserialize, Serialize};

/// A storage node as the router sees it: a stable id plus a transport
/// locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: String,
    pub addr: String,
}

/// Body of `POST /register-node`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterNodeRequest {
    pub id: String,
    pub addr: String,
}

/// Body of `POST /deregister-node`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeregisterNodeRequest {
    pub id: String,
}

/// Response to a successful registration: the full active node set,
/// including the node that just registered. The new node derives its
/// bootstrap ownership set from this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterNodeResponse {
    #[serde(rename = "activeNodes")]
    pub active_nodes: Vec<NodeInfo>,
}
