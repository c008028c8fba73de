//! Topology state and operation dispatch.
//!
//! The router's entire mutable state is one `Topology` value: the ring,
//! the node map and the client map, guarded by a single readers-writer
//! lock so the three can never disagree. Membership changes take the
//! writer; dispatch takes the reader, clones what it needs and releases
//! the lock before any network call. An operation racing a membership
//! change sees either the old or the new topology, never a torn one.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::client::NodeClient;
use crate::error::{Error, Result};
use crate::model::schema::TableDef;
use crate::model::value::Item;
use crate::router::protocol::NodeInfo;
use crate::router::ring::HashRing;
use crate::storage::protocol::{
    DeleteItemRequest, DeleteTableRequest, DescribeTableRequest, GetItemRequest, PutItemRequest,
    QueryRequest, ScanRequest, ScanResponse, UpdateItemRequest,
};

struct Topology {
    ring: HashRing,
    nodes: HashMap<String, NodeInfo>,
    clients: HashMap<String, NodeClient>,
}

/// Routes storage operations to the nodes owning them.
pub struct Router {
    topology: RwLock<Topology>,
}

impl Router {
    pub fn new(replicas: usize) -> Self {
        Router {
            topology: RwLock::new(Topology {
                ring: HashRing::new(replicas),
                nodes: HashMap::new(),
                clients: HashMap::new(),
            }),
        }
    }

    /// Adds a node to the ring, the node map and the client map, and
    /// returns the resulting active set (the new node included).
    pub async fn add_node(&self, node: NodeInfo) -> Vec<NodeInfo> {
        let mut topology = self.topology.write().await;
        topology.ring.add(&node.id);
        topology
            .clients
            .insert(node.id.clone(), NodeClient::new(&node.addr));
        topology.nodes.insert(node.id.clone(), node);
        topology.nodes.values().cloned().collect()
    }

    /// Removes a node from all three maps. In-flight dispatches that
    /// already cloned the node's client will surface their transport
    /// errors to their callers.
    pub async fn remove_node(&self, id: &str) {
        let mut topology = self.topology.write().await;
        topology.ring.remove(id);
        topology.nodes.remove(id);
        topology.clients.remove(id);
    }

    /// The current active node set.
    pub async fn active_nodes(&self) -> Vec<NodeInfo> {
        let topology = self.topology.read().await;
        topology.nodes.values().cloned().collect()
    }

    /// The client of the node owning `key` under the current ring.
    async fn owner_client(&self, key: &str) -> Result<NodeClient> {
        let topology = self.topology.read().await;
        let owner = topology.ring.owner(key).ok_or(Error::NoNodes)?;
        topology
            .clients
            .get(owner)
            .cloned()
            .ok_or_else(|| Error::Transport(format!("no client for node {}", owner)))
    }

    /// A snapshot of every member's client, for fan-out operations.
    async fn all_clients(&self) -> Vec<(String, NodeClient)> {
        let topology = self.topology.read().await;
        topology
            .clients
            .iter()
            .map(|(id, client)| (id.clone(), client.clone()))
            .collect()
    }

    /// Creates the table on every member.
    ///
    /// All calls complete regardless of individual failures; the first
    /// error encountered wins, otherwise the first successful description
    /// is returned. There is no rollback of partially applied creates.
    pub async fn create_table(&self, schema: &TableDef) -> Result<TableDef> {
        let clients = self.all_clients().await;
        if clients.is_empty() {
            return Err(Error::NoNodes);
        }
        let mut first_ok = None;
        let mut first_err = None;
        for (id, client) in clients {
            match client.create_table(schema).await {
                Ok(desc) => {
                    if first_ok.is_none() {
                        first_ok = Some(desc);
                    }
                }
                Err(e) => {
                    tracing::warn!("CreateTable {} failed on node {}: {}", schema.table_name, id, e);
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => first_ok.ok_or(Error::NoNodes),
        }
    }

    /// Deletes the table on every member, with the same error policy as
    /// `create_table`.
    pub async fn delete_table(&self, req: &DeleteTableRequest) -> Result<TableDef> {
        let clients = self.all_clients().await;
        if clients.is_empty() {
            return Err(Error::NoNodes);
        }
        let mut first_ok = None;
        let mut first_err = None;
        for (id, client) in clients {
            match client.delete_table(req).await {
                Ok(desc) => {
                    if first_ok.is_none() {
                        first_ok = Some(desc);
                    }
                }
                Err(e) => {
                    tracing::warn!("DeleteTable {} failed on node {}: {}", req.table_name, id, e);
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => first_ok.ok_or(Error::NoNodes),
        }
    }

    /// Describes the table on its single owner.
    pub async fn describe_table(&self, req: &DescribeTableRequest) -> Result<TableDef> {
        let client = self.owner_client(&req.table_name).await?;
        client.describe_table(req).await
    }

    /// The set-union of table names across every member.
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let clients = self.all_clients().await;
        if clients.is_empty() {
            return Err(Error::NoNodes);
        }
        let mut names = std::collections::BTreeSet::new();
        let mut first_err = None;
        for (id, client) in clients {
            match client.list_tables().await {
                Ok(tables) => names.extend(tables),
                Err(e) => {
                    tracing::warn!("ListTables failed on node {}: {}", id, e);
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(names.into_iter().collect()),
        }
    }

    pub async fn put_item(&self, req: &PutItemRequest) -> Result<()> {
        let client = self.owner_client(&req.table_name).await?;
        client.put_item(req).await
    }

    pub async fn get_item(&self, req: &GetItemRequest) -> Result<Option<Item>> {
        let client = self.owner_client(&req.table_name).await?;
        client.get_item(req).await
    }

    pub async fn delete_item(&self, req: &DeleteItemRequest) -> Result<()> {
        let client = self.owner_client(&req.table_name).await?;
        client.delete_item(req).await
    }

    pub async fn update_item(&self, req: &UpdateItemRequest) -> Result<Item> {
        let client = self.owner_client(&req.table_name).await?;
        client.update_item(req).await
    }

    pub async fn query(&self, req: &QueryRequest) -> Result<Vec<Item>> {
        let client = self.owner_client(&req.table_name).await?;
        client.query(req).await
    }

    pub async fn scan(&self, req: &ScanRequest) -> Result<ScanResponse> {
        let client = self.owner_client(&req.table_name).await?;
        client.scan(req).await
    }
}
