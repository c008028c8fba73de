//! RPC Clients Module
//!
//! HTTP clients for talking to storage nodes and to the router's control
//! plane. `NodeClient` speaks the action-multiplexed storage protocol
//! (also implemented by the router's public surface, so the same client
//! works against either); `RouterClient` covers node registration.
//!
//! Transport failures are retried a few times with exponential backoff and
//! jitter before surfacing as a `Transport` error; a non-success HTTP
//! response is decoded from the error envelope back into the typed error
//! the remote side raised.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, ErrorBody, Result};
use crate::model::schema::TableDef;
use crate::model::value::Item;
use crate::router::protocol::{
    DeregisterNodeRequest, NodeInfo, RegisterNodeRequest, RegisterNodeResponse,
};
use crate::storage::protocol::*;

/// Fixed per-call timeout for every RPC.
const CALL_TIMEOUT: Duration = Duration::from_secs(10);
/// Transport-level retry attempts before giving up.
const RETRY_ATTEMPTS: usize = 3;

fn base_url(addr: &str) -> String {
    if addr.starts_with("http://") || addr.starts_with("https://") {
        addr.trim_end_matches('/').to_string()
    } else {
        format!("http://{}", addr)
    }
}

async fn post_with_retry<T: Serialize>(
    http: &reqwest::Client,
    url: String,
    headers: &[(&str, String)],
    payload: &T,
) -> Result<reqwest::Response> {
    let mut delay_ms = 150u64;

    for attempt in 0..RETRY_ATTEMPTS {
        let mut request = http.post(url.clone()).json(payload).timeout(CALL_TIMEOUT);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }
        match request.send().await {
            Ok(resp) => return Ok(resp),
            Err(e) => {
                if attempt + 1 == RETRY_ATTEMPTS {
                    return Err(e.into());
                }
                let jitter = rand::random::<u64>() % 50;
                tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                delay_ms = (delay_ms * 2).min(1200);
            }
        }
    }

    Err(Error::Transport("retry attempts exhausted".to_string()))
}

/// Decodes a response: success bodies deserialize into `R`, error bodies
/// are mapped back to the typed error from the envelope.
async fn decode<R: DeserializeOwned>(resp: reqwest::Response) -> Result<R> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }
    let status = status.as_u16();
    let text = resp.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => Err(Error::from_envelope(status, body)),
        Err(_) => Err(Error::Remote {
            status,
            message: text,
        }),
    }
}

/// Client for the storage protocol spoken by nodes (and, for the public
/// operations, by the router).
#[derive(Clone)]
pub struct NodeClient {
    base: String,
    http: reqwest::Client,
}

impl NodeClient {
    pub fn new(addr: &str) -> Self {
        NodeClient {
            base: base_url(addr),
            http: reqwest::Client::new(),
        }
    }

    /// POSTs an action-multiplexed request to the root endpoint.
    async fn do_action<T: Serialize, R: DeserializeOwned>(
        &self,
        action: &str,
        req: &T,
    ) -> Result<R> {
        let target = format!("{}.{}", TARGET_PREFIX, action);
        let resp = post_with_retry(
            &self.http,
            format!("{}/", self.base),
            &[(TARGET_HEADER, target)],
            req,
        )
        .await?;
        decode(resp).await
    }

    pub async fn create_table(&self, schema: &TableDef) -> Result<TableDef> {
        let resp: CreateTableResponse = self.do_action(ACTION_CREATE_TABLE, schema).await?;
        Ok(resp.table_description)
    }

    pub async fn delete_table(&self, req: &DeleteTableRequest) -> Result<TableDef> {
        let resp: DeleteTableResponse = self.do_action(ACTION_DELETE_TABLE, req).await?;
        Ok(resp.table_description)
    }

    pub async fn describe_table(&self, req: &DescribeTableRequest) -> Result<TableDef> {
        let resp: DescribeTableResponse = self.do_action(ACTION_DESCRIBE_TABLE, req).await?;
        Ok(resp.table)
    }

    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let resp: ListTablesResponse = self
            .do_action(ACTION_LIST_TABLES, &ListTablesRequest {})
            .await?;
        Ok(resp.table_names)
    }

    pub async fn put_item(&self, req: &PutItemRequest) -> Result<()> {
        let _: serde_json::Value = self.do_action(ACTION_PUT_ITEM, req).await?;
        Ok(())
    }

    pub async fn get_item(&self, req: &GetItemRequest) -> Result<Option<Item>> {
        let resp: GetItemResponse = self.do_action(ACTION_GET_ITEM, req).await?;
        Ok(resp.item)
    }

    pub async fn delete_item(&self, req: &DeleteItemRequest) -> Result<()> {
        let _: serde_json::Value = self.do_action(ACTION_DELETE_ITEM, req).await?;
        Ok(())
    }

    pub async fn update_item(&self, req: &UpdateItemRequest) -> Result<Item> {
        let resp: UpdateItemResponse = self.do_action(ACTION_UPDATE_ITEM, req).await?;
        Ok(resp.attributes)
    }

    pub async fn query(&self, req: &QueryRequest) -> Result<Vec<Item>> {
        let resp: QueryResponse = self.do_action(ACTION_QUERY, req).await?;
        Ok(resp.items)
    }

    pub async fn scan(&self, req: &ScanRequest) -> Result<ScanResponse> {
        self.do_action(ACTION_SCAN, req).await
    }

    /// Paginated scan over the peer-to-peer surface. Used only by
    /// bootstrap replication.
    pub async fn internal_scan(&self, req: &ScanRequest) -> Result<ScanResponse> {
        let resp = post_with_retry(
            &self.http,
            format!("{}{}", self.base, INTERNAL_SCAN_PATH),
            &[],
            req,
        )
        .await?;
        decode(resp).await
    }
}

/// Client for the router's membership control plane.
#[derive(Clone)]
pub struct RouterClient {
    base: String,
    http: reqwest::Client,
}

impl RouterClient {
    pub fn new(addr: &str) -> Self {
        RouterClient {
            base: base_url(addr),
            http: reqwest::Client::new(),
        }
    }

    /// Registers this node and returns the currently active node set,
    /// including the node itself.
    pub async fn register(&self, id: &str, addr: &str) -> Result<Vec<NodeInfo>> {
        let req = RegisterNodeRequest {
            id: id.to_string(),
            addr: addr.to_string(),
        };
        let resp = post_with_retry(&self.http, format!("{}/register-node", self.base), &[], &req)
            .await?;
        let resp: RegisterNodeResponse = decode(resp).await?;
        Ok(resp.active_nodes)
    }

    /// Removes this node from the router's membership.
    pub async fn deregister(&self, id: &str) -> Result<()> {
        let req = DeregisterNodeRequest { id: id.to_string() };
        let resp = post_with_retry(
            &self.http,
            format!("{}/deregister-node", self.base),
            &[],
            &req,
        )
        .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Remote {
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}
