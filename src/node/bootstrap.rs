//! Startup synchronization.
//!
//! When a node registers, table ownership shifts onto it immediately, but
//! the data is still sitting on the previous owner. Before the node opens
//! its public port it therefore walks every table in the cluster, and for
//! each table it now owns it pulls the previous owner's copy through the
//! peer-to-peer internal scan, page by page, into the local engine.
//!
//! The previous owner of a table is computed from the same ring with this
//! node removed: that is the member the table hashed to before this node
//! joined. Per-table and per-item failures are logged and skipped so a
//! flaky peer cannot wedge startup; the node then comes up best-effort.

use crate::client::NodeClient;
use crate::error::Result;
use crate::router::protocol::NodeInfo;
use crate::router::ring::HashRing;
use crate::storage::engine::TableStore;
use crate::storage::protocol::{DescribeTableRequest, PutItemRequest, ScanRequest};

/// Pulls every table this node now owns from its previous owner. The
/// active set must include the local node; `router_addr` is used to list
/// the cluster's tables.
pub async fn synchronize(
    store: &TableStore,
    self_id: &str,
    active: &[NodeInfo],
    router_addr: &str,
    ring_replicas: usize,
    page_size: usize,
) -> Result<()> {
    let mut ring = HashRing::new(ring_replicas);
    for node in active {
        ring.add(&node.id);
    }
    // The membership as it was before this node joined.
    let mut previous = ring.clone();
    previous.remove(self_id);

    let router_client = NodeClient::new(router_addr);
    let tables = router_client.list_tables().await?;

    for table in tables {
        if ring.owner(&table) != Some(self_id) {
            continue;
        }
        let Some(peer_id) = previous.owner(&table) else {
            tracing::info!(
                "No previous owner for table {}; starting with empty data",
                table
            );
            continue;
        };
        let Some(peer) = active.iter().find(|n| n.id == peer_id) else {
            tracing::warn!("Previous owner {} of table {} is not active", peer_id, table);
            continue;
        };

        tracing::info!("Syncing table {} from node {} ({})", table, peer.id, peer.addr);
        let client = NodeClient::new(&peer.addr);
        if let Err(e) = sync_table(store, &client, &table, page_size).await {
            tracing::warn!("Failed to sync table {} from {}: {}", table, peer.id, e);
        }
    }
    Ok(())
}

/// Copies one table from `peer`: schema first (a node that joined after
/// CreateTable never saw the fan-out), then every item via paginated
/// internal scan.
async fn sync_table(
    store: &TableStore,
    peer: &NodeClient,
    table: &str,
    page_size: usize,
) -> Result<()> {
    let schema = peer
        .describe_table(&DescribeTableRequest {
            table_name: table.to_string(),
        })
        .await?;
    store.create_table(&schema)?;

    let mut exclusive_start_key = None;
    let mut synced = 0usize;
    loop {
        let page = peer
            .internal_scan(&ScanRequest {
                table_name: table.to_string(),
                limit: Some(page_size),
                exclusive_start_key,
            })
            .await?;

        for item in page.items {
            let req = PutItemRequest {
                table_name: table.to_string(),
                item,
            };
            match store.put(&req) {
                Ok(()) => synced += 1,
                Err(e) => tracing::warn!("Failed to store synced item for {}: {}", table, e),
            }
        }

        match page.last_evaluated_key {
            Some(key) => exclusive_start_key = Some(key),
            None => break,
        }
    }

    tracing::info!("Finished syncing {} items for table {}", synced, table);
    Ok(())
}
