use std::sync::Arc;

use dynastore::client::RouterClient;
use dynastore::node::{self, bootstrap, NodeContext};
use dynastore::router::ring::DEFAULT_REPLICAS;
use dynastore::storage::engine::TableStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut node_id: Option<String> = None;
    let mut addr = "127.0.0.1:8001".to_string();
    let mut router_addr = "127.0.0.1:8081".to_string();
    let mut db_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--id" => {
                node_id = Some(args[i + 1].clone());
                i += 2;
            }
            "--addr" => {
                addr = args[i + 1].clone();
                i += 2;
            }
            "--router" => {
                router_addr = args[i + 1].clone();
                i += 2;
            }
            "--db" => {
                db_path = Some(args[i + 1].clone());
                i += 2;
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: {} [--id <id>] [--addr <host:port>] [--router <host:port>] [--db <path>]",
                    args[0]
                );
                std::process::exit(0);
            }
            _ => {
                i += 1;
            }
        }
    }

    let node_id = node_id.unwrap_or_else(|| format!("node-{}", uuid::Uuid::new_v4()));
    let db_path = db_path.unwrap_or_else(|| format!("./{}.db", node_id));

    let ring_replicas = std::env::var("RING_REPLICAS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(DEFAULT_REPLICAS);
    let page_size = std::env::var("SYNC_PAGE_SIZE")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(100);
    let max_body_bytes = std::env::var("MAX_BODY_BYTES")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(20 * 1024 * 1024);

    tracing::info!("Starting node {} on {}", node_id, addr);

    // 1. Register with the router; the response carries the active set.
    let router_client = RouterClient::new(&router_addr);
    let active = router_client.register(&node_id, &addr).await?;
    tracing::info!("Registered with router; {} active node(s)", active.len());

    // 2. Open the local store.
    let store = Arc::new(TableStore::open(&db_path)?);

    // 3. Pull every table this node now owns before opening the port.
    bootstrap::synchronize(
        &store,
        &node_id,
        &active,
        &router_addr,
        ring_replicas,
        page_size,
    )
    .await?;
    tracing::info!("Node {} synchronization complete", node_id);

    // 4. Deregister on shutdown.
    {
        let router_client = router_client.clone();
        let node_id = node_id.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                if let Err(e) = router_client.deregister(&node_id).await {
                    tracing::warn!("Failed to deregister node {}: {}", node_id, e);
                }
                std::process::exit(0);
            }
        });
    }

    // 5. Serve client traffic.
    let ctx = Arc::new(NodeContext {
        id: node_id,
        addr: addr.clone(),
        store,
    });
    let app = node::app(ctx, max_body_bytes);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Node RPC listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
