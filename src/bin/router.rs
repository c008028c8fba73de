use std::sync::Arc;

use dynastore::router::{self, ring::DEFAULT_REPLICAS, service::Router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut addr = "127.0.0.1:8081".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--addr" => {
                addr = args[i + 1].clone();
                i += 2;
            }
            "--help" | "-h" => {
                eprintln!("Usage: {} [--addr <host:port>]", args[0]);
                std::process::exit(0);
            }
            _ => {
                i += 1;
            }
        }
    }

    let ring_replicas = std::env::var("RING_REPLICAS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(DEFAULT_REPLICAS);

    let service = Arc::new(Router::new(ring_replicas));
    let app = router::app(service);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Router listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
