#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::client::NodeClient;
    use crate::model::schema::{
        AttributeDefinition, KeySchemaElement, KeyType, ScalarAttributeType, TableDef,
    };
    use crate::model::value::{AttributeValue, Item};
    use crate::node::{self, bootstrap, NodeContext};
    use crate::router::protocol::NodeInfo;
    use crate::router::ring::HashRing;
    use crate::router::service::Router;
    use crate::storage::engine::TableStore;
    use crate::storage::protocol::{PutItemRequest, ScanRequest};
    use crate::{router, storage};

    fn s(value: &str) -> AttributeValue {
        AttributeValue::S(value.to_string())
    }

    fn schema_for(table: &str) -> TableDef {
        TableDef {
            table_name: table.to_string(),
            key_schema: vec![KeySchemaElement {
                attribute_name: "ID".to_string(),
                key_type: KeyType::HASH,
            }],
            attribute_definitions: vec![AttributeDefinition {
                attribute_name: "ID".to_string(),
                attribute_type: ScalarAttributeType::S,
            }],
        }
    }

    fn seed(store: &TableStore, table: &str, count: usize) {
        store.create_table(&schema_for(table)).unwrap();
        for i in 1..=count {
            let mut item = Item::new();
            item.insert("ID".to_string(), s(&format!("item{}", i)));
            item.insert("Payload".to_string(), s(&format!("payload-{}", i)));
            store
                .put(&PutItemRequest {
                    table_name: table.to_string(),
                    item,
                })
                .unwrap();
        }
    }

    /// Starts a real node service on an ephemeral port and returns its
    /// store and address.
    async fn spawn_node(id: &str) -> (tempfile::TempDir, Arc<TableStore>, String) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(TableStore::open(dir.path().join("node.db")).unwrap());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let ctx = Arc::new(NodeContext {
            id: id.to_string(),
            addr: addr.clone(),
            store: store.clone(),
        });
        let app = node::app(ctx, 1024 * 1024);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (dir, store, addr)
    }

    async fn spawn_router(service: Arc<Router>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let app = router::app(service);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn test_internal_scan_pages_over_http() {
        let (_dir, store, addr) = spawn_node("node-a").await;
        seed(&store, "Things", 5);

        let client = NodeClient::new(&addr);
        let mut start_key = None;
        let mut total = 0;
        let mut pages = 0;
        loop {
            let page = client
                .internal_scan(&ScanRequest {
                    table_name: "Things".to_string(),
                    limit: Some(2),
                    exclusive_start_key: start_key,
                })
                .await
                .unwrap();
            pages += 1;
            total += page.items.len();
            match page.last_evaluated_key {
                Some(key) => start_key = Some(key),
                None => break,
            }
        }
        assert_eq!(pages, 3);
        assert_eq!(total, 5);
    }

    #[tokio::test]
    async fn test_bootstrap_pulls_owned_tables_from_previous_owner() {
        let (_dir_a, store_a, addr_a) = spawn_node("node-a").await;

        // Pick table names by their ownership under the two-node ring.
        let mut ring = HashRing::new(20);
        ring.add("node-a");
        ring.add("node-b");
        let owned_by_b = (0..1000)
            .map(|i| format!("table{}", i))
            .find(|t| ring.owner(t) == Some("node-b"))
            .unwrap();
        let owned_by_a = (0..1000)
            .map(|i| format!("table{}", i))
            .find(|t| ring.owner(t) == Some("node-a"))
            .unwrap();

        seed(&store_a, &owned_by_b, 5);
        seed(&store_a, &owned_by_a, 2);

        let service = Arc::new(Router::new(20));
        service
            .add_node(NodeInfo {
                id: "node-a".to_string(),
                addr: addr_a.clone(),
            })
            .await;
        let router_addr = spawn_router(service).await;

        // Node b joins: it must pull the table it now owns, and only that
        // one, before serving.
        let dir_b = tempfile::tempdir().unwrap();
        let store_b = TableStore::open(dir_b.path().join("node.db")).unwrap();
        let active = vec![
            NodeInfo {
                id: "node-a".to_string(),
                addr: addr_a,
            },
            NodeInfo {
                id: "node-b".to_string(),
                addr: "127.0.0.1:0".to_string(),
            },
        ];
        bootstrap::synchronize(&store_b, "node-b", &active, &router_addr, 20, 2)
            .await
            .unwrap();

        let page = store_b
            .scan(&ScanRequest {
                table_name: owned_by_b.clone(),
                limit: None,
                exclusive_start_key: None,
            })
            .unwrap();
        assert_eq!(page.items.len(), 5);

        // Items match the peer's copy exactly.
        let on_a = store_a
            .scan(&ScanRequest {
                table_name: owned_by_b,
                limit: None,
                exclusive_start_key: None,
            })
            .unwrap();
        let mut ids_a: Vec<String> = on_a
            .items
            .iter()
            .map(|i| format!("{:?}", i.get("ID").unwrap()))
            .collect();
        let mut ids_b: Vec<String> = page
            .items
            .iter()
            .map(|i| format!("{:?}", i.get("ID").unwrap()))
            .collect();
        ids_a.sort();
        ids_b.sort();
        assert_eq!(ids_a, ids_b);

        // The table still owned by node-a was not copied.
        assert!(matches!(
            store_b.describe_table(&owned_by_a),
            Err(crate::error::Error::TableNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_bootstrap_with_single_node_has_no_peer() {
        let (_dir_a, _store_a, addr_a) = spawn_node("node-solo").await;

        let service = Arc::new(Router::new(20));
        service
            .add_node(NodeInfo {
                id: "node-solo".to_string(),
                addr: addr_a.clone(),
            })
            .await;
        let router_addr = spawn_router(service).await;

        let dir = tempfile::tempdir().unwrap();
        let store = TableStore::open(dir.path().join("solo.db")).unwrap();
        let active = vec![NodeInfo {
            id: "node-solo".to_string(),
            addr: addr_a,
        }];
        // A founding node has no previous owner to pull from; this must
        // simply succeed with nothing synced.
        bootstrap::synchronize(&store, "node-solo", &active, &router_addr, 20, 2)
            .await
            .unwrap();
        assert!(store.list_tables().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_node_service_maps_errors_to_envelope() {
        let (_dir, _store, addr) = spawn_node("node-err").await;

        let client = NodeClient::new(&addr);
        let err = client
            .describe_table(&storage::protocol::DescribeTableRequest {
                table_name: "Ghost".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::Error::TableNotFound(_)));
    }
}
