//! Router API Handlers
//!
//! HTTP endpoints of the router process: the action-multiplexed public
//! surface (wire-compatible with a single storage node) plus the
//! membership control plane nodes register through.

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::{error_response, extract_action, ok_response, parse_body};
use crate::error::{Error, Result};
use crate::model::schema::TableDef;
use crate::router::protocol::{
    DeregisterNodeRequest, NodeInfo, RegisterNodeRequest, RegisterNodeResponse,
};
use crate::router::service::Router;
use crate::storage::protocol::*;

/// Generic handler for the public storage operations, demultiplexed on
/// the action carried in the target header.
pub async fn handle_action(
    Extension(service): Extension<Arc<Router>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match dispatch(&service, &headers, &body).await {
        Ok(resp) => resp,
        Err(e) => error_response(&e),
    }
}

async fn dispatch(service: &Router, headers: &HeaderMap, body: &Bytes) -> Result<Response> {
    let action = extract_action(headers)?;
    match action.as_str() {
        ACTION_CREATE_TABLE => {
            let req: TableDef = parse_body(body)?;
            let table_description = service.create_table(&req).await?;
            Ok(ok_response(CreateTableResponse { table_description }))
        }
        ACTION_DELETE_TABLE => {
            let req: DeleteTableRequest = parse_body(body)?;
            let table_description = service.delete_table(&req).await?;
            Ok(ok_response(DeleteTableResponse { table_description }))
        }
        ACTION_DESCRIBE_TABLE => {
            let req: DescribeTableRequest = parse_body(body)?;
            let table = service.describe_table(&req).await?;
            Ok(ok_response(DescribeTableResponse { table }))
        }
        ACTION_LIST_TABLES => {
            let table_names = service.list_tables().await?;
            Ok(ok_response(ListTablesResponse { table_names }))
        }
        ACTION_PUT_ITEM => {
            let req: PutItemRequest = parse_body(body)?;
            service.put_item(&req).await?;
            Ok(ok_response(serde_json::json!({})))
        }
        ACTION_GET_ITEM => {
            let req: GetItemRequest = parse_body(body)?;
            let item = service.get_item(&req).await?;
            Ok(ok_response(GetItemResponse { item }))
        }
        ACTION_DELETE_ITEM => {
            let req: DeleteItemRequest = parse_body(body)?;
            service.delete_item(&req).await?;
            Ok(ok_response(serde_json::json!({})))
        }
        ACTION_UPDATE_ITEM => {
            let req: UpdateItemRequest = parse_body(body)?;
            let attributes = service.update_item(&req).await?;
            Ok(ok_response(UpdateItemResponse { attributes }))
        }
        ACTION_QUERY => {
            let req: QueryRequest = parse_body(body)?;
            let items = service.query(&req).await?;
            Ok(ok_response(QueryResponse { items }))
        }
        ACTION_SCAN => {
            let req: ScanRequest = parse_body(body)?;
            let page = service.scan(&req).await?;
            Ok(ok_response(page))
        }
        other => Err(Error::InvalidRequest(format!("unknown action: {}", other))),
    }
}

/// Registers a node and replies with the active set the newcomer derives
/// its ownership from.
pub async fn handle_register_node(
    Extension(service): Extension<Arc<Router>>,
    Json(req): Json<RegisterNodeRequest>,
) -> impl IntoResponse {
    tracing::info!("Registering node {} at {}", req.id, req.addr);
    let active_nodes = service
        .add_node(NodeInfo {
            id: req.id,
            addr: req.addr,
        })
        .await;
    (StatusCode::OK, Json(RegisterNodeResponse { active_nodes }))
}

/// Removes a node from the membership.
pub async fn handle_deregister_node(
    Extension(service): Extension<Arc<Router>>,
    Json(req): Json<DeregisterNodeRequest>,
) -> impl IntoResponse {
    tracing::info!("Deregistering node {}", req.id);
    service.remove_node(&req.id).await;
    StatusCode::OK
}

#[derive(Serialize)]
pub struct RoutesResponse {
    routes: Vec<&'static str>,
}

pub async fn handle_routes() -> Json<RoutesResponse> {
    Json(RoutesResponse {
        routes: vec!["/", "/register-node", "/deregister-node", "/health/routes"],
    })
}
