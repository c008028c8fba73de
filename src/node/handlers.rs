//! Node API Handlers
//!
//! HTTP endpoints of a storage node. The public endpoint demultiplexes on
//! the action name in the target header and translates engine results
//! into the wire shapes; engine errors become the JSON error envelope
//! with the kind-specific status.

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::{Extension, Json};
use serde::Serialize;
use sysinfo::System;

use crate::api::{error_response, extract_action, ok_response, parse_body};
use crate::error::{Error, Result};
use crate::model::schema::TableDef;
use crate::node::NodeContext;
use crate::storage::protocol::*;

/// Generic handler for all storage operations on the public endpoint.
pub async fn handle_action(
    Extension(ctx): Extension<Arc<NodeContext>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match dispatch(&ctx, &headers, &body) {
        Ok(resp) => resp,
        Err(e) => error_response(&e),
    }
}

fn dispatch(ctx: &NodeContext, headers: &HeaderMap, body: &Bytes) -> Result<Response> {
    let action = extract_action(headers)?;
    match action.as_str() {
        ACTION_CREATE_TABLE => {
            let req: TableDef = parse_body(body)?;
            let table_description = ctx.store.create_table(&req)?;
            Ok(ok_response(CreateTableResponse { table_description }))
        }
        ACTION_DELETE_TABLE => {
            let req: DeleteTableRequest = parse_body(body)?;
            let table_description = ctx.store.delete_table(&req.table_name)?;
            Ok(ok_response(DeleteTableResponse { table_description }))
        }
        ACTION_DESCRIBE_TABLE => {
            let req: DescribeTableRequest = parse_body(body)?;
            let table = ctx.store.describe_table(&req.table_name)?;
            Ok(ok_response(DescribeTableResponse { table }))
        }
        ACTION_LIST_TABLES => {
            let table_names = ctx.store.list_tables()?;
            Ok(ok_response(ListTablesResponse { table_names }))
        }
        ACTION_PUT_ITEM => {
            let req: PutItemRequest = parse_body(body)?;
            ctx.store.put(&req)?;
            Ok(ok_response(serde_json::json!({})))
        }
        ACTION_GET_ITEM => {
            let req: GetItemRequest = parse_body(body)?;
            let item = ctx.store.get(&req)?;
            Ok(ok_response(GetItemResponse { item }))
        }
        ACTION_DELETE_ITEM => {
            let req: DeleteItemRequest = parse_body(body)?;
            ctx.store.delete(&req)?;
            Ok(ok_response(serde_json::json!({})))
        }
        ACTION_UPDATE_ITEM => {
            let req: UpdateItemRequest = parse_body(body)?;
            let attributes = ctx.store.update(&req)?;
            Ok(ok_response(UpdateItemResponse { attributes }))
        }
        ACTION_QUERY => {
            let req: QueryRequest = parse_body(body)?;
            let items = ctx.store.query(&req)?;
            Ok(ok_response(QueryResponse { items }))
        }
        ACTION_SCAN => {
            let req: ScanRequest = parse_body(body)?;
            let page = ctx.store.scan(&req)?;
            Ok(ok_response(page))
        }
        other => Err(Error::InvalidRequest(format!("unknown action: {}", other))),
    }
}

/// Peer-to-peer scan used exclusively by bootstrap replication. Same
/// semantics as the public Scan, on a surface operators can filter or
/// rate-limit independently of client traffic.
pub async fn handle_internal_scan(
    Extension(ctx): Extension<Arc<NodeContext>>,
    Json(req): Json<ScanRequest>,
) -> Response {
    match ctx.store.scan(&req) {
        Ok(page) => ok_response(page),
        Err(e) => error_response(&e),
    }
}

#[derive(Serialize)]
pub struct NodeStatsResponse {
    node_id: String,
    addr: String,
    tables: usize,
    cpu_usage: f32,
    mem_used_mb: u64,
    mem_total_mb: u64,
}

/// Process-level stats for operators.
pub async fn handle_stats(Extension(ctx): Extension<Arc<NodeContext>>) -> Response {
    let tables = match ctx.store.table_count() {
        Ok(count) => count,
        Err(e) => return error_response(&e),
    };
    let mut sys = System::new_all();
    sys.refresh_cpu();
    sys.refresh_memory();
    let cpu_usage = sys.global_cpu_info().cpu_usage();
    // sysinfo reports memory in bytes.
    let mem_total_mb = sys.total_memory() / (1024 * 1024);
    let mem_used_mb = sys.used_memory() / (1024 * 1024);

    ok_response(NodeStatsResponse {
        node_id: ctx.id.clone(),
        addr: ctx.addr.clone(),
        tables,
        cpu_usage,
        mem_used_mb,
        mem_total_mb,
    })
}
