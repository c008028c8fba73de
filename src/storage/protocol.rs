//! Storage Wire Protocol
//!
//! Request and response bodies for the table and item operations, shared
//! by the storage engine, the node service, the RPC clients and the
//! router. Field names follow the DynamoDB JSON conventions
//! (`TableName`, `Item`, `ExpressionAttributeValues`, ...).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::schema::TableDef;
use crate::model::value::{AttributeValue, Item};

// --- Action names carried in the request target header ---

/// Target header prefix; the action is the segment after the dot.
pub const TARGET_PREFIX: &str = "DynamoDB_20120810";
/// Name of the header the single RPC endpoint demultiplexes on.
pub const TARGET_HEADER: &str = "x-amz-target";

pub const ACTION_CREATE_TABLE: &str = "CreateTable";
pub const ACTION_DELETE_TABLE: &str = "DeleteTable";
pub const ACTION_DESCRIBE_TABLE: &str = "DescribeTable";
pub const ACTION_LIST_TABLES: &str = "ListTables";
pub const ACTION_PUT_ITEM: &str = "PutItem";
pub const ACTION_GET_ITEM: &str = "GetItem";
pub const ACTION_DELETE_ITEM: &str = "DeleteItem";
pub const ACTION_UPDATE_ITEM: &str = "UpdateItem";
pub const ACTION_QUERY: &str = "Query";
pub const ACTION_SCAN: &str = "Scan";

/// Path of the peer-to-peer scan endpoint used by bootstrap replication.
pub const INTERNAL_SCAN_PATH: &str = "/internal-scan";

// --- Table lifecycle ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateTableResponse {
    pub table_description: TableDef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteTableRequest {
    pub table_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteTableResponse {
    pub table_description: TableDef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeTableRequest {
    pub table_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeTableResponse {
    pub table: TableDef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListTablesRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListTablesResponse {
    pub table_names: Vec<String>,
}

// --- Item operations ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutItemRequest {
    pub table_name: String,
    pub item: Item,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetItemRequest {
    pub table_name: String,
    pub key: Item,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetItemResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteItemRequest {
    pub table_name: String,
    pub key: Item,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateItemRequest {
    pub table_name: String,
    pub key: Item,
    pub update_expression: String,
    #[serde(default)]
    pub expression_attribute_values: HashMap<String, AttributeValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateItemResponse {
    pub attributes: Item,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryRequest {
    pub table_name: String,
    pub key_condition_expression: String,
    #[serde(default)]
    pub expression_attribute_values: HashMap<String, AttributeValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryResponse {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScanRequest {
    pub table_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_start_key: Option<Item>,
}

/// One page of a Scan. `last_evaluated_key` is present exactly when the
/// page was truncated by the limit and more entries remain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScanResponse {
    pub items: Vec<Item>,
    pub scanned_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_evaluated_key: Option<Item>,
}

impl ScanResponse {
    /// An empty, final page.
    pub fn empty() -> Self {
        ScanResponse {
            items: Vec::new(),
            scanned_count: 0,
            last_evaluated_key: None,
        }
    }
}
