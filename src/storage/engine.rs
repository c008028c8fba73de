//! Embedded storage engine backed by a single-file B+tree store.
//!
//! Each node owns exactly one store file. Inside it, a reserved
//! `_metadata` table maps table names to serialized schemas, and every
//! user table lives in its own redb table whose keys are the composite
//! encoding from `crate::model::key` and whose values are JSON-serialized
//! items. Write transactions are serialized by redb; read transactions
//! run against a consistent snapshot.

use std::ops::Bound;
use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition, TableError};

use crate::error::{Error, Result};
use crate::expression::interpreter;
use crate::model::key::{encode_primary_key, hash_key_prefix, key_attributes, validate_key_map};
use crate::model::schema::TableDef;
use crate::model::value::Item;
use crate::storage::protocol::{
    DeleteItemRequest, GetItemRequest, PutItemRequest, QueryRequest, ScanRequest, ScanResponse,
    UpdateItemRequest,
};

/// Reserved table holding one serialized schema per user table.
const METADATA: TableDefinition<&str, &[u8]> = TableDefinition::new("_metadata");

fn item_table(name: &str) -> TableDefinition<'_, &'static str, &'static [u8]> {
    TableDefinition::new(name)
}

/// The node-local storage engine.
pub struct TableStore {
    db: Database,
}

impl TableStore {
    /// Opens (or creates) the store file at `path` and ensures the
    /// metadata table exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::create(path)?;
        let txn = db.begin_write()?;
        txn.open_table(METADATA)?;
        txn.commit()?;
        Ok(TableStore { db })
    }

    /// Creates a table and records its schema.
    ///
    /// Re-creating a table with an identical schema is an idempotent
    /// success; a different schema for an existing name is a `Conflict`.
    pub fn create_table(&self, schema: &TableDef) -> Result<TableDef> {
        schema.validate()?;
        let txn = self.db.begin_write()?;
        {
            let mut meta = txn.open_table(METADATA)?;
            if let Some(guard) = meta.get(schema.table_name.as_str())? {
                let existing: TableDef = serde_json::from_slice(guard.value())?;
                return if &existing == schema {
                    Ok(existing)
                } else {
                    Err(Error::Conflict(schema.table_name.clone()))
                };
            }
            txn.open_table(item_table(&schema.table_name))?;
            let encoded = serde_json::to_vec(schema)?;
            meta.insert(schema.table_name.as_str(), encoded.as_slice())?;
        }
        txn.commit()?;
        Ok(schema.clone())
    }

    /// Drops a table together with its items and metadata entry.
    pub fn delete_table(&self, name: &str) -> Result<TableDef> {
        let txn = self.db.begin_write()?;
        let schema = {
            let meta = txn.open_table(METADATA)?;
            schema_from(&meta, name)?
        }
        .ok_or_else(|| Error::TableNotFound(name.to_string()))?;

        txn.delete_table(item_table(name))?;
        {
            let mut meta = txn.open_table(METADATA)?;
            meta.remove(name)?;
        }
        txn.commit()?;
        Ok(schema)
    }

    /// Returns the schema of a table.
    pub fn describe_table(&self, name: &str) -> Result<TableDef> {
        let txn = self.db.begin_read()?;
        let meta = txn.open_table(METADATA)?;
        schema_from(&meta, name)?.ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Lists the names of all tables on this node.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let txn = self.db.begin_read()?;
        let meta = txn.open_table(METADATA)?;
        let mut names = Vec::new();
        for entry in meta.iter()? {
            let (key, _) = entry?;
            names.push(key.value().to_string());
        }
        Ok(names)
    }

    /// Writes an item, replacing any previous item with the same key.
    pub fn put(&self, req: &PutItemRequest) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let meta = txn.open_table(METADATA)?;
            let schema = schema_from(&meta, &req.table_name)?
                .ok_or_else(|| Error::TableNotFound(req.table_name.clone()))?;
            for ks in &schema.key_schema {
                if !req.item.contains_key(&ks.attribute_name) {
                    return Err(Error::InvalidKey(format!(
                        "missing key attribute: {}",
                        ks.attribute_name
                    )));
                }
            }
            let key = encode_primary_key(&schema, &req.item)?;
            let value = serde_json::to_vec(&req.item)?;
            let mut table = txn.open_table(item_table(&req.table_name))?;
            table.insert(key.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Reads an item by its full primary key. A missing item is `None`,
    /// not an error.
    pub fn get(&self, req: &GetItemRequest) -> Result<Option<Item>> {
        let txn = self.db.begin_read()?;
        let meta = txn.open_table(METADATA)?;
        let schema = schema_from(&meta, &req.table_name)?
            .ok_or_else(|| Error::TableNotFound(req.table_name.clone()))?;
        validate_key_map(&schema, &req.key)?;
        let key = encode_primary_key(&schema, &req.key)?;

        let table = match txn.open_table(item_table(&req.table_name)) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match table.get(key.as_str())? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Deletes an item by its full primary key. Deleting an absent key is
    /// a no-op.
    pub fn delete(&self, req: &DeleteItemRequest) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let meta = txn.open_table(METADATA)?;
            let schema = schema_from(&meta, &req.table_name)?
                .ok_or_else(|| Error::TableNotFound(req.table_name.clone()))?;
            validate_key_map(&schema, &req.key)?;
            let key = encode_primary_key(&schema, &req.key)?;
            let mut table = txn.open_table(item_table(&req.table_name))?;
            table.remove(key.as_str())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Applies an update expression to an existing item and returns the
    /// post-update item.
    pub fn update(&self, req: &UpdateItemRequest) -> Result<Item> {
        let txn = self.db.begin_write()?;
        let updated = {
            let meta = txn.open_table(METADATA)?;
            let schema = schema_from(&meta, &req.table_name)?
                .ok_or_else(|| Error::TableNotFound(req.table_name.clone()))?;
            validate_key_map(&schema, &req.key)?;
            let key = encode_primary_key(&schema, &req.key)?;

            let mut table = txn.open_table(item_table(&req.table_name))?;
            let current: Item = match table.get(key.as_str())? {
                Some(guard) => serde_json::from_slice(guard.value())?,
                None => return Err(Error::ItemNotFound),
            };
            let updated = interpreter::apply_update(
                &current,
                &req.update_expression,
                &req.expression_attribute_values,
            )?;
            let value = serde_json::to_vec(&updated)?;
            table.insert(key.as_str(), value.as_slice())?;
            updated
        };
        txn.commit()?;
        Ok(updated)
    }

    /// Returns every item of one partition.
    ///
    /// The condition must have the shape `<name> = <placeholder>` where
    /// `<name>` is the table's hash key and the placeholder resolves to a
    /// value of the declared hash-key type. Composite-key tables are read
    /// with a prefix cursor, which yields ascending range-key order;
    /// hash-only tables are an exact lookup.
    pub fn query(&self, req: &QueryRequest) -> Result<Vec<Item>> {
        let txn = self.db.begin_read()?;
        let meta = txn.open_table(METADATA)?;
        let schema = schema_from(&meta, &req.table_name)?
            .ok_or_else(|| Error::TableNotFound(req.table_name.clone()))?;

        let parts: Vec<&str> = req.key_condition_expression.split_whitespace().collect();
        if parts.len() != 3 || parts[1] != "=" {
            return Err(Error::InvalidExpression(
                "invalid key condition expression: expected '<name> = <placeholder>'".to_string(),
            ));
        }
        let hash = schema
            .hash_key()
            .ok_or_else(|| Error::InvalidKey("table has no hash key".to_string()))?;
        if parts[0] != hash.attribute_name {
            return Err(Error::InvalidExpression(format!(
                "key condition must use the hash key {}, got {}",
                hash.attribute_name, parts[0]
            )));
        }
        let value = req
            .expression_attribute_values
            .get(parts[2])
            .ok_or_else(|| {
                Error::InvalidExpression(format!(
                    "expression attribute value {} not found",
                    parts[2]
                ))
            })?;
        let declared = schema
            .attribute_type(&hash.attribute_name)
            .ok_or_else(|| Error::InvalidKey("hash key has no attribute definition".to_string()))?;
        if !declared.matches(value) {
            return Err(Error::InvalidExpression(format!(
                "invalid type for hash key {}: expected {:?}, got {}",
                hash.attribute_name,
                declared,
                value.type_tag()
            )));
        }

        let table = match txn.open_table(item_table(&req.table_name)) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let prefix = hash_key_prefix(&schema, value)?;
        let mut items = Vec::new();
        if schema.range_key().is_some() {
            for entry in table.range::<&str>(prefix.as_str()..)? {
                let (entry_key, entry_value) = entry?;
                if !entry_key.value().starts_with(prefix.as_str()) {
                    break;
                }
                items.push(serde_json::from_slice(entry_value.value())?);
            }
        } else {
            // Hash-only: the prefix is the full key, match it exactly.
            if let Some(guard) = table.get(prefix.as_str())? {
                items.push(serde_json::from_slice(guard.value())?);
            }
        }
        Ok(items)
    }

    /// Returns one page of the table, in key order.
    ///
    /// With an `exclusive_start_key`, the cursor starts strictly past that
    /// key. The page's `last_evaluated_key` is present exactly when the
    /// limit truncated the page and further entries remain. Scanning an
    /// absent table yields an empty page.
    pub fn scan(&self, req: &ScanRequest) -> Result<ScanResponse> {
        if req.limit == Some(0) {
            return Err(Error::InvalidRequest("Limit must be at least 1".to_string()));
        }
        let txn = self.db.begin_read()?;
        let meta = txn.open_table(METADATA)?;
        let Some(schema) = schema_from(&meta, &req.table_name)? else {
            return Ok(ScanResponse::empty());
        };
        let table = match txn.open_table(item_table(&req.table_name)) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(ScanResponse::empty()),
            Err(e) => return Err(e.into()),
        };

        let start_key = match &req.exclusive_start_key {
            Some(start) => {
                validate_key_map(&schema, start)?;
                Some(encode_primary_key(&schema, start)?)
            }
            None => None,
        };
        let mut iter = match &start_key {
            Some(key) => {
                table.range::<&str>((Bound::Excluded(key.as_str()), Bound::Unbounded))?
            }
            None => table.iter()?,
        };

        let mut items: Vec<Item> = Vec::new();
        let mut truncated = false;
        while let Some(entry) = iter.next() {
            let (_, value) = entry?;
            items.push(serde_json::from_slice(value.value())?);
            if Some(items.len()) == req.limit {
                truncated = match iter.next() {
                    Some(Ok(_)) => true,
                    Some(Err(e)) => return Err(e.into()),
                    None => false,
                };
                break;
            }
        }

        let last_evaluated_key = if truncated {
            items.last().map(|item| key_attributes(&schema, item))
        } else {
            None
        };
        Ok(ScanResponse {
            scanned_count: items.len(),
            items,
            last_evaluated_key,
        })
    }

    /// Number of user tables on this node, for the stats surface.
    pub fn table_count(&self) -> Result<usize> {
        Ok(self.list_tables()?.len())
    }
}

fn schema_from(
    meta: &impl ReadableTable<&'static str, &'static [u8]>,
    name: &str,
) -> Result<Option<TableDef>> {
    match meta.get(name)? {
        Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
        None => Ok(None),
    }
}
