//! Composite primary-key codec.
//!
//! Items are stored under a single string key derived from their key
//! attributes: `canon(hash)` for hash-only tables, or
//! `canon(hash) | canon(range)` for composite-key tables. The `|`
//! delimiter is neither a digit nor a letter, so a partition's entries
//! collate contiguously and a hash-only seek is the prefix
//! `canon(hash) |` with no risk of one hash value shadowing another that
//! merely starts with it.

use crate::error::{Error, Result};
use crate::model::schema::{KeyType, TableDef};
use crate::model::value::{AttributeValue, Item};

/// Separator between the hash and range components of an encoded key.
pub const KEY_DELIMITER: char = '|';

/// Canonical string form of an attribute value in key position.
///
/// Only `S`, `N`, `BOOL` and `NULL` may appear in a key.
fn canon(value: &AttributeValue) -> Result<String> {
    match value {
        AttributeValue::S(s) => Ok(s.clone()),
        AttributeValue::N(n) => Ok(n.clone()),
        AttributeValue::BOOL(b) => Ok(b.to_string()),
        AttributeValue::NULL(_) => Ok("NULL".to_string()),
        other => Err(Error::InvalidKey(format!(
            "unsupported attribute type for key: {}",
            other.type_tag()
        ))),
    }
}

/// Encodes the primary key of `item` under `schema`.
///
/// The hash attribute must be present; the range attribute may be absent,
/// in which case the encoded key is the hash component alone.
pub fn encode_primary_key(schema: &TableDef, item: &Item) -> Result<String> {
    let mut hash_val: Option<String> = None;
    let mut range_val: Option<String> = None;

    for ks in &schema.key_schema {
        let Some(value) = item.get(&ks.attribute_name) else {
            if ks.key_type == KeyType::HASH {
                return Err(Error::InvalidKey(format!(
                    "missing key attribute {} in item",
                    ks.attribute_name
                )));
            }
            continue;
        };
        let encoded = canon(value)?;
        match ks.key_type {
            KeyType::HASH => hash_val = Some(encoded),
            KeyType::RANGE => range_val = Some(encoded),
        }
    }

    let hash_val = match hash_val {
        Some(v) if !v.is_empty() => v,
        _ => return Err(Error::InvalidKey("hash key not found in item".to_string())),
    };

    let mut key = hash_val;
    if let Some(range_val) = range_val {
        if !range_val.is_empty() {
            key.push(KEY_DELIMITER);
            key.push_str(&range_val);
        }
    }
    Ok(key)
}

/// Seek prefix for all items of one partition.
///
/// For composite-key tables this is `canon(hash)` followed by the
/// delimiter; for hash-only tables it equals the full encoded key and the
/// caller should match exactly instead of scanning.
pub fn hash_key_prefix(schema: &TableDef, hash_value: &AttributeValue) -> Result<String> {
    let mut prefix = canon(hash_value)?;
    if prefix.is_empty() {
        return Err(Error::InvalidKey("hash key not found in item".to_string()));
    }
    if schema.range_key().is_some() {
        prefix.push(KEY_DELIMITER);
    }
    Ok(prefix)
}

/// Checks that `key` names exactly the key attributes of `schema`: same
/// count, same names.
pub fn validate_key_map(schema: &TableDef, key: &Item) -> Result<()> {
    if key.len() != schema.key_schema.len() {
        return Err(Error::InvalidKey(format!(
            "invalid number of key attributes: expected {}, got {}",
            schema.key_schema.len(),
            key.len()
        )));
    }
    for name in key.keys() {
        if !schema
            .key_schema
            .iter()
            .any(|ks| &ks.attribute_name == name)
        {
            return Err(Error::InvalidKey(format!("invalid key attribute: {}", name)));
        }
    }
    Ok(())
}

/// Extracts the key attributes of `item` as an item-shaped key, e.g. for
/// building a scan page's `LastEvaluatedKey`.
pub fn key_attributes(schema: &TableDef, item: &Item) -> Item {
    let mut key = Item::new();
    for ks in &schema.key_schema {
        if let Some(value) = item.get(&ks.attribute_name) {
            key.insert(ks.attribute_name.clone(), value.clone());
        }
    }
    key
}
