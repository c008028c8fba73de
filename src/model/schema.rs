//! Table schema types.
//!
//! A table is described by its name, a key schema (one `HASH` element and
//! at most one `RANGE` element) and the scalar attribute definitions
//! backing the key attributes. The description doubles as the CreateTable
//! request body and as the serialized form stored in the metadata bucket.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::value::AttributeValue;

/// Role of a key attribute within the primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum KeyType {
    HASH,
    RANGE,
}

/// Declared scalar type of a key attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarAttributeType {
    S,
    N,
    B,
}

impl ScalarAttributeType {
    /// Whether `value` carries this scalar type.
    pub fn matches(&self, value: &AttributeValue) -> bool {
        matches!(
            (self, value),
            (ScalarAttributeType::S, AttributeValue::S(_))
                | (ScalarAttributeType::N, AttributeValue::N(_))
                | (ScalarAttributeType::B, AttributeValue::B(_))
        )
    }
}

/// One element of a table's key schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeySchemaElement {
    pub attribute_name: String,
    pub key_type: KeyType,
}

/// Declared type for a key attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeDefinition {
    pub attribute_name: String,
    pub attribute_type: ScalarAttributeType,
}

/// Full description of a table. Serves as the CreateTable request body,
/// the description echoed in table-lifecycle responses, and the schema
/// record persisted in the metadata bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableDef {
    pub table_name: String,
    pub key_schema: Vec<KeySchemaElement>,
    pub attribute_definitions: Vec<AttributeDefinition>,
}

impl TableDef {
    /// The `HASH` element of the key schema.
    pub fn hash_key(&self) -> Option<&KeySchemaElement> {
        self.key_schema.iter().find(|ks| ks.key_type == KeyType::HASH)
    }

    /// The `RANGE` element of the key schema, if the table has one.
    pub fn range_key(&self) -> Option<&KeySchemaElement> {
        self.key_schema
            .iter()
            .find(|ks| ks.key_type == KeyType::RANGE)
    }

    /// Declared scalar type of a key attribute.
    pub fn attribute_type(&self, name: &str) -> Option<ScalarAttributeType> {
        self.attribute_definitions
            .iter()
            .find(|ad| ad.attribute_name == name)
            .map(|ad| ad.attribute_type)
    }

    /// Structural validation applied at table creation time: exactly one
    /// `HASH` element, at most one `RANGE` element, and a matching
    /// attribute definition for every key attribute.
    pub fn validate(&self) -> Result<()> {
        if self.table_name.is_empty() {
            return Err(Error::InvalidRequest("table name must not be empty".into()));
        }
        let hash_count = self
            .key_schema
            .iter()
            .filter(|ks| ks.key_type == KeyType::HASH)
            .count();
        if hash_count != 1 {
            return Err(Error::InvalidRequest(format!(
                "key schema must contain exactly one HASH element, got {}",
                hash_count
            )));
        }
        let range_count = self
            .key_schema
            .iter()
            .filter(|ks| ks.key_type == KeyType::RANGE)
            .count();
        if range_count > 1 {
            return Err(Error::InvalidRequest(format!(
                "key schema must contain at most one RANGE element, got {}",
                range_count
            )));
        }
        for ks in &self.key_schema {
            if self.attribute_type(&ks.attribute_name).is_none() {
                return Err(Error::InvalidRequest(format!(
                    "key attribute {} has no matching attribute definition",
                    ks.attribute_name
                )));
            }
        }
        Ok(())
    }
}
