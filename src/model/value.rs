//! Typed attribute values and items.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single typed attribute value.
///
/// The serde representation is externally tagged, which yields exactly the
/// wire shape clients send: `{"S": "abc"}`, `{"N": "42"}`, `{"BOOL": true}`,
/// `{"NULL": true}`, `{"M": {...}}` and so on. Exactly one tag is ever
/// present; an untagged value fails deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum AttributeValue {
    /// String.
    S(String),
    /// Number, held as its canonical decimal string.
    N(String),
    /// Byte string.
    B(Vec<u8>),
    /// Set of strings.
    SS(Vec<String>),
    /// Set of number-strings.
    NS(Vec<String>),
    /// Set of byte strings.
    BS(Vec<Vec<u8>>),
    /// Mapping from attribute name to value.
    M(HashMap<String, AttributeValue>),
    /// Ordered sequence of values.
    L(Vec<AttributeValue>),
    /// Null marker.
    NULL(bool),
    /// Boolean.
    BOOL(bool),
}

impl AttributeValue {
    /// The wire tag of this value, e.g. `"S"` or `"BOOL"`.
    pub fn type_tag(&self) -> &'static str {
        match self {
            AttributeValue::S(_) => "S",
            AttributeValue::N(_) => "N",
            AttributeValue::B(_) => "B",
            AttributeValue::SS(_) => "SS",
            AttributeValue::NS(_) => "NS",
            AttributeValue::BS(_) => "BS",
            AttributeValue::M(_) => "M",
            AttributeValue::L(_) => "L",
            AttributeValue::NULL(_) => "NULL",
            AttributeValue::BOOL(_) => "BOOL",
        }
    }
}

/// An item: a mapping from attribute names to attribute values.
pub type Item = HashMap<String, AttributeValue>;
