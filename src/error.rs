//! Error types for the storage plane.
//!
//! A single crate-wide error enum covers every failure kind the core can
//! surface, from schema validation up to RPC transport. Errors cross the
//! wire as a small JSON envelope (`__type` + `message`) so that the router
//! and the bootstrap code can reconstruct the original kind from a node's
//! HTTP response instead of collapsing everything into "request failed".

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for storage, routing and RPC operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("item not found")]
    ItemNotFound,

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("table exists with a different schema: {0}")]
    Conflict(String),

    #[error("no nodes in the ring")]
    NoNodes,

    #[error("transport error: {0}")]
    Transport(String),

    /// A node answered with an error the envelope could not classify.
    #[error("node responded with status {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("storage engine error: {0}")]
    Storage(#[from] redb::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Stable kind string carried in the wire envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::TableNotFound(_) => "TableNotFound",
            Error::ItemNotFound => "ItemNotFound",
            Error::InvalidKey(_) => "InvalidKey",
            Error::InvalidExpression(_) => "InvalidExpression",
            Error::InvalidRequest(_) => "InvalidRequest",
            Error::Conflict(_) => "Conflict",
            Error::NoNodes => "NoNodes",
            Error::Transport(_) => "Transport",
            Error::Remote { .. } => "Remote",
            Error::Storage(_) => "StorageIO",
            Error::Serialization(_) => "Serialization",
        }
    }

    /// HTTP status the node/router service maps this error to.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::TableNotFound(_) | Error::ItemNotFound => 404,
            Error::InvalidKey(_) | Error::InvalidExpression(_) | Error::InvalidRequest(_) => 400,
            Error::Conflict(_) => 409,
            Error::NoNodes => 503,
            Error::Transport(_) => 502,
            Error::Remote { status, .. } => *status,
            Error::Storage(_) | Error::Serialization(_) => 500,
        }
    }

    /// Rebuilds a typed error from a wire envelope received by an RPC client.
    ///
    /// Kinds minted by a peer's engine come back as the matching variant so
    /// callers can pattern-match them; anything else stays `Remote`.
    pub fn from_envelope(status: u16, body: ErrorBody) -> Error {
        fn detail(message: &str, prefix: &str) -> String {
            message.strip_prefix(prefix).unwrap_or(message).to_string()
        }
        let ErrorBody { kind, message } = body;
        match kind.as_str() {
            "TableNotFound" => Error::TableNotFound(detail(&message, "table not found: ")),
            "ItemNotFound" => Error::ItemNotFound,
            "InvalidKey" => Error::InvalidKey(detail(&message, "invalid key: ")),
            "InvalidExpression" => {
                Error::InvalidExpression(detail(&message, "invalid expression: "))
            }
            "InvalidRequest" => Error::InvalidRequest(detail(&message, "invalid request: ")),
            "Conflict" => {
                Error::Conflict(detail(&message, "table exists with a different schema: "))
            }
            "NoNodes" => Error::NoNodes,
            _ => Error::Remote { status, message },
        }
    }
}

/// JSON error envelope written by the node and router services.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error kind, e.g. `TableNotFound`.
    #[serde(rename = "__type")]
    pub kind: String,
    /// Human-readable message.
    pub message: String,
}

impl From<&Error> for ErrorBody {
    fn from(err: &Error) -> Self {
        ErrorBody {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

impl From<redb::DatabaseError> for Error {
    fn from(err: redb::DatabaseError) -> Self {
        Error::Storage(err.into())
    }
}

impl From<redb::TransactionError> for Error {
    fn from(err: redb::TransactionError) -> Self {
        Error::Storage(err.into())
    }
}

impl From<redb::TableError> for Error {
    fn from(err: redb::TableError) -> Self {
        Error::Storage(err.into())
    }
}

impl From<redb::StorageError> for Error {
    fn from(err: redb::StorageError) -> Self {
        Error::Storage(err.into())
    }
}

impl From<redb::CommitError> for Error {
    fn from(err: redb::CommitError) -> Self {
        Error::Storage(err.into())
    }
}
