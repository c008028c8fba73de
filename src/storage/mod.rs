//! Local Storage Module
//!
//! A durable, single-file embedded storage engine for schema-constrained
//! tables of items.
//!
//! ## Core Concepts
//! - **Buckets**: the store file holds one ordered key-value namespace per
//!   user table plus a reserved `_metadata` bucket mapping table names to
//!   serialized schemas.
//! - **Transactions**: every operation runs inside one read or write
//!   transaction of the underlying B+tree store; writes are serialized by
//!   the engine, reads run concurrently.
//! - **Ordering**: item keys use the composite encoding from
//!   `crate::model::key`, so a partition's items are contiguous and Query
//!   degenerates to a prefix scan.
//! - **Pagination**: Scan returns at most `Limit` items per page together
//!   with a `LastEvaluatedKey` the caller threads into the next call.

pub mod engine;
pub mod protocol;
