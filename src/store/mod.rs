// ============================================================================
// Order Store - Key-value persistence for order records
// ============================================================================
//
// Records are maps of attribute name -> tagged value, e.g.
//   {"id": {"S": "abc-123"}, "name": {"S": "Widget"}}
//
// The OrderStore trait is the only seam handlers talk to. Backends:
// - memory/       - in-process store (tests, local runs without a database)
// - scylla_store/ - ScyllaDB, one table per collection
//
// Each trait method is exactly one logical store call. Atomicity per key is
// the backend's job (conditional put/update included).
//
// ============================================================================

mod memory;
mod scylla_store;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use memory::InMemoryStore;
pub use scylla_store::ScyllaStore;

/// A single typed attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeValue {
    #[serde(rename = "S")]
    S(String),
    #[serde(rename = "NULL")]
    Null(bool),
}

impl AttributeValue {
    pub fn s(value: impl Into<String>) -> Self {
        AttributeValue::S(value.into())
    }

    /// Returns the string payload if this value carries the `S` tag.
    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttributeValue::S(value) => Some(value),
            AttributeValue::Null(_) => None,
        }
    }
}

/// A stored record: attribute name to tagged value.
pub type Record = HashMap<String, AttributeValue>;

/// Primary key of a record (attribute name + value).
pub type Key = HashMap<String, AttributeValue>;

/// Builds the single-attribute `id` key used by the orders collection.
pub fn id_key(id: &str) -> Key {
    HashMap::from([("id".to_string(), AttributeValue::s(id))])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutCondition {
    /// Write only if no record with this attribute exists for the key.
    AttributeNotExists(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateCondition {
    /// Update only if the record already exists.
    AttributeExists(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateAction {
    Put,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeUpdate {
    pub action: UpdateAction,
    pub value: Option<AttributeValue>,
}

impl AttributeUpdate {
    pub fn put(value: AttributeValue) -> Self {
        Self {
            action: UpdateAction::Put,
            value: Some(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnValues {
    None,
    AllNew,
}

/// Result of an update; the record sits under `Attributes` when requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateOutput {
    #[serde(rename = "Attributes", skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Record>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("The conditional request failed: {condition} on table {table}")]
    ConditionalCheckFailed { table: String, condition: String },

    #[error("{message}")]
    Backend { message: String },

    #[error("Invalid table name: {0}")]
    InvalidTable(String),
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend {
            message: message.into(),
        }
    }

    pub fn is_conditional_check_failed(&self) -> bool {
        matches!(self, StoreError::ConditionalCheckFailed { .. })
    }
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Unconditional full-table scan.
    async fn scan(&self, table: &str) -> Result<Vec<Record>, StoreError>;

    /// Point lookup; `Ok(None)` when absent.
    async fn get_item(&self, table: &str, key: &Key) -> Result<Option<Record>, StoreError>;

    async fn put_item(
        &self,
        table: &str,
        item: Record,
        condition: Option<PutCondition>,
    ) -> Result<(), StoreError>;

    async fn update_item(
        &self,
        table: &str,
        key: &Key,
        updates: HashMap<String, AttributeUpdate>,
        condition: Option<UpdateCondition>,
        return_values: ReturnValues,
    ) -> Result<UpdateOutput, StoreError>;

    /// Idempotent delete by key; absence is not an error.
    async fn delete_item(&self, table: &str, key: &Key) -> Result<(), StoreError>;
}

/// Extracts the `S` value of the key's `id` attribute.
pub(crate) fn key_id(key: &Key) -> Result<&str, StoreError> {
    key.get("id")
        .and_then(AttributeValue::as_s)
        .ok_or_else(|| StoreError::backend("The provided key element does not match the schema"))
}

// ============================================================================
// Unit Tests
// ============================================================================
