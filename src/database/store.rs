use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::database::filter::Filter;
use crate::database::manager::DatabaseError;

/// Body of a stored document: a JSON object keyed by top-level field.
pub type Document = serde_json::Map<String, Value>;

pub type SharedStore = Arc<dyn DocumentStore>;

/// A document as returned by the store, with its store-assigned id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: Uuid,
    pub body: Document,
}

impl StoredDocument {
    /// Decode into a typed record; the id is exposed to the record as `id`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, DatabaseError> {
        let mut body = self.body;
        body.insert("id".to_string(), Value::String(self.id.to_string()));
        Ok(serde_json::from_value(Value::Object(body))?)
    }
}

/// Serialize a record into a document body.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document, DatabaseError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Err(DatabaseError::NotAnObject),
    }
}

/// Persistent collections of JSON documents.
///
/// Every method is a single atomic store operation.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Declare `field` unique within `collection`. Idempotent.
    async fn ensure_unique(&self, collection: &str, field: &str) -> Result<(), DatabaseError>;

    /// Insert a document; the store assigns its id.
    async fn insert(&self, collection: &str, body: Document) -> Result<StoredDocument, DatabaseError>;

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<StoredDocument>, DatabaseError>;

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<StoredDocument>, DatabaseError>;

    /// Merge `set` into the top level of the first matching document and return the result.
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> Result<Option<StoredDocument>, DatabaseError>;

    /// Returns whether a document was removed.
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool, DatabaseError>;

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError>;

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;

    async fn close(&self);
}

/// Collection and field names end up in index names and SQL; keep them plain.
pub(crate) fn validate_identifier(name: &str) -> Result<(), DatabaseError> {
    let valid = !name.is_empty()
        && name.len() <= 32
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name.chars().next().is_some_and(|c| c.is_ascii_alphabetic());

    if valid {
        Ok(())
    } else {
        Err(DatabaseError::InvalidIdentifier(name.to_string()))
    }
}
