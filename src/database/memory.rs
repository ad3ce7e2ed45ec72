use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::filter::Filter;
use crate::database::manager::DatabaseError;
use crate::database::store::{validate_identifier, Document, DocumentStore, StoredDocument};

#[derive(Default)]
struct Collection {
    next_seq: u64,
    // seq preserves insertion order for listings
    documents: HashMap<Uuid, (u64, Document)>,
    unique_fields: Vec<String>,
}

impl Collection {
    fn ordered_matches(&self, filter: &Filter) -> Vec<(u64, Uuid)> {
        let mut hits: Vec<(u64, Uuid)> = self
            .documents
            .iter()
            .filter(|(id, (_, body))| filter.matches(**id, body))
            .map(|(id, (seq, _))| (*seq, *id))
            .collect();
        hits.sort_unstable();
        hits
    }

    fn first_match(&self, filter: &Filter) -> Option<Uuid> {
        self.ordered_matches(filter).first().map(|(_, id)| *id)
    }

    /// Would `body` (replacing `except`, if given) collide on a unique field?
    fn violates_unique(&self, body: &Document, except: Option<Uuid>) -> bool {
        self.unique_fields.iter().any(|field| {
            let Some(value) = body.get(field).filter(|v| !v.is_null()) else {
                return false;
            };
            self.documents
                .iter()
                .any(|(id, (_, other))| Some(*id) != except && other.get(field) == Some(value))
        })
    }
}

/// In-process document store.
///
/// Used for local development (`memory://`) and by the test suites. One lock
/// guards all collections, so each operation is atomic.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ensure_unique(&self, collection: &str, field: &str) -> Result<(), DatabaseError> {
        validate_identifier(collection)?;
        validate_identifier(field)?;

        let mut collections = self.collections.write().await;
        let entry = collections.entry(collection.to_string()).or_default();
        if !entry.unique_fields.iter().any(|f| f == field) {
            entry.unique_fields.push(field.to_string());
        }
        Ok(())
    }

    async fn insert(&self, collection: &str, body: Document) -> Result<StoredDocument, DatabaseError> {
        let mut collections = self.collections.write().await;
        let entry = collections.entry(collection.to_string()).or_default();

        if entry.violates_unique(&body, None) {
            return Err(DatabaseError::Conflict(collection.to_string()));
        }

        let id = Uuid::new_v4();
        let seq = entry.next_seq;
        entry.next_seq += 1;
        entry.documents.insert(id, (seq, body.clone()));

        Ok(StoredDocument { id, body })
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<StoredDocument>, DatabaseError> {
        let collections = self.collections.read().await;
        let Some(entry) = collections.get(collection) else {
            return Ok(None);
        };

        Ok(entry.first_match(filter).and_then(|id| {
            entry
                .documents
                .get(&id)
                .map(|(_, body)| StoredDocument { id, body: body.clone() })
        }))
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<StoredDocument>, DatabaseError> {
        let collections = self.collections.read().await;
        let Some(entry) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(entry
            .ordered_matches(filter)
            .into_iter()
            .filter_map(|(_, id)| {
                entry
                    .documents
                    .get(&id)
                    .map(|(_, body)| StoredDocument { id, body: body.clone() })
            })
            .collect())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> Result<Option<StoredDocument>, DatabaseError> {
        let mut collections = self.collections.write().await;
        let Some(entry) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(id) = entry.first_match(filter) else {
            return Ok(None);
        };
        let Some((_, current)) = entry.documents.get(&id) else {
            return Ok(None);
        };

        let mut merged = current.clone();
        merged.extend(set);

        if entry.violates_unique(&merged, Some(id)) {
            return Err(DatabaseError::Conflict(collection.to_string()));
        }

        if let Some((_, body)) = entry.documents.get_mut(&id) {
            *body = merged.clone();
        }
        Ok(Some(StoredDocument { id, body: merged }))
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool, DatabaseError> {
        let mut collections = self.collections.write().await;
        let Some(entry) = collections.get_mut(collection) else {
            return Ok(false);
        };

        Ok(match entry.first_match(filter) {
            Some(id) => entry.documents.remove(&id).is_some(),
            None => false,
        })
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError> {
        let mut collections = self.collections.write().await;
        let Some(entry) = collections.get_mut(collection) else {
            return Ok(0);
        };

        let before = entry.documents.len();
        entry.documents.retain(|id, (_, body)| !filter.matches(*id, body));
        Ok((before - entry.documents.len()) as u64)
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|entry| {
                entry
                    .documents
                    .iter()
                    .filter(|(id, (_, body))| filter.matches(**id, body))
                    .count() as u64
            })
            .unwrap_or(0))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn close(&self) {}
}
