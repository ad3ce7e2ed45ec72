use serde_json::Value;
use uuid::Uuid;

use crate::database::store::Document;

/// Equality filter over a document's id and top-level fields.
///
/// An empty filter matches every document in the collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub id: Option<Uuid>,
    pub fields: Document,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: Uuid) -> Self {
        Self::new().id(id)
    }

    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Evaluate the filter against one stored document.
    pub fn matches(&self, id: Uuid, body: &Document) -> bool {
        if let Some(wanted) = self.id {
            if wanted != id {
                return false;
            }
        }

        self.fields
            .iter()
            .all(|(field, value)| body.get(field) == Some(value))
    }
}
