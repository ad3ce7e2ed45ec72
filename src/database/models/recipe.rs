use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::store::{to_document, Document};

pub const RECIPES: &str = "recipes";

/// A stored recipe. Optional fields absent from the document come back as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default)]
    pub steps: Option<String>,
    #[serde(default)]
    pub servings: Option<String>,
}

/// Request body for create and update.
///
/// Every field is optional at the type level so presence can be checked
/// explicitly; `None` means "not supplied". `owner` is not accepted from clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeInput {
    #[serde(default, skip_serializing)]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<String>,
}

impl RecipeInput {
    /// The supplied editable fields as a document; unsupplied fields are omitted.
    pub fn changes(&self) -> Result<Document, DatabaseError> {
        to_document(self)
    }
}
