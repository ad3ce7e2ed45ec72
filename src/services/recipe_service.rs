use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::database::models::recipe::RECIPES;
use crate::database::models::{Recipe, RecipeInput};
use crate::database::{DatabaseError, Filter, SharedStore};

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("{message}")]
    InvalidInput { field: &'static str, message: String },

    #[error("Request path id and request body id values must match")]
    IdMismatch,

    #[error("Recipe not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] DatabaseError),
}

/// CRUD over recipe documents, always scoped to the owning user.
#[derive(Clone)]
pub struct RecipeService {
    store: SharedStore,
}

impl RecipeService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// All recipes, or only those of `owner`, in store order.
    pub async fn list(&self, owner: Option<&str>) -> Result<Vec<Recipe>, RecipeError> {
        let filter = match owner {
            Some(owner) => Filter::new().eq("owner", owner),
            None => Filter::new(),
        };

        let documents = self.store.find(RECIPES, &filter).await?;
        Ok(documents
            .into_iter()
            .map(|d| d.decode())
            .collect::<Result<Vec<Recipe>, DatabaseError>>()?)
    }

    pub async fn get(&self, owner: &str, id: &str) -> Result<Recipe, RecipeError> {
        let filter = owned(owner, id).ok_or(RecipeError::NotFound)?;

        match self.store.find_one(RECIPES, &filter).await? {
            Some(document) => Ok(document.decode()?),
            None => Err(RecipeError::NotFound),
        }
    }

    /// Required fields are checked before anything is written.
    pub async fn create(&self, owner: &str, input: RecipeInput) -> Result<Recipe, RecipeError> {
        require_text(&input.name, "name")?;
        require_text(&input.description, "description")?;

        let mut document = input.changes()?;
        document.insert("owner".to_string(), owner.into());

        let stored = self.store.insert(RECIPES, document).await?;
        let recipe: Recipe = stored.decode()?;

        info!("Created recipe {} for {}", recipe.id, owner);
        Ok(recipe)
    }

    /// Sparse patch: only supplied fields change.
    pub async fn update(&self, owner: &str, path_id: &str, input: RecipeInput) -> Result<Recipe, RecipeError> {
        if input.id.as_deref() != Some(path_id) {
            return Err(RecipeError::IdMismatch);
        }
        if input.name.is_some() {
            require_text(&input.name, "name")?;
        }

        let filter = owned(owner, path_id).ok_or(RecipeError::NotFound)?;
        let changes = input.changes()?;

        let updated = self
            .store
            .update_one(RECIPES, &filter, changes)
            .await?
            .ok_or(RecipeError::NotFound)?;
        let recipe: Recipe = updated.decode()?;

        info!("Updated recipe {} for {}", recipe.id, owner);
        Ok(recipe)
    }

    /// Idempotent: an id that is absent, malformed, or someone else's is a no-op.
    pub async fn delete(&self, owner: &str, id: &str) -> Result<(), RecipeError> {
        let Some(filter) = owned(owner, id) else {
            return Ok(());
        };

        if self.store.delete_one(RECIPES, &filter).await? {
            info!("Deleted recipe {} for {}", id, owner);
        }
        Ok(())
    }

    pub async fn delete_all(&self, owner: &str) -> Result<u64, RecipeError> {
        let removed = self
            .store
            .delete_many(RECIPES, &Filter::new().eq("owner", owner))
            .await?;
        Ok(removed)
    }
}

/// Filter for `id` owned by `owner`; `None` when `id` cannot be a stored id.
fn owned(owner: &str, id: &str) -> Option<Filter> {
    Uuid::parse_str(id)
        .ok()
        .map(|id| Filter::by_id(id).eq("owner", owner))
}

fn require_text(value: &Option<String>, field: &'static str) -> Result<(), RecipeError> {
    match value {
        None => Err(RecipeError::InvalidInput {
            field,
            message: format!("Missing `{}` in request body", field),
        }),
        Some(text) if text.trim().is_empty() => Err(RecipeError::InvalidInput {
            field,
            message: format!("`{}` cannot be empty", field),
        }),
        Some(_) => Ok(()),
    }
}
