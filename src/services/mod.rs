pub mod credential_service;
pub mod recipe_service;

pub use credential_service::{AuthError, CredentialService, ProfileUpdate, Registration};
pub use recipe_service::{RecipeError, RecipeService};
