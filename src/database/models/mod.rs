pub mod recipe;
pub mod user;

pub use recipe::{Recipe, RecipeInput};
pub use user::{User, UserIdentity, UserRecord};
