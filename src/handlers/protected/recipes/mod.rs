pub mod collection;
pub mod record;

// Re-export handler functions for use in routing
pub use collection::get as recipes_get;
pub use collection::post as recipes_post;

pub use record::delete as recipe_delete;
pub use record::get as recipe_get;
pub use record::put as recipe_put;
