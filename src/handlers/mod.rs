// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) -> Protected (bearer token required)
pub mod public;    // Registration, login, service info
pub mod protected; // Recipes and the caller's own account

pub use public::system::{health, not_found, root};
