// handlers/protected/auth/mod.rs - Authenticated account handlers

pub mod account; // GET|PUT|DELETE /users/me, PUT /users/me/password
pub mod refresh; // POST /auth/refresh

pub use account::{account_delete, account_get, account_put, password_put};
pub use refresh::refresh_post;
