// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every route here sits behind `jwt_auth_middleware`, which injects `AuthUser`
// and rejects unauthenticated requests before a handler runs.

pub mod auth;    // Token refresh and the caller's own account
pub mod recipes; // Owner-scoped recipe CRUD

pub use auth::*;
pub use recipes::*;
