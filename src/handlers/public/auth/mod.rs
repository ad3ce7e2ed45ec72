// handlers/public/auth/mod.rs - Public authentication handlers

pub mod login;    // POST /auth/login - verify credentials and get a bearer token
pub mod register; // POST /users - create a new account

pub use login::login_post;
pub use register::register_post;
