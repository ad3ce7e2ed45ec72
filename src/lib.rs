pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod services;

pub use config::AppConfig;
pub use server::{start, AppState, ServerHandle};
