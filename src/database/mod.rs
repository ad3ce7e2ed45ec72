pub mod filter;
pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use filter::Filter;
pub use manager::{connect, DatabaseError};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{Document, DocumentStore, SharedStore, StoredDocument};
