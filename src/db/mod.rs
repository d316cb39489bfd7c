//! SQLite primary backend for the entry store.

pub mod migrate;
pub mod pool;
pub mod queries;

pub use pool::DbPool;
