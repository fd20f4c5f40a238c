//! SQLite backend for the Tether gadget registry.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. SQLite transactions give the
//! transfer path its single atomic boundary across the gadget, both users'
//! reference sets, and the notification log.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
