//! Core types and trait definitions for the Tether gadget registry.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod auth;
pub mod error;
pub mod gadget;
pub mod notification;
pub mod report;
pub mod store;
pub mod transfer;
pub mod user;

pub use error::{Error, Result};
