//! Database layer - connection pool and repositories
//!
//! - Connection pool (max 5 connections by default)
//! - Related rows (hours, images) fetched per batch of ids, never per row
//! - Unique constraints are the source of truth for duplicates
//! - Stored functions are called with named arguments

pub mod pool;
pub mod repos;

pub use pool::{create_pool, create_pool_with_options};
pub use repos::*;
