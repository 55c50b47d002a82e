//! Infrastructure layer for Parlor.
//!
//! Contains implementations of the repository traits defined in `parlor-core`
//! (SQLite chat store) and configuration loading from the data directory
//! and environment.

pub mod config;
pub mod sqlite;
