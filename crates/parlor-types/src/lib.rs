//! Shared domain types for Parlor.
//!
//! Chat turns, session summaries, cache snapshots, configuration, and the
//! error types shared by the core and infrastructure crates.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
