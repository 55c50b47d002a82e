//! Session cache and chat orchestration for Parlor.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements, the LRU session cache, and the session service that ties
//! the two together. It depends only on `parlor-types` -- never on
//! `parlor-infra` or any database/IO crate.

pub mod cache;
pub mod chat;
