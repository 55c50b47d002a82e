//! Chat turn persistence and session orchestration.
//!
//! `ChatRepository` is the port the infrastructure layer implements;
//! `SessionService` layers the session cache over it.

pub mod repository;
pub mod service;
