//! HTTP request handlers for the REST API.

pub mod debug;
pub mod session;
