//! Observability for Parlor: tracing subscriber setup and shutdown.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, shutdown_tracing, TracingOptions};
