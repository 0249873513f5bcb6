//! Observability setup for Pondbridge.

pub mod tracing_setup;
