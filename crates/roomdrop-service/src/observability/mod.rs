//! Observability module for the Roomdrop service.
//!
//! Provides metrics definitions and instrumentation helpers.

pub mod metrics;
