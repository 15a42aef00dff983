#![deny(missing_docs)]

//! Core library for the postlog message service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Message activity counters.
pub mod metrics;
/// Message record codec, file-backed stores, and the record service.
pub mod records;
