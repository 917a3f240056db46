//! # TaskDesk API
//!
//! Library crate exposing the router, configuration, and error types so
//! integration tests and the binary share one wiring.

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
