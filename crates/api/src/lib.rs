//! HTTP API: bearer gate middleware, request context, and server wiring.

pub mod app;
pub mod basic;
pub mod config;
pub mod context;
pub mod errors;
pub mod middleware;
