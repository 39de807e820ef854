//! HTTP API: server, routing, and request/response mapping.

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
