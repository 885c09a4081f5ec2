//! EpiWatch API server library.
//!
//! Exposes config, state, error handling, routes and background jobs so the
//! integration tests and the binary entrypoint build the same application.

pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
