//! Axum API server: notification creation endpoints and health check.

pub mod middleware;
pub mod routes;
pub mod state;
