//! Dispatch pipeline and notification services.
//!
//! - [`dispatcher`] — the single-pass fan-out pipeline run for each created
//!   notification row
//! - [`payload`] — extra-data flattening and the outbound data map
//! - [`tokens`] — user token reads and best-effort token pruning
//! - [`notifications`] — creation/broadcast service behind the API endpoints

pub mod dispatcher;
pub mod notifications;
pub mod payload;
pub mod tokens;
