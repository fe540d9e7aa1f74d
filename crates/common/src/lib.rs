//! Shared configuration, database pool, error type, and row types.

pub mod config;
pub mod db;
pub mod error;
pub mod types;
