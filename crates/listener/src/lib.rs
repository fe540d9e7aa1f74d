//! Listener process: consumes `notification_created` NOTIFY events and runs
//! the dispatch pipeline for each created notification row.

pub mod listener;
