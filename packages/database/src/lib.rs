#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! `SQLite` persistence for BillionEye.
//!
//! Events, agencies, ground staff, and issued session tokens all live in a
//! single `SQLite` database opened through `switchy_database`. The schema is
//! bootstrapped with idempotent DDL on open; timestamps are stored as RFC
//! 3339 text.

pub mod attribution;
pub mod db;
pub mod queries;

use billion_eye_event_models::EventStatus;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },

    /// A referenced record does not exist.
    #[error("Not found: {what}")]
    NotFound {
        /// Description of the missing record.
        what: String,
    },

    /// A status mutation that the state machine does not allow.
    #[error("Invalid status transition {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: EventStatus,
        /// Requested status.
        to: EventStatus,
    },
}
