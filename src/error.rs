//! Error types for the gateway
//!
//! # Error Recovery Strategies
//!
//! ## Fatal Errors (Abort Startup)
//!
//! - **`Bind`**: The UDP ingest socket or the control listener could not be
//!   bound. There is nothing to ingest into, so `run()` returns the error.
//!
//! ## Degraded-Mode Errors (Warn and Continue)
//!
//! - **`Io`** while opening the record file: recording is disabled for the
//!   session and ingest continues. Mid-run write failures on the recorder
//!   surface the same way.
//!
//! ## Protocol Errors (Count and Continue)
//!
//! Malformed telemetry frames are *data*, not faults. They are represented by
//! [`ParseError`](crate::gateway::ParseError), feed the malformed/CRC
//! counters, and never terminate the ingest loop.
//!
//! ## Configuration Errors (Fix and Restart)
//!
//! - **`Config`**: the TOML file is missing, unreadable, or fails validation.
//! - **`Scenario`**: a simulator scenario JSON failed to load.

use thiserror::Error;

/// Errors that can occur in the gateway and its tools
///
/// See module-level documentation for recovery strategies.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to bind {0}: {1}")]
    Bind(String, std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Recorder is closed")]
    RecorderClosed,

    #[error("Control channel error: {0}")]
    Control(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
