//! # Lab Error Types
//!
//! Error types for the boundary layer.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Lab Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Files       │  │      Sessions           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Io             │  │  SessionNotFound        │ │
//! │  │  TomlParse      │  │  Json           │  │  SessionAlreadyOpen     │ │
//! │  │  TomlSerialize  │  │                 │  │  LockPoisoned           │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Core(CoreError) wraps failures raised by palyno-core itself           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use palyno_core::{CoreError, PoolId};

/// Result type alias for lab operations.
pub type LabResult<T> = Result<T, LabError>;

/// Lab error type covering config, file and session failures.
#[derive(Debug, Error)]
pub enum LabError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// A configuration value is out of range.
    #[error("Invalid lab configuration: {0}")]
    InvalidConfig(String),

    /// Failed to parse the TOML config file.
    #[error("Failed to parse config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to render the config as TOML.
    #[error("Failed to serialize config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// No explicit path and no platform config directory.
    #[error("No config path available")]
    NoConfigPath,

    // =========================================================================
    // File Errors
    // =========================================================================
    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON input could not be decoded.
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// No counting session is open for the pool.
    #[error("No counting session open for pool {0}")]
    SessionNotFound(PoolId),

    /// A counting session is already open for the pool.
    #[error("A counting session is already open for pool {0}")]
    SessionAlreadyOpen(PoolId),

    /// The registry lock was poisoned by a panicking thread.
    #[error("Session registry lock poisoned")]
    LockPoisoned,

    // =========================================================================
    // Core Errors
    // =========================================================================
    /// Failure raised by palyno-core.
    #[error(transparent)]
    Core(#[from] CoreError),
}
