//! Common error types for the terms tooling

use thiserror::Error;

/// Common result type for terms operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types shared by the library and the CLI
#[derive(Error, Debug)]
pub enum Error {
    /// A record failed field-set, value-type or id-format checks
    #[error("Invalid term record: {0}")]
    Shape(String),

    /// Duplicate id, term or title inside one batch
    #[error("Non-unique term data: {0}")]
    Uniqueness(String),

    /// Create-only seed found an existing document
    #[error(
        "Method aborted: the document '{collection}/{key}' already exists.\n\
         You should use a method that updates '{collection}/{key}'. This one would have overwritten it."
    )]
    WouldOverwrite { collection: String, key: String },

    /// Seeding write failed (cause is logged, not carried)
    #[error("Error seeding the document")]
    SeedFailed,

    /// Store transport or write failure
    #[error("Store error: {0}")]
    Store(String),

    /// Requested document not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
