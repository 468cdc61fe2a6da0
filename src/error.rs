// In: src/error.rs

//! This module defines the single, unified error type for the entire dwimask crate.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DwimaskError {
    // =========================================================================
    // === High-Level, Semantic Errors (Specific to the pipeline's logic)
    // =========================================================================
    /// Malformed or insufficient-dimensionality input image, or an output
    /// path conflict. Raised before any scratch work wherever possible.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Missing gradient table, unknown or duplicate algorithm name. Always
    /// raised before the scratch workspace is created.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An external command invocation failed. The failing stage's own
    /// diagnostic output is propagated verbatim.
    #[error("external command '{stage}' failed: {detail}")]
    Execution { stage: String, detail: String },

    #[error("internal logic error (this is a bug): {0}")]
    Internal(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem (e.g. an
    /// unreadable input or an undeletable workspace).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically while parsing an
    /// image header dump.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl DwimaskError {
    /// Shorthand for an `Execution` error tied to a named external operation.
    pub fn execution(stage: impl Into<String>, detail: impl Into<String>) -> Self {
        DwimaskError::Execution {
            stage: stage.into(),
            detail: detail.into(),
        }
    }
}
