//! Error types for hfcanvas operations.
//!
//! This module provides the main error type [`HfCanvasError`] which wraps the
//! errors of the individual host services.

use std::io;

use thiserror::Error;

use crate::host::{import::ImportError, modeling::ModelingError, palette::PaletteError};

/// The main error type for hfcanvas operations.
///
/// # Diagnostic Variants
///
/// The `Import` variant keeps the imported document next to the error, so
/// the byte span of [`ImportError::span`] can be shown against the source.
#[derive(Debug, Error)]
pub enum HfCanvasError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Import { err: ImportError, src: String },

    #[error("Modeling error: {0}")]
    Modeling(#[from] ModelingError),

    #[error("Palette error: {0}")]
    Palette(#[from] PaletteError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl HfCanvasError {
    /// Create a new `Import` error with the associated document.
    pub fn new_import_error(err: ImportError, src: impl Into<String>) -> Self {
        Self::Import {
            err,
            src: src.into(),
        }
    }
}
