use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationReport;

/// The main error type for pdflayout operations.
#[derive(Debug, Error)]
pub enum PdfLayoutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input file '{}' does not exist", .path.display())]
    InputNotFound { path: PathBuf },

    #[error("Unknown model: '{0}' (supported: yolov8l_doc, yolov8s_doc, yolov8n_doc, yolov8m_cdla, yolov8n_cdla)")]
    UnknownModel(String),

    #[error("Unsupported model weights: '{0}' has no known download location")]
    UnsupportedModel(String),

    #[error("Failed to download {url} to {}: {message}", .path.display())]
    Download {
        url: String,
        path: PathBuf,
        message: String,
    },

    #[error("Invalid predict input: {0}")]
    InvalidInput(String),

    #[error("Unsupported predict input: {0}")]
    UnsupportedInput(String),

    #[error("Model {model} produced class index {index}, which is not in its label table")]
    UnknownClassIndex { model: String, index: usize },

    #[error("Invalid page key '{0}' (expected a non-negative integer)")]
    InvalidPageKey(String),

    #[error("Detections failed validation with {error_count} error(s) and {warning_count} warning(s)")]
    ValidationFailed {
        error_count: usize,
        warning_count: usize,
        report: ValidationReport,
    },

    #[error("{context}: {source}")]
    Processing {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to parse detections JSON from {}: {source}", .path.display())]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write detections JSON to {}: {source}", .path.display())]
    JsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl PdfLayoutError {
    /// Wraps a failure reported by one of the underlying detection, image or
    /// PDF libraries.
    ///
    /// The library error is kept as the source, so `-v` can print the chain.
    /// Plain strings are accepted for failures detected by pdflayout itself.
    pub fn processing(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        PdfLayoutError::Processing {
            context: context.into(),
            source: source.into(),
        }
    }
}
