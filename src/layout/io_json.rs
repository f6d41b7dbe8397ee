//! JSON persistence for detection results.
//!
//! A document is stored as `{"<page>": {"boxes": [...]}, ...}`. The CLI
//! writes this as a sidecar next to the annotated PDF and can read it back
//! to re-annotate without running inference again.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use super::model::Document;
use crate::error::PdfLayoutError;

/// Reads a document from a detections JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed, including page
/// keys that are not non-negative integers.
pub fn read_detections_json(path: &Path) -> Result<Document, PdfLayoutError> {
    let file = File::open(path).map_err(PdfLayoutError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| PdfLayoutError::JsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a document to a detections JSON file.
pub fn write_detections_json(path: &Path, document: &Document) -> Result<(), PdfLayoutError> {
    let file = File::create(path).map_err(PdfLayoutError::Io)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, document).map_err(|source| {
        PdfLayoutError::JsonWrite {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.flush().map_err(PdfLayoutError::Io)
}

/// Reads a document from a JSON string.
pub fn from_json_str(json: &str) -> Result<Document, serde_json::Error> {
    serde_json::from_str(json)
}

/// Writes a document to a pretty-printed JSON string.
pub fn to_json_string(document: &Document) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(document)
}
