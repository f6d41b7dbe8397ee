//! Weight file acquisition.
//!
//! Weights are published as release assets keyed by variant name. A file
//! that already exists locally is used as-is; otherwise it is downloaded to
//! a temporary file beside the target and renamed into place only once the
//! transfer is complete, so an interrupted download never leaves a file that
//! looks finished.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::ModelVariant;
use crate::error::PdfLayoutError;

/// Release location of the pretrained layout weights.
pub const RELEASE_BASE_URL: &str = "https://github.com/pleb631/PdfDet/releases/download/v0.0.1";

/// Something that can stream the bytes behind a URL.
pub trait WeightSource {
    /// Writes the resource at `url` into `dest`, returning the number of
    /// bytes written.
    fn fetch(&self, url: &str, dest: &mut dyn Write) -> Result<u64, PdfLayoutError>;
}

/// Downloads over HTTPS with `ureq`. One attempt, no retries.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpSource;

impl WeightSource for HttpSource {
    fn fetch(&self, url: &str, dest: &mut dyn Write) -> Result<u64, PdfLayoutError> {
        let download_error = |message: String| PdfLayoutError::Download {
            url: url.to_string(),
            path: Default::default(),
            message,
        };

        let mut response = ureq::get(url)
            .call()
            .map_err(|e| download_error(e.to_string()))?;

        // Content-Length counts encoded bytes; only compare it for identity
        // transfers.
        let headers = response.headers();
        let expected_len = if headers.contains_key("content-encoding") {
            None
        } else {
            headers
                .get("content-length")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
        };

        let mut reader = response.body_mut().as_reader();
        let written = io::copy(&mut reader, dest).map_err(|e| download_error(e.to_string()))?;

        if let Some(expected) = expected_len {
            if written != expected {
                return Err(download_error(format!(
                    "transfer ended after {written} of {expected} bytes"
                )));
            }
        }

        Ok(written)
    }
}

/// Whether [`ensure_weights`] had to download anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    AlreadyPresent,
    Downloaded { bytes: u64 },
}

/// Returns the download URL for a weight file path.
///
/// The file's stem must name one of the known variants; the extension of
/// the URL follows that variant's published format.
pub fn weight_url(path: &Path) -> Result<String, PdfLayoutError> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    let variant = ModelVariant::from_name(stem)
        .ok_or_else(|| PdfLayoutError::UnsupportedModel(stem.to_string()))?;

    Ok(format!(
        "{}/{}",
        RELEASE_BASE_URL,
        variant.weight_file_name()
    ))
}

/// Makes sure a weight file exists at `path`, downloading it if missing.
///
/// # Errors
/// `UnsupportedModel` if the file name is not a known variant, `Download`
/// if the transfer fails. On failure nothing is left at `path`.
pub fn ensure_weights(
    path: &Path,
    source: &dyn WeightSource,
) -> Result<FetchOutcome, PdfLayoutError> {
    if path.is_file() {
        debug!("Using cached weights {}", path.display());
        return Ok(FetchOutcome::AlreadyPresent);
    }

    let url = weight_url(path)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    info!("Downloading {} to {}", url, path.display());

    let with_path = |err: PdfLayoutError| match err {
        PdfLayoutError::Download { url, message, .. } => PdfLayoutError::Download {
            url,
            path: path.to_path_buf(),
            message,
        },
        other => PdfLayoutError::Download {
            url: url.clone(),
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    };

    // Dropping the temp file on any early return deletes it.
    let mut partial = NamedTempFile::new_in(dir)?;
    let bytes = source
        .fetch(&url, partial.as_file_mut())
        .map_err(with_path)?;
    partial.as_file_mut().sync_all()?;

    partial.persist(path).map_err(|e| PdfLayoutError::Download {
        url: url.clone(),
        path: path.to_path_buf(),
        message: e.error.to_string(),
    })?;

    info!("Downloaded {} ({} bytes)", path.display(), bytes);
    Ok(FetchOutcome::Downloaded { bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_url_by_family() {
        assert_eq!(
            weight_url(Path::new("weights/yolov8s_doc.onnx")).unwrap(),
            "https://github.com/pleb631/PdfDet/releases/download/v0.0.1/yolov8s_doc.onnx"
        );
        assert_eq!(
            weight_url(Path::new("yolov8n_cdla.pt")).unwrap(),
            "https://github.com/pleb631/PdfDet/releases/download/v0.0.1/yolov8n_cdla.pt"
        );
    }

    #[test]
    fn test_weight_url_unknown_name() {
        assert!(matches!(
            weight_url(Path::new("weights/yolov8x_doc.onnx")),
            Err(PdfLayoutError::UnsupportedModel(name)) if name == "yolov8x_doc"
        ));
    }
}
