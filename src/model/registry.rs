//! Model name dispatch.
//!
//! User-facing model names resolve to a [`DetectorKind`], a closed set of
//! detector implementations. Every `yolov8*` name routes to the shared
//! YOLOv8 detector with the variant as its model type.

use tracing::debug;

use super::{Detector, DetectorOptions, ModelVariant, YoloDetector};
use crate::error::PdfLayoutError;

/// Substring that selects the YOLOv8 detector family.
const YOLOV8_FAMILY: &str = "yolov8";

/// A resolved detector implementation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DetectorKind {
    /// The shared YOLOv8 detector configured for one variant.
    Yolov8(ModelVariant),
}

impl DetectorKind {
    pub fn variant(&self) -> ModelVariant {
        match self {
            DetectorKind::Yolov8(variant) => *variant,
        }
    }
}

/// Resolves a model name, case-insensitively.
///
/// # Errors
/// `UnknownModel` for names outside the supported set, including
/// `yolov8*` names that are not one of the published variants.
pub fn resolve(name: &str) -> Result<DetectorKind, PdfLayoutError> {
    let normalized = name.trim().to_ascii_lowercase();

    if normalized.contains(YOLOV8_FAMILY) {
        let variant = ModelVariant::from_name(&normalized)
            .ok_or_else(|| PdfLayoutError::UnknownModel(name.to_string()))?;
        return Ok(DetectorKind::Yolov8(variant));
    }

    Err(PdfLayoutError::UnknownModel(name.to_string()))
}

/// Resolves `name` and builds a fresh detector for it.
///
/// Each call loads an independent detector; weights already on disk are
/// reused.
pub fn load_detector(
    name: &str,
    options: &DetectorOptions,
) -> Result<Box<dyn Detector>, PdfLayoutError> {
    let kind = resolve(name)?;
    debug!("Resolved model '{}' to {:?}", name, kind);

    match kind {
        DetectorKind::Yolov8(variant) => Ok(Box::new(YoloDetector::load(variant, options)?)),
    }
}
