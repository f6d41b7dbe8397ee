//! Pretrained layout detectors.
//!
//! The set of supported models is closed: [`ModelVariant`] enumerates the
//! five YOLOv8 layout checkpoints and carries every per-variant fact (label
//! vocabulary, weight format, file name). [`registry`] turns a user-supplied
//! name into a detector, [`weights`] makes sure the weight file is on disk,
//! and [`yolo`] runs the model.

pub mod backend;
pub mod registry;
pub mod weights;
pub mod yolo;

pub use registry::{load_detector, resolve, DetectorKind};
pub use yolo::{YoloConfig, YoloDetector};

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::{DynamicImage, RgbImage};

use crate::error::PdfLayoutError;
use crate::labels::LabelTable;
use crate::layout::Detection;

/// Label vocabulary a model was trained on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelFamily {
    /// DocLayNet, 11 classes.
    Doc,
    /// CDLA, 10 classes.
    Cdla,
}

impl ModelFamily {
    pub fn labels(&self) -> LabelTable {
        match self {
            ModelFamily::Doc => LabelTable::DOC,
            ModelFamily::Cdla => LabelTable::CDLA,
        }
    }

    /// On-disk format the family is published in.
    pub fn weight_format(&self) -> WeightFormat {
        match self {
            ModelFamily::Doc => WeightFormat::Onnx,
            ModelFamily::Cdla => WeightFormat::TorchCheckpoint,
        }
    }
}

/// Serialized weight format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeightFormat {
    /// Self-contained ONNX inference graph.
    Onnx,
    /// Framework-native PyTorch checkpoint.
    TorchCheckpoint,
}

impl WeightFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            WeightFormat::Onnx => "onnx",
            WeightFormat::TorchCheckpoint => "pt",
        }
    }
}

/// The supported pretrained layout models.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelVariant {
    Yolov8lDoc,
    Yolov8sDoc,
    Yolov8nDoc,
    Yolov8mCdla,
    Yolov8nCdla,
}

impl ModelVariant {
    pub const ALL: [ModelVariant; 5] = [
        ModelVariant::Yolov8lDoc,
        ModelVariant::Yolov8sDoc,
        ModelVariant::Yolov8nDoc,
        ModelVariant::Yolov8mCdla,
        ModelVariant::Yolov8nCdla,
    ];

    /// Canonical lowercase name, also the weight file stem.
    pub fn name(&self) -> &'static str {
        match self {
            ModelVariant::Yolov8lDoc => "yolov8l_doc",
            ModelVariant::Yolov8sDoc => "yolov8s_doc",
            ModelVariant::Yolov8nDoc => "yolov8n_doc",
            ModelVariant::Yolov8mCdla => "yolov8m_cdla",
            ModelVariant::Yolov8nCdla => "yolov8n_cdla",
        }
    }

    pub fn family(&self) -> ModelFamily {
        match self {
            ModelVariant::Yolov8lDoc | ModelVariant::Yolov8sDoc | ModelVariant::Yolov8nDoc => {
                ModelFamily::Doc
            }
            ModelVariant::Yolov8mCdla | ModelVariant::Yolov8nCdla => ModelFamily::Cdla,
        }
    }

    pub fn labels(&self) -> LabelTable {
        self.family().labels()
    }

    pub fn weight_format(&self) -> WeightFormat {
        self.family().weight_format()
    }

    /// File name of the published weights, e.g. `yolov8l_doc.onnx`.
    pub fn weight_file_name(&self) -> String {
        format!("{}.{}", self.name(), self.weight_format().extension())
    }

    /// Looks up a variant by exact canonical name.
    pub fn from_name(name: &str) -> Option<ModelVariant> {
        ModelVariant::ALL.into_iter().find(|v| v.name() == name)
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelVariant {
    type Err = PdfLayoutError;

    /// Parses a variant name case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelVariant::from_name(&s.to_ascii_lowercase())
            .ok_or_else(|| PdfLayoutError::UnknownModel(s.to_string()))
    }
}

/// Immutable facts about a loaded model.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelDescriptor {
    pub variant: ModelVariant,
    pub weight_path: PathBuf,
    pub labels: LabelTable,
}

impl ModelDescriptor {
    /// Describes `variant` with its weights under `weights_dir`.
    pub fn new(variant: ModelVariant, weights_dir: &Path) -> Self {
        Self {
            variant,
            weight_path: weights_dir.join(variant.weight_file_name()),
            labels: variant.labels(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.variant.name()
    }
}

/// Options shared by every detector.
#[derive(Clone, Debug)]
pub struct DetectorOptions {
    /// Directory holding (or receiving) weight files.
    pub weights_dir: PathBuf,
    /// Inference and post-processing settings.
    pub yolo: YoloConfig,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            weights_dir: PathBuf::from("weights"),
            yolo: YoloConfig::default(),
        }
    }
}

/// Uniform interface over pretrained layout detectors.
pub trait Detector {
    fn descriptor(&self) -> &ModelDescriptor;

    /// Runs detection on exactly one of an in-memory RGB image or an image
    /// file.
    ///
    /// Returns the detections in model output order, in the image's pixel
    /// space, along with the image that was processed.
    ///
    /// # Errors
    /// `InvalidInput` unless exactly one input is given; `UnsupportedInput`
    /// if the in-memory image is not 8-bit RGB.
    fn predict(
        &mut self,
        image: Option<&DynamicImage>,
        path: Option<&Path>,
    ) -> Result<(Vec<Detection>, RgbImage), PdfLayoutError>;
}

/// Resolves the `predict` arguments to the RGB image to run on.
pub(crate) fn resolve_predict_input(
    image: Option<&DynamicImage>,
    path: Option<&Path>,
) -> Result<RgbImage, PdfLayoutError> {
    match (image, path) {
        (None, None) => Err(PdfLayoutError::InvalidInput(
            "either an image or a path is required".to_string(),
        )),
        (Some(_), Some(_)) => Err(PdfLayoutError::InvalidInput(
            "pass an image or a path, not both".to_string(),
        )),
        (None, Some(path)) => image::open(path)
            .map(|decoded| decoded.to_rgb8())
            .map_err(|e| {
                PdfLayoutError::processing(format!("Failed to decode image {}", path.display()), e)
            }),
        (Some(DynamicImage::ImageRgb8(rgb)), None) => Ok(rgb.clone()),
        (Some(other), None) => Err(PdfLayoutError::UnsupportedInput(format!(
            "expected an 8-bit RGB image, got {:?}",
            other.color()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_names_roundtrip() {
        for variant in ModelVariant::ALL {
            assert_eq!(variant.name().parse::<ModelVariant>().unwrap(), variant);
            assert_eq!(variant.to_string(), variant.name());
        }
    }

    #[test]
    fn test_variant_parse_is_case_insensitive() {
        assert_eq!(
            "YOLOv8N_CDLA".parse::<ModelVariant>().unwrap(),
            ModelVariant::Yolov8nCdla
        );
        assert!(matches!(
            "yolov8x_doc".parse::<ModelVariant>(),
            Err(PdfLayoutError::UnknownModel(_))
        ));
    }

    #[test]
    fn test_weight_file_names_follow_family() {
        assert_eq!(ModelVariant::Yolov8lDoc.weight_file_name(), "yolov8l_doc.onnx");
        assert_eq!(ModelVariant::Yolov8mCdla.weight_file_name(), "yolov8m_cdla.pt");
    }

    #[test]
    fn test_descriptor_binds_labels() {
        let desc = ModelDescriptor::new(ModelVariant::Yolov8sDoc, Path::new("w"));
        assert_eq!(desc.labels.len(), 11);
        assert_eq!(desc.weight_path, Path::new("w").join("yolov8s_doc.onnx"));

        let desc = ModelDescriptor::new(ModelVariant::Yolov8nCdla, Path::new("w"));
        assert_eq!(desc.labels.len(), 10);
    }

    #[test]
    fn test_predict_input_requires_exactly_one() {
        assert!(matches!(
            resolve_predict_input(None, None),
            Err(PdfLayoutError::InvalidInput(_))
        ));

        let img = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
        assert!(matches!(
            resolve_predict_input(Some(&img), Some(Path::new("a.png"))),
            Err(PdfLayoutError::InvalidInput(_))
        ));
        assert_eq!(resolve_predict_input(Some(&img), None).unwrap().dimensions(), (4, 4));
    }

    #[test]
    fn test_predict_input_rejects_non_rgb() {
        let rgba = DynamicImage::ImageRgba8(image::RgbaImage::new(2, 2));
        assert!(matches!(
            resolve_predict_input(Some(&rgba), None),
            Err(PdfLayoutError::UnsupportedInput(_))
        ));
    }

    #[test]
    fn test_predict_input_decodes_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        RgbImage::new(8, 6).save(&path).unwrap();

        let rgb = resolve_predict_input(None, Some(&path)).unwrap();
        assert_eq!(rgb.dimensions(), (8, 6));

        let missing = resolve_predict_input(None, Some(&dir.path().join("missing.png")));
        assert!(matches!(missing, Err(PdfLayoutError::Processing { .. })));
    }
}
