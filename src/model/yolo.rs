//! YOLOv8 layout detector.
//!
//! All five pretrained variants share this code path; they differ only in
//! the weight file and label table carried by their [`ModelDescriptor`].
//!
//! Pipeline per image: letterbox to a square input, run the backend, decode
//! the `(1, 4 + classes, anchors)` head output, apply class-aware NMS, map
//! boxes back to the original image and translate class indices to labels.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use ndarray::Array4;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::backend::{InferenceBackend, OrtBackend, RawOutput};
use super::weights::{ensure_weights, HttpSource, WeightSource};
use super::{
    resolve_predict_input, Detector, DetectorOptions, ModelDescriptor, ModelVariant, WeightFormat,
};
use crate::error::PdfLayoutError;
use crate::layout::{BBoxXYXY, Detection, Pixel};

/// Number of leading box values per anchor: cx, cy, w, h.
const BOX_FEATURES: usize = 4;

/// Gray used by the letterbox padding, as in the training pipeline.
const PAD_VALUE: u8 = 114;

/// Inference and post-processing settings.
#[derive(Clone, Debug, PartialEq)]
pub struct YoloConfig {
    /// Minimum class score for a candidate box.
    pub confidence_threshold: f32,
    /// Boxes of the same class overlapping more than this are suppressed.
    pub iou_threshold: f32,
    /// Maximum detections kept per image.
    pub max_detections: usize,
    /// Side of the square model input.
    pub input_size: u32,
}

impl Default for YoloConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            iou_threshold: 0.7,
            max_detections: 300,
            input_size: 640,
        }
    }
}

/// How an image was fitted into the square model input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Letterbox {
    /// Resize ratio applied to the original image.
    pub ratio: f64,
    pub pad_x: f64,
    pub pad_y: f64,
    /// Original image size.
    pub width: u32,
    pub height: u32,
}

impl Letterbox {
    /// Computes the letterbox geometry for an image of the given size.
    pub fn new(width: u32, height: u32, input_size: u32) -> Self {
        let size = f64::from(input_size);
        let ratio = (size / f64::from(width)).min(size / f64::from(height));
        let new_w = (f64::from(width) * ratio).round();
        let new_h = (f64::from(height) * ratio).round();

        Self {
            ratio,
            pad_x: ((size - new_w) / 2.0).floor(),
            pad_y: ((size - new_h) / 2.0).floor(),
            width,
            height,
        }
    }

    /// Maps a box from model input space back to the original image and
    /// clips it to the image bounds.
    pub fn restore(&self, bbox: &BBoxXYXY<Pixel>) -> BBoxXYXY<Pixel> {
        BBoxXYXY::<Pixel>::from_xyxy(
            (bbox.x1 - self.pad_x) / self.ratio,
            (bbox.y1 - self.pad_y) / self.ratio,
            (bbox.x2 - self.pad_x) / self.ratio,
            (bbox.y2 - self.pad_y) / self.ratio,
        )
        .clip(f64::from(self.width), f64::from(self.height))
    }
}

/// Resizes and pads an image into a normalized `(1, 3, size, size)` tensor.
pub fn preprocess(image: &RgbImage, input_size: u32) -> (Array4<f32>, Letterbox) {
    let letterbox = Letterbox::new(image.width(), image.height(), input_size);
    let new_w = ((f64::from(image.width()) * letterbox.ratio).round() as u32).max(1);
    let new_h = ((f64::from(image.height()) * letterbox.ratio).round() as u32).max(1);

    let resized = imageops::resize(image, new_w, new_h, FilterType::Triangle);
    let mut canvas = RgbImage::from_pixel(input_size, input_size, Rgb([PAD_VALUE; 3]));
    imageops::overlay(
        &mut canvas,
        &resized,
        letterbox.pad_x as i64,
        letterbox.pad_y as i64,
    );

    let size = input_size as usize;
    let mut input = Array4::<f32>::zeros((1, 3, size, size));
    for (x, y, pixel) in canvas.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        input[[0, 0, y, x]] = f32::from(pixel[0]) / 255.0;
        input[[0, 1, y, x]] = f32::from(pixel[1]) / 255.0;
        input[[0, 2, y, x]] = f32::from(pixel[2]) / 255.0;
    }

    (input, letterbox)
}

/// A decoded box in model input space, before label translation.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub class_index: usize,
    pub score: f32,
    pub bbox: BBoxXYXY<Pixel>,
}

/// Decodes a YOLOv8 head output and applies NMS.
///
/// The output must have shape `(1, 4 + classes, anchors)`. Candidates are
/// returned in descending score order, at most `max_detections` of them.
pub fn decode_output(
    output: &RawOutput,
    config: &YoloConfig,
) -> Result<Vec<Candidate>, PdfLayoutError> {
    let (features, anchors) = match output.shape.as_slice() {
        [1, features, anchors] if *features > BOX_FEATURES => (*features, *anchors),
        other => {
            return Err(PdfLayoutError::processing(
                "Unexpected model output",
                format!("expected shape (1, 4 + classes, anchors), got {:?}", other),
            ))
        }
    };
    if output.data.len() != features * anchors {
        return Err(PdfLayoutError::processing(
            "Unexpected model output",
            format!(
                "shape {:?} needs {} values, got {}",
                output.shape,
                features * anchors,
                output.data.len()
            ),
        ));
    }

    let feature = |f: usize, anchor: usize| output.data[f * anchors + anchor];

    let mut candidates = Vec::new();
    for anchor in 0..anchors {
        let mut best_class = 0usize;
        let mut best_score = f32::MIN;
        for class_index in 0..features - BOX_FEATURES {
            let score = feature(BOX_FEATURES + class_index, anchor);
            if score > best_score {
                best_score = score;
                best_class = class_index;
            }
        }

        if best_score.is_nan() || best_score < config.confidence_threshold {
            continue;
        }

        candidates.push(Candidate {
            class_index: best_class,
            score: best_score,
            bbox: BBoxXYXY::from_cxcywh(
                f64::from(feature(0, anchor)),
                f64::from(feature(1, anchor)),
                f64::from(feature(2, anchor)),
                f64::from(feature(3, anchor)),
            ),
        });
    }

    debug!("Raw candidates before NMS: {}", candidates.len());
    let mut kept = non_max_suppression(candidates, config.iou_threshold);
    kept.truncate(config.max_detections);
    Ok(kept)
}

/// Greedy class-aware non-maximum suppression.
pub fn non_max_suppression(mut candidates: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut keep: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let suppressed = keep.iter().any(|kept| {
            kept.class_index == candidate.class_index
                && kept.bbox.iou(&candidate.bbox) > f64::from(iou_threshold)
        });
        if !suppressed {
            keep.push(candidate);
        }
    }
    keep
}

/// YOLOv8 detector bound to one model variant.
pub struct YoloDetector {
    descriptor: ModelDescriptor,
    config: YoloConfig,
    backend: Box<dyn InferenceBackend>,
}

impl YoloDetector {
    /// Loads a variant, downloading its weights on first use.
    pub fn load(variant: ModelVariant, options: &DetectorOptions) -> Result<Self, PdfLayoutError> {
        Self::load_with_source(variant, options, &HttpSource)
    }

    /// Like [`YoloDetector::load`], fetching missing weights from `source`.
    pub fn load_with_source(
        variant: ModelVariant,
        options: &DetectorOptions,
        source: &dyn WeightSource,
    ) -> Result<Self, PdfLayoutError> {
        let descriptor = ModelDescriptor::new(variant, &options.weights_dir);
        let onnx_path = onnx_graph_path(&descriptor, source)?;
        let backend = OrtBackend::from_file(&onnx_path)?;
        info!("Loaded {} ({} labels)", variant, descriptor.labels.len());

        Ok(Self::with_backend(
            descriptor,
            options.yolo.clone(),
            Box::new(backend),
        ))
    }

    /// Builds a detector around an already constructed backend.
    pub fn with_backend(
        descriptor: ModelDescriptor,
        config: YoloConfig,
        backend: Box<dyn InferenceBackend>,
    ) -> Self {
        Self {
            descriptor,
            config,
            backend,
        }
    }

    pub fn config(&self) -> &YoloConfig {
        &self.config
    }

    /// Runs detection on an RGB image.
    pub fn detect(&mut self, image: &RgbImage) -> Result<Vec<Detection>, PdfLayoutError> {
        debug!(
            "Running {} on {}x{} image",
            self.descriptor.name(),
            image.width(),
            image.height()
        );

        let (input, letterbox) = preprocess(image, self.config.input_size);
        let output = self.backend.run(input.view())?;
        let candidates = decode_output(&output, &self.config)?;

        let mut detections = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let label = self.descriptor.labels.name(candidate.class_index).ok_or_else(|| {
                PdfLayoutError::UnknownClassIndex {
                    model: self.descriptor.name().to_string(),
                    index: candidate.class_index,
                }
            })?;

            let bbox = letterbox.restore(&candidate.bbox);
            if !bbox.is_finite() || !bbox.is_ordered() {
                debug!("Dropping degenerate {} box {:?}", label, bbox);
                continue;
            }

            detections.push(Detection::new(
                label,
                bbox,
                f64::from(candidate.score).clamp(0.0, 1.0),
            ));
        }

        debug!("Detected {} regions", detections.len());
        Ok(detections)
    }
}

impl Detector for YoloDetector {
    fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    fn predict(
        &mut self,
        image: Option<&DynamicImage>,
        path: Option<&Path>,
    ) -> Result<(Vec<Detection>, RgbImage), PdfLayoutError> {
        let rgb = resolve_predict_input(image, path)?;
        let detections = self.detect(&rgb)?;
        Ok((detections, rgb))
    }
}

/// Returns the ONNX graph to load for a descriptor, fetching weights if
/// needed.
///
/// Checkpoint families cannot run under ONNX Runtime; an exported
/// `<variant>.onnx` next to the checkpoint is used when present.
fn onnx_graph_path(
    descriptor: &ModelDescriptor,
    source: &dyn WeightSource,
) -> Result<PathBuf, PdfLayoutError> {
    match descriptor.variant.weight_format() {
        WeightFormat::Onnx => {
            ensure_weights(&descriptor.weight_path, source)?;
            Ok(descriptor.weight_path.clone())
        }
        WeightFormat::TorchCheckpoint => {
            let exported = descriptor.weight_path.with_extension("onnx");
            if exported.is_file() {
                debug!("Using exported graph {}", exported.display());
                return Ok(exported);
            }

            ensure_weights(&descriptor.weight_path, source)?;
            Err(PdfLayoutError::processing(
                format!("Cannot load {}", descriptor.weight_path.display()),
                format!(
                    "PyTorch checkpoints must be exported to ONNX first \
                     (yolo export model={} format=onnx), then placed at {}",
                    descriptor.weight_path.display(),
                    exported.display()
                ),
            ))
        }
    }
}
