//! Inference backends.
//!
//! The detector hands a `(1, 3, H, W)` tensor to an [`InferenceBackend`] and
//! gets the raw head output back. [`OrtBackend`] runs ONNX graphs through
//! ONNX Runtime; tests substitute canned outputs.

use std::path::Path;

use ndarray::ArrayView4;
use ort::{session::Session, value::TensorRef};
use tracing::{debug, info};

use crate::error::PdfLayoutError;

/// Raw output tensor of a detection head, flattened in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct RawOutput {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

/// Executes a detection model on a preprocessed input tensor.
pub trait InferenceBackend {
    fn run(&mut self, input: ArrayView4<'_, f32>) -> Result<RawOutput, PdfLayoutError>;
}

/// ONNX Runtime session.
pub struct OrtBackend {
    session: Session,
}

impl OrtBackend {
    /// Loads an ONNX graph from disk.
    pub fn from_file(model_path: &Path) -> Result<Self, PdfLayoutError> {
        info!("Loading ONNX model from {}", model_path.display());

        let context = || format!("Failed to load model {}", model_path.display());
        let session = Session::builder()
            .map_err(|e| PdfLayoutError::processing(context(), e))?
            .commit_from_file(model_path)
            .map_err(|e| PdfLayoutError::processing(context(), e))?;

        Ok(Self { session })
    }
}

impl InferenceBackend for OrtBackend {
    fn run(&mut self, input: ArrayView4<'_, f32>) -> Result<RawOutput, PdfLayoutError> {
        let tensor = TensorRef::from_array_view(input)
            .map_err(|e| PdfLayoutError::processing("Failed to build input tensor", e))?;

        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .map_err(|e| PdfLayoutError::processing("Inference failed", e))?;

        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| PdfLayoutError::processing("Failed to extract output tensor", e))?;

        let shape: Vec<usize> = shape.iter().map(|&d| d.max(0) as usize).collect();
        debug!("ONNX output shape: {:?}", shape);

        Ok(RawOutput {
            shape,
            data: data.to_vec(),
        })
    }
}
