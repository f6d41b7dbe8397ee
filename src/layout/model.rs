//! Detection results: per-detection records, per-page layers, and
//! multi-page documents.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use super::bbox::BBoxXYXY;
use super::ids::PageKey;
use super::space::Pixel;
use crate::error::PdfLayoutError;

/// One predicted layout region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Label name from the model's vocabulary (e.g. "Table").
    #[serde(rename = "type", alias = "label")]
    pub label: String,

    /// Box in the pixel space of the image fed to the detector.
    #[serde(rename = "box")]
    pub bbox: BBoxXYXY<Pixel>,

    /// Confidence in `[0, 1]`.
    pub score: f64,
}

impl Detection {
    pub fn new(label: impl Into<String>, bbox: BBoxXYXY<Pixel>, score: f64) -> Self {
        Self {
            label: label.into(),
            bbox,
            score,
        }
    }

    /// Returns true if the box is finite and ordered and the score is in
    /// `[0, 1]`.
    pub fn is_valid(&self) -> bool {
        self.bbox.is_finite() && self.bbox.is_ordered() && (0.0..=1.0).contains(&self.score)
    }

    /// JSON form: `{"type": .., "box": [x1, y1, x2, y2], "score": ..}`.
    pub fn to_json(&self) -> Value {
        json!({
            "type": self.label,
            "box": self.bbox.to_array(),
            "score": self.score,
        })
    }
}

/// The detections for a single page or image, in model output order.
///
/// A layer is built once from one inference call and not modified after.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    #[serde(rename = "boxes")]
    detections: Vec<Detection>,
}

impl Layer {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Detection> {
        self.detections.iter()
    }

    /// Returns `{"boxes": [...]}`. Pure; repeated calls yield equal values.
    pub fn to_json(&self) -> Value {
        json!({
            "boxes": self.detections.iter().map(Detection::to_json).collect::<Vec<_>>(),
        })
    }
}

impl From<Vec<Detection>> for Layer {
    fn from(detections: Vec<Detection>) -> Self {
        Layer::new(detections)
    }
}

impl<'a> IntoIterator for &'a Layer {
    type Item = &'a Detection;
    type IntoIter = std::slice::Iter<'a, Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.iter()
    }
}

/// Layers of a multi-page input, keyed by page index.
///
/// Keys are ordered numerically, so iteration visits page 9 before page 10.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pages: BTreeMap<PageKey, Layer>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer as the page after the current last page and returns
    /// its key.
    pub fn push(&mut self, layer: Layer) -> PageKey {
        let key = self
            .pages
            .keys()
            .next_back()
            .map(PageKey::next)
            .unwrap_or(PageKey(0));
        self.pages.insert(key, layer);
        key
    }

    /// Inserts a layer at an explicit page, returning any layer it replaced.
    pub fn insert(&mut self, key: PageKey, layer: Layer) -> Option<Layer> {
        self.pages.insert(key, layer)
    }

    /// Page keys as strings, in numeric order.
    pub fn layers(&self) -> Vec<String> {
        self.pages.keys().map(ToString::to_string).collect()
    }

    /// Looks up a layer by its string page key.
    ///
    /// Returns `None` for keys that are not valid page indices as well as
    /// for pages that have no layer.
    pub fn layer(&self, key: &str) -> Option<&Layer> {
        let key: PageKey = key.parse().ok()?;
        self.pages.get(&key)
    }

    pub fn get(&self, key: PageKey) -> Option<&Layer> {
        self.pages.get(&key)
    }

    /// Iterates layers in numeric page order.
    pub fn iter(&self) -> impl Iterator<Item = (PageKey, &Layer)> {
        self.pages.iter().map(|(key, layer)| (*key, layer))
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Sum of detections over all layers.
    pub fn total_detections(&self) -> usize {
        self.pages.values().map(Layer::len).sum()
    }

    /// Returns `{"<page>": {"boxes": [...]}, ...}`.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.pages
                .iter()
                .map(|(key, layer)| (key.to_string(), layer.to_json()))
                .collect(),
        )
    }

    /// Builds a document from string-keyed layers, rejecting keys that are
    /// not non-negative integers.
    pub fn from_keyed<I, K>(layers: I) -> Result<Self, PdfLayoutError>
    where
        I: IntoIterator<Item = (K, Layer)>,
        K: AsRef<str>,
    {
        let mut doc = Document::new();
        for (key, layer) in layers {
            doc.insert(key.as_ref().parse()?, layer);
        }
        Ok(doc)
    }
}
