//! Bounding box types in canonical XYXY format.

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

use super::{PageFrame, PdfPoint, Pixel};

/// An axis-aligned bounding box in XYXY format (x1, y1, x2, y2).
///
/// The `TSpace` parameter is either [`Pixel`] or [`PdfPoint`]. Boxes
/// serialize as a bare `[x1, y1, x2, y2]` array.
///
/// The constructor does not enforce `x1 < x2`; saved detections are
/// validated after loading so problems are reported rather than panicking.
#[derive(Clone, Copy, PartialEq)]
pub struct BBoxXYXY<TSpace> {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> BBoxXYXY<TSpace> {
    /// Creates a new bounding box from explicit corner coordinates.
    #[inline]
    pub fn from_xyxy(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            _space: PhantomData,
        }
    }

    /// Creates a box from center coordinates and size, the layout YOLO heads
    /// emit.
    #[inline]
    pub fn from_cxcywh(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self::from_xyxy(
            cx - width / 2.0,
            cy - height / 2.0,
            cx + width / 2.0,
            cy + height / 2.0,
        )
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Returns the area, or 0 for an inverted box.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// Returns true if all coordinates are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x1.is_finite() && self.y1.is_finite() && self.x2.is_finite() && self.y2.is_finite()
    }

    /// Returns true if the box has positive extent on both axes.
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.x1 < self.x2 && self.y1 < self.y2
    }

    /// Intersection over union with another box in the same space.
    pub fn iou(&self, other: &Self) -> f64 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        let intersection = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }

    /// Returns the corners as an array.
    #[inline]
    pub fn to_array(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

impl BBoxXYXY<Pixel> {
    /// Clamps the box to `[0, width] x [0, height]`.
    pub fn clip(&self, width: f64, height: f64) -> Self {
        Self::from_xyxy(
            self.x1.clamp(0.0, width),
            self.y1.clamp(0.0, height),
            self.x2.clamp(0.0, width),
            self.y2.clamp(0.0, height),
        )
    }

    /// Converts a box on a rendered page image into PDF user space.
    ///
    /// `scale` converts pixels to points (72 / render DPI). The frame gives
    /// the visible page box and rotation the image was rendered with.
    pub fn to_pdf_points(&self, scale: f64, frame: &PageFrame) -> BBoxXYXY<PdfPoint> {
        frame.place(self, scale)
    }
}

impl<TSpace> std::fmt::Debug for BBoxXYXY<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BBoxXYXY")
            .field("x1", &self.x1)
            .field("y1", &self.y1)
            .field("x2", &self.x2)
            .field("y2", &self.y2)
            .finish()
    }
}

impl<TSpace> Default for BBoxXYXY<TSpace> {
    fn default() -> Self {
        Self::from_xyxy(0.0, 0.0, 0.0, 0.0)
    }
}

// Custom serde implementation to avoid TSpace: Serialize/Deserialize bounds
impl<TSpace> Serialize for BBoxXYXY<TSpace> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}

impl<'de, TSpace> Deserialize<'de> for BBoxXYXY<TSpace> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<f64>::deserialize(deserializer)?;
        match values.as_slice() {
            [x1, y1, x2, y2] => Ok(BBoxXYXY::from_xyxy(*x1, *y1, *x2, *y2)),
            other => Err(D::Error::invalid_length(
                other.len(),
                &"a box of four numbers [x1, y1, x2, y2]",
            )),
        }
    }
}
