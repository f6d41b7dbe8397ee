//! Geometry of a page as it is rendered.
//!
//! A renderer draws only the visible region of a page (the CropBox clipped
//! to the MediaBox) and turns it clockwise by the page's `/Rotate`. Pixel
//! (0, 0) is therefore the top-left corner of the *displayed* page, which is
//! a different corner of PDF user space for each rotation.

use super::bbox::BBoxXYXY;
use super::space::{PdfPoint, Pixel};

/// Clockwise display rotation of a page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    #[default]
    None,
    Quarter,
    Half,
    ThreeQuarter,
}

impl Rotation {
    /// Normalizes a `/Rotate` value. Values that are not a multiple of 90
    /// are invalid per PDF and are treated as no rotation.
    pub fn from_degrees(degrees: i64) -> Self {
        match degrees.rem_euclid(360) {
            90 => Rotation::Quarter,
            180 => Rotation::Half,
            270 => Rotation::ThreeQuarter,
            _ => Rotation::None,
        }
    }

    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Quarter => 90,
            Rotation::Half => 180,
            Rotation::ThreeQuarter => 270,
        }
    }
}

/// The visible box of a page and its display rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageFrame {
    /// `[llx, lly, urx, ury]` in PDF user space.
    pub view_box: [f64; 4],
    pub rotation: Rotation,
}

impl PageFrame {
    /// An unrotated frame over `view_box`.
    pub fn new(view_box: [f64; 4]) -> Self {
        Self {
            view_box,
            rotation: Rotation::None,
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// The region a renderer shows: CropBox clipped to MediaBox, or the
    /// MediaBox when there is no CropBox or the two do not overlap.
    pub fn visible(media_box: [f64; 4], crop_box: Option<[f64; 4]>) -> Self {
        let view_box = crop_box
            .map(|crop| {
                [
                    crop[0].max(media_box[0]),
                    crop[1].max(media_box[1]),
                    crop[2].min(media_box[2]),
                    crop[3].min(media_box[3]),
                ]
            })
            .filter(|b| b[0] < b[2] && b[1] < b[3])
            .unwrap_or(media_box);
        Self::new(view_box)
    }

    /// Size of the displayed page in points, after rotation.
    pub fn display_size(&self) -> (f64, f64) {
        let [l, b, r, t] = self.view_box;
        match self.rotation {
            Rotation::None | Rotation::Half => (r - l, t - b),
            Rotation::Quarter | Rotation::ThreeQuarter => (t - b, r - l),
        }
    }

    /// Maps a displayed-page offset `(u, v)` in points (origin top-left,
    /// v down) to PDF user space.
    pub fn point(&self, u: f64, v: f64) -> (f64, f64) {
        let [l, b, r, t] = self.view_box;
        match self.rotation {
            Rotation::None => (l + u, t - v),
            Rotation::Quarter => (l + v, b + u),
            Rotation::Half => (r - u, b + v),
            Rotation::ThreeQuarter => (r - v, t - u),
        }
    }

    /// Maps a box on the rendered image into PDF user space. `scale`
    /// converts pixels to points (72 / render DPI).
    pub fn place(&self, bbox: &BBoxXYXY<Pixel>, scale: f64) -> BBoxXYXY<PdfPoint> {
        let (ax, ay) = self.point(bbox.x1 * scale, bbox.y1 * scale);
        let (bx, by) = self.point(bbox.x2 * scale, bbox.y2 * scale);
        BBoxXYXY::from_xyxy(ax.min(bx), ay.min(by), ax.max(bx), ay.max(by))
    }
}
