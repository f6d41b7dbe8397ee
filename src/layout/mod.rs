//! Detection result model for pdflayout.
//!
//! Detectors produce [`Detection`] records in the pixel space of the page
//! image they were given. A [`Layer`] holds one page's detections in model
//! output order and a [`Document`] maps page indices to layers.
//!
//! # Design Principles
//!
//! 1. **Typed coordinate spaces**: boxes carry a marker for pixel space or
//!    PDF point space, so the y-flip, crop offset, rotation and DPI scaling
//!    between the two happen in exactly one place ([`PageFrame::place`]).
//!
//! 2. **Numeric page keys**: pages are keyed by [`PageKey`], which orders
//!    numerically but serializes as a string for JSON object keys.
//!
//! # Example
//!
//! ```
//! use pdflayout::layout::{BBoxXYXY, Detection, Document, Layer};
//!
//! let mut doc = Document::new();
//! doc.push(Layer::new(vec![Detection::new(
//!     "Table",
//!     BBoxXYXY::from_xyxy(10.0, 20.0, 300.0, 180.0),
//!     0.87,
//! )]));
//! assert_eq!(doc.layers(), vec!["0"]);
//! ```

mod bbox;
mod frame;
mod ids;
pub mod io_json;
mod model;
mod space;

// Re-export core types for convenient access
pub use bbox::BBoxXYXY;
pub use frame::{PageFrame, Rotation};
pub use ids::PageKey;
pub use model::{Detection, Document, Layer};
pub use space::{PdfPoint, Pixel};
