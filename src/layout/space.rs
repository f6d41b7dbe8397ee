//! Coordinate space marker types.
//!
//! Detectors report boxes in the pixel space of the rendered page image
//! (origin top-left, y down). PDF annotations live in PDF user space
//! (points, origin bottom-left, y up). These zero-sized markers keep the two
//! from being mixed up.

use std::fmt;

/// Marker for pixel coordinates of a rendered page image.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Marker for PDF user-space coordinates, in points (1/72 inch).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum PdfPoint {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for PdfPoint {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}
