//! Label vocabularies and the label -> color registry.
//!
//! Two vocabularies are known: the 11-class DocLayNet set used by the `*_doc`
//! models and the 10-class CDLA set used by the `*_cdla` models. Every label
//! of either set has a fixed display color; anything else is drawn black.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An RGB color with components in `[0, 1]`, as PDF color arrays expect.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Returns the components as an array, in PDF operand order.
    #[inline]
    pub fn components(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.r, self.g, self.b)
    }
}

const RED: Rgb = Rgb::new(1.0, 0.0, 0.0);
const GREEN: Rgb = Rgb::new(0.0, 1.0, 0.0);
const BLUE: Rgb = Rgb::new(0.0, 0.0, 1.0);
const YELLOW: Rgb = Rgb::new(1.0, 1.0, 0.0);
const MAGENTA: Rgb = Rgb::new(1.0, 0.0, 1.0);
const CYAN: Rgb = Rgb::new(0.0, 1.0, 1.0);
const PURPLE: Rgb = Rgb::new(0.5, 0.0, 0.5);
const ORANGE: Rgb = Rgb::new(1.0, 0.65, 0.0);
const GRAY: Rgb = Rgb::new(0.5, 0.5, 0.5);
const DARK_GREEN: Rgb = Rgb::new(0.0, 0.5, 0.0);
const DEEP_PINK: Rgb = Rgb::new(1.0, 0.08, 0.58);

/// DocLayNet labels, indexed by model class id.
pub const DOC_LABELS: [&str; 11] = [
    "Caption",
    "Footnote",
    "Formula",
    "List-item",
    "Page-footer",
    "Page-header",
    "Picture",
    "Section-header",
    "Table",
    "Text",
    "Title",
];

/// CDLA labels, indexed by model class id.
pub const CDLA_LABELS: [&str; 10] = [
    "Header",
    "Text",
    "Reference",
    "Figure caption",
    "Figure",
    "Table caption",
    "Table",
    "Title",
    "Footer",
    "Equation",
];

/// Label -> color. Labels shared by both vocabularies ("Text", "Table",
/// "Title") appear once.
const COLOR_TABLE: &[(&str, Rgb)] = &[
    ("Caption", RED),
    ("Footnote", GREEN),
    ("Formula", BLUE),
    ("List-item", YELLOW),
    ("Page-footer", MAGENTA),
    ("Page-header", CYAN),
    ("Picture", PURPLE),
    ("Section-header", ORANGE),
    ("Table", GRAY),
    ("Text", DARK_GREEN),
    ("Title", DEEP_PINK),
    ("Header", DEEP_PINK),
    ("Reference", ORANGE),
    ("Figure caption", RED),
    ("Figure", PURPLE),
    ("Table caption", GREEN),
    ("Footer", MAGENTA),
    ("Equation", BLUE),
];

/// Returns the display color for a label, or black if the label belongs to
/// neither vocabulary. Matching is exact (case-sensitive).
pub fn color_for_label(label: &str) -> Rgb {
    COLOR_TABLE
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, color)| *color)
        .unwrap_or(Rgb::BLACK)
}

/// Returns true if the label is part of either known vocabulary.
pub fn is_known_label(label: &str) -> bool {
    DOC_LABELS.contains(&label) || CDLA_LABELS.contains(&label)
}

/// A model's class-index -> label-name table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LabelTable {
    names: &'static [&'static str],
}

impl LabelTable {
    /// The 11-class DocLayNet table.
    pub const DOC: LabelTable = LabelTable { names: &DOC_LABELS };

    /// The 10-class CDLA table.
    pub const CDLA: LabelTable = LabelTable {
        names: &CDLA_LABELS,
    };

    /// Looks up the label for a class index.
    #[inline]
    pub fn name(&self, index: usize) -> Option<&'static str> {
        self.names.get(index).copied()
    }

    /// Number of classes in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }
}
