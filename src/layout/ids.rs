//! Page keys for documents.
//!
//! Pages are identified by their zero-based index. The key is a newtype
//! over `u32` so that ordering is numeric ("10" sorts after "9"), while
//! `Display`/`FromStr` keep the string form used in JSON output.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::PdfLayoutError;

/// Zero-based page index of a layer within a document.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageKey(pub u32);

impl PageKey {
    /// Creates a new PageKey.
    #[inline]
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the page index as a `usize`, for indexing page lists.
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Returns the key of the following page.
    #[inline]
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Debug for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageKey({})", self.0)
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PageKey {
    type Err = PdfLayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // u32's parser accepts a leading '+'; page keys are plain digits.
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PdfLayoutError::InvalidPageKey(s.to_string()));
        }
        s.parse::<u32>()
            .map(PageKey)
            .map_err(|_| PdfLayoutError::InvalidPageKey(s.to_string()))
    }
}

impl From<u32> for PageKey {
    fn from(index: u32) -> Self {
        PageKey(index)
    }
}

// Serialized as the decimal string so it can be a JSON object key.
impl Serialize for PageKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PageKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ordering_is_numeric() {
        let mut keys: Vec<PageKey> = ["2", "10", "1"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["1", "2", "10"]);
    }

    #[test]
    fn test_key_parse_rejects_non_integers() {
        for bad in ["", "-1", "+3", "1.5", "abc", " 4"] {
            assert!(
                matches!(bad.parse::<PageKey>(), Err(PdfLayoutError::InvalidPageKey(_))),
                "accepted {bad:?}"
            );
        }
        assert_eq!("007".parse::<PageKey>().unwrap(), PageKey(7));
    }

    #[test]
    fn test_key_serializes_as_string() {
        let json = serde_json::to_string(&PageKey(12)).unwrap();
        assert_eq!(json, "\"12\"");
        let back: PageKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PageKey(12));
    }
}
