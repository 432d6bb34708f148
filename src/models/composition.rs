// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Saved composition state.
//!
//! A composition document records which image was used and where the
//! captions sit, so the work can be reopened later.

use super::overlay::Overlay;
use super::store::DEFAULT_FONT_SIZE;
use crate::io::source::ImageSource;
use serde::{Deserialize, Serialize};

/// Complete composition data for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionDocument {
    pub source: ImageSource,
    #[serde(default = "default_font_size")]
    pub default_font_size: u32,
    #[serde(default)]
    pub overlays: Vec<Overlay>,
}

fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE
}

impl CompositionDocument {
    /// Create a composition for the given image with no captions.
    pub fn new(source: ImageSource) -> Self {
        Self {
            source,
            default_font_size: DEFAULT_FONT_SIZE,
            overlays: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let doc: CompositionDocument =
            serde_json::from_str(r#"{ "source": "https://example.com/a.png" }"#).unwrap();
        assert_eq!(doc.default_font_size, DEFAULT_FONT_SIZE);
        assert!(doc.overlays.is_empty());
        assert_eq!(
            doc.source,
            ImageSource::Url("https://example.com/a.png".into())
        );
    }
}
