// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Caption overlay data structures.
//!
//! An overlay is a single line of text anchored (centered) at a normalized
//! position on the display surface.

use crate::util::geometry::clamp_normalized;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text shown in place of an empty caption while editing, and the text new
/// captions start with.
pub const PLACEHOLDER_TEXT: &str = "Your text here";

/// Stable caption identifier. Never reused within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverlayId(pub u64);

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A 2D point in percent of surface width/height (0.0 to 100.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    /// Center of the surface.
    pub const CENTER: Self = Self { x: 50.0, y: 50.0 };

    /// Create a point, clamping both coordinates into `[0, 100]`.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }.clamped()
    }

    pub fn clamped(self) -> Self {
        Self {
            x: clamp_normalized(self.x),
            y: clamp_normalized(self.y),
        }
    }
}

/// One caption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub id: OverlayId,
    pub text: String,
    pub position: NormalizedPoint,
    pub font_size: u32,
    /// Set once the font size was chosen explicitly; pinned captions no
    /// longer follow the session default.
    #[serde(default)]
    pub font_pinned: bool,
}

impl Overlay {
    pub(crate) fn new(id: OverlayId, font_size: u32) -> Self {
        Self {
            id,
            text: PLACEHOLDER_TEXT.to_string(),
            position: NormalizedPoint::CENTER,
            font_size,
            font_pinned: false,
        }
    }

    /// Text to show in interactive chrome: the placeholder while empty.
    pub fn display_text(&self) -> &str {
        if self.text.is_empty() {
            PLACEHOLDER_TEXT
        } else {
            &self.text
        }
    }

    /// Merge the set fields of `patch` into this overlay.
    pub(crate) fn apply(&mut self, patch: OverlayPatch) {
        if let Some(text) = patch.text {
            self.text = text;
        }
        if let Some(position) = patch.position {
            self.position = position.clamped();
        }
        match patch.font_size {
            Some(0) => log::warn!("Ignoring zero font size for overlay {}", self.id),
            Some(size) => {
                self.font_size = size;
                self.font_pinned = true;
            }
            None => {}
        }
    }
}

/// Partial update for an overlay. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayPatch {
    pub text: Option<String>,
    pub position: Option<NormalizedPoint>,
    pub font_size: Option<u32>,
}

impl OverlayPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn position(position: NormalizedPoint) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn font_size(size: u32) -> Self {
        Self {
            font_size: Some(size),
            ..Self::default()
        }
    }
}
