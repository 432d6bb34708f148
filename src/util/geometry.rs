// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! Overlay positions are stored as percentages (0 to 100) of the display
//! surface, so a caption keeps its relative placement whatever the pixel
//! size of the loaded image. This module converts between that normalized
//! space and surface pixels.

use crate::models::overlay::NormalizedPoint;
use serde::{Deserialize, Serialize};

/// Upper bound of the normalized coordinate space.
pub const NORMALIZED_MAX: f64 = 100.0;

/// Pixel dimensions of a display surface. Both sides are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }
}

/// Axis-aligned rectangle in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl PixelRect {
    /// Rectangle of the given size centered on `(cx, cy)`.
    pub fn centered(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self {
            min_x: cx - width / 2.0,
            min_y: cy - height / 2.0,
            max_x: cx + width / 2.0,
            max_y: cy + height / 2.0,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Edges are inclusive.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Clamp a coordinate into `[0, 100]`. NaN collapses to 0.
pub fn clamp_normalized(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, NORMALIZED_MAX)
    }
}

/// Convert one normalized coordinate to pixels along an axis of `surface_size` pixels.
pub fn to_pixels(normalized: f64, surface_size: u32) -> f64 {
    normalized / NORMALIZED_MAX * surface_size as f64
}

/// Convert a pixel coordinate to the normalized space, clamped to `[0, 100]`.
pub fn to_normalized(pixel: f64, surface_size: u32) -> f64 {
    clamp_normalized(pixel / surface_size.max(1) as f64 * NORMALIZED_MAX)
}

/// Convert a normalized point to surface pixel coordinates.
pub fn denormalize_point(point: &NormalizedPoint, size: SurfaceSize) -> (f64, f64) {
    (to_pixels(point.x, size.width), to_pixels(point.y, size.height))
}

/// Convert surface pixel coordinates to a clamped normalized point.
pub fn normalize_point(pixel_x: f64, pixel_y: f64, size: SurfaceSize) -> NormalizedPoint {
    NormalizedPoint {
        x: to_normalized(pixel_x, size.width),
        y: to_normalized(pixel_y, size.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_denormalize_roundtrip() {
        let size = SurfaceSize::new(600, 150);
        let pixel_x = 300.0;
        let pixel_y = 75.0;

        let normalized = normalize_point(pixel_x, pixel_y, size);
        assert!((normalized.x - 50.0).abs() < 1e-9);
        assert!((normalized.y - 50.0).abs() < 1e-9);

        let (denorm_x, denorm_y) = denormalize_point(&normalized, size);
        assert!((denorm_x - pixel_x).abs() < 0.0001);
        assert!((denorm_y - pixel_y).abs() < 0.0001);
    }

    #[test]
    fn test_normalize_corners() {
        let size = SurfaceSize::new(1920, 1080);

        let tl = normalize_point(0.0, 0.0, size);
        assert_eq!(tl.x, 0.0);
        assert_eq!(tl.y, 0.0);

        let br = normalize_point(1920.0, 1080.0, size);
        assert_eq!(br.x, 100.0);
        assert_eq!(br.y, 100.0);
    }

    #[test]
    fn test_outside_surface_is_clamped() {
        let size = SurfaceSize::new(400, 300);
        let p = normalize_point(-25.0, 10_000.0, size);
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, 100.0);
        assert_eq!(clamp_normalized(f64::NAN), 0.0);
    }

    #[test]
    fn test_zero_sized_surface_is_bumped() {
        let size = SurfaceSize::new(0, 0);
        assert_eq!(size, SurfaceSize::new(1, 1));
    }

    #[test]
    fn test_rect_contains_edges() {
        let r = PixelRect::centered(10.0, 10.0, 4.0, 2.0);
        assert!(r.contains(8.0, 9.0));
        assert!(r.contains(12.0, 11.0));
        assert!(!r.contains(12.1, 10.0));
        assert_eq!(r.width(), 4.0);
        assert_eq!(r.height(), 2.0);
    }

    proptest! {
        #[test]
        fn roundtrip_within_tolerance(n in 0.0f64..=100.0, s in 1u32..10_000) {
            let back = to_normalized(to_pixels(n, s), s);
            prop_assert!((back - n).abs() < 1e-9);
        }

        #[test]
        fn normalized_is_always_in_range(px in -1.0e6f64..1.0e6, s in 1u32..10_000) {
            let n = to_normalized(px, s);
            prop_assert!((0.0..=NORMALIZED_MAX).contains(&n));
        }
    }
}
