// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay store.
//!
//! Owns the ordered caption collection and the session default font size.
//! Collection order is insertion order, which is also z-order for hit
//! testing and rendering. Operations on unknown ids are no-ops.

use super::overlay::{Overlay, OverlayId, OverlayPatch};
use std::collections::HashSet;
use std::ops::RangeInclusive;

/// Session default font size before the user touches the slider.
pub const DEFAULT_FONT_SIZE: u32 = 40;

/// Accepted range for the session default font size.
pub const FONT_SIZE_RANGE: RangeInclusive<u32> = 20..=100;

/// Largest caption id kept when restoring saved captions. Captions saved
/// with larger ids are renumbered so new ids never run out.
pub const MAX_RESTORED_ID: u64 = u32::MAX as u64;

/// Ordered caption collection plus session defaults.
#[derive(Debug, Clone)]
pub struct OverlayStore {
    overlays: Vec<Overlay>,
    next_id: u64,
    default_font_size: u32,
    /// Bumped on every effective mutation; the renderer cache keys on it.
    revision: u64,
}

impl Default for OverlayStore {
    fn default() -> Self {
        Self::new(DEFAULT_FONT_SIZE)
    }
}

impl OverlayStore {
    /// Create an empty store. `default_font_size` is clamped into [`FONT_SIZE_RANGE`].
    pub fn new(default_font_size: u32) -> Self {
        Self {
            overlays: Vec::new(),
            next_id: 1,
            default_font_size: default_font_size
                .clamp(*FONT_SIZE_RANGE.start(), *FONT_SIZE_RANGE.end()),
            revision: 0,
        }
    }

    /// Append a caption at the surface center using the current default font size.
    pub fn create(&mut self) -> OverlayId {
        let id = OverlayId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.overlays.push(Overlay::new(id, self.default_font_size));
        self.touch();
        log::info!("Added caption {}, total: {}", id, self.overlays.len());
        id
    }

    /// Remove a caption. Returns false when the id is unknown.
    pub fn remove(&mut self, id: OverlayId) -> bool {
        let before = self.overlays.len();
        self.overlays.retain(|overlay| overlay.id != id);
        if self.overlays.len() == before {
            log::debug!("Ignoring removal of unknown caption {}", id);
            return false;
        }
        self.touch();
        log::info!("Removed caption {}, total: {}", id, self.overlays.len());
        true
    }

    /// Merge `patch` into a caption. Returns false when the id is unknown.
    pub fn update(&mut self, id: OverlayId, patch: OverlayPatch) -> bool {
        match self.overlays.iter_mut().find(|overlay| overlay.id == id) {
            Some(overlay) => {
                overlay.apply(patch);
                self.touch();
                true
            }
            None => {
                log::debug!("Ignoring update of unknown caption {}", id);
                false
            }
        }
    }

    pub fn get(&self, id: OverlayId) -> Option<&Overlay> {
        self.overlays.iter().find(|overlay| overlay.id == id)
    }

    /// Snapshot of all captions in z-order.
    pub fn all(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Drop every caption. Ids keep counting up.
    pub fn clear(&mut self) {
        self.overlays.clear();
        self.touch();
    }

    /// Replace the collection with previously saved captions.
    ///
    /// Positions are re-clamped and duplicate ids are dropped. Future ids
    /// continue after the largest restored one. When any saved id exceeds
    /// [`MAX_RESTORED_ID`] every caption gets a fresh id instead.
    pub fn restore(&mut self, overlays: Vec<Overlay>) {
        let mut seen = HashSet::new();
        self.overlays = overlays
            .into_iter()
            .filter(|overlay| {
                let fresh = seen.insert(overlay.id);
                if !fresh {
                    log::warn!("Dropping duplicate caption {}", overlay.id);
                }
                fresh
            })
            .map(|mut overlay| {
                overlay.position = overlay.position.clamped();
                if overlay.font_size == 0 {
                    overlay.font_size = self.default_font_size;
                    overlay.font_pinned = false;
                }
                overlay
            })
            .collect();
        match self.overlays.iter().map(|overlay| overlay.id.0).max() {
            Some(max) if max > MAX_RESTORED_ID => {
                log::warn!("Saved caption id {} out of range, renumbering", max);
                for overlay in &mut self.overlays {
                    overlay.id = OverlayId(self.next_id);
                    self.next_id = self.next_id.saturating_add(1);
                }
            }
            Some(max) => self.next_id = self.next_id.max(max + 1),
            None => {}
        }
        self.touch();
    }

    pub fn default_font_size(&self) -> u32 {
        self.default_font_size
    }

    /// Change the session default font size.
    ///
    /// Every caption whose font size was never pinned follows the new
    /// default. Values outside [`FONT_SIZE_RANGE`] are ignored and false is
    /// returned.
    pub fn set_default_font_size(&mut self, size: u32) -> bool {
        if !FONT_SIZE_RANGE.contains(&size) {
            log::warn!("Ignoring out of range default font size {}", size);
            return false;
        }
        self.default_font_size = size;
        for overlay in self.overlays.iter_mut().filter(|o| !o.font_pinned) {
            overlay.font_size = size;
        }
        self.touch();
        log::info!("Default font size set to {}", size);
        true
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
