// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pointer and keyboard interaction state machine.
//!
//! Host toolkits translate their raw input into [`InputEvent`]s; the
//! controller turns those into Overlay Store mutations. At most one caption
//! is dragged or edited at any time.

use crate::models::overlay::{OverlayId, OverlayPatch};
use crate::models::store::OverlayStore;
use crate::util::geometry::{denormalize_point, normalize_point, SurfaceSize};

/// Toolkit-independent input intent. Coordinates are surface pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Primary button pressed over a caption's body.
    PointerDown { id: OverlayId, x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    PointerCancel,
    /// Double click or double tap over a caption.
    DoubleActivate { id: OverlayId },
    /// Edit field content changed (one event per keystroke).
    TextChanged { id: OverlayId, text: String },
    /// Enter pressed in the edit field.
    CommitEdit,
    /// Edit field lost focus.
    FocusLost,
    /// The caption's remove control was activated.
    Remove { id: OverlayId },
    /// Global font size control moved.
    FontSizeChanged { value: u32 },
}

/// Current interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Dragging `id`; the offset is pointer minus caption anchor at press time.
    Dragging {
        id: OverlayId,
        offset_x: f64,
        offset_y: f64,
    },
    Editing {
        id: OverlayId,
    },
}

/// Drag/edit state machine.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: InteractionState,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn dragging(&self) -> Option<OverlayId> {
        match self.state {
            InteractionState::Dragging { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn editing(&self) -> Option<OverlayId> {
        match self.state {
            InteractionState::Editing { id } => Some(id),
            _ => None,
        }
    }

    /// Return to idle, e.g. after the caption collection was replaced.
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
    }

    /// Apply one event. Returns true when the store was mutated.
    ///
    /// Pointer events need a surface to convert coordinates and are ignored
    /// without one. Events naming captions that no longer exist are ignored.
    pub fn handle(
        &mut self,
        event: InputEvent,
        store: &mut OverlayStore,
        surface: Option<SurfaceSize>,
    ) -> bool {
        match event {
            InputEvent::PointerDown { id, x, y } => {
                self.begin_drag(id, x, y, store, surface);
                false
            }
            InputEvent::PointerMove { x, y } => self.drag_to(x, y, store, surface),
            InputEvent::PointerUp | InputEvent::PointerCancel => {
                if let Some(id) = self.dragging() {
                    log::debug!("Stopped dragging caption {}", id);
                    self.state = InteractionState::Idle;
                }
                false
            }
            InputEvent::DoubleActivate { id } => {
                self.begin_edit(id, store);
                false
            }
            InputEvent::TextChanged { id, text } => {
                if self.editing() == Some(id) {
                    store.update(id, OverlayPatch::text(text))
                } else {
                    log::debug!("Ignoring text change for caption {} not being edited", id);
                    false
                }
            }
            InputEvent::CommitEdit | InputEvent::FocusLost => {
                self.commit_edit();
                false
            }
            InputEvent::Remove { id } => {
                let removed = store.remove(id);
                let involved = match self.state {
                    InteractionState::Dragging { id: current, .. }
                    | InteractionState::Editing { id: current } => current == id,
                    InteractionState::Idle => false,
                };
                if involved {
                    self.state = InteractionState::Idle;
                }
                removed
            }
            InputEvent::FontSizeChanged { value } => store.set_default_font_size(value),
        }
    }

    fn begin_drag(
        &mut self,
        id: OverlayId,
        x: f64,
        y: f64,
        store: &OverlayStore,
        surface: Option<SurfaceSize>,
    ) {
        let Some(size) = surface else {
            return;
        };
        let Some(overlay) = store.get(id) else {
            log::debug!("Ignoring press on unknown caption {}", id);
            return;
        };
        if self.editing() == Some(id) {
            // Presses inside the caption being edited belong to the text field.
            return;
        }
        self.commit_edit();

        let (anchor_x, anchor_y) = denormalize_point(&overlay.position, size);
        self.state = InteractionState::Dragging {
            id,
            offset_x: x - anchor_x,
            offset_y: y - anchor_y,
        };
        log::debug!("Started dragging caption {}", id);
    }

    fn drag_to(
        &mut self,
        x: f64,
        y: f64,
        store: &mut OverlayStore,
        surface: Option<SurfaceSize>,
    ) -> bool {
        let InteractionState::Dragging {
            id,
            offset_x,
            offset_y,
        } = self.state
        else {
            return false;
        };
        let Some(size) = surface else {
            return false;
        };
        let position = normalize_point(x - offset_x, y - offset_y, size);
        let moved = store.update(id, OverlayPatch::position(position));
        if !moved {
            self.state = InteractionState::Idle;
        }
        moved
    }

    fn begin_edit(&mut self, id: OverlayId, store: &OverlayStore) {
        if matches!(self.state, InteractionState::Dragging { .. }) {
            log::debug!("Ignoring double activation during drag");
            return;
        }
        if store.get(id).is_none() {
            log::debug!("Ignoring double activation on unknown caption {}", id);
            return;
        }
        if self.editing() == Some(id) {
            return;
        }
        self.commit_edit();
        self.state = InteractionState::Editing { id };
        log::debug!("Editing caption {}", id);
    }

    fn commit_edit(&mut self) {
        if let Some(id) = self.editing() {
            log::debug!("Committed edit of caption {}", id);
            self.state = InteractionState::Idle;
        }
    }
}
