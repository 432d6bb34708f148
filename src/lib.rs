// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! MemeCanvas - caption composition engine
//!
//! Loads a background image, lets the user place movable, editable text
//! captions over it, and flattens the result into a PNG. The engine is
//! independent of any windowing toolkit; the desktop front-end in the
//! binary only translates its pointer and keyboard input into
//! [`controller::InputEvent`]s.

pub mod config;
pub mod controller;
pub mod error;
pub mod io;
pub mod models;
pub mod render;
pub mod session;
pub mod util;

pub use controller::{InputEvent, InteractionController, InteractionState};
pub use error::{ExportError, ImageLoadError, PublishError, RenderError};
pub use models::overlay::{NormalizedPoint, Overlay, OverlayId, OverlayPatch};
pub use models::store::OverlayStore;
pub use session::{EditorSession, Hit};
