// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editing session.
//!
//! Owns everything one editing context needs: the caption store, the
//! interaction controller, the current Composition Surface, the background
//! loader and the renderer. Any store mutation or surface replacement marks
//! the cached frame stale; the next [`EditorSession::frame`] call re-renders.

use crate::controller::{InputEvent, InteractionController};
use crate::error::{ExportError, ImageLoadError, RenderError};
use crate::io::export;
use crate::io::media::{load_surface, ImageLoader, LoadOutcome, Surface};
use crate::io::source::ImageSource;
use crate::models::composition::CompositionDocument;
use crate::models::overlay::{Overlay, OverlayId, OverlayPatch};
use crate::models::store::OverlayStore;
use crate::render::{Frame, Renderer};
use crate::util::geometry::{PixelRect, SurfaceSize};
use std::path::Path;

/// Padding around a caption's text when hit testing.
pub const HIT_PADDING: f64 = 4.0;

/// Side length of the square remove control at a caption's top-right corner.
pub const REMOVE_HANDLE_SIZE: f64 = 18.0;

/// What lies under a pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// The remove control of a caption.
    Remove(OverlayId),
    /// The caption itself.
    Body(OverlayId),
}

struct CachedFrame {
    frame: Frame,
    revision: u64,
    generation: u64,
    serial: u64,
}

/// Captions waiting for their image to finish loading.
struct PendingRestore {
    ticket: u64,
    doc: CompositionDocument,
}

/// One independent editing context.
pub struct EditorSession {
    store: OverlayStore,
    controller: InteractionController,
    surface: Option<Surface>,
    source: Option<ImageSource>,
    /// Bumped whenever the surface is replaced.
    generation: u64,
    loader: ImageLoader,
    renderer: Renderer,
    cached: Option<CachedFrame>,
    renders: u64,
    pending_restore: Option<PendingRestore>,
}

impl EditorSession {
    pub fn new(renderer: Renderer, default_font_size: u32) -> Self {
        Self {
            store: OverlayStore::new(default_font_size),
            controller: InteractionController::new(),
            surface: None,
            source: None,
            generation: 0,
            loader: ImageLoader::new(),
            renderer,
            cached: None,
            renders: 0,
            pending_restore: None,
        }
    }

    pub fn with_bundled_font(default_font_size: u32) -> Result<Self, RenderError> {
        Ok(Self::new(Renderer::with_bundled_font()?, default_font_size))
    }

    pub fn store(&self) -> &OverlayStore {
        &self.store
    }

    pub fn overlays(&self) -> &[Overlay] {
        self.store.all()
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn surface_size(&self) -> Option<SurfaceSize> {
        self.surface.as_ref().map(Surface::size)
    }

    /// Source of the installed surface.
    pub fn source(&self) -> Option<&ImageSource> {
        self.source.as_ref()
    }

    // ---- image loading ----

    /// Load synchronously and install the result.
    ///
    /// On failure the previous surface and captions are left untouched.
    /// Background loads requested earlier are superseded either way.
    pub fn load_blocking(&mut self, source: ImageSource) -> Result<(), ImageLoadError> {
        self.loader.invalidate();
        self.pending_restore = None;
        let surface = load_surface(&source)?;
        self.install(source, surface);
        Ok(())
    }

    /// Start a background load. The current surface stays renderable until
    /// [`poll_load`](Self::poll_load) installs the new one.
    pub fn request_load(&mut self, source: ImageSource) -> u64 {
        self.loader.request(source)
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_pending()
    }

    /// Install a finished background load, if the newest one is done.
    ///
    /// Returns `None` while nothing new has resolved.
    pub fn poll_load(&mut self) -> Option<Result<(), ImageLoadError>> {
        let outcome = self.loader.poll()?;
        Some(self.finish_load(outcome))
    }

    /// Block until the newest background load resolves and install it.
    pub fn wait_for_load(&mut self) -> Option<Result<(), ImageLoadError>> {
        let outcome = self.loader.wait()?;
        Some(self.finish_load(outcome))
    }

    fn finish_load(&mut self, outcome: LoadOutcome) -> Result<(), ImageLoadError> {
        let restore = match self.pending_restore.take() {
            Some(pending) if pending.ticket == outcome.ticket => Some(pending.doc),
            _ => None,
        };
        match outcome.result {
            Ok(surface) => {
                self.install(outcome.source, surface);
                if let Some(doc) = restore {
                    self.restore_captions(doc);
                }
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load image {}: {}", outcome.source, e);
                Err(e)
            }
        }
    }

    /// Replace the surface. Captions belong to the old image and are dropped.
    fn install(&mut self, source: ImageSource, surface: Surface) {
        self.surface = Some(surface);
        self.source = Some(source);
        self.generation += 1;
        self.store.clear();
        self.controller.reset();
    }

    // ---- composition documents ----

    /// Snapshot the composition for saving. `None` before any image is loaded.
    pub fn document(&self) -> Option<CompositionDocument> {
        Some(CompositionDocument {
            source: self.source.clone()?,
            default_font_size: self.store.default_font_size(),
            overlays: self.store.all().to_vec(),
        })
    }

    /// Load a document's image synchronously, then restore its captions.
    pub fn open_document_blocking(
        &mut self,
        doc: CompositionDocument,
    ) -> Result<(), ImageLoadError> {
        self.load_blocking(doc.source.clone())?;
        self.restore_captions(doc);
        Ok(())
    }

    /// Load a document's image in the background; its captions are restored
    /// once that load is installed.
    pub fn open_document(&mut self, doc: CompositionDocument) -> u64 {
        let ticket = self.request_load(doc.source.clone());
        self.pending_restore = Some(PendingRestore { ticket, doc });
        ticket
    }

    fn restore_captions(&mut self, doc: CompositionDocument) {
        self.store.set_default_font_size(doc.default_font_size);
        self.store.restore(doc.overlays);
    }

    // ---- captions and input ----

    pub fn add_caption(&mut self) -> OverlayId {
        self.store.create()
    }

    /// Direct edit outside of pointer interaction.
    pub fn update_caption(&mut self, id: OverlayId, patch: OverlayPatch) -> bool {
        self.store.update(id, patch)
    }

    pub fn set_default_font_size(&mut self, value: u32) -> bool {
        self.handle(InputEvent::FontSizeChanged { value })
    }

    /// Feed one input event to the interaction controller.
    pub fn handle(&mut self, event: InputEvent) -> bool {
        let size = self.surface_size();
        self.controller.handle(event, &mut self.store, size)
    }

    /// Pixel box of a caption on the current surface.
    pub fn hit_rect(&self, id: OverlayId) -> Option<PixelRect> {
        let surface = self.surface.as_ref()?;
        let overlay = self.store.get(id)?;
        Some(self.renderer.caption_bounds(overlay, surface, HIT_PADDING))
    }

    /// Remove control of a caption: a square centered on the box's top-right corner.
    pub fn remove_handle(&self, id: OverlayId) -> Option<PixelRect> {
        let body = self.hit_rect(id)?;
        Some(PixelRect::centered(
            body.max_x,
            body.min_y,
            REMOVE_HANDLE_SIZE,
            REMOVE_HANDLE_SIZE,
        ))
    }

    /// Find what is under `(x, y)`. Remove controls win over caption bodies;
    /// among equals the topmost (latest) caption wins.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<Hit> {
        let under = |rect: Option<PixelRect>| rect.is_some_and(|r| r.contains(x, y));
        let ids: Vec<OverlayId> = self.store.all().iter().rev().map(|o| o.id).collect();
        ids.iter()
            .find(|&&id| under(self.remove_handle(id)))
            .map(|&id| Hit::Remove(id))
            .or_else(|| {
                ids.iter()
                    .find(|&&id| under(self.hit_rect(id)))
                    .map(|&id| Hit::Body(id))
            })
    }

    /// Primary button pressed at `(x, y)`.
    ///
    /// A remove control removes its caption and starts nothing else. A press
    /// on a caption body starts a drag. A press on empty space ends editing.
    pub fn press(&mut self, x: f64, y: f64) -> bool {
        match self.hit_test(x, y) {
            Some(Hit::Remove(id)) => self.handle(InputEvent::Remove { id }),
            Some(Hit::Body(id)) => self.handle(InputEvent::PointerDown { id, x, y }),
            None => self.handle(InputEvent::FocusLost),
        }
    }

    /// Double click/tap at `(x, y)`.
    pub fn double_activate_at(&mut self, x: f64, y: f64) -> bool {
        match self.hit_test(x, y) {
            Some(Hit::Body(id)) => self.handle(InputEvent::DoubleActivate { id }),
            _ => false,
        }
    }

    // ---- rendering and export ----

    /// True when the cached frame no longer reflects the session state.
    pub fn is_dirty(&self) -> bool {
        match &self.cached {
            Some(cached) => {
                cached.revision != self.store.revision() || cached.generation != self.generation
            }
            None => self.surface.is_some(),
        }
    }

    /// Current frame, re-rendered if stale. `None` before any image is loaded.
    pub fn frame(&mut self) -> Result<Option<&Frame>, RenderError> {
        let Some(surface) = &self.surface else {
            return Ok(None);
        };
        let stale = match &self.cached {
            Some(cached) => {
                cached.revision != self.store.revision() || cached.generation != self.generation
            }
            None => true,
        };
        if stale {
            let frame = self.renderer.render(surface, self.store.all())?;
            self.renders += 1;
            self.cached = Some(CachedFrame {
                frame,
                revision: self.store.revision(),
                generation: self.generation,
                serial: self.renders,
            });
        }
        Ok(self.cached.as_ref().map(|cached| &cached.frame))
    }

    /// Counter that changes whenever [`frame`](Self::frame) produced a new frame.
    pub fn frame_serial(&self) -> Option<u64> {
        self.cached.as_ref().map(|cached| cached.serial)
    }

    /// Render and encode the composition as PNG.
    pub fn export_png(&mut self) -> Result<Vec<u8>, ExportError> {
        let frame = self.frame()?;
        export::export_png(frame)
    }

    /// Render, encode and write the composition to `path`.
    pub fn save_png(&mut self, path: &Path) -> Result<(), ExportError> {
        let bytes = self.export_png()?;
        export::write_png(&bytes, path)
    }
}
