// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image loading and canvas sizing.
//!
//! Decodes an image source into a Composition Surface whose display size is
//! bounded to 600x600 while keeping the aspect ratio. Loading can run on a
//! background thread through [`ImageLoader`]; only the newest request's
//! result is ever handed back.

use crate::error::ImageLoadError;
use crate::io::source::ImageSource;
use crate::render::pixmap_from_rgba;
use crate::util::geometry::SurfaceSize;
use image::{imageops::FilterType, RgbaImage};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use tiny_skia::Pixmap;

/// Largest display width and height of a surface.
pub const MAX_DISPLAY_DIMENSION: f64 = 600.0;

/// Compute the bounded display size for an image of `width` x `height`.
///
/// Width is bounded first; height is then bounded on the result. Sides are
/// rounded to whole pixels and never drop below 1.
pub fn bounded_size(width: u32, height: u32) -> SurfaceSize {
    let mut w = width as f64;
    let mut h = height as f64;

    if w > MAX_DISPLAY_DIMENSION {
        h = h * MAX_DISPLAY_DIMENSION / w;
        w = MAX_DISPLAY_DIMENSION;
    }
    if h > MAX_DISPLAY_DIMENSION {
        w = w * MAX_DISPLAY_DIMENSION / h;
        h = MAX_DISPLAY_DIMENSION;
    }

    SurfaceSize::new(w.round() as u32, h.round() as u32)
}

/// Decoded background image and its bounded display size.
///
/// Cheap to clone; the bitmaps are shared.
#[derive(Clone)]
pub struct Surface {
    source: Arc<RgbaImage>,
    backdrop: Arc<Pixmap>,
    size: SurfaceSize,
}

impl Surface {
    /// Build a surface from a decoded bitmap, pre-scaling it to the display size.
    pub fn new(source: RgbaImage) -> Result<Self, ImageLoadError> {
        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageLoadError::EmptyImage { width, height });
        }
        let size = bounded_size(width, height);
        let scaled = if (size.width, size.height) == (width, height) {
            source.clone()
        } else {
            image::imageops::resize(&source, size.width, size.height, FilterType::Triangle)
        };
        let backdrop = pixmap_from_rgba(&scaled)?;

        Ok(Self {
            source: Arc::new(source),
            backdrop: Arc::new(backdrop),
            size,
        })
    }

    /// Bounded display size; the frame of reference for overlay positions.
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    /// The bitmap at its native resolution.
    pub fn source_bitmap(&self) -> &RgbaImage {
        &self.source
    }

    /// The bitmap scaled to the display size, ready for compositing.
    pub fn backdrop(&self) -> &Pixmap {
        &self.backdrop
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("native", &self.source.dimensions())
            .field("size", &self.size)
            .finish()
    }
}

/// Decode encoded image bytes into a surface.
pub fn decode_surface(bytes: &[u8]) -> Result<Surface, ImageLoadError> {
    let decoded = image::load_from_memory(bytes)?;
    Surface::new(decoded.to_rgba8())
}

/// Resolve and decode a source synchronously.
pub fn load_surface(source: &ImageSource) -> Result<Surface, ImageLoadError> {
    let bytes = source.read()?;
    let surface = decode_surface(&bytes)?;
    let (native_w, native_h) = surface.source_bitmap().dimensions();
    log::info!(
        "Loaded image: {} ({}x{} -> {}x{})",
        source,
        native_w,
        native_h,
        surface.width(),
        surface.height()
    );
    Ok(surface)
}

/// Result of a background load that is still current.
#[derive(Debug)]
pub struct LoadOutcome {
    pub ticket: u64,
    pub source: ImageSource,
    pub result: Result<Surface, ImageLoadError>,
}

type LoadMessage = (u64, ImageSource, Result<Surface, ImageLoadError>);

/// Background image loader.
///
/// Each [`request`](Self::request) gets a new ticket and its own worker
/// thread. Results arriving for anything but the newest ticket are dropped,
/// so the last request always wins regardless of completion order.
pub struct ImageLoader {
    sender: Sender<LoadMessage>,
    receiver: Receiver<LoadMessage>,
    latest: u64,
    resolved: u64,
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageLoader {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self {
            sender,
            receiver,
            latest: 0,
            resolved: 0,
        }
    }

    /// Start loading `source` on a worker thread and return its ticket.
    pub fn request(&mut self, source: ImageSource) -> u64 {
        self.latest += 1;
        let ticket = self.latest;
        let sender = self.sender.clone();
        log::info!("Loading image {} (request {})", source, ticket);

        std::thread::spawn(move || {
            let result = load_surface(&source);
            let _ = sender.send((ticket, source, result));
        });

        ticket
    }

    /// True while the newest request has not resolved.
    pub fn is_pending(&self) -> bool {
        self.latest > self.resolved
    }

    /// Forget every outstanding request. Their results are dropped when
    /// they arrive.
    pub fn invalidate(&mut self) {
        if self.is_pending() {
            log::debug!("Invalidating pending image load {}", self.latest);
        }
        self.latest += 1;
        self.resolved = self.latest;
    }

    /// Collect finished work without blocking.
    pub fn poll(&mut self) -> Option<LoadOutcome> {
        let mut outcome = None;
        while let Ok(message) = self.receiver.try_recv() {
            if let Some(current) = self.accept(message) {
                outcome = Some(current);
            }
        }
        outcome
    }

    /// Block until the newest request resolves. Returns `None` when nothing is pending.
    pub fn wait(&mut self) -> Option<LoadOutcome> {
        while self.is_pending() {
            let message = self.receiver.recv().ok()?;
            if let Some(outcome) = self.accept(message) {
                return Some(outcome);
            }
        }
        None
    }

    fn accept(&mut self, (ticket, source, result): LoadMessage) -> Option<LoadOutcome> {
        if ticket != self.latest {
            log::debug!(
                "Discarding stale image load {} (latest is {})",
                ticket,
                self.latest
            );
            return None;
        }
        self.resolved = ticket;
        Some(LoadOutcome {
            ticket,
            source,
            result,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    /// Encode a solid-color PNG of the given size.
    pub(crate) fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn wide_image_is_width_constrained() {
        assert_eq!(bounded_size(1200, 300), SurfaceSize::new(600, 150));
    }

    #[test]
    fn tall_image_is_height_constrained() {
        assert_eq!(bounded_size(300, 1200), SurfaceSize::new(150, 600));
    }

    #[test]
    fn both_steps_apply_in_order() {
        // 2000x4000 -> width step 600x1200 -> height step 300x600
        assert_eq!(bounded_size(2000, 4000), SurfaceSize::new(300, 600));
    }

    #[test]
    fn small_images_keep_their_size() {
        assert_eq!(bounded_size(320, 240), SurfaceSize::new(320, 240));
        assert_eq!(bounded_size(600, 600), SurfaceSize::new(600, 600));
    }

    #[test]
    fn extreme_aspect_never_collapses_to_zero() {
        assert_eq!(bounded_size(100_000, 1), SurfaceSize::new(600, 1));
    }

    #[test]
    fn decode_builds_bounded_backdrop() {
        let surface = decode_surface(&png_bytes(1200, 300, [10, 20, 30, 255])).unwrap();
        assert_eq!(surface.size(), SurfaceSize::new(600, 150));
        assert_eq!(surface.source_bitmap().dimensions(), (1200, 300));
        assert_eq!(surface.backdrop().width(), 600);
        assert_eq!(surface.backdrop().height(), 150);
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(matches!(
            decode_surface(b"not an image"),
            Err(ImageLoadError::Decode(_))
        ));
    }

    #[test]
    fn loader_returns_latest_result() {
        let mut loader = ImageLoader::new();
        assert!(!loader.is_pending());
        assert!(loader.wait().is_none());

        loader.request(ImageSource::Bytes(png_bytes(10, 10, [0, 0, 0, 255])));
        let newest = loader.request(ImageSource::Bytes(png_bytes(40, 20, [0, 0, 0, 255])));
        assert!(loader.is_pending());

        let outcome = loader.wait().unwrap();
        assert_eq!(outcome.ticket, newest);
        assert_eq!(outcome.result.unwrap().size(), SurfaceSize::new(40, 20));
        assert!(!loader.is_pending());
    }

    #[test]
    fn invalidated_requests_are_dropped() {
        let mut loader = ImageLoader::new();
        loader.request(ImageSource::Bytes(png_bytes(10, 10, [0, 0, 0, 255])));
        loader.invalidate();
        assert!(!loader.is_pending());
        assert!(loader.wait().is_none());

        std::thread::sleep(std::time::Duration::from_millis(200));
        assert!(loader.poll().is_none());

        let newest = loader.request(ImageSource::Bytes(png_bytes(30, 10, [0, 0, 0, 255])));
        let outcome = loader.wait().unwrap();
        assert_eq!(outcome.ticket, newest);
    }

    #[test]
    fn loader_reports_failures() {
        let mut loader = ImageLoader::new();
        loader.request(ImageSource::Bytes(b"broken".to_vec()));
        let outcome = loader.wait().unwrap();
        assert!(outcome.result.is_err());
    }
}
