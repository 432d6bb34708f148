// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Caption rasterization.
//!
//! Produces a flattened frame from a Composition Surface and the overlay
//! collection: the backdrop scaled to the surface, then every caption in
//! collection order, each stroked in black and filled in white.

use crate::error::RenderError;
use crate::io::media::Surface;
use crate::models::overlay::Overlay;
use crate::util::geometry::{denormalize_point, PixelRect};
use ab_glyph::{Font, FontArc, GlyphId, OutlineCurve, PxScale, ScaleFont};
use image::RgbaImage;
use std::path::Path;
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke,
    Transform,
};

/// Name of the egui bundled font used when no caption font is configured.
const BUNDLED_FONT: &str = "Ubuntu-Light";

/// Outline width for a caption of `font_size` pixels.
pub fn stroke_width(font_size: u32) -> f32 {
    (font_size as f32 / 20.0).max(2.0)
}

/// Copy an RGBA bitmap into a premultiplied pixmap.
pub fn pixmap_from_rgba(img: &RgbaImage) -> Result<Pixmap, RenderError> {
    let (width, height) = img.dimensions();
    let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Surface { width, height })?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Font used to shape and measure captions.
#[derive(Clone)]
pub struct CaptionFont {
    font: FontArc,
}

impl CaptionFont {
    /// The proportional font bundled with egui.
    pub fn bundled() -> Result<Self, RenderError> {
        let definitions = egui::FontDefinitions::default();
        let data = definitions
            .font_data
            .get(BUNDLED_FONT)
            .or_else(|| definitions.font_data.values().next())
            .ok_or_else(|| RenderError::font("no bundled font available"))?;
        Self::from_bytes(data.font.to_vec())
    }

    /// Load a TTF/OTF font file.
    pub fn from_file(path: &Path) -> Result<Self, RenderError> {
        let bytes = std::fs::read(path)
            .map_err(|e| RenderError::font(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, RenderError> {
        let font = FontArc::try_from_vec(bytes).map_err(|e| RenderError::font(e.to_string()))?;
        Ok(Self { font })
    }

    /// ab_glyph scales by line height; captions are sized by em like CSS `px`.
    fn scale(&self, font_size: f32) -> PxScale {
        let units_per_em = self.font.units_per_em().unwrap_or(1000.0);
        PxScale::from(font_size * self.font.height_unscaled() / units_per_em)
    }

    /// Advance width and line height of `text` in pixels.
    pub fn measure(&self, text: &str, font_size: f32) -> (f32, f32) {
        let scaled = self.font.as_scaled(self.scale(font_size));
        let mut width = 0.0f32;
        let mut prev: Option<GlyphId> = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = prev {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        (width, scaled.ascent() - scaled.descent())
    }

    /// Outline of `text` centered horizontally and vertically on the anchor.
    /// `None` for text without visible glyphs.
    fn text_path(
        &self,
        text: &str,
        font_size: f32,
        anchor_x: f32,
        anchor_y: f32,
    ) -> Option<tiny_skia::Path> {
        let scaled = self.font.as_scaled(self.scale(font_size));
        let (width, _) = self.measure(text, font_size);
        let baseline = anchor_y + (scaled.ascent() + scaled.descent()) / 2.0;
        let sx = scaled.h_scale_factor();
        let sy = scaled.v_scale_factor();

        let mut builder = PathBuilder::new();
        let mut caret = anchor_x - width / 2.0;
        let mut prev: Option<GlyphId> = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = prev {
                caret += scaled.kern(prev, id);
            }
            if let Some(outline) = self.font.outline(id) {
                let map = |p: ab_glyph::Point| (caret + p.x * sx, baseline - p.y * sy);
                append_curves(&mut builder, &outline.curves, map);
            }
            caret += scaled.h_advance(id);
            prev = Some(id);
        }
        builder.finish()
    }
}

/// Append glyph curves, starting a new contour whenever a curve does not
/// continue from the previous end point.
fn append_curves(
    builder: &mut PathBuilder,
    curves: &[OutlineCurve],
    map: impl Fn(ab_glyph::Point) -> (f32, f32),
) {
    let mut last: Option<ab_glyph::Point> = None;
    for curve in curves {
        let (start, end) = match curve {
            OutlineCurve::Line(a, b) => (*a, *b),
            OutlineCurve::Quad(a, _, b) => (*a, *b),
            OutlineCurve::Cubic(a, _, _, b) => (*a, *b),
        };
        if last != Some(start) {
            if last.is_some() {
                builder.close();
            }
            let (x, y) = map(start);
            builder.move_to(x, y);
        }
        match curve {
            OutlineCurve::Line(_, b) => {
                let (x, y) = map(*b);
                builder.line_to(x, y);
            }
            OutlineCurve::Quad(_, c, b) => {
                let (cx, cy) = map(*c);
                let (x, y) = map(*b);
                builder.quad_to(cx, cy, x, y);
            }
            OutlineCurve::Cubic(_, c1, c2, b) => {
                let (c1x, c1y) = map(*c1);
                let (c2x, c2y) = map(*c2);
                let (x, y) = map(*b);
                builder.cubic_to(c1x, c1y, c2x, c2y, x, y);
            }
        }
        last = Some(end);
    }
    if last.is_some() {
        builder.close();
    }
}

/// A rasterized composition.
#[derive(Clone)]
pub struct Frame {
    pixmap: Pixmap,
}

impl Frame {
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Straight-alpha RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
    }

    /// Premultiplied RGBA bytes, row-major.
    pub fn premultiplied_data(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Straight-alpha copy suitable for encoding.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let data = self
            .pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        RgbaImage::from_raw(self.width(), self.height(), data)
            .unwrap_or_else(|| RgbaImage::new(self.width(), self.height()))
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.width() == other.width() && self.premultiplied_data() == other.premultiplied_data()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame({}x{})", self.width(), self.height())
    }
}

/// Deterministic compositor. Holds nothing but the caption font.
#[derive(Clone)]
pub struct Renderer {
    font: CaptionFont,
}

impl Renderer {
    pub fn new(font: CaptionFont) -> Self {
        Self { font }
    }

    pub fn with_bundled_font() -> Result<Self, RenderError> {
        Ok(Self::new(CaptionFont::bundled()?))
    }

    pub fn font(&self) -> &CaptionFont {
        &self.font
    }

    /// Pixel box a caption occupies on `surface`, measured on its display
    /// text so empty captions stay grabbable.
    pub fn caption_bounds(&self, overlay: &Overlay, surface: &Surface, padding: f64) -> PixelRect {
        let (cx, cy) = denormalize_point(&overlay.position, surface.size());
        let (w, h) = self.font.measure(overlay.display_text(), overlay.font_size as f32);
        PixelRect::centered(cx, cy, w as f64 + 2.0 * padding, h as f64 + 2.0 * padding)
    }

    /// Composite the backdrop and all captions into a new frame.
    pub fn render(&self, surface: &Surface, overlays: &[Overlay]) -> Result<Frame, RenderError> {
        let (width, height) = (surface.width(), surface.height());
        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Surface { width, height })?;

        let backdrop = surface.backdrop();
        let transform = Transform::from_scale(
            width as f32 / backdrop.width() as f32,
            height as f32 / backdrop.height() as f32,
        );
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        pixmap.draw_pixmap(0, 0, backdrop.as_ref(), &paint, transform, None);

        for overlay in overlays {
            self.draw_caption(&mut pixmap, overlay, surface);
        }

        Ok(Frame { pixmap })
    }

    fn draw_caption(&self, pixmap: &mut Pixmap, overlay: &Overlay, surface: &Surface) {
        let (x, y) = denormalize_point(&overlay.position, surface.size());
        let font_size = overlay.font_size as f32;
        let Some(path) = self.font.text_path(&overlay.text, font_size, x as f32, y as f32) else {
            return;
        };

        let mut outline = Paint::default();
        outline.set_color_rgba8(0, 0, 0, 255);
        outline.anti_alias = true;
        let stroke = Stroke {
            width: stroke_width(overlay.font_size),
            line_join: LineJoin::Round,
            miter_limit: 2.0,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &outline, &stroke, Transform::identity(), None);

        let mut fill = Paint::default();
        fill.set_color_rgba8(255, 255, 255, 255);
        fill.anti_alias = true;
        pixmap.fill_path(&path, &fill, FillRule::Winding, Transform::identity(), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::media::{decode_surface, tests::png_bytes};
    use crate::models::overlay::{NormalizedPoint, OverlayId};

    fn gray_surface(width: u32, height: u32) -> Surface {
        decode_surface(&png_bytes(width, height, [128, 128, 128, 255])).unwrap()
    }

    fn caption(id: u64, text: &str, font_size: u32) -> Overlay {
        Overlay {
            id: OverlayId(id),
            text: text.to_string(),
            position: NormalizedPoint::CENTER,
            font_size,
            font_pinned: false,
        }
    }

    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const BLACK: [u8; 4] = [0, 0, 0, 255];

    fn count_pixels(frame: &Frame, rgba: [u8; 4]) -> usize {
        (0..frame.height())
            .flat_map(|y| (0..frame.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| frame.pixel(x, y) == Some(rgba))
            .count()
    }

    #[test]
    fn stroke_width_has_a_floor() {
        assert_eq!(stroke_width(20), 2.0);
        assert_eq!(stroke_width(40), 2.0);
        assert_eq!(stroke_width(80), 4.0);
    }

    #[test]
    fn background_fills_the_surface() {
        let renderer = Renderer::with_bundled_font().unwrap();
        let surface = gray_surface(1200, 300);
        let frame = renderer.render(&surface, &[]).unwrap();
        assert_eq!((frame.width(), frame.height()), (600, 150));
        assert_eq!(frame.pixel(0, 0), Some([128, 128, 128, 255]));
        assert_eq!(frame.pixel(599, 149), Some([128, 128, 128, 255]));
    }

    #[test]
    fn caption_has_black_outline_and_white_fill() {
        let renderer = Renderer::with_bundled_font().unwrap();
        let surface = gray_surface(400, 200);
        let frame = renderer
            .render(&surface, &[caption(1, "HHHH", 80)])
            .unwrap();
        assert!(count_pixels(&frame, WHITE) > 0);
        assert!(count_pixels(&frame, BLACK) > 0);
        // Corners stay untouched by a centered caption.
        assert_eq!(frame.pixel(0, 0), Some([128, 128, 128, 255]));
    }

    #[test]
    fn empty_caption_draws_nothing() {
        let renderer = Renderer::with_bundled_font().unwrap();
        let surface = gray_surface(200, 100);
        let bare = renderer.render(&surface, &[]).unwrap();
        let empty = renderer.render(&surface, &[caption(1, "", 60)]).unwrap();
        assert_eq!(bare, empty);
    }

    #[test]
    fn rendering_is_deterministic() {
        let renderer = Renderer::with_bundled_font().unwrap();
        let surface = gray_surface(300, 300);
        let overlays = [caption(1, "Top text", 40), caption(2, "Bottom", 30)];
        let a = renderer.render(&surface, &overlays).unwrap();
        let b = renderer.render(&surface, &overlays).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn later_captions_draw_on_top() {
        let renderer = Renderer::with_bundled_font().unwrap();
        let surface = gray_surface(400, 200);
        // Same size and anchor, so the I stems' outlines cross the M strokes.
        let wide = caption(1, "MMMM", 100);
        let narrow = caption(2, "IIII", 100);

        // A pixel that only the wide caption fills and only the narrow one outlines.
        let wide_alone = renderer.render(&surface, &[wide.clone()]).unwrap();
        let narrow_alone = renderer.render(&surface, &[narrow.clone()]).unwrap();
        let (x, y) = (0..surface.height())
            .flat_map(|y| (0..surface.width()).map(move |x| (x, y)))
            .find(|&(x, y)| {
                wide_alone.pixel(x, y) == Some(WHITE) && narrow_alone.pixel(x, y) == Some(BLACK)
            })
            .expect("captions overlap with different colors");

        let narrow_on_top = renderer
            .render(&surface, &[wide.clone(), narrow.clone()])
            .unwrap();
        let wide_on_top = renderer.render(&surface, &[narrow, wide]).unwrap();

        assert_eq!(narrow_on_top.pixel(x, y), Some(BLACK));
        assert_eq!(wide_on_top.pixel(x, y), Some(WHITE));
    }

    #[test]
    fn caption_bounds_follow_position() {
        let renderer = Renderer::with_bundled_font().unwrap();
        let surface = gray_surface(400, 200);
        let mut overlay = caption(1, "Hi", 40);
        overlay.position = NormalizedPoint::new(25.0, 75.0);

        let bounds = renderer.caption_bounds(&overlay, &surface, 0.0);
        assert!(bounds.contains(100.0, 150.0));
        assert!(bounds.width() > 0.0);
        assert!(bounds.height() > 0.0);
    }

    #[test]
    fn empty_caption_is_measured_as_placeholder() {
        let renderer = Renderer::with_bundled_font().unwrap();
        let surface = gray_surface(400, 200);
        let empty = renderer.caption_bounds(&caption(1, "", 40), &surface, 0.0);
        let placeholder = renderer.caption_bounds(
            &caption(1, crate::models::overlay::PLACEHOLDER_TEXT, 40),
            &surface,
            0.0,
        );
        assert_eq!(empty, placeholder);
    }
}
