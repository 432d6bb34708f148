// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It owns an [`EditorSession`] and translates egui
//! input into engine events; all caption logic lives in the engine.

use crate::ui::{canvas, sidebar, toolbar};
use anyhow::Result;
use memecanvas::config::AppConfig;
use memecanvas::io::export::EXPORT_FILE_NAME;
use memecanvas::io::publish::{self, AuthProvider, GalleryDir, StaticAuth};
use memecanvas::io::serialization;
use memecanvas::io::source::ImageSource;
use memecanvas::models::composition::CompositionDocument;
use memecanvas::{EditorSession, InputEvent, OverlayId};

/// Extensions offered by the upload dialog.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff", "tif"];

/// A user-visible message.
struct Status {
    text: String,
    is_error: bool,
}

/// Main application state.
pub struct MemeApp {
    /// Loaded configuration (templates, gallery)
    config: AppConfig,

    /// The composition engine
    session: EditorSession,

    /// Authentication collaborator for posting
    auth: StaticAuth,

    /// Where posted memes go
    gallery: GalleryDir,

    /// Rendered frame uploaded to the GPU
    texture: Option<egui::TextureHandle>,

    /// Frame serial the texture was built from
    texture_serial: Option<u64>,

    /// Slider value mirrored from the session default
    font_size: u32,

    /// Text field contents and target while editing a caption
    edit_buffer: String,
    edit_target: Option<OverlayId>,

    /// Last message to show the user
    status: Option<Status>,
}

impl MemeApp {
    /// Create a new application instance from configuration.
    pub fn new(config: AppConfig) -> Result<Self> {
        let renderer = config.renderer()?;
        let session = EditorSession::new(renderer, config.default_font_size);
        let font_size = session.store().default_font_size();
        Ok(Self {
            auth: config.auth(),
            gallery: config.gallery(),
            config,
            session,
            texture: None,
            texture_serial: None,
            font_size,
            edit_buffer: String::new(),
            edit_target: None,
            status: None,
        })
    }

    fn info(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            is_error: false,
        });
    }

    /// Show an error. Returns false when the same error is already shown.
    fn error(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        // Render failures repeat every frame; log each message once
        if self.status.as_ref().is_some_and(|s| s.is_error && s.text == text) {
            return false;
        }
        log::error!("{}", text);
        self.status = Some(Status {
            text,
            is_error: true,
        });
        true
    }

    /// Start loading an image in the background.
    fn select_image(&mut self, source: ImageSource) {
        self.session.request_load(source);
        self.status = None;
    }

    fn upload_image(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
        else {
            return;
        };
        match std::fs::read(&path) {
            Ok(bytes) => self.select_image(ImageSource::Bytes(bytes)),
            Err(e) => {
                self.error(format!("Failed to read {}: {}", path.display(), e));
            }
        }
    }

    fn download(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_file_name(EXPORT_FILE_NAME)
            .save_file()
        else {
            return;
        };
        match self.session.save_png(&path) {
            Ok(()) => self.info(format!("Saved {}", path.display())),
            Err(e) => {
                self.error(format!("Export failed: {}", e));
            }
        }
    }

    fn post(&mut self) {
        match publish::publish(&mut self.session, &self.auth, &self.gallery) {
            Ok(_) => self.info("Meme posted successfully!"),
            Err(e) => {
                self.error(format!("Failed to post meme: {}", e));
            }
        }
    }

    fn save_composition(&mut self) {
        let Some(doc) = self.session.document() else {
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Compositions", &["yaml", "yml", "json"])
            .set_file_name("meme.yaml")
            .save_file()
        else {
            return;
        };
        match serialization::save_composition(&doc, &path) {
            Ok(()) => self.info(format!("Saved {}", path.display())),
            Err(e) => {
                self.error(format!("{:#}", e));
            }
        }
    }

    fn open_composition(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Compositions", &["yaml", "yml", "json"])
            .pick_file()
        else {
            return;
        };
        match serialization::open_composition(&path) {
            Ok(doc) => self.open_document(doc),
            Err(e) => {
                self.error(format!("{:#}", e));
            }
        }
    }

    /// Start loading a saved composition. The slider follows its font size
    /// only once the image has loaded.
    fn open_document(&mut self, doc: CompositionDocument) {
        self.session.open_document(doc);
        self.status = None;
    }

    /// Install finished loads and report failures.
    fn poll_loader(&mut self) {
        match self.session.poll_load() {
            Some(Ok(())) => {
                self.font_size = self.session.store().default_font_size();
                self.edit_target = None;
                log::info!("Image loaded successfully");
            }
            Some(Err(e)) => {
                let message = format!("Failed to load image. Please try another image. ({})", e);
                self.error(message);
            }
            None => {}
        }
    }

    /// Re-upload the texture when the engine produced a new frame.
    fn sync_texture(&mut self, ctx: &egui::Context) {
        match self.session.frame() {
            Ok(Some(_)) => {}
            Ok(None) => return,
            Err(e) => {
                self.error(format!("Render failed: {}", e));
                return;
            }
        }
        let serial = self.session.frame_serial();
        if self.texture_serial == serial && self.texture.is_some() {
            return;
        }
        // Cached, so this does not render again
        let Ok(Some(frame)) = self.session.frame() else {
            return;
        };
        let size = [frame.width() as usize, frame.height() as usize];
        let image = egui::ColorImage::from_rgba_premultiplied(size, frame.premultiplied_data());
        match &mut self.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                let texture = ctx.load_texture("composition", image, egui::TextureOptions::LINEAR);
                self.texture = Some(texture);
            }
        }
        self.texture_serial = serial;
    }

    fn apply_canvas_input(&mut self, input: canvas::CanvasInput) {
        match input {
            canvas::CanvasInput::Press { x, y } => {
                self.session.press(x, y);
            }
            canvas::CanvasInput::Move { x, y } => {
                self.session.handle(InputEvent::PointerMove { x, y });
            }
            canvas::CanvasInput::Release => {
                self.session.handle(InputEvent::PointerUp);
            }
            canvas::CanvasInput::DoubleClick { x, y } => {
                self.session.double_activate_at(x, y);
            }
            canvas::CanvasInput::TextChanged(text) => {
                if let Some(id) = self.session.controller().editing() {
                    self.session.handle(InputEvent::TextChanged { id, text });
                }
            }
            canvas::CanvasInput::CommitEdit => {
                self.session.handle(InputEvent::CommitEdit);
            }
            canvas::CanvasInput::FocusLost => {
                self.session.handle(InputEvent::FocusLost);
            }
        }
    }

    fn show_canvas(&mut self, ui: &mut egui::Ui) {
        let (Some(texture), Some(size)) = (self.texture.clone(), self.session.surface_size()) else {
            ui.centered_and_justified(|ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(20.0);
                    ui.heading(
                        egui::RichText::new("Meme Generator")
                            .size(32.0)
                            .color(egui::Color32::from_gray(200)),
                    );
                    ui.label(
                        egui::RichText::new("Select an image to get started")
                            .color(egui::Color32::from_gray(180)),
                    );
                    ui.label(
                        egui::RichText::new("Upload your own or choose a template")
                            .weak()
                            .color(egui::Color32::from_gray(130)),
                    );
                });
            });
            return;
        };

        let editing = self.session.controller().editing();
        let active = editing.or(self.session.controller().dragging());
        let chrome: Vec<canvas::CaptionChrome> = self
            .session
            .overlays()
            .iter()
            .filter_map(|overlay| {
                Some(canvas::CaptionChrome {
                    body: self.session.hit_rect(overlay.id)?,
                    remove: self.session.remove_handle(overlay.id)?,
                    active: active == Some(overlay.id),
                })
            })
            .collect();

        // Seed the text field when an edit starts
        let request_focus = editing.is_some() && editing != self.edit_target;
        if request_focus {
            if let Some(overlay) = editing.and_then(|id| self.session.store().get(id)) {
                self.edit_buffer = overlay.text.clone();
            }
        }
        self.edit_target = editing;

        let editor = editing.and_then(|id| {
            let rect = self.session.hit_rect(id)?;
            let font_size = self.session.store().get(id)?.font_size as f32;
            Some(canvas::CaptionEditor {
                rect,
                buffer: &mut self.edit_buffer,
                font_size,
                request_focus,
            })
        });

        let inputs = canvas::show(ui, &texture, (size.width, size.height), &chrome, editor);
        for input in inputs {
            self.apply_canvas_input(input);
        }
    }
}

impl eframe::App for MemeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loader();

        // Keep polling while a load is in flight
        if self.session.is_loading() {
            ctx.request_repaint();
        }

        // Side panel: image selection and output
        let status = self.status.as_ref().map(|s| (s.text.as_str(), s.is_error));
        let sidebar_state = sidebar::SidebarState {
            templates: &self.config.templates,
            has_image: self.session.surface().is_some(),
            can_post: self.auth.is_authenticated(),
            status,
        };
        let sidebar_action = egui::SidePanel::left("sidebar")
            .default_width(240.0)
            .show(ctx, |ui| sidebar::show(ui, &sidebar_state))
            .inner;

        match sidebar_action {
            sidebar::SidebarAction::UploadImage => self.upload_image(),
            sidebar::SidebarAction::SelectTemplate(index) => {
                if let Some(template) = self.config.templates.get(index) {
                    let source = template.source();
                    self.select_image(source);
                }
            }
            sidebar::SidebarAction::Download => self.download(),
            sidebar::SidebarAction::Post => self.post(),
            sidebar::SidebarAction::SaveComposition => self.save_composition(),
            sidebar::SidebarAction::OpenComposition => self.open_composition(),
            sidebar::SidebarAction::None => {}
        }

        // Caption controls
        if self.session.surface().is_some() {
            let count = self.session.overlays().len();
            let toolbar_action = egui::TopBottomPanel::top("toolbar")
                .show(ctx, |ui| toolbar::show(ui, &mut self.font_size, count))
                .inner;
            match toolbar_action {
                toolbar::ToolbarAction::AddCaption => {
                    self.session.add_caption();
                }
                toolbar::ToolbarAction::FontSize(value) => {
                    self.session.set_default_font_size(value);
                }
                toolbar::ToolbarAction::None => {}
            }
        }

        self.sync_texture(ctx);

        // Main canvas (center)
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.session.is_loading() {
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(20.0);
                        ui.spinner();
                        ui.add_space(10.0);
                        ui.label(
                            egui::RichText::new("Loading image...")
                                .size(16.0)
                                .color(egui::Color32::from_gray(200)),
                        );
                    });
                });
            } else {
                egui::ScrollArea::both().show(ui, |ui| self.show_canvas(ui));
            }
        });

        // Mutations made this frame show up on the next one
        if self.session.is_dirty() {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;
    use std::time::Duration;

    fn app() -> MemeApp {
        MemeApp::new(AppConfig::default()).unwrap()
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([20, 40, 60, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn settle(app: &mut MemeApp) {
        app.poll_loader();
        while app.session.is_loading() {
            std::thread::sleep(Duration::from_millis(10));
            app.poll_loader();
        }
    }

    #[test]
    fn slider_keeps_value_when_document_load_fails() {
        let mut app = app();
        let mut doc = CompositionDocument::new(ImageSource::Bytes(b"broken".to_vec()));
        doc.default_font_size = 80;

        app.open_document(doc);
        settle(&mut app);

        assert_eq!(app.font_size, 40);
        assert_eq!(app.session.store().default_font_size(), 40);
        assert!(app.status.as_ref().is_some_and(|s| s.is_error));
    }

    #[test]
    fn slider_follows_loaded_document() {
        let mut app = app();
        let mut doc = CompositionDocument::new(ImageSource::Bytes(png(60, 40)));
        doc.default_font_size = 80;

        app.open_document(doc);
        settle(&mut app);

        assert_eq!(app.font_size, 80);
        assert_eq!(app.session.store().default_font_size(), 80);
    }

    #[test]
    fn repeated_error_is_reported_once() {
        let mut app = app();
        assert!(app.error("Render failed: boom"));
        assert!(!app.error("Render failed: boom"));
        assert!(app.error("Render failed: other"));

        app.info("Saved meme.png");
        assert!(app.error("Render failed: other"));
    }
}
