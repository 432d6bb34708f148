// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Composition canvas.
//!
//! Shows the rendered frame at its surface size, draws caption outlines
//! and remove handles, and reports pointer and text input in surface pixel
//! coordinates.

use memecanvas::util::geometry::PixelRect;

/// Raw canvas input, in surface pixels.
pub enum CanvasInput {
    Press { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Release,
    DoubleClick { x: f64, y: f64 },
    TextChanged(String),
    CommitEdit,
    FocusLost,
}

/// Interactive chrome for one caption.
pub struct CaptionChrome {
    pub body: PixelRect,
    pub remove: PixelRect,
    pub active: bool,
}

/// Inline text editor for the caption being edited.
pub struct CaptionEditor<'a> {
    pub rect: PixelRect,
    pub buffer: &'a mut String,
    pub font_size: f32,
    pub request_focus: bool,
}

fn to_screen(origin: egui::Pos2, rect: &PixelRect) -> egui::Rect {
    egui::Rect::from_min_max(
        origin + egui::vec2(rect.min_x as f32, rect.min_y as f32),
        origin + egui::vec2(rect.max_x as f32, rect.max_y as f32),
    )
}

/// Display the canvas and collect input.
pub fn show(
    ui: &mut egui::Ui,
    texture: &egui::TextureHandle,
    size: (u32, u32),
    captions: &[CaptionChrome],
    editor: Option<CaptionEditor<'_>>,
) -> Vec<CanvasInput> {
    let mut inputs = Vec::new();

    let (rect, response) = ui.allocate_exact_size(
        egui::vec2(size.0 as f32, size.1 as f32),
        egui::Sense::click_and_drag(),
    );
    let origin = rect.min;
    let local = |pos: egui::Pos2| ((pos.x - origin.x) as f64, (pos.y - origin.y) as f64);

    // Draw the rendered composition
    let painter = ui.painter_at(rect);
    painter.image(
        texture.id(),
        rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );

    // Caption outlines and remove handles
    for caption in captions {
        let color = if caption.active {
            egui::Color32::LIGHT_BLUE
        } else {
            egui::Color32::from_white_alpha(90)
        };
        painter.rect_stroke(
            to_screen(origin, &caption.body),
            2.0,
            egui::Stroke::new(1.0, color),
        );
        let handle = to_screen(origin, &caption.remove);
        let handle_color = egui::Color32::from_rgb(200, 60, 60);
        painter.circle_filled(handle.center(), handle.width() / 2.0, handle_color);
        painter.text(
            handle.center(),
            egui::Align2::CENTER_CENTER,
            "×",
            egui::FontId::proportional(14.0),
            egui::Color32::WHITE,
        );
    }

    let (pressed, released, down, moving, pointer) = ui.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            i.pointer.primary_down(),
            i.pointer.is_moving(),
            i.pointer.latest_pos(),
        )
    });

    let editor_rect = editor.as_ref().map(|e| to_screen(origin, &e.rect));

    if let Some(pos) = pointer {
        let over_editor = editor_rect.is_some_and(|r| r.contains(pos));
        if pressed && rect.contains(pos) && !over_editor {
            let (x, y) = local(pos);
            inputs.push(CanvasInput::Press { x, y });
        }
        // Moves outside the canvas still count; the engine clamps them.
        if down && moving {
            let (x, y) = local(pos);
            inputs.push(CanvasInput::Move { x, y });
        }
    }
    if released {
        inputs.push(CanvasInput::Release);
    }
    if response.double_clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let (x, y) = local(pos);
            inputs.push(CanvasInput::DoubleClick { x, y });
        }
    }

    if let (Some(editor), Some(screen_rect)) = (editor, editor_rect) {
        let edit = ui.put(
            screen_rect,
            egui::TextEdit::singleline(&mut *editor.buffer)
                .hint_text(memecanvas::models::overlay::PLACEHOLDER_TEXT)
                .font(egui::FontId::proportional(editor.font_size)),
        );
        if editor.request_focus {
            edit.request_focus();
        }
        if edit.changed() {
            inputs.push(CanvasInput::TextChanged(editor.buffer.clone()));
        }
        if edit.lost_focus() {
            if ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                inputs.push(CanvasInput::CommitEdit);
            } else {
                inputs.push(CanvasInput::FocusLost);
            }
        }
    }

    inputs
}
