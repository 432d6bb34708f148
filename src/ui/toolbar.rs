// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Caption controls.
//!
//! Font size slider, the "add caption" button and a short usage hint.

use memecanvas::models::store::FONT_SIZE_RANGE;

/// Result of toolbar interaction.
pub enum ToolbarAction {
    None,
    AddCaption,
    FontSize(u32),
}

/// Display the caption controls.
pub fn show(ui: &mut egui::Ui, font_size: &mut u32, caption_count: usize) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.button("+ Add Text Box").clicked() {
            action = ToolbarAction::AddCaption;
        }

        ui.separator();

        let slider = egui::Slider::new(font_size, FONT_SIZE_RANGE)
            .text("Font Size")
            .suffix("px");
        if ui.add(slider).changed() {
            action = ToolbarAction::FontSize(*font_size);
        }

        ui.separator();

        ui.label(format!(
            "{} text box{} active",
            caption_count,
            if caption_count == 1 { "" } else { "es" }
        ));

        ui.separator();

        ui.label(
            egui::RichText::new("Drag to move, double-click to edit, × to remove")
                .italics()
                .weak(),
        );
    });

    action
}
