// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image selection and output panel.
//!
//! Lets the user upload an image or pick a template, and holds the
//! download, post and composition file actions.

use memecanvas::config::Template;

/// Result of sidebar interaction.
pub enum SidebarAction {
    None,
    UploadImage,
    SelectTemplate(usize),
    Download,
    Post,
    SaveComposition,
    OpenComposition,
}

/// What the sidebar needs to know about the application state.
pub struct SidebarState<'a> {
    pub templates: &'a [Template],
    pub has_image: bool,
    pub can_post: bool,
    pub status: Option<(&'a str, bool)>,
}

/// Display the sidebar.
pub fn show(ui: &mut egui::Ui, state: &SidebarState<'_>) -> SidebarAction {
    let mut action = SidebarAction::None;

    ui.heading("Select Image");
    ui.add_space(4.0);
    if ui.button("Upload Image...").clicked() {
        action = SidebarAction::UploadImage;
    }
    if ui.button("Open Composition...").clicked() {
        action = SidebarAction::OpenComposition;
    }

    ui.add_space(8.0);
    ui.label(egui::RichText::new("Or Choose a Template").strong());
    egui::ScrollArea::vertical()
        .max_height(220.0)
        .show(ui, |ui| {
            for (index, template) in state.templates.iter().enumerate() {
                if ui
                    .selectable_label(false, &template.name)
                    .on_hover_text(&template.url)
                    .clicked()
                {
                    action = SidebarAction::SelectTemplate(index);
                }
            }
        });

    ui.separator();

    ui.add_enabled_ui(state.has_image, |ui| {
        if ui.button("Download Meme").clicked() {
            action = SidebarAction::Download;
        }
        ui.label(
            egui::RichText::new("Your meme will be saved as a PNG image")
                .small()
                .weak(),
        );

        let post = ui
            .add_enabled(state.can_post, egui::Button::new("Post to Gallery"))
            .on_disabled_hover_text("Log in (gallery.user) to post memes");
        if post.clicked() {
            action = SidebarAction::Post;
        }

        if ui.button("Save Composition...").clicked() {
            action = SidebarAction::SaveComposition;
        }
    });

    if let Some((message, is_error)) = state.status {
        ui.separator();
        let color = if is_error {
            egui::Color32::from_rgb(230, 90, 90)
        } else {
            egui::Color32::from_rgb(120, 200, 120)
        };
        ui.label(egui::RichText::new(message).color(color));
    }

    action
}
