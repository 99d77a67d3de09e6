// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with class selection and box operations.
//!
//! This module provides the class picker driving new-box creation, the
//! add-class field, and the clear/remove-last shortcuts.

/// Result of toolbar interaction, applied by the app.
pub enum ToolbarAction {
    None,
    SelectClass(u32),
    AddClass(String),
    RemoveLast,
    ClearAll,
}

/// Display the toolbar.
pub fn show(
    ui: &mut egui::Ui,
    classes: &[String],
    current_class: Option<u32>,
    draft_class: &mut String,
) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("Class:");

        let current_label = current_class
            .and_then(|id| classes.get(id as usize))
            .map(String::as_str)
            .unwrap_or("(none)");
        egui::ComboBox::from_id_source("class_picker")
            .selected_text(current_label)
            .show_ui(ui, |ui| {
                for (id, name) in classes.iter().enumerate() {
                    let id = id as u32;
                    if ui
                        .selectable_label(current_class == Some(id), name)
                        .clicked()
                    {
                        action = ToolbarAction::SelectClass(id);
                    }
                }
            });

        ui.separator();

        let edit = ui.add(
            egui::TextEdit::singleline(draft_class)
                .hint_text("new class")
                .desired_width(120.0),
        );
        let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if (ui.button("Add Class").clicked() || submitted) && !draft_class.trim().is_empty() {
            action = ToolbarAction::AddClass(draft_class.trim().to_string());
            draft_class.clear();
        }

        ui.separator();

        if ui.button("Remove Last").clicked() {
            action = ToolbarAction::RemoveLast;
        }
        if ui.button("Clear All").clicked() {
            action = ToolbarAction::ClearAll;
        }

        ui.separator();

        ui.label(
            egui::RichText::new("Drag on the image to draw a box, drag handles to resize")
                .italics()
                .weak(),
        );
    });

    action
}
