// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation properties panel.
//!
//! This module provides the side panel listing the boxes on the current
//! image with selection and per-box delete, plus a detail readout for the
//! selected box.

use crate::models::annotation::{BoundingBox, BoxId};

/// Result of properties panel interaction.
pub enum PropertiesAction {
    None,
    SelectBox(BoxId),
    DeleteBox(BoxId),
}

/// Display the properties panel.
pub fn show(ui: &mut egui::Ui, boxes: &[BoundingBox]) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Annotations");
    ui.separator();

    if boxes.is_empty() {
        ui.label(egui::RichText::new("No boxes yet").weak());
        return action;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        for bb in boxes {
            ui.horizontal(|ui| {
                let label = format!("{} #{}", bb.class_name, bb.id);
                if ui.selectable_label(bb.selected, label).clicked() {
                    action = PropertiesAction::SelectBox(bb.id);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("✕").clicked() {
                        action = PropertiesAction::DeleteBox(bb.id);
                    }
                });
            });
        }
    });

    if let Some(selected) = boxes.iter().find(|b| b.selected) {
        ui.separator();
        ui.label(format!(
            "x: {:.0}  y: {:.0}",
            selected.rect.x, selected.rect.y
        ));
        ui.label(format!(
            "w: {:.0}  h: {:.0}",
            selected.rect.width, selected.rect.height
        ));
        ui.label(format!("class: {} ({})", selected.class_name, selected.class_id));
    }

    action
}
