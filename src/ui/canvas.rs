// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for image display and box annotation.
//!
//! This module renders the fitted image with its bounding boxes and routes
//! pointer input into the editor: press/drag/release become editor events
//! in image space, right-click opens the box context menu, and hover picks
//! the cursor from the handle under the pointer.

use crate::editor::hit::{self, Axis, Handle};
use crate::editor::{ClassRegistry, Editor, EditorNotice};
use crate::models::annotation::BoxId;
use crate::util::geometry::ViewTransform;

/// Result of one canvas frame.
#[derive(Default)]
pub struct CanvasOutcome {
    /// Condition to surface in the status bar, if any.
    pub notice: Option<EditorNotice>,
}

/// Display the canvas and handle mouse interactions.
pub fn show(
    ui: &mut egui::Ui,
    editor: &mut Editor,
    registry: &dyn ClassRegistry,
    image_texture: &Option<egui::TextureHandle>,
    context_target: &mut Option<BoxId>,
) -> CanvasOutcome {
    let mut outcome = CanvasOutcome::default();
    // Set background color
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        let (Some(texture), Some((img_width, img_height))) = (image_texture, editor.image_size())
        else {
            // Show welcome message when no image is loaded
            ui.centered_and_justified(|ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(20.0);
                    ui.heading(
                        egui::RichText::new("BOXMARK")
                            .size(32.0)
                            .color(egui::Color32::from_gray(200)),
                    );
                    ui.label(
                        egui::RichText::new("Bounding Box Annotation Tool")
                            .size(14.0)
                            .color(egui::Color32::from_gray(150)),
                    );
                    ui.add_space(20.0);
                    ui.label(
                        egui::RichText::new("Open an image to begin annotating")
                            .color(egui::Color32::from_gray(180)),
                    );
                    ui.add_space(10.0);
                    ui.label(
                        egui::RichText::new("File → Open Image...")
                            .weak()
                            .color(egui::Color32::from_gray(130)),
                    );
                });
            });
            return;
        };

        let canvas_rect = ui.available_rect_before_wrap();
        // Recomputed every frame so window resizes never leave the mapping stale.
        let transform = ViewTransform::fit(canvas_rect, img_width, img_height);
        let image_rect = transform.screen_rect();

        let response = ui.allocate_rect(canvas_rect, egui::Sense::click_and_drag());

        // Draw the image
        ui.painter().image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        outcome.notice = route_pointer_events(&response, editor, registry, &transform);
        handle_context_menu(&response, editor, registry, &transform, context_target);

        if let Some(hover) = response.hover_pos() {
            if let Some(icon) = cursor_for(editor, &transform, hover) {
                ui.ctx().set_cursor_icon(icon);
            }
        }

        // Draw annotations on top of the image
        let painter = ui.painter();
        for bb in editor.boxes() {
            draw_box(painter, &transform, bb);
        }

        // Rubber-band preview while drawing
        if let Some(preview) = editor.drawing_preview() {
            painter.rect_stroke(
                transform.rect_to_screen(&preview),
                0.0,
                egui::Stroke::new(2.0, egui::Color32::LIGHT_BLUE),
            );
        }
    });

    // Status line at the bottom of the canvas area
    ui.separator();
    ui.horizontal(|ui| {
        match editor.current_class() {
            Some((id, name)) => ui.label(format!("Current class: {name} ({id})")),
            None => ui.label("No class selected"),
        };
        ui.separator();
        if editor.has_image() {
            ui.label(format!("{} boxes", editor.boxes().len()));
        } else {
            ui.label("No image loaded");
        }
    });

    outcome
}

/// Translate egui pointer state into editor events. Presses only count
/// when they land on the rendered image; an active gesture is continued
/// with bounds-clamped coordinates even when the pointer strays outside.
fn route_pointer_events(
    response: &egui::Response,
    editor: &mut Editor,
    registry: &dyn ClassRegistry,
    transform: &ViewTransform,
) -> Option<EditorNotice> {
    let pos = response.interact_pointer_pos();

    if response.drag_started_by(egui::PointerButton::Primary) {
        if let Some(p) = pos.and_then(|pos| transform.screen_to_image(pos)) {
            editor.pointer_down(p, transform.scale);
        }
    } else if response.dragged_by(egui::PointerButton::Primary) {
        if let Some(pos) = pos {
            editor.pointer_move(transform.screen_to_image_clamped(pos));
        }
    }

    if response.drag_stopped_by(egui::PointerButton::Primary) {
        if let Some(pos) = pos {
            return editor.pointer_up(transform.screen_to_image_clamped(pos), registry);
        }
    }

    // A plain click is a press and release in place: it selects the box
    // under the pointer or deselects on empty space.
    if response.clicked() {
        if let Some(p) = pos.and_then(|pos| transform.screen_to_image(pos)) {
            editor.pointer_down(p, transform.scale);
            return editor.pointer_up(p, registry);
        }
    }

    None
}

/// Right-click over a box opens delete/reassign actions. The interaction
/// state is left alone.
fn handle_context_menu(
    response: &egui::Response,
    editor: &mut Editor,
    registry: &dyn ClassRegistry,
    transform: &ViewTransform,
    context_target: &mut Option<BoxId>,
) {
    if response.secondary_clicked() {
        *context_target = response
            .interact_pointer_pos()
            .and_then(|pos| transform.screen_to_image(pos))
            .and_then(|p| hit::find_box_at(editor.boxes(), p));
    }

    let Some(target) = *context_target else {
        return;
    };
    response.context_menu(|ui| {
        if ui.button("Delete box").clicked() {
            editor.delete_box(target);
            *context_target = None;
            ui.close_menu();
        }
        ui.menu_button("Reassign class", |ui| {
            for class_id in 0..registry.class_count() as u32 {
                let Some(name) = registry.class_name(class_id) else {
                    continue;
                };
                let name = name.to_owned();
                if ui.button(&name).clicked() {
                    editor.reassign_class(target, class_id, name);
                    ui.close_menu();
                }
            }
        });
    });
}

/// Cursor for the current pointer position, or `None` to leave the default.
fn cursor_for(editor: &Editor, transform: &ViewTransform, hover: egui::Pos2) -> Option<egui::CursorIcon> {
    use crate::editor::Gesture;

    match editor.gesture() {
        Gesture::Resizing { handle, .. } => return Some(handle_cursor(handle)),
        Gesture::Dragging { .. } => return Some(egui::CursorIcon::Grabbing),
        Gesture::Drawing { .. } => return Some(egui::CursorIcon::Crosshair),
        Gesture::Idle => {}
    }

    let p = transform.screen_to_image(hover)?;
    if let Some(selected) = editor.selected_box() {
        if let Some(handle) = hit::find_handle_at(&selected.rect, p, transform.scale) {
            return Some(handle_cursor(handle));
        }
    }
    if hit::find_box_at(editor.boxes(), p).is_some() {
        Some(egui::CursorIcon::Move)
    } else {
        Some(egui::CursorIcon::Crosshair)
    }
}

/// Cursor glyph per handle, derived from the axis table.
fn handle_cursor(handle: Handle) -> egui::CursorIcon {
    match handle.axis() {
        Axis::Horizontal => egui::CursorIcon::ResizeHorizontal,
        Axis::Vertical => egui::CursorIcon::ResizeVertical,
        Axis::Diagonal => match handle {
            Handle::NorthWest | Handle::SouthEast => egui::CursorIcon::ResizeNwSe,
            _ => egui::CursorIcon::ResizeNeSw,
        },
    }
}

/// Draw one bounding box, with handles when selected.
fn draw_box(painter: &egui::Painter, transform: &ViewTransform, bb: &crate::models::annotation::BoundingBox) {
    let rect = transform.rect_to_screen(&bb.rect);
    let color = bb.color();
    let stroke_width = if bb.selected { 3.0 } else { 2.0 };

    if bb.selected {
        painter.rect_filled(rect, 0.0, color.gamma_multiply(0.15));
    }
    painter.rect_stroke(rect, 0.0, egui::Stroke::new(stroke_width, color));

    painter.text(
        rect.left_top() + egui::vec2(2.0, -2.0),
        egui::Align2::LEFT_BOTTOM,
        &bb.class_name,
        egui::FontId::proportional(12.0),
        color,
    );

    if bb.selected {
        for handle in Handle::ALL {
            let center = transform.image_to_screen(handle.anchor(&bb.rect));
            let handle_rect =
                egui::Rect::from_center_size(center, egui::vec2(hit::HANDLE_SCREEN_SIZE, hit::HANDLE_SCREEN_SIZE));
            painter.rect_filled(handle_rect, 1.0, egui::Color32::WHITE);
            painter.rect_stroke(handle_rect, 1.0, egui::Stroke::new(1.0, egui::Color32::BLACK));
        }
    }
}
