// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Interactive bounding box editor.
//!
//! The editor owns the annotation store and the pointer gesture state for
//! one loaded image, and exposes the operations the host UI drives:
//! loading an image with its existing labels, pointer events, class
//! selection, and the delete/clear/undo-style operations. Collaborators
//! (the class registry, image dimensions) are passed in explicitly rather
//! than resolved through globals.

pub mod hit;
pub mod state;

use crate::models::annotation::{BoundingBox, BoxId, Rect, YoloRecord};
use crate::models::store::{AnnotationStore, ChangeListener};

pub use state::{EditorNotice, Gesture};

/// Class lookup owned by the host (project classes, `classes.txt`, ...).
pub trait ClassRegistry {
    fn class_name(&self, class_id: u32) -> Option<&str>;
    fn class_count(&self) -> usize;
}

/// Resolve a class id to a display name, synthesizing `class_<id>` when the
/// id is not in the registry. Label loading never fails on unknown ids.
pub fn resolve_class_name(registry: &dyn ClassRegistry, class_id: u32) -> String {
    match registry.class_name(class_id) {
        Some(name) => name.to_owned(),
        None => format!("class_{class_id}"),
    }
}

pub struct Editor {
    store: AnnotationStore,
    state: state::InteractionState,
    current_class: Option<(u32, String)>,
    image_size: Option<(u32, u32)>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self {
            store: AnnotationStore::new(),
            state: state::InteractionState::new(),
            current_class: None,
            image_size: None,
        }
    }

    /// Register the host change callback (persistence + redraw).
    pub fn set_change_listener(&mut self, listener: ChangeListener) {
        self.store.set_listener(listener);
    }

    /// Replace the session with a newly loaded image and its existing
    /// annotations. Records with a non-positive size are dropped with a
    /// warning; rectangles are clamped into the image.
    pub fn load_image(
        &mut self,
        width: u32,
        height: u32,
        records: &[YoloRecord],
        registry: &dyn ClassRegistry,
    ) {
        self.state.reset();
        self.image_size = Some((width, height));

        let mut boxes = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let name = resolve_class_name(registry, record.class_id);
            let bb = BoundingBox::from_yolo(index as BoxId, record, width, height, name);
            if bb.rect.width <= 0.0 || bb.rect.height <= 0.0 {
                log::warn!(
                    "dropping degenerate annotation {} (class {})",
                    index,
                    record.class_id
                );
                continue;
            }
            boxes.push(bb);
        }
        log::info!("loaded {} annotations for {}x{} image", boxes.len(), width, height);
        self.store.replace_all(boxes);
    }

    /// Clear the session when the host unloads the image.
    pub fn unload_image(&mut self) {
        self.state.reset();
        self.image_size = None;
        self.store.replace_all(Vec::new());
    }

    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.image_size
    }

    pub fn has_image(&self) -> bool {
        self.image_size.is_some()
    }

    /// Snapshot of the current boxes, in z-order.
    pub fn bounding_boxes(&self) -> Vec<BoundingBox> {
        self.store.boxes().to_vec()
    }

    pub fn boxes(&self) -> &[BoundingBox] {
        self.store.boxes()
    }

    pub fn selected_box(&self) -> Option<&BoundingBox> {
        self.store.selected()
    }

    /// Normalized records for persistence, in z-order.
    pub fn yolo_records(&self) -> Vec<YoloRecord> {
        match self.image_size {
            Some((w, h)) => self.store.boxes().iter().map(|b| b.to_yolo(w, h)).collect(),
            None => Vec::new(),
        }
    }

    /// Class applied to newly drawn boxes. Required before creation.
    pub fn set_current_class(&mut self, class_id: u32, class_name: String) {
        self.current_class = Some((class_id, class_name));
    }

    pub fn current_class(&self) -> Option<(u32, &str)> {
        self.current_class
            .as_ref()
            .map(|(id, name)| (*id, name.as_str()))
    }

    pub fn select(&mut self, id: BoxId) {
        self.store.select(id);
    }

    pub fn deselect_all(&mut self) {
        self.store.deselect_all();
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.store.selected().map(|b| b.id) {
            Some(id) => self.store.remove(id),
            None => false,
        }
    }

    pub fn delete_box(&mut self, id: BoxId) -> bool {
        self.store.remove(id)
    }

    pub fn clear_all(&mut self) {
        self.state.reset();
        self.store.clear();
    }

    /// Pop the most recently appended box.
    pub fn remove_last(&mut self) {
        self.store.remove_last();
    }

    /// Re-tag an existing box with a different class. The rectangle and
    /// selection state are untouched.
    pub fn reassign_class(&mut self, id: BoxId, class_id: u32, class_name: String) {
        if let Some(existing) = self.store.get(id).cloned() {
            let mut updated = existing;
            updated.class_id = class_id;
            updated.class_name = class_name;
            self.store.replace(id, updated);
        }
    }

    /// Wholesale replacement of the box list (undo/redo restore).
    pub fn restore(&mut self, boxes: Vec<BoundingBox>) {
        self.state.reset();
        self.store.replace_all(boxes);
    }

    // Pointer events, in image pixel coordinates. The canvas only routes a
    // press that landed on the rendered image; move/release continue an
    // active gesture with clamped coordinates.

    pub fn pointer_down(&mut self, p: egui::Pos2, scale: f32) {
        if self.has_image() {
            self.state.pointer_down(p, scale, &mut self.store);
        }
    }

    pub fn pointer_move(&mut self, p: egui::Pos2) {
        if let Some((w, h)) = self.image_size {
            self.state.pointer_move(p, &mut self.store, w as f32, h as f32);
        }
    }

    pub fn pointer_up(&mut self, p: egui::Pos2, registry: &dyn ClassRegistry) -> Option<EditorNotice> {
        let (w, h) = self.image_size?;
        let current = self
            .current_class
            .as_ref()
            .map(|(id, name)| (*id, name.as_str()));
        self.state.pointer_up(
            p,
            &mut self.store,
            w as f32,
            h as f32,
            current,
            registry.class_count(),
        )
    }

    pub fn gesture(&self) -> Gesture {
        self.state.gesture()
    }

    pub fn gesture_active(&self) -> bool {
        self.state.is_active()
    }

    /// Rubber-band rectangle while a draw is in progress.
    pub fn drawing_preview(&self) -> Option<Rect> {
        self.state.drawing_preview()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClasses(Vec<&'static str>);

    impl ClassRegistry for FixedClasses {
        fn class_name(&self, class_id: u32) -> Option<&str> {
            self.0.get(class_id as usize).copied()
        }

        fn class_count(&self) -> usize {
            self.0.len()
        }
    }

    #[test]
    fn test_load_image_resolves_names_with_fallback() {
        let registry = FixedClasses(vec!["person", "car"]);
        let mut editor = Editor::new();
        let records = [
            YoloRecord {
                class_id: 1,
                x_center: 0.5,
                y_center: 0.5,
                width: 0.25,
                height: 0.25,
            },
            YoloRecord {
                class_id: 9,
                x_center: 0.25,
                y_center: 0.25,
                width: 0.1,
                height: 0.1,
            },
        ];
        editor.load_image(640, 480, &records, &registry);
        let boxes = editor.bounding_boxes();
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].class_name, "car");
        assert_eq!(boxes[1].class_name, "class_9");
    }

    #[test]
    fn test_load_image_drops_degenerate_records() {
        let registry = FixedClasses(vec!["person"]);
        let mut editor = Editor::new();
        let records = [YoloRecord {
            class_id: 0,
            x_center: 0.5,
            y_center: 0.5,
            width: 0.0,
            height: 0.1,
        }];
        editor.load_image(640, 480, &records, &registry);
        assert!(editor.bounding_boxes().is_empty());
    }

    #[test]
    fn test_load_image_replaces_previous_session() {
        let registry = FixedClasses(vec!["person"]);
        let mut editor = Editor::new();
        editor.set_current_class(0, "person".into());
        editor.load_image(640, 480, &[], &registry);
        editor.pointer_down(egui::pos2(10.0, 10.0), 1.0);
        editor.pointer_move(egui::pos2(100.0, 100.0));
        editor.pointer_up(egui::pos2(100.0, 100.0), &registry);
        assert_eq!(editor.bounding_boxes().len(), 1);

        editor.load_image(320, 240, &[], &registry);
        assert!(editor.bounding_boxes().is_empty());
        assert_eq!(editor.image_size(), Some((320, 240)));
    }

    #[test]
    fn test_full_draw_cycle_and_persist_records() {
        let registry = FixedClasses(vec!["person", "bike", "car"]);
        let mut editor = Editor::new();
        editor.load_image(640, 480, &[], &registry);
        editor.set_current_class(2, "car".into());

        editor.pointer_down(egui::pos2(100.0, 100.0), 1.0);
        editor.pointer_move(egui::pos2(300.0, 250.0));
        let notice = editor.pointer_up(egui::pos2(300.0, 250.0), &registry);
        assert_eq!(notice, None);

        let records = editor.yolo_records();
        assert_eq!(records.len(), 1);
        let r = records[0];
        assert_eq!(r.class_id, 2);
        assert!((r.x_center - 0.3125).abs() < 1e-6);
        assert!((r.y_center - 0.364_583).abs() < 1e-5);
        assert!((r.width - 0.3125).abs() < 1e-6);
        assert!((r.height - 0.3125).abs() < 1e-6);
    }

    #[test]
    fn test_delete_and_remove_last() {
        let registry = FixedClasses(vec!["person"]);
        let mut editor = Editor::new();
        editor.load_image(640, 480, &[], &registry);
        editor.set_current_class(0, "person".into());
        for i in 0..3 {
            let y = 100.0 + i as f32 * 50.0;
            editor.pointer_down(egui::pos2(10.0, y), 1.0);
            editor.pointer_move(egui::pos2(40.0, y + 30.0));
            editor.pointer_up(egui::pos2(40.0, y + 30.0), &registry);
        }
        assert_eq!(editor.boxes().len(), 3);

        // Newest box is selected after creation.
        assert!(editor.delete_selected());
        assert_eq!(editor.boxes().len(), 2);
        assert!(!editor.delete_selected());

        editor.remove_last();
        assert_eq!(editor.boxes().len(), 1);
        editor.clear_all();
        assert!(editor.boxes().is_empty());
    }

    #[test]
    fn test_reassign_class_keeps_rect_and_selection() {
        let registry = FixedClasses(vec!["person", "car"]);
        let mut editor = Editor::new();
        editor.load_image(640, 480, &[], &registry);
        editor.set_current_class(0, "person".into());
        editor.pointer_down(egui::pos2(10.0, 10.0), 1.0);
        editor.pointer_move(egui::pos2(60.0, 60.0));
        editor.pointer_up(egui::pos2(60.0, 60.0), &registry);

        let id = editor.selected_box().unwrap().id;
        let rect = editor.selected_box().unwrap().rect;
        editor.reassign_class(id, 1, "car".into());
        let b = editor.selected_box().unwrap();
        assert_eq!(b.class_id, 1);
        assert_eq!(b.class_name, "car");
        assert_eq!(b.rect, rect);
        assert!(b.selected);
    }

    #[test]
    fn test_unload_clears_session() {
        let registry = FixedClasses(vec!["person"]);
        let mut editor = Editor::new();
        editor.load_image(640, 480, &[], &registry);
        editor.set_current_class(0, "person".into());
        editor.pointer_down(egui::pos2(10.0, 10.0), 1.0);
        editor.pointer_move(egui::pos2(100.0, 100.0));
        editor.pointer_up(egui::pos2(100.0, 100.0), &registry);
        assert_eq!(editor.bounding_boxes().len(), 1);

        editor.unload_image();
        assert!(!editor.has_image());
        assert!(editor.bounding_boxes().is_empty());
        assert!(!editor.gesture_active());
    }

    #[test]
    fn test_pointer_events_without_image_are_ignored() {
        let registry = FixedClasses(vec!["person"]);
        let mut editor = Editor::new();
        editor.pointer_down(egui::pos2(10.0, 10.0), 1.0);
        editor.pointer_move(egui::pos2(50.0, 50.0));
        assert_eq!(editor.pointer_up(egui::pos2(50.0, 50.0), &registry), None);
        assert!(editor.bounding_boxes().is_empty());
        assert!(!editor.gesture_active());
    }
}
