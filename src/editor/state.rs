// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pointer gesture state machine.
//!
//! Owns the Idle/Drawing/Dragging/Resizing states and turns a stream of
//! pointer events (already converted to image space) into store mutations.
//! Geometry is total: out-of-bounds and undersized results are resolved by
//! clamping and edge pinning, never by failing. The only user-facing
//! failure conditions are the class-gating checks at creation time.

use super::hit::{self, Handle};
use crate::models::annotation::{BoxId, Rect, CREATE_THRESHOLD, MIN_BOX_SIZE};
use crate::models::store::AnnotationStore;

/// User-facing condition raised when a completed draw cannot become a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorNotice {
    NoClassSelected,
    NoClassesInProject,
}

impl EditorNotice {
    pub fn message(self) -> &'static str {
        match self {
            EditorNotice::NoClassSelected => "Select a class before drawing a box",
            EditorNotice::NoClassesInProject => "Add a class to the project before drawing boxes",
        }
    }
}

/// Current pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Idle,
    /// Rubber-band rectangle in progress; nothing exists in the store yet.
    Drawing { start: egui::Pos2, current: egui::Pos2 },
    /// Translating an existing box.
    Dragging { id: BoxId, last: egui::Pos2 },
    /// Resizing an existing box from one handle. The rectangle is rebuilt
    /// from the gesture-start snapshot on every event rather than mutated
    /// incrementally.
    Resizing {
        id: BoxId,
        handle: Handle,
        start_rect: Rect,
        start: egui::Pos2,
    },
}

pub struct InteractionState {
    gesture: Gesture,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionState {
    pub fn new() -> Self {
        Self {
            gesture: Gesture::Idle,
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn is_active(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    /// Live preview rectangle while drawing.
    pub fn drawing_preview(&self) -> Option<Rect> {
        match self.gesture {
            Gesture::Drawing { start, current } => Some(Rect::from_corners(start, current)),
            _ => None,
        }
    }

    /// Abandon any in-flight gesture, leaving the store as-is.
    pub fn reset(&mut self) {
        self.gesture = Gesture::Idle;
    }

    /// Pointer press inside the image. Resolution order: resize handle of
    /// the selected box, then topmost box (select + drag), then empty space
    /// (deselect + draw).
    pub fn pointer_down(&mut self, p: egui::Pos2, scale: f32, store: &mut AnnotationStore) {
        if self.gesture != Gesture::Idle {
            return;
        }

        if let Some(selected) = store.selected() {
            if let Some(handle) = hit::find_handle_at(&selected.rect, p, scale) {
                self.gesture = Gesture::Resizing {
                    id: selected.id,
                    handle,
                    start_rect: selected.rect,
                    start: p,
                };
                return;
            }
        }

        if let Some(id) = hit::find_box_at(store.boxes(), p) {
            store.select(id);
            self.gesture = Gesture::Dragging { id, last: p };
        } else {
            store.deselect_all();
            self.gesture = Gesture::Drawing { start: p, current: p };
        }
    }

    /// Pointer movement. `p` may come from outside the image when a gesture
    /// is being continued; it is clamped to the image bounds here.
    pub fn pointer_move(
        &mut self,
        p: egui::Pos2,
        store: &mut AnnotationStore,
        image_width: f32,
        image_height: f32,
    ) {
        let p = clamp_point(p, image_width, image_height);
        match self.gesture {
            Gesture::Idle => {}
            Gesture::Drawing { start, .. } => {
                self.gesture = Gesture::Drawing { start, current: p };
            }
            Gesture::Dragging { id, last } => {
                if let Some(current) = store.get(id).cloned() {
                    let mut moved = current;
                    moved.rect =
                        moved
                            .rect
                            .translated_clamped(p.x - last.x, p.y - last.y, image_width, image_height);
                    store.replace(id, moved);
                }
                self.gesture = Gesture::Dragging { id, last: p };
            }
            Gesture::Resizing {
                id,
                handle,
                start_rect,
                start,
            } => {
                if let Some(current) = store.get(id).cloned() {
                    let mut resized = current;
                    resized.rect = resize_rect(
                        start_rect,
                        handle,
                        egui::vec2(p.x - start.x, p.y - start.y),
                        image_width,
                        image_height,
                    );
                    store.replace(id, resized);
                }
            }
        }
    }

    /// Pointer release. Completes a draw (creating a box when the span and
    /// class gating allow it) or ends a drag/resize.
    pub fn pointer_up(
        &mut self,
        p: egui::Pos2,
        store: &mut AnnotationStore,
        image_width: f32,
        image_height: f32,
        current_class: Option<(u32, &str)>,
        class_count: usize,
    ) -> Option<EditorNotice> {
        let p = clamp_point(p, image_width, image_height);
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        match gesture {
            Gesture::Drawing { start, .. } => {
                let span = Rect::from_corners(start, p);
                if span.width < CREATE_THRESHOLD || span.height < CREATE_THRESHOLD {
                    // Sub-threshold drags (including plain clicks) are
                    // discarded without comment.
                    return None;
                }
                if class_count == 0 {
                    log::warn!("box creation rejected: project has no classes");
                    return Some(EditorNotice::NoClassesInProject);
                }
                let Some((class_id, class_name)) = current_class else {
                    log::warn!("box creation rejected: no class selected");
                    return Some(EditorNotice::NoClassSelected);
                };
                let rect = span.clamped_to(image_width, image_height);
                let id = store.add(class_id, class_name.to_owned(), rect);
                store.select(id);
                None
            }
            Gesture::Idle | Gesture::Dragging { .. } | Gesture::Resizing { .. } => None,
        }
    }
}

fn clamp_point(p: egui::Pos2, image_width: f32, image_height: f32) -> egui::Pos2 {
    egui::pos2(p.x.clamp(0.0, image_width), p.y.clamp(0.0, image_height))
}

/// Apply a resize delta to the edges owned by `handle`, starting from the
/// gesture-start rectangle. A dimension that would drop below
/// [`MIN_BOX_SIZE`] pins the moving edge so the dimension is exactly the
/// minimum; the opposite edge never moves. The result is clamped to the
/// image bounds.
pub fn resize_rect(
    start: Rect,
    handle: Handle,
    delta: egui::Vec2,
    image_width: f32,
    image_height: f32,
) -> Rect {
    let mut left = start.x;
    let mut top = start.y;
    let mut right = start.right();
    let mut bottom = start.bottom();

    if handle.moves_left_edge() {
        left += delta.x;
    }
    if handle.moves_right_edge() {
        right += delta.x;
    }
    if handle.moves_top_edge() {
        top += delta.y;
    }
    if handle.moves_bottom_edge() {
        bottom += delta.y;
    }

    if right - left < MIN_BOX_SIZE {
        if handle.moves_left_edge() {
            left = right - MIN_BOX_SIZE;
        } else if handle.moves_right_edge() {
            right = left + MIN_BOX_SIZE;
        }
    }
    if bottom - top < MIN_BOX_SIZE {
        if handle.moves_top_edge() {
            top = bottom - MIN_BOX_SIZE;
        } else if handle.moves_bottom_edge() {
            bottom = top + MIN_BOX_SIZE;
        }
    }

    Rect::new(left, top, right - left, bottom - top).clamped_to(image_width, image_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMG_W: f32 = 640.0;
    const IMG_H: f32 = 480.0;

    fn draw_box(
        state: &mut InteractionState,
        store: &mut AnnotationStore,
        from: egui::Pos2,
        to: egui::Pos2,
        class: Option<(u32, &str)>,
        class_count: usize,
    ) -> Option<EditorNotice> {
        state.pointer_down(from, 1.0, store);
        state.pointer_move(to, store, IMG_W, IMG_H);
        state.pointer_up(to, store, IMG_W, IMG_H, class, class_count)
    }

    #[test]
    fn test_draw_creates_box_matching_span() {
        let mut state = InteractionState::new();
        let mut store = AnnotationStore::new();
        let notice = draw_box(
            &mut state,
            &mut store,
            egui::pos2(100.0, 100.0),
            egui::pos2(300.0, 250.0),
            Some((2, "car")),
            3,
        );
        assert_eq!(notice, None);
        assert_eq!(store.len(), 1);
        let created = &store.boxes()[0];
        assert_eq!(created.rect, Rect::new(100.0, 100.0, 200.0, 150.0));
        assert_eq!(created.class_id, 2);
        assert!(created.selected);
        assert_eq!(state.gesture(), Gesture::Idle);
    }

    #[test]
    fn test_sub_threshold_draw_is_discarded_silently() {
        let mut state = InteractionState::new();
        let mut store = AnnotationStore::new();
        let notice = draw_box(
            &mut state,
            &mut store,
            egui::pos2(100.0, 100.0),
            egui::pos2(103.0, 103.0),
            Some((0, "car")),
            1,
        );
        assert_eq!(notice, None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_draw_without_class_selected_reports() {
        let mut state = InteractionState::new();
        let mut store = AnnotationStore::new();
        let notice = draw_box(
            &mut state,
            &mut store,
            egui::pos2(100.0, 100.0),
            egui::pos2(120.0, 120.0),
            None,
            3,
        );
        assert_eq!(notice, Some(EditorNotice::NoClassSelected));
        assert!(store.is_empty());
    }

    #[test]
    fn test_draw_with_empty_class_list_reports() {
        let mut state = InteractionState::new();
        let mut store = AnnotationStore::new();
        let notice = draw_box(
            &mut state,
            &mut store,
            egui::pos2(100.0, 100.0),
            egui::pos2(120.0, 120.0),
            None,
            0,
        );
        assert_eq!(notice, Some(EditorNotice::NoClassesInProject));
        assert!(store.is_empty());
    }

    #[test]
    fn test_draw_started_on_empty_space_deselects() {
        let mut state = InteractionState::new();
        let mut store = AnnotationStore::new();
        let id = store.add(0, "car".into(), Rect::new(0.0, 0.0, 50.0, 50.0));
        store.select(id);
        state.pointer_down(egui::pos2(300.0, 300.0), 1.0, &mut store);
        assert!(store.selected().is_none());
        assert!(matches!(state.gesture(), Gesture::Drawing { .. }));
    }

    #[test]
    fn test_down_on_box_selects_and_drags() {
        let mut state = InteractionState::new();
        let mut store = AnnotationStore::new();
        let a = store.add(0, "car".into(), Rect::new(0.0, 0.0, 50.0, 50.0));
        let b = store.add(1, "dog".into(), Rect::new(30.0, 30.0, 50.0, 50.0));
        state.pointer_down(egui::pos2(40.0, 40.0), 1.0, &mut store);
        // Overlap point: topmost (later) box wins and becomes selected.
        assert_eq!(store.selected().map(|s| s.id), Some(b));
        assert!(matches!(state.gesture(), Gesture::Dragging { id, .. } if id == b));

        state.pointer_move(egui::pos2(50.0, 45.0), &mut store, IMG_W, IMG_H);
        assert_eq!(store.get(b).unwrap().rect, Rect::new(40.0, 35.0, 50.0, 50.0));
        assert_eq!(store.get(a).unwrap().rect, Rect::new(0.0, 0.0, 50.0, 50.0));

        state.pointer_up(egui::pos2(50.0, 45.0), &mut store, IMG_W, IMG_H, None, 2);
        assert_eq!(state.gesture(), Gesture::Idle);
        // The dragged box stays selected after the gesture.
        assert_eq!(store.selected().map(|s| s.id), Some(b));
    }

    #[test]
    fn test_drag_clamps_to_image_bounds() {
        let mut state = InteractionState::new();
        let mut store = AnnotationStore::new();
        let id = store.add(0, "car".into(), Rect::new(600.0, 440.0, 30.0, 30.0));
        state.pointer_down(egui::pos2(610.0, 450.0), 1.0, &mut store);
        // Way past the bottom-right corner; the box parks at the border.
        state.pointer_move(egui::pos2(2000.0, 2000.0), &mut store, IMG_W, IMG_H);
        let rect = store.get(id).unwrap().rect;
        assert_eq!(rect, Rect::new(610.0, 450.0, 30.0, 30.0));
        // Repeated off-image movement never escapes the bounds.
        state.pointer_move(egui::pos2(-500.0, -500.0), &mut store, IMG_W, IMG_H);
        let rect = store.get(id).unwrap().rect;
        assert!(rect.x >= 0.0 && rect.y >= 0.0);
        assert!(rect.right() <= IMG_W && rect.bottom() <= IMG_H);
        assert_eq!(rect.width, 30.0);
        assert_eq!(rect.height, 30.0);
    }

    #[test]
    fn test_resize_from_east_handle_pins_at_min_size() {
        let start = Rect::new(100.0, 100.0, 200.0, 150.0);
        let out = resize_rect(start, Handle::East, egui::vec2(-250.0, 0.0), IMG_W, IMG_H);
        assert_eq!(out, Rect::new(100.0, 100.0, 10.0, 150.0));
    }

    #[test]
    fn test_resize_moves_only_owned_edges() {
        let start = Rect::new(100.0, 100.0, 200.0, 150.0);
        let out = resize_rect(start, Handle::North, egui::vec2(50.0, -20.0), IMG_W, IMG_H);
        // The horizontal component of the delta is ignored by N.
        assert_eq!(out, Rect::new(100.0, 80.0, 200.0, 170.0));

        let out = resize_rect(start, Handle::SouthWest, egui::vec2(-10.0, 30.0), IMG_W, IMG_H);
        assert_eq!(out, Rect::new(90.0, 100.0, 210.0, 180.0));
    }

    #[test]
    fn test_resize_sequence_keeps_invariants() {
        let start = Rect::new(50.0, 50.0, 100.0, 100.0);
        let deltas = [
            egui::vec2(-500.0, 0.0),
            egui::vec2(900.0, 900.0),
            egui::vec2(-90.0, -95.0),
            egui::vec2(3.0, -700.0),
        ];
        for handle in Handle::ALL {
            for delta in deltas {
                let out = resize_rect(start, handle, delta, IMG_W, IMG_H);
                assert!(out.width >= MIN_BOX_SIZE - 1e-3, "{handle:?} {delta:?} {out:?}");
                assert!(out.height >= MIN_BOX_SIZE - 1e-3, "{handle:?} {delta:?} {out:?}");
                assert!(out.x >= 0.0 && out.y >= 0.0);
                assert!(out.right() <= IMG_W && out.bottom() <= IMG_H);
            }
        }
    }

    #[test]
    fn test_resize_gesture_through_state_machine() {
        let mut state = InteractionState::new();
        let mut store = AnnotationStore::new();
        let id = store.add(0, "car".into(), Rect::new(100.0, 100.0, 200.0, 150.0));
        store.select(id);

        // Grab the E handle at (300, 175) and pull far left.
        state.pointer_down(egui::pos2(300.0, 175.0), 1.0, &mut store);
        assert!(matches!(
            state.gesture(),
            Gesture::Resizing { handle: Handle::East, .. }
        ));
        state.pointer_move(egui::pos2(50.0, 175.0), &mut store, IMG_W, IMG_H);
        assert_eq!(
            store.get(id).unwrap().rect,
            Rect::new(100.0, 100.0, 10.0, 150.0)
        );
        state.pointer_up(egui::pos2(50.0, 175.0), &mut store, IMG_W, IMG_H, None, 1);
        assert_eq!(state.gesture(), Gesture::Idle);
    }

    #[test]
    fn test_down_outside_gesture_is_ignored_while_active() {
        let mut state = InteractionState::new();
        let mut store = AnnotationStore::new();
        state.pointer_down(egui::pos2(10.0, 10.0), 1.0, &mut store);
        let before = state.gesture();
        // A second press (e.g. another mouse button) does not restart.
        state.pointer_down(egui::pos2(200.0, 200.0), 1.0, &mut store);
        assert_eq!(state.gesture(), before);
    }

    #[test]
    fn test_drawing_preview_tracks_pointer() {
        let mut state = InteractionState::new();
        let mut store = AnnotationStore::new();
        state.pointer_down(egui::pos2(10.0, 20.0), 1.0, &mut store);
        state.pointer_move(egui::pos2(60.0, 10.0), &mut store, IMG_W, IMG_H);
        assert_eq!(state.drawing_preview(), Some(Rect::new(10.0, 10.0, 50.0, 10.0)));
        assert!(store.is_empty());
    }
}
