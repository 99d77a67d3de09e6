// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Hit-testing for boxes and resize handles.
//!
//! Box picking walks the store in reverse insertion order so the topmost
//! (last added) box wins. Handle picking checks the 8 perimeter anchors of
//! the selected box against a zoom-compensated hit square.

use crate::models::annotation::{BoundingBox, BoxId, Rect};

/// Nominal handle size in screen pixels.
pub const HANDLE_SCREEN_SIZE: f32 = 8.0;

/// One of the 8 resize handles on a selected box, indexed clockwise from
/// the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    NorthWest,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
}

/// Resize axis of a handle, used for cursor selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Diagonal,
    Horizontal,
    Vertical,
}

// Axis per handle, in Handle::ALL order.
const HANDLE_AXES: [Axis; 8] = [
    Axis::Diagonal,
    Axis::Vertical,
    Axis::Diagonal,
    Axis::Horizontal,
    Axis::Diagonal,
    Axis::Vertical,
    Axis::Diagonal,
    Axis::Horizontal,
];

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::NorthWest,
        Handle::North,
        Handle::NorthEast,
        Handle::East,
        Handle::SouthEast,
        Handle::South,
        Handle::SouthWest,
        Handle::West,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|h| *h == self).unwrap_or(0)
    }

    pub fn axis(self) -> Axis {
        HANDLE_AXES[self.index()]
    }

    /// Anchor point of this handle on the given rectangle (corners plus
    /// edge midpoints).
    pub fn anchor(self, rect: &Rect) -> egui::Pos2 {
        let cx = rect.x + rect.width / 2.0;
        let cy = rect.y + rect.height / 2.0;
        match self {
            Handle::NorthWest => egui::pos2(rect.x, rect.y),
            Handle::North => egui::pos2(cx, rect.y),
            Handle::NorthEast => egui::pos2(rect.right(), rect.y),
            Handle::East => egui::pos2(rect.right(), cy),
            Handle::SouthEast => egui::pos2(rect.right(), rect.bottom()),
            Handle::South => egui::pos2(cx, rect.bottom()),
            Handle::SouthWest => egui::pos2(rect.x, rect.bottom()),
            Handle::West => egui::pos2(rect.x, cy),
        }
    }

    pub fn moves_left_edge(self) -> bool {
        matches!(self, Handle::NorthWest | Handle::SouthWest | Handle::West)
    }

    pub fn moves_right_edge(self) -> bool {
        matches!(self, Handle::NorthEast | Handle::East | Handle::SouthEast)
    }

    pub fn moves_top_edge(self) -> bool {
        matches!(self, Handle::NorthWest | Handle::North | Handle::NorthEast)
    }

    pub fn moves_bottom_edge(self) -> bool {
        matches!(self, Handle::SouthEast | Handle::South | Handle::SouthWest)
    }
}

/// Side length (in image pixels) of a handle's hit square at the given
/// display scale. Stays around [`HANDLE_SCREEN_SIZE`] screen pixels however
/// far the view is zoomed out.
pub fn handle_hit_size(scale: f32) -> f32 {
    HANDLE_SCREEN_SIZE.max(HANDLE_SCREEN_SIZE / scale)
}

/// Topmost box containing the point, if any.
pub fn find_box_at(boxes: &[BoundingBox], p: egui::Pos2) -> Option<BoxId> {
    boxes
        .iter()
        .rev()
        .find(|b| b.rect.contains(p.x, p.y))
        .map(|b| b.id)
}

/// Handle of `rect` under the point, if any.
pub fn find_handle_at(rect: &Rect, p: egui::Pos2, scale: f32) -> Option<Handle> {
    let half = handle_hit_size(scale) / 2.0;
    Handle::ALL.into_iter().find(|h| {
        let anchor = h.anchor(rect);
        (p.x - anchor.x).abs() <= half && (p.y - anchor.y).abs() <= half
    })
}
