// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the bounding box model: a class-tagged pixel
//! rectangle plus its normalized (YOLO) form. The pixel rectangle is the
//! canonical representation; the normalized form is derived on demand for
//! serialization.

/// Minimum width/height (in image pixels) for a box at rest.
pub const MIN_BOX_SIZE: f32 = 10.0;

/// Minimum drag extent before a drawn rectangle becomes an annotation.
pub const CREATE_THRESHOLD: f32 = 5.0;

/// Color palette for annotation classes. Indexed by `class_id`, so a class
/// keeps its color across sessions.
const CLASS_COLORS: &[(u8, u8, u8)] = &[
    (255, 200, 100), // Orange
    (100, 150, 255), // Blue
    (100, 255, 150), // Green
    (255, 100, 200), // Pink
    (200, 100, 255), // Purple
    (255, 255, 100), // Yellow
    (100, 255, 255), // Cyan
    (255, 150, 100), // Coral
];

/// Stroke color for a class id.
pub fn class_color(class_id: u32) -> egui::Color32 {
    let (r, g, b) = CLASS_COLORS[class_id as usize % CLASS_COLORS.len()];
    egui::Color32::from_rgb(r, g, b)
}

/// Identifier for a box within an [`AnnotationStore`](super::store::AnnotationStore).
pub type BoxId = u64;

/// An axis-aligned rectangle in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning two corner points, in any drag direction.
    pub fn from_corners(a: egui::Pos2, b: egui::Pos2) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self {
            x,
            y,
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Point containment, half-open on the max edges.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Translate by (dx, dy), reducing the delta as needed so the rectangle
    /// stays inside `[0, image_width] x [0, image_height]`. The size never
    /// changes.
    pub fn translated_clamped(&self, dx: f32, dy: f32, image_width: f32, image_height: f32) -> Self {
        let dx = dx.clamp(-self.x, (image_width - self.width - self.x).max(-self.x));
        let dy = dy.clamp(-self.y, (image_height - self.height - self.y).max(-self.y));
        self.translated(dx, dy)
    }

    /// Clamp all edges into `[0, image_width] x [0, image_height]`.
    pub fn clamped_to(&self, image_width: f32, image_height: f32) -> Self {
        let x = self.x.max(0.0);
        let y = self.y.max(0.0);
        let right = self.right().min(image_width);
        let bottom = self.bottom().min(image_height);
        Self {
            x,
            y,
            width: (right - x).max(0.0),
            height: (bottom - y).max(0.0),
        }
    }
}

/// A bounding box in normalized YOLO form: center point and size, each
/// divided by the image dimension, values in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YoloRecord {
    pub class_id: u32,
    pub x_center: f32,
    pub y_center: f32,
    pub width: f32,
    pub height: f32,
}

/// A class-tagged rectangular annotation on the loaded image.
///
/// `class_name` is a denormalized cache of the class registry lookup; the
/// registry stays the source of truth for id-to-name mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    pub id: BoxId,
    pub class_id: u32,
    pub class_name: String,
    pub rect: Rect,
    pub selected: bool,
}

impl BoundingBox {
    pub fn new(id: BoxId, class_id: u32, class_name: String, rect: Rect) -> Self {
        Self {
            id,
            class_id,
            class_name,
            rect,
            selected: false,
        }
    }

    /// Rendering color, a pure function of the class id.
    pub fn color(&self) -> egui::Color32 {
        class_color(self.class_id)
    }

    /// Normalized YOLO form relative to the given image dimensions.
    pub fn to_yolo(&self, image_width: u32, image_height: u32) -> YoloRecord {
        let iw = image_width as f32;
        let ih = image_height as f32;
        YoloRecord {
            class_id: self.class_id,
            x_center: (self.rect.x + self.rect.width / 2.0) / iw,
            y_center: (self.rect.y + self.rect.height / 2.0) / ih,
            width: self.rect.width / iw,
            height: self.rect.height / ih,
        }
    }

    /// Build a box from a normalized record. The resulting rectangle is
    /// clamped to the image bounds.
    pub fn from_yolo(
        id: BoxId,
        record: &YoloRecord,
        image_width: u32,
        image_height: u32,
        class_name: String,
    ) -> Self {
        let iw = image_width as f32;
        let ih = image_height as f32;
        let w = record.width * iw;
        let h = record.height * ih;
        let rect = Rect::new(
            record.x_center * iw - w / 2.0,
            record.y_center * ih - h / 2.0,
            w,
            h,
        )
        .clamped_to(iw, ih);
        Self::new(id, record.class_id, class_name, rect)
    }
}
