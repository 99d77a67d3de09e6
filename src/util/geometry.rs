// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the viewport transform mapping between screen
//! coordinates and image pixel coordinates under the fit-to-viewport
//! display policy.

/// Mapping between viewport (screen) space and image pixel space.
///
/// The image is scaled to fit the viewport while preserving its aspect
/// ratio, then centered. The transform is recomputed every frame from the
/// current viewport rectangle, so a window resize or image change never
/// leaves a stale mapping behind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Screen pixels per image pixel.
    pub scale: f32,
    /// Screen position of the image's top-left corner.
    pub offset: egui::Vec2,
    image_width: f32,
    image_height: f32,
}

impl ViewTransform {
    /// Fit an image of the given pixel dimensions into `viewport`.
    pub fn fit(viewport: egui::Rect, image_width: u32, image_height: u32) -> Self {
        let iw = image_width as f32;
        let ih = image_height as f32;
        let scale = (viewport.width() / iw).min(viewport.height() / ih);
        let offset = egui::vec2(
            viewport.min.x + (viewport.width() - iw * scale) / 2.0,
            viewport.min.y + (viewport.height() - ih * scale) / 2.0,
        );
        Self {
            scale,
            offset,
            image_width: iw,
            image_height: ih,
        }
    }

    /// Screen rectangle occupied by the rendered image.
    pub fn screen_rect(&self) -> egui::Rect {
        egui::Rect::from_min_size(
            egui::pos2(self.offset.x, self.offset.y),
            egui::vec2(self.image_width * self.scale, self.image_height * self.scale),
        )
    }

    /// Convert a screen point to image pixel coordinates.
    ///
    /// Returns `None` when the point falls outside the rendered image
    /// (half-open on the max edges).
    pub fn screen_to_image(&self, p: egui::Pos2) -> Option<egui::Pos2> {
        let x = (p.x - self.offset.x) / self.scale;
        let y = (p.y - self.offset.y) / self.scale;
        if x >= 0.0 && x < self.image_width && y >= 0.0 && y < self.image_height {
            Some(egui::pos2(x, y))
        } else {
            None
        }
    }

    /// Convert a screen point to image pixel coordinates, clamping to the
    /// image bounds. Used to continue an in-flight gesture after the
    /// pointer leaves the image.
    pub fn screen_to_image_clamped(&self, p: egui::Pos2) -> egui::Pos2 {
        let x = (p.x - self.offset.x) / self.scale;
        let y = (p.y - self.offset.y) / self.scale;
        egui::pos2(
            x.clamp(0.0, self.image_width),
            y.clamp(0.0, self.image_height),
        )
    }

    /// Convert an image pixel point to screen coordinates. Total.
    pub fn image_to_screen(&self, p: egui::Pos2) -> egui::Pos2 {
        egui::pos2(
            self.offset.x + p.x * self.scale,
            self.offset.y + p.y * self.scale,
        )
    }

    /// Convert an image-space rectangle to a screen rectangle.
    pub fn rect_to_screen(&self, rect: &crate::models::annotation::Rect) -> egui::Rect {
        egui::Rect::from_min_max(
            self.image_to_screen(egui::pos2(rect.x, rect.y)),
            self.image_to_screen(egui::pos2(rect.x + rect.width, rect.y + rect.height)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(w: f32, h: f32) -> egui::Rect {
        egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(w, h))
    }

    #[test]
    fn test_fit_wide_image_centers_horizontally() {
        // 640x480 in a 1280x720 viewport: height is the limiting axis.
        let t = ViewTransform::fit(viewport(1280.0, 720.0), 640, 480);
        assert_eq!(t.scale, 1.5);
        assert_eq!(t.offset.x, 160.0);
        assert_eq!(t.offset.y, 0.0);
    }

    #[test]
    fn test_fit_respects_viewport_origin() {
        let vp = egui::Rect::from_min_size(egui::pos2(100.0, 50.0), egui::vec2(640.0, 480.0));
        let t = ViewTransform::fit(vp, 640, 480);
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.image_to_screen(egui::pos2(0.0, 0.0)), egui::pos2(100.0, 50.0));
    }

    #[test]
    fn test_screen_image_roundtrip() {
        let t = ViewTransform::fit(viewport(1280.0, 720.0), 640, 480);
        let img = egui::pos2(123.0, 456.0);
        let screen = t.image_to_screen(img);
        let back = t.screen_to_image(screen).unwrap();
        assert!((back.x - img.x).abs() < 1e-3);
        assert!((back.y - img.y).abs() < 1e-3);
    }

    #[test]
    fn test_screen_to_image_outside_is_none() {
        let t = ViewTransform::fit(viewport(1280.0, 720.0), 640, 480);
        // Left of the centered image (letterbox region).
        assert_eq!(t.screen_to_image(egui::pos2(10.0, 360.0)), None);
        // The max edge is exclusive.
        assert_eq!(t.screen_to_image(egui::pos2(160.0 + 960.0, 360.0)), None);
        assert!(t.screen_to_image(egui::pos2(160.0, 0.0)).is_some());
    }

    #[test]
    fn test_clamped_conversion_pins_to_bounds() {
        let t = ViewTransform::fit(viewport(1280.0, 720.0), 640, 480);
        let p = t.screen_to_image_clamped(egui::pos2(5000.0, -50.0));
        assert_eq!(p, egui::pos2(640.0, 0.0));
    }
}
