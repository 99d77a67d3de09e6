// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! BOXMARK - Bounding Box Annotation Tool
//!
//! A cross-platform desktop application for annotating images with
//! class-tagged bounding boxes, stored as YOLO label files.

mod app;
mod editor;
mod io;
mod models;
mod ui;
mod util;

use anyhow::Result;
use app::BoxmarkApp;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("BOXMARK - Bounding Box Annotation Tool"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "BOXMARK",
        options,
        Box::new(|_cc| Ok(Box::new(BoxmarkApp::new()))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
