// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait, wiring the bounding box editor to image loading,
//! label persistence, keyboard shortcuts, and the surrounding panels.

use crate::editor::{Editor, EditorNotice};
use crate::io::labels;
use crate::models::annotation::{BoundingBox, BoxId, YoloRecord};
use crate::models::project::ProjectData;
use crate::ui::{canvas, properties, toolbar};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};

/// History system for undo/redo functionality.
struct History {
    /// Undo stack (past states)
    undo_stack: Vec<Vec<BoundingBox>>,
    /// Redo stack (future states after undo)
    redo_stack: Vec<Vec<BoundingBox>>,
    /// Maximum history size
    max_size: usize,
}

impl History {
    fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size: 50, // Keep last 50 states
        }
    }

    /// Save current state before making a change
    fn push(&mut self, boxes: Vec<BoundingBox>) {
        self.undo_stack.push(boxes);
        // Limit history size
        if self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
        // Clear redo stack when new action is performed
        self.redo_stack.clear();
    }

    /// Undo: restore previous state
    fn undo(&mut self, current: Vec<BoundingBox>) -> Option<Vec<BoundingBox>> {
        if let Some(previous) = self.undo_stack.pop() {
            self.redo_stack.push(current);
            Some(previous)
        } else {
            None
        }
    }

    /// Redo: restore next state
    fn redo(&mut self, current: Vec<BoundingBox>) -> Option<Vec<BoundingBox>> {
        if let Some(next) = self.redo_stack.pop() {
            self.undo_stack.push(current);
            Some(next)
        } else {
            None
        }
    }

    fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

/// Box lists are considered equal for history/persistence purposes when
/// they hold the same rectangles and classes; the selection flag is
/// transient and neither undoable nor persisted.
fn same_content(a: &[BoundingBox], b: &[BoundingBox]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(x, y)| {
            x.id == y.id && x.class_id == y.class_id && x.rect == y.rect && x.class_name == y.class_name
        })
}

/// Result of background image loading operation.
struct LoadedImageData {
    image_path: PathBuf,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    records: Vec<YoloRecord>,
}

/// Main application state.
pub struct BoxmarkApp {
    /// The bounding box editor for the loaded image
    editor: Editor,

    /// Current project (image reference + class list)
    project: ProjectData,

    /// Where the project was last saved/loaded, if anywhere
    project_path: Option<PathBuf>,

    /// Currently loaded image file
    image_path: Option<PathBuf>,

    /// Label sidecar for the loaded image
    label_path: Option<PathBuf>,

    /// Loaded image texture for display
    image_texture: Option<egui::TextureHandle>,

    /// Draft text for the add-class field
    draft_class: String,

    /// Status bar message
    status: Option<String>,

    /// History for undo/redo
    history: History,

    /// Box list as of the last committed change
    undo_baseline: Vec<BoundingBox>,

    /// Box under the last right-click, for the context menu
    context_target: Option<BoxId>,

    /// Store change notifications (full box list per mutation)
    changes: Receiver<Vec<BoundingBox>>,

    /// A notification arrived but has not been committed yet (e.g. it
    /// landed mid-gesture)
    pending_change: bool,

    /// Receiver for background image loading
    image_loader: Option<Receiver<Result<LoadedImageData, String>>>,

    /// Loading state message
    loading_message: Option<String>,
}

impl Default for BoxmarkApp {
    fn default() -> Self {
        Self::new()
    }
}

impl BoxmarkApp {
    /// Create a new BOXMARK application instance.
    pub fn new() -> Self {
        let (tx, rx) = channel();
        let mut editor = Editor::new();
        editor.set_change_listener(Box::new(move |boxes| {
            let _ = tx.send(boxes.to_vec());
        }));
        Self {
            editor,
            project: ProjectData::default(),
            project_path: None,
            image_path: None,
            label_path: None,
            image_texture: None,
            draft_class: String::new(),
            status: None,
            history: History::new(),
            undo_baseline: Vec::new(),
            context_target: None,
            changes: rx,
            pending_change: false,
            image_loader: None,
            loading_message: None,
        }
    }

    /// Load an image file and its label sidecar (asynchronously).
    pub fn load_image_file(&mut self, path: PathBuf) {
        let (sender, receiver) = channel();
        self.image_loader = Some(receiver);
        self.loading_message = Some("Loading image...".to_string());

        // Spawn background thread for loading
        std::thread::spawn(move || {
            let result = (|| -> Result<LoadedImageData, String> {
                let loaded = crate::io::media::load_image(&path)
                    .map_err(|e| format!("Failed to load image: {e:#}"))?;

                let label_path = labels::label_path_for(&path);
                let records = labels::read_labels(&label_path)
                    .map_err(|e| format!("Failed to read labels: {e:#}"))?;

                log::info!(
                    "Loaded image: {} ({}x{}), {} existing annotations",
                    path.display(),
                    loaded.width,
                    loaded.height,
                    records.len()
                );

                Ok(LoadedImageData {
                    image_path: path,
                    width: loaded.width,
                    height: loaded.height,
                    pixels: loaded.pixels,
                    records,
                })
            })();

            let _ = sender.send(result);
        });
    }

    /// Import a project file and load its referenced image, if any.
    fn open_project(&mut self, path: PathBuf) {
        let extension = path.extension().and_then(|s| s.to_str());
        let result = match extension {
            Some("yaml") | Some("yml") => crate::io::serialization::import_yaml(&path),
            Some("json") => crate::io::serialization::import_json(&path),
            _ => {
                log::error!("Unsupported project extension: {:?}", extension);
                self.status = Some("Unsupported project file extension".into());
                return;
            }
        };

        match result {
            Ok(project) => {
                log::info!(
                    "Opened project {} with {} classes",
                    path.display(),
                    project.classes.len()
                );
                if let Some(first) = project.classes.first() {
                    self.editor.set_current_class(0, first.clone());
                }
                let image_file = PathBuf::from(&project.image_file);
                self.project = project;
                self.project_path = Some(path);

                // The project replaces the whole session; a previously
                // loaded image no longer belongs to it.
                self.image_texture = None;
                self.image_path = None;
                self.label_path = None;
                self.editor.unload_image();
                self.history.clear();
                self.undo_baseline.clear();

                if image_file.as_os_str().is_empty() {
                    self.status = Some("Project opened (no image referenced)".into());
                } else if image_file.exists() {
                    self.load_image_file(image_file);
                } else {
                    self.status = Some(format!(
                        "Referenced image not found: {}",
                        image_file.display()
                    ));
                }
            }
            Err(e) => {
                log::error!("Failed to open project: {e:#}");
                self.status = Some("Failed to open project file".into());
            }
        }
    }

    /// Export the project to a file, format chosen by extension.
    fn save_project(&mut self, path: PathBuf) {
        let extension = path.extension().and_then(|s| s.to_str());
        let result = match extension {
            Some("yaml") | Some("yml") => crate::io::serialization::export_yaml(&self.project, &path),
            Some("json") => crate::io::serialization::export_json(&self.project, &path),
            _ => {
                log::error!("Unsupported project extension: {:?}", extension);
                self.status = Some("Unsupported project file extension".into());
                return;
            }
        };

        match result {
            Ok(()) => {
                log::info!("Saved project to {}", path.display());
                self.project_path = Some(path);
                self.status = Some("Project saved".into());
            }
            Err(e) => {
                log::error!("Failed to save project: {e:#}");
                self.status = Some("Failed to save project".into());
            }
        }
    }

    /// Write the current boxes to the label sidecar. Failures are logged;
    /// the in-memory state stays authoritative either way.
    fn persist_labels(&self) {
        let Some(path) = &self.label_path else {
            return;
        };
        let records = self.editor.yolo_records();
        match labels::write_labels(path, &records) {
            Ok(()) => log::debug!("Wrote {} labels to {}", records.len(), path.display()),
            Err(e) => log::error!("Failed to write labels: {e:#}"),
        }
    }

    /// Fold pending store notifications into history + persistence. Runs
    /// once per frame; mid-gesture notifications wait until the gesture
    /// settles so a whole drag is one undo step and one file write.
    fn commit_changes(&mut self) {
        while self.changes.try_recv().is_ok() {
            self.pending_change = true;
        }
        if !self.pending_change || self.editor.gesture_active() {
            return;
        }
        self.pending_change = false;
        let current = self.editor.bounding_boxes();
        if same_content(&current, &self.undo_baseline) {
            return;
        }
        let previous = std::mem::replace(&mut self.undo_baseline, current);
        self.history.push(previous);
        self.persist_labels();
    }

    fn undo(&mut self) {
        let current = self.editor.bounding_boxes();
        if let Some(previous) = self.history.undo(current) {
            self.undo_baseline = previous.clone();
            self.editor.restore(previous);
            self.persist_labels();
            log::info!("Undo");
        }
    }

    fn redo(&mut self) {
        let current = self.editor.bounding_boxes();
        if let Some(next) = self.history.redo(current) {
            self.undo_baseline = next.clone();
            self.editor.restore(next);
            self.persist_labels();
            log::info!("Redo");
        }
    }

    fn add_class(&mut self, name: String) {
        if self.project.classes.iter().any(|c| c == &name) {
            self.status = Some(format!("Class \"{name}\" already exists"));
            return;
        }
        self.project.classes.push(name.clone());
        let id = (self.project.classes.len() - 1) as u32;
        self.editor.set_current_class(id, name);
        self.status = Some("Class added".into());
    }

    fn show_notice(&mut self, notice: EditorNotice) {
        log::info!("Editor notice: {}", notice.message());
        self.status = Some(notice.message().to_string());
    }
}

impl eframe::App for BoxmarkApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for completed image loading
        if let Some(ref receiver) = self.image_loader {
            if let Ok(result) = receiver.try_recv() {
                self.image_loader = None;
                self.loading_message = None;

                match result {
                    Ok(loaded) => {
                        // Create egui texture from the loaded image data
                        let size = [loaded.width as usize, loaded.height as usize];
                        let color_image =
                            egui::ColorImage::from_rgba_unmultiplied(size, &loaded.pixels);
                        let texture = ctx.load_texture(
                            "loaded_image",
                            color_image,
                            egui::TextureOptions::LINEAR,
                        );
                        self.image_texture = Some(texture);

                        self.editor.load_image(
                            loaded.width,
                            loaded.height,
                            &loaded.records,
                            &self.project,
                        );
                        self.label_path = Some(labels::label_path_for(&loaded.image_path));
                        self.project.image_file = loaded.image_path.display().to_string();
                        self.image_path = Some(loaded.image_path);

                        // A fresh session: nothing to undo yet.
                        self.history.clear();
                        self.undo_baseline = self.editor.bounding_boxes();
                        while self.changes.try_recv().is_ok() {}
                        self.pending_change = false;
                        self.status = Some(format!(
                            "Loaded {} annotations",
                            self.undo_baseline.len()
                        ));
                    }
                    Err(e) => {
                        log::error!("Failed to load image: {}", e);
                        self.status = Some(e);
                    }
                }
            }
        }

        // Request repaint if still loading (to update spinner)
        if self.loading_message.is_some() {
            ctx.request_repaint();
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Image...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Images", &["jpg", "jpeg", "png", "bmp", "tiff", "tif"])
                            .pick_file()
                        {
                            self.load_image_file(path);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Open Project...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Projects", &["yaml", "yml", "json"])
                            .pick_file()
                        {
                            self.open_project(path);
                        }
                        ui.close_menu();
                    }
                    let can_save = self.project_path.is_some();
                    if ui
                        .add_enabled(can_save, egui::Button::new("Save Project"))
                        .clicked()
                    {
                        if let Some(path) = self.project_path.clone() {
                            self.save_project(path);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Save Project As...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("YAML", &["yaml", "yml"])
                            .add_filter("JSON", &["json"])
                            .set_file_name("project.yaml")
                            .save_file()
                        {
                            self.save_project(path);
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    let can_undo = self.history.can_undo();
                    if ui
                        .add_enabled(can_undo, egui::Button::new("Undo (Ctrl+Z)"))
                        .clicked()
                    {
                        self.undo();
                        ui.close_menu();
                    }

                    let can_redo = self.history.can_redo();
                    if ui
                        .add_enabled(can_redo, egui::Button::new("Redo (Ctrl+Shift+Z)"))
                        .clicked()
                    {
                        self.redo();
                        ui.close_menu();
                    }

                    ui.separator();

                    let has_selection = self.editor.selected_box().is_some();
                    if ui
                        .add_enabled(has_selection, egui::Button::new("Delete Selected"))
                        .clicked()
                    {
                        self.editor.delete_selected();
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(
                            !self.editor.boxes().is_empty(),
                            egui::Button::new("Clear All"),
                        )
                        .clicked()
                    {
                        self.editor.clear_all();
                        ui.close_menu();
                    }
                });
            });
        });

        // Toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            let current_class = self.editor.current_class().map(|(id, _)| id);
            let action = toolbar::show(ui, &self.project.classes, current_class, &mut self.draft_class);
            match action {
                toolbar::ToolbarAction::SelectClass(id) => {
                    if let Some(name) = self.project.classes.get(id as usize) {
                        self.editor.set_current_class(id, name.clone());
                    }
                }
                toolbar::ToolbarAction::AddClass(name) => self.add_class(name),
                toolbar::ToolbarAction::RemoveLast => self.editor.remove_last(),
                toolbar::ToolbarAction::ClearAll => self.editor.clear_all(),
                toolbar::ToolbarAction::None => {}
            }
        });

        // Properties panel (right side)
        let properties_action = egui::SidePanel::right("properties")
            .default_width(250.0)
            .show(ctx, |ui| properties::show(ui, self.editor.boxes()))
            .inner;

        match properties_action {
            properties::PropertiesAction::SelectBox(id) => self.editor.select(id),
            properties::PropertiesAction::DeleteBox(id) => {
                self.editor.delete_box(id);
            }
            properties::PropertiesAction::None => {}
        }

        // Handle keyboard events
        // Only process if no text field is focused (to avoid deleting while editing names)
        if !ctx.wants_keyboard_input() {
            if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
                self.editor.deselect_all();
            }

            if ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace))
            {
                if self.editor.delete_selected() {
                    log::info!("Deleted selected box, total: {}", self.editor.boxes().len());
                }
            }

            // Handle undo (Ctrl+Z)
            if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Z) && !i.modifiers.shift)
            {
                self.undo();
            }

            // Handle redo (Ctrl+Shift+Z or Ctrl+Y)
            if ctx.input(|i| {
                (i.modifiers.command && i.modifiers.shift && i.key_pressed(egui::Key::Z))
                    || (i.modifiers.command && i.key_pressed(egui::Key::Y))
            }) {
                self.redo();
            }
        }

        // Main canvas (center)
        let canvas_outcome = egui::CentralPanel::default()
            .show(ctx, |ui| {
                // Show loading overlay if loading
                if let Some(ref message) = self.loading_message {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new(message)
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    canvas::CanvasOutcome::default()
                } else {
                    canvas::show(
                        ui,
                        &mut self.editor,
                        &self.project,
                        &self.image_texture,
                        &mut self.context_target,
                    )
                }
            })
            .inner;

        if let Some(notice) = canvas_outcome.notice {
            self.show_notice(notice);
        }

        // Bottom status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match &self.image_path {
                    Some(path) => ui.label(format!("Image: {}", path.display())),
                    None => ui.label("No image"),
                };
                if let Some(status) = &self.status {
                    ui.separator();
                    ui.label(status);
                }
            });
        });

        // Fold this frame's store notifications into undo history and the
        // label file once the pointer has settled.
        self.commit_changes();
    }
}
