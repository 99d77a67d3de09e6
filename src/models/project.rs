// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project state management.
//!
//! A project ties an image to the class list used for labeling. The
//! annotations themselves live in the YOLO sidecar file next to the image
//! (see `io::labels`), not in the project file.

use crate::editor::ClassRegistry;
use serde::{Deserialize, Serialize};

/// Complete project data for serialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectData {
    pub image_file: String,
    pub classes: Vec<String>,
}

impl ProjectData {
    /// Create a new project for the given image file.
    pub fn new(image_file: String) -> Self {
        Self {
            image_file,
            classes: Vec::new(),
        }
    }
}

impl ClassRegistry for ProjectData {
    fn class_name(&self, class_id: u32) -> Option<&str> {
        self.classes.get(class_id as usize).map(String::as_str)
    }

    fn class_count(&self) -> usize {
        self.classes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let mut project = ProjectData::new("img.png".into());
        project.classes = vec!["person".into(), "car".into()];
        assert_eq!(project.class_name(1), Some("car"));
        assert_eq!(project.class_name(2), None);
        assert_eq!(project.class_count(), 2);
    }
}
