// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! YOLO label file reading and writing.
//!
//! One UTF-8 text file per image, basename shared with the image,
//! extension `.txt`. Each line is
//! `<class_id> <x_center> <y_center> <width> <height>` with the four
//! coordinates normalized to the image dimensions and printed with six
//! decimal places. An empty file is a valid image with zero annotations.

use crate::models::annotation::YoloRecord;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Label file path for an image: same basename, `.txt` extension.
pub fn label_path_for(image_path: &Path) -> PathBuf {
    image_path.with_extension("txt")
}

/// Format one record as a label line.
pub fn format_record(record: &YoloRecord) -> String {
    format!(
        "{} {:.6} {:.6} {:.6} {:.6}",
        record.class_id, record.x_center, record.y_center, record.width, record.height
    )
}

/// Parse one label line. Requires exactly 5 whitespace-separated tokens:
/// an unsigned integer class id and four floats.
pub fn parse_line(line: &str) -> Option<YoloRecord> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 5 {
        return None;
    }
    Some(YoloRecord {
        class_id: parts[0].parse().ok()?,
        x_center: parts[1].parse().ok()?,
        y_center: parts[2].parse().ok()?,
        width: parts[3].parse().ok()?,
        height: parts[4].parse().ok()?,
    })
}

/// Parse a whole label file body. Blank lines are ignored; a malformed
/// line is skipped with a warning and never aborts the load.
pub fn parse_labels(text: &str) -> Vec<YoloRecord> {
    let mut records = Vec::new();
    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(record) => records.push(record),
            None => log::warn!("skipping malformed label line {}: {:?}", number + 1, line),
        }
    }
    records
}

/// Read the label file for an image. A missing file is an image that has
/// not been annotated yet, not an error.
pub fn read_labels(path: &Path) -> Result<Vec<YoloRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read labels from {}", path.display()))?;
    Ok(parse_labels(&text))
}

/// Write all records to the label file, one line each.
pub fn write_labels(path: &Path, records: &[YoloRecord]) -> Result<()> {
    let mut body = records
        .iter()
        .map(format_record)
        .collect::<Vec<_>>()
        .join("\n");
    if !body.is_empty() {
        body.push('\n');
    }
    std::fs::write(path, body)
        .with_context(|| format!("failed to write labels to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_matches_reference_line() {
        let record = YoloRecord {
            class_id: 2,
            x_center: 0.3125,
            y_center: 0.364_583,
            width: 0.3125,
            height: 0.3125,
        };
        assert_eq!(format_record(&record), "2 0.312500 0.364583 0.312500 0.312500");
    }

    #[test]
    fn test_parse_roundtrip_within_tolerance() {
        let record = YoloRecord {
            class_id: 7,
            x_center: 0.123_456_7,
            y_center: 0.5,
            width: 0.25,
            height: 0.999_999,
        };
        let parsed = parse_line(&format_record(&record)).unwrap();
        assert_eq!(parsed.class_id, 7);
        assert!((parsed.x_center - record.x_center).abs() < 1e-4);
        assert!((parsed.height - record.height).abs() < 1e-4);
    }

    #[test]
    fn test_parse_rejects_wrong_token_count() {
        assert!(parse_line("0 0.5 0.5 0.2").is_none());
        assert!(parse_line("0 0.5 0.5 0.2 0.3 0.4").is_none());
        assert!(parse_line("").is_none());
    }

    #[test]
    fn test_parse_rejects_bad_tokens() {
        // Fractional or negative class ids are invalid.
        assert!(parse_line("1.5 0.5 0.5 0.2 0.3").is_none());
        assert!(parse_line("-1 0.5 0.5 0.2 0.3").is_none());
        assert!(parse_line("0 0.5 abc 0.2 0.3").is_none());
    }

    #[test]
    fn test_malformed_lines_are_skipped_not_fatal() {
        let body = "0 0.5 0.5 0.2 0.3\nnot a label\n\n1 0.25 0.25 0.1 0.1\n";
        let records = parse_labels(body);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].class_id, 0);
        assert_eq!(records[1].class_id, 1);
    }

    #[test]
    fn test_empty_body_is_zero_annotations() {
        assert!(parse_labels("").is_empty());
        assert!(parse_labels("\n\n").is_empty());
    }

    #[test]
    fn test_label_path_swaps_extension() {
        assert_eq!(
            label_path_for(Path::new("/data/images/frame_001.jpg")),
            PathBuf::from("/data/images/frame_001.txt")
        );
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = std::env::temp_dir().join("boxmark_label_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sample.txt");
        let records = vec![
            YoloRecord {
                class_id: 0,
                x_center: 0.5,
                y_center: 0.5,
                width: 0.25,
                height: 0.25,
            },
            YoloRecord {
                class_id: 3,
                x_center: 0.1,
                y_center: 0.2,
                width: 0.05,
                height: 0.05,
            },
        ];
        write_labels(&path, &records).unwrap();
        let back = read_labels(&path).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[1].class_id, 3);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_read_missing_file_is_empty() {
        let path = Path::new("/nonexistent/boxmark/never.txt");
        assert!(read_labels(path).unwrap().is_empty());
    }
}
