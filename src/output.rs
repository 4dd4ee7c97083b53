//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Batch
//!
//! ```text
//! Processing 3 images from input/
//! 001 beach.jpg: 2 faces
//!     Annotated: output/output_beach.jpg.webp
//!     Face 1: output/beach_face_1.webp
//!     Face 2: output/beach_face_2.webp
//! 002 empty.png: no faces
//! 003 broken.jpg: failed
//!     Error: Failed to decode input/broken.jpg: ...
//!
//! Processed 2 of 3 images: 1 with faces (2 faces), 1 without, 1 failed
//! ```
//!
//! ## Single image
//!
//! ```text
//! Face detection log:
//! {
//!   "input_path": "portrait.jpg",
//!   "output_path": "output.webp",
//!   "has_face": true
//! }
//! Image successfully processed and saved to: output.webp
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure and do no I/O.

use crate::batch::{BatchEvent, BatchSummary};
use serde::Serialize;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Batch output
// ============================================================================

/// Format a single batch progress event as display lines.
///
/// Each file leads with its positional index and file name; written paths
/// and errors are shown as indented context.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { input_dir, total } => vec![format!(
            "Processing {} from {}",
            plural(*total, "image", "images"),
            input_dir.display()
        )],
        BatchEvent::FileProcessed { index, outcome, .. } => {
            let mut lines = vec![format!(
                "{} {}: {}",
                format_index(*index),
                file_name(&outcome.input),
                plural(outcome.faces, "face", "faces")
            )];
            if let Some(annotated) = &outcome.annotated {
                lines.push(format!("{}Annotated: {}", indent(1), annotated.display()));
            }
            for (i, crop) in outcome.crops.iter().enumerate() {
                lines.push(format!("{}Face {}: {}", indent(1), i + 1, crop.display()));
            }
            lines
        }
        BatchEvent::NoFaces { index, input, .. } => {
            vec![format!("{} {}: no faces", format_index(*index), file_name(input))]
        }
        BatchEvent::FileFailed {
            index,
            input,
            error,
            ..
        } => vec![
            format!("{} {}: failed", format_index(*index), file_name(input)),
            format!("{}Error: {}", indent(1), error),
        ],
    }
}

/// Print a batch event to stdout.
pub fn print_batch_event(event: &BatchEvent) {
    for line in format_batch_event(event) {
        println!("{}", line);
    }
}

/// Format the end-of-run summary.
pub fn format_summary(summary: &BatchSummary) -> Vec<String> {
    if summary.files_seen == 0 {
        return vec![String::new(), "No images found".to_string()];
    }
    vec![
        String::new(),
        format!(
            "Processed {} of {}: {} with faces ({}), {} without, {} failed",
            summary.processed(),
            plural(summary.files_seen, "image", "images"),
            summary.with_faces,
            plural(summary.total_faces, "face", "faces"),
            summary.without_faces,
            summary.failed
        ),
    ]
}

/// Print the end-of-run summary to stdout.
pub fn print_summary(summary: &BatchSummary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Single-image output
// ============================================================================

/// Structured record printed after a single-image run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleImageLog {
    pub input_path: String,
    pub output_path: String,
    pub has_face: bool,
}

impl SingleImageLog {
    pub fn new(input: &Path, output: &Path, has_face: bool) -> Self {
        Self {
            input_path: input.display().to_string(),
            output_path: output.display().to_string(),
            has_face,
        }
    }
}

/// Format the single-image log: header, pretty JSON record, result line.
pub fn format_single_log(log: &SingleImageLog) -> Result<Vec<String>, serde_json::Error> {
    let json = serde_json::to_string_pretty(log)?;
    let mut lines = vec!["Face detection log:".to_string()];
    lines.extend(json.lines().map(str::to_string));
    lines.push(if log.has_face {
        format!("Image successfully processed and saved to: {}", log.output_path)
    } else {
        format!("No faces found in {}, nothing written", log.input_path)
    });
    Ok(lines)
}

/// Print the single-image log to stdout.
pub fn print_single_log(log: &SingleImageLog) -> Result<(), serde_json::Error> {
    for line in format_single_log(log)? {
        println!("{}", line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::FileOutcome;
    use std::path::PathBuf;

    #[test]
    fn started_line_counts_images() {
        let lines = format_batch_event(&BatchEvent::Started {
            input_dir: PathBuf::from("input"),
            total: 3,
        });
        assert_eq!(lines, vec!["Processing 3 images from input"]);

        let lines = format_batch_event(&BatchEvent::Started {
            input_dir: PathBuf::from("input"),
            total: 1,
        });
        assert_eq!(lines, vec!["Processing 1 image from input"]);
    }

    #[test]
    fn processed_file_lists_outputs() {
        let event = BatchEvent::FileProcessed {
            index: 1,
            total: 3,
            outcome: FileOutcome {
                input: PathBuf::from("input/beach.jpg"),
                annotated: Some(PathBuf::from("output/output_beach.jpg.webp")),
                crops: vec![
                    PathBuf::from("output/beach_face_1.webp"),
                    PathBuf::from("output/beach_face_2.webp"),
                ],
                faces: 2,
            },
        };
        assert_eq!(
            format_batch_event(&event),
            vec![
                "001 beach.jpg: 2 faces",
                "    Annotated: output/output_beach.jpg.webp",
                "    Face 1: output/beach_face_1.webp",
                "    Face 2: output/beach_face_2.webp",
            ]
        );
    }

    #[test]
    fn single_face_is_singular() {
        let event = BatchEvent::FileProcessed {
            index: 12,
            total: 20,
            outcome: FileOutcome {
                input: PathBuf::from("input/solo.png"),
                annotated: Some(PathBuf::from("output/output_solo.png.webp")),
                crops: vec![PathBuf::from("output/solo_face_1.webp")],
                faces: 1,
            },
        };
        assert_eq!(format_batch_event(&event)[0], "012 solo.png: 1 face");
    }

    #[test]
    fn no_faces_is_one_line() {
        let event = BatchEvent::NoFaces {
            index: 2,
            total: 3,
            input: PathBuf::from("input/empty.png"),
        };
        assert_eq!(format_batch_event(&event), vec!["002 empty.png: no faces"]);
    }

    #[test]
    fn failure_shows_error_context() {
        let event = BatchEvent::FileFailed {
            index: 3,
            total: 3,
            input: PathBuf::from("input/broken.jpg"),
            error: "Failed to decode input/broken.jpg: bad header".into(),
        };
        assert_eq!(
            format_batch_event(&event),
            vec![
                "003 broken.jpg: failed",
                "    Error: Failed to decode input/broken.jpg: bad header",
            ]
        );
    }

    #[test]
    fn summary_line() {
        let summary = BatchSummary {
            files_seen: 3,
            with_faces: 1,
            without_faces: 1,
            failed: 1,
            total_faces: 2,
        };
        assert_eq!(
            format_summary(&summary),
            vec![
                "",
                "Processed 2 of 3 images: 1 with faces (2 faces), 1 without, 1 failed"
            ]
        );
    }

    #[test]
    fn summary_for_empty_batch() {
        assert_eq!(
            format_summary(&BatchSummary::default()),
            vec!["", "No images found"]
        );
    }

    #[test]
    fn single_log_prints_pretty_json_record() {
        let log = SingleImageLog::new(Path::new("portrait.jpg"), Path::new("output.webp"), true);
        let lines = format_single_log(&log).unwrap();

        assert_eq!(lines[0], "Face detection log:");
        assert_eq!(
            lines.last().unwrap(),
            "Image successfully processed and saved to: output.webp"
        );
        let json = lines[1..lines.len() - 1].join("\n");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["input_path"], "portrait.jpg");
        assert_eq!(value["output_path"], "output.webp");
        assert_eq!(value["has_face"], true);
    }

    #[test]
    fn single_log_without_face() {
        let log = SingleImageLog::new(Path::new("wall.jpg"), Path::new("out.webp"), false);
        let lines = format_single_log(&log).unwrap();
        assert!(lines.iter().any(|l| l.contains("\"has_face\": false")));
        assert_eq!(
            lines.last().unwrap(),
            "No faces found in wall.jpg, nothing written"
        );
    }
}
