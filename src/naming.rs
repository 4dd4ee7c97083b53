//! Centralized output filename rules.
//!
//! The annotated image keeps the input's full file name; crops are named from
//! its base name (file name without its extension) so outputs from one input
//! sort together:
//!
//! ```text
//! input/portrait.jpg  →  output/output_portrait.jpg.webp   annotated image
//!                        output/portrait_face_1.webp       first detection
//!                        output/portrait_face_2.webp       second detection
//! ```
//!
//! Face indices are 1-based and follow detector order.
//!
//! When several inputs share a base name (`a.bmp` and `a.png`), their crops
//! use the full file name instead (`a.bmp_face_1.webp`, `a.png_face_1.webp`)
//! so no input overwrites another's output.

use crate::imaging::OUTPUT_EXTENSION;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Prefix of the annotated whole-image output.
pub const ANNOTATED_PREFIX: &str = "output_";

/// Base name of an input path: the file name without its final extension.
///
/// - `"/photos/portrait.jpg"` → `"portrait"`
/// - `"group.shot.png"` → `"group.shot"`
/// - `".hidden"` → `".hidden"`
/// - `"/"` → `"image"` (no file name at all)
pub fn base_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "image".to_string())
}

/// Full file name of an input path, `"image"` when it has none.
pub fn original_name(input: &Path) -> String {
    input
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "image".to_string())
}

/// `output_<original>.webp`
pub fn annotated_file_name(original: &str) -> String {
    format!("{ANNOTATED_PREFIX}{original}.{OUTPUT_EXTENSION}")
}

/// `<base>_face_<index>.webp`, with a 1-based `index`.
pub fn face_file_name(base: &str, index: usize) -> String {
    format!("{base}_face_{index}.{OUTPUT_EXTENSION}")
}

/// Where the annotated image for `input` lands inside `output_dir`.
pub fn annotated_path(output_dir: &Path, input: &Path) -> PathBuf {
    output_dir.join(annotated_file_name(&original_name(input)))
}

/// Where one input's outputs are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTargets {
    /// The annotated whole image.
    pub annotated: PathBuf,
    /// Directory receiving the crops.
    pub crop_dir: PathBuf,
    /// Name the crops are derived from.
    pub crop_base: String,
}

impl OutputTargets {
    /// Targets for a lone input: annotated image and crops in `output_dir`.
    pub fn for_input(output_dir: &Path, input: &Path) -> Self {
        Self {
            annotated: annotated_path(output_dir, input),
            crop_dir: output_dir.to_path_buf(),
            crop_base: base_name(input),
        }
    }

    /// Crop number `index` (1-based).
    pub fn face_path(&self, index: usize) -> PathBuf {
        self.crop_dir.join(face_file_name(&self.crop_base, index))
    }
}

/// Targets for every input of one batch, in input order.
///
/// Inputs whose base name is shared fall back to their full file name for
/// crops; a numeric suffix settles anything still taken.
pub fn plan_outputs(output_dir: &Path, inputs: &[PathBuf]) -> Vec<OutputTargets> {
    let mut stem_counts: HashMap<String, usize> = HashMap::new();
    for input in inputs {
        *stem_counts.entry(base_name(input)).or_default() += 1;
    }

    let mut taken = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let stem = base_name(input);
            let preferred = if stem_counts[&stem] > 1 {
                original_name(input)
            } else {
                stem
            };
            let mut crop_base = preferred.clone();
            let mut n = 2;
            while !taken.insert(crop_base.clone()) {
                crop_base = format!("{preferred}_{n}");
                n += 1;
            }
            OutputTargets {
                annotated: annotated_path(output_dir, input),
                crop_dir: output_dir.to_path_buf(),
                crop_base,
            }
        })
        .collect()
}
