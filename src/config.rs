//! Run configuration.
//!
//! Handles loading, validating, and layering `facecrop.toml`. Values are
//! resolved in three layers, each overriding the one before it:
//!
//! ```text
//! stock defaults  →  facecrop.toml  →  command-line flags
//! ```
//!
//! ## Config File Location
//!
//! By default `facecrop.toml` is read from the working directory and is
//! optional. A path passed with `--config` must exist.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! input_dir = "input"        # Images to process (not recursive)
//! output_dir = "output"      # Created if missing
//! classifier_path = "haarcascade_frontalface_default.xml"
//! target_width = 1024        # Working raster bounding box
//! target_height = 1024
//!
//! [detection]
//! scale_factor = 1.1         # Pyramid step, must be > 1
//! min_neighbors = 5          # Overlapping hits needed per face
//! min_face_size = 30         # Smallest face in working-raster pixels
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! output_dir = "/tmp/faces"
//!
//! [detection]
//! min_neighbors = 3
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::detect::DetectionParams;
use crate::imaging::Dimensions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "facecrop.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Classifier file not found: {}", .0.display())]
    MissingClassifier(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Run configuration loaded from `facecrop.toml`.
///
/// All fields have defaults. Relative paths resolve against the working
/// directory. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory scanned for input images.
    pub input_dir: PathBuf,
    /// Directory receiving annotated images and crops.
    pub output_dir: PathBuf,
    /// OpenCV Haar cascade XML.
    pub classifier_path: PathBuf,
    /// Width of the box every input is fitted into before detection.
    pub target_width: u32,
    /// Height of the box every input is fitted into before detection.
    pub target_height: u32,
    /// Multi-scale scan parameters.
    pub detection: DetectionParams,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            classifier_path: PathBuf::from("haarcascade_frontalface_default.xml"),
            target_width: 1024,
            target_height: 1024,
            detection: DetectionParams::default(),
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err(ConfigError::Validation(
                "target_width and target_height must be non-zero".into(),
            ));
        }
        self.detection
            .validate()
            .map_err(|e| ConfigError::Validation(format!("[detection] {e}")))
    }

    /// The working-raster bounding box.
    pub fn target(&self) -> Dimensions {
        Dimensions::new(self.target_width, self.target_height)
    }

    /// Fail early when the classifier file is absent.
    pub fn require_classifier(&self) -> Result<&Path, ConfigError> {
        if self.classifier_path.is_file() {
            Ok(&self.classifier_path)
        } else {
            Err(ConfigError::MissingClassifier(self.classifier_path.clone()))
        }
    }
}

/// Values given on the command line. `None` leaves the lower layer in place.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_height: Option<u32>,
}

impl Overrides {
    /// The overrides as a sparse TOML table, ready for [`merge_toml`].
    pub fn to_overlay(&self) -> Result<toml::Value, ConfigError> {
        Ok(toml::Value::try_from(self)?)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer every other layer is merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(Config::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge overlays onto a base value in order, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlays: impl IntoIterator<Item = toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = overlays.into_iter().fold(base, merge_toml);
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path` and apply command-line overrides.
///
/// A missing file is an error only when `required` is set.
pub fn load_config_at(
    path: &Path,
    required: bool,
    overrides: &Overrides,
) -> Result<Config, ConfigError> {
    let base = stock_defaults_value()?;
    let file = match load_raw_config(path)? {
        Some(value) => Some(value),
        None if required => return Err(ConfigError::NotFound(path.to_path_buf())),
        None => None,
    };
    resolve_config(base, file.into_iter().chain([overrides.to_overlay()?]))
}

/// Load the run configuration.
///
/// Reads `explicit` when given (must exist), otherwise the optional
/// [`DEFAULT_CONFIG_FILE`] in the working directory.
pub fn load_config(explicit: Option<&Path>, overrides: &Overrides) -> Result<Config, ConfigError> {
    match explicit {
        Some(path) => load_config_at(path, true, overrides),
        None => load_config_at(Path::new(DEFAULT_CONFIG_FILE), false, overrides),
    }
}

/// Returns a fully-commented stock `facecrop.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# facecrop configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags (--input, --output, --classifier, --width, --height)
# override the values in this file.
# Unknown keys will cause an error.

# Directory scanned for input images. Only files directly inside it are
# processed; subdirectories are ignored.
input_dir = "input"

# Directory receiving results. Created if missing.
#   output_<name>.webp       annotated image with red face outlines
#   <name>_face_<i>.webp     one crop per detected face
output_dir = "output"

# OpenCV Haar cascade (new cascade XML layout).
classifier_path = "haarcascade_frontalface_default.xml"

# Every input is scaled down (aspect preserved) to fit this box before
# detection. Face boxes and crops are measured on the scaled image.
target_width = 1024
target_height = 1024

# ---------------------------------------------------------------------------
# Face detection
# ---------------------------------------------------------------------------
[detection]
# Step between pyramid scales. Smaller is slower and finds more sizes.
scale_factor = 1.1

# Overlapping raw hits a face needs (more than this many). 0 keeps raw hits.
min_neighbors = 5

# Smallest face searched for, in pixels of the scaled image.
min_face_size = 30
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.input_dir, PathBuf::from("input"));
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(
            config.classifier_path,
            PathBuf::from("haarcascade_frontalface_default.xml")
        );
        assert_eq!(config.target(), Dimensions::new(1024, 1024));
        assert_eq!(config.detection, DetectionParams::default());
    }

    #[test]
    fn parse_partial_config() {
        let config: Config = toml::from_str(
            r#"
output_dir = "/tmp/faces"

[detection]
min_neighbors = 3
"#,
        )
        .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/faces"));
        assert_eq!(config.input_dir, PathBuf::from("input"));
        assert_eq!(config.detection.min_neighbors, 3);
        assert_eq!(config.detection.scale_factor, 1.1);
    }

    // =========================================================================
    // Loading
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config_at(
            &tmp.path().join(DEFAULT_CONFIG_FILE),
            false,
            &Overrides::default(),
        )
        .unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn explicit_missing_config_is_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope.toml");
        let result = load_config(Some(&missing), &Overrides::default());
        assert!(matches!(result, Err(ConfigError::NotFound(p)) if p == missing));
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            &tmp,
            r#"
input_dir = "photos"
target_width = 800

[detection]
min_face_size = 48
"#,
        );

        let config = load_config(Some(&path), &Overrides::default()).unwrap();
        assert_eq!(config.input_dir, PathBuf::from("photos"));
        assert_eq!(config.target(), Dimensions::new(800, 1024));
        assert_eq!(config.detection.min_face_size, 48);
        assert_eq!(config.detection.min_neighbors, 5);
    }

    #[test]
    fn overrides_beat_file_values() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "input_dir = \"photos\"\ntarget_width = 800\n");
        let overrides = Overrides {
            input_dir: Some(PathBuf::from("cli-in")),
            target_height: Some(640),
            ..Overrides::default()
        };

        let config = load_config(Some(&path), &overrides).unwrap();
        assert_eq!(config.input_dir, PathBuf::from("cli-in"));
        assert_eq!(config.target(), Dimensions::new(800, 640));
        assert_eq!(config.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "target_width = [");
        let result = load_config(Some(&path), &Overrides::default());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn empty_overrides_serialize_to_empty_table() {
        let overlay = Overrides::default().to_overlay().unwrap();
        assert!(overlay.as_table().unwrap().is_empty());
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"target_width = 1024"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"target_width = 640"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("target_width").unwrap().as_integer(), Some(640));
    }

    #[test]
    fn merge_toml_table_merge_preserves_base_keys() {
        let base: toml::Value = toml::from_str(
            r#"
[detection]
scale_factor = 1.1
min_neighbors = 5
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[detection]
min_neighbors = 2
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let detection = merged.get("detection").unwrap();
        assert_eq!(detection.get("min_neighbors").unwrap().as_integer(), Some(2));
        assert_eq!(detection.get("scale_factor").unwrap().as_float(), Some(1.1));
    }

    #[test]
    fn merge_toml_three_layers() {
        let stock = stock_defaults_value().unwrap();
        let file: toml::Value = toml::from_str("output_dir = \"file-out\"").unwrap();
        let cli = Overrides {
            output_dir: Some(PathBuf::from("cli-out")),
            ..Overrides::default()
        }
        .to_overlay()
        .unwrap();

        let config = resolve_config(stock, [file, cli]).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("cli-out"));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<Config, _> = toml::from_str("output = \"x\"");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_nested_key_rejected() {
        let result: Result<Config, _> = toml::from_str(
            r#"
[detection]
min_neighbours = 3
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "taget_width = 10\n");
        let result = load_config(Some(&path), &Overrides::default());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_zero_target_dimension() {
        let config = Config {
            target_height: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_detection_params() {
        let mut config = Config::default();
        config.detection.scale_factor = 1.0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("scale_factor"));
    }

    #[test]
    fn load_config_validates_overrides() {
        let tmp = TempDir::new().unwrap();
        let overrides = Overrides {
            target_width: Some(0),
            ..Overrides::default()
        };
        let result = load_config_at(&tmp.path().join("absent.toml"), false, &overrides);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn require_classifier_checks_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cascade.xml");
        let config = Config {
            classifier_path: path.clone(),
            ..Config::default()
        };
        assert!(matches!(
            config.require_classifier(),
            Err(ConfigError::MissingClassifier(_))
        ));

        fs::write(&path, "<opencv_storage/>").unwrap();
        assert_eq!(config.require_classifier().unwrap(), path.as_path());
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: Config = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        assert!(content.contains("[detection]"));
        assert!(content.contains("classifier_path"));
        assert!(content.contains("target_height"));
    }

    #[test]
    fn stock_defaults_value_is_table() {
        let val = stock_defaults_value().unwrap();
        assert!(val.is_table());
        assert!(val.get("detection").is_some());
        assert!(val.get("input_dir").is_some());
    }
}
