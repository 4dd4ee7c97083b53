//! Pure Rust image backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, BMP, GIF) | `image::ImageReader` with content sniffing |
//! | Resize | `image::imageops::resize` with `Lanczos3` filter |
//! | Encode → WebP (lossless) | `image::codecs::webp::WebPEncoder::new_lossless` |

use super::backend::{BackendError, ImageBackend};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, ImageReader, RgbImage};
use std::path::Path;
use std::sync::LazyLock;

/// Extension of every file the pipeline writes.
pub const OUTPUT_EXTENSION: &str = "webp";

/// Extensions whose decoders are compiled in.
const INPUT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
    ("bmp", ImageFormat::Bmp),
    ("gif", ImageFormat::Gif),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    INPUT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// True if the path has an extension we can decode (case-insensitive).
pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Production backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    fn load(&self, path: &Path) -> Result<RgbImage, BackendError> {
        // Sniff the content rather than trusting the extension: renamed files
        // are common in photo dumps.
        let img = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| BackendError::Decode {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(img.into_rgb8())
    }

    fn resize(&self, img: &RgbImage, width: u32, height: u32) -> RgbImage {
        image::imageops::resize(img, width, height, FilterType::Lanczos3)
    }

    fn encode(&self, img: &RgbImage) -> Result<Vec<u8>, BackendError> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(BackendError::Encode(format!(
                "cannot encode an empty {width}x{height} raster"
            )));
        }

        let mut buf = Vec::new();
        WebPEncoder::new_lossless(&mut buf)
            .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
            .map_err(|e| BackendError::Encode(format!("WebP encode failed: {e}")))?;
        Ok(buf)
    }
}
