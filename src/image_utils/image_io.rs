use image::{self, ImageError, ImageResult, RgbImage};
use std::fs;
use std::path::Path;

/// Extensions accepted for uploaded X-rays.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Decodes an uploaded file into an RGB raster, rejecting data that is not an image or has no
/// pixels.
pub fn decode_image_bytes(bytes: &[u8]) -> ImageResult<RgbImage> {
    let img = image::load_from_memory(bytes)?.into_rgb8();
    reject_empty(img)
}

pub fn read_image_as_rgb8(filepath: &Path) -> ImageResult<RgbImage> {
    let img = image::open(filepath)?.into_rgb8();
    reject_empty(img)
}

/// Saves an image, creating the parent directory when needed. The format follows the file
/// extension.
pub fn save_image(image: &RgbImage, filepath: &Path) -> ImageResult<()> {
    if let Some(parent) = filepath.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(ImageError::IoError)?;
        }
    }
    image.save(filepath)
}

fn reject_empty(img: RgbImage) -> ImageResult<RgbImage> {
    if img.width() == 0 || img.height() == 0 {
        return Err(ImageError::Limits(image::error::LimitError::from_kind(
            image::error::LimitErrorKind::DimensionError,
        )));
    }
    Ok(img)
}
