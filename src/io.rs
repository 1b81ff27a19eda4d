//! Convenience helpers for loading and saving images via the `image` crate.

use std::path::Path;

use image::{RgbImage, RgbaImage};

use crate::util::{DeepMatchError, DeepMatchResult};

/// Loads an image from disk and converts it to RGB.
pub fn load_rgb_image<P: AsRef<Path>>(path: P) -> DeepMatchResult<RgbImage> {
    let img = image::open(path).map_err(|err| DeepMatchError::ImageIo {
        reason: err.to_string(),
    })?;
    Ok(img.to_rgb8())
}

/// Saves an RGB image, inferring the format from the file extension.
pub fn save_rgb_image<P: AsRef<Path>>(path: P, img: &RgbImage) -> DeepMatchResult<()> {
    img.save(path).map_err(|err| DeepMatchError::ImageIo {
        reason: err.to_string(),
    })
}

/// Saves an RGBA image, inferring the format from the file extension.
pub fn save_rgba_image<P: AsRef<Path>>(path: P, img: &RgbaImage) -> DeepMatchResult<()> {
    img.save(path).map_err(|err| DeepMatchError::ImageIo {
        reason: err.to_string(),
    })
}
