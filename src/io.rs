//! Image file I/O.
//!
//! - `load_image`: decode a JPEG/PNG into an (H, W, 3) RGB array.
//! - `load_grayscale`: decode into an (H, W, 1) luma array.
//! - `save_image`: encode a 1, 3 or 4 channel array; the format follows the
//!   file extension.

use std::fs;
use std::path::Path;

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use log::debug;
use ndarray::{Array3, ArrayView3};

use crate::error::{FilterError, Result};

fn decode(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|source| FilterError::Image {
        path: path.to_path_buf(),
        source,
    })
}

fn to_array(height: u32, width: u32, channels: usize, raw: Vec<u8>) -> Result<Array3<u8>> {
    Array3::from_shape_vec((height as usize, width as usize, channels), raw)
        .map_err(|e| FilterError::invalid("image", e.to_string()))
}

/// Load an image from disk as 8-bit RGB.
pub fn load_image(path: &Path) -> Result<Array3<u8>> {
    let img = decode(path)?.into_rgb8();
    let (width, height) = img.dimensions();
    debug!("loaded {} ({width}x{height} rgb)", path.display());
    to_array(height, width, 3, img.into_raw())
}

/// Load an image from disk as 8-bit grayscale.
pub fn load_grayscale(path: &Path) -> Result<Array3<u8>> {
    let img = decode(path)?.into_luma8();
    let (width, height) = img.dimensions();
    debug!("loaded {} ({width}x{height} gray)", path.display());
    to_array(height, width, 1, img.into_raw())
}

/// Save a 1, 3 or 4 channel image, creating parent directories.
pub fn save_image(image: ArrayView3<u8>, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;

    let (height, width, channels) = image.dim();
    let (w, h) = (width as u32, height as u32);
    let raw: Vec<u8> = image.iter().copied().collect();
    let buffer_error = || FilterError::invalid("image", format!("cannot encode {height}x{width}x{channels}"));

    let dynamic = match channels {
        1 => DynamicImage::ImageLuma8(GrayImage::from_raw(w, h, raw).ok_or_else(buffer_error)?),
        3 => DynamicImage::ImageRgb8(RgbImage::from_raw(w, h, raw).ok_or_else(buffer_error)?),
        4 => DynamicImage::ImageRgba8(RgbaImage::from_raw(w, h, raw).ok_or_else(buffer_error)?),
        _ => {
            return Err(FilterError::invalid(
                "image",
                format!("expected 1, 3 or 4 channels, got {channels}"),
            ))
        }
    };

    dynamic.save(path).map_err(|source| FilterError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("saved {} ({width}x{height}x{channels})", path.display());
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| FilterError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}
