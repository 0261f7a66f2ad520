//! Cropping and resizing.
//!
//! These are the only operations that change height and width. Channel
//! count is always preserved.
//!
//! ## Coordinates
//!
//! `x` runs along the width axis, `y` along the height axis, both starting
//! at the top-left pixel. Resizing maps pixel centers:
//! `src = (dst + 0.5) * (src_len / dst_len) - 0.5`.

use ndarray::{s, Array3, ArrayView3};
use serde::{Deserialize, Serialize};

use super::core::{check_image, saturate_u8};
use crate::error::{FilterError, Result};

/// Rectangular region of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Roi {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the rectangle lies fully inside an image of the given size.
    pub fn fits(&self, height: usize, width: usize) -> bool {
        let right = self.x.checked_add(self.width);
        let bottom = self.y.checked_add(self.height);
        self.width > 0
            && self.height > 0
            && right.is_some_and(|r| r <= width)
            && bottom.is_some_and(|b| b <= height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    Nearest,
    #[default]
    Bilinear,
}

/// Cut a rectangular region out of an image.
///
/// # Arguments
/// * `input` - Image (H, W, C)
/// * `roi` - Region to keep
///
/// # Returns
/// Image of shape (roi.height, roi.width, C)
///
/// # Errors
/// `InvalidParameter` if the region is empty or extends past the image.
pub fn crop(input: ArrayView3<u8>, roi: Roi) -> Result<Array3<u8>> {
    check_image(&input)?;
    let (height, width, _) = input.dim();
    if !roi.fits(height, width) {
        return Err(FilterError::invalid(
            "roi",
            format!("{roi:?} does not fit inside a {height}x{width} image"),
        ));
    }

    Ok(input
        .slice(s![roi.y..roi.y + roi.height, roi.x..roi.x + roi.width, ..])
        .to_owned())
}

/// Resize an image.
///
/// # Arguments
/// * `input` - Image (H, W, C)
/// * `new_height` - Target height (> 0)
/// * `new_width` - Target width (> 0)
/// * `interpolation` - Sampling method
///
/// # Returns
/// Image of shape (new_height, new_width, C)
pub fn resize(
    input: ArrayView3<u8>,
    new_height: usize,
    new_width: usize,
    interpolation: Interpolation,
) -> Result<Array3<u8>> {
    check_image(&input)?;
    if new_height == 0 || new_width == 0 {
        return Err(FilterError::invalid(
            "size",
            format!("target size must be non-zero, got {new_height}x{new_width}"),
        ));
    }

    let (height, width, channels) = input.dim();
    if (height, width) == (new_height, new_width) {
        return Ok(input.to_owned());
    }

    let scale_y = height as f32 / new_height as f32;
    let scale_x = width as f32 / new_width as f32;
    let mut output = Array3::<u8>::zeros((new_height, new_width, channels));

    match interpolation {
        Interpolation::Nearest => {
            for y in 0..new_height {
                let sy = (((y as f32 + 0.5) * scale_y) as usize).min(height - 1);
                for x in 0..new_width {
                    let sx = (((x as f32 + 0.5) * scale_x) as usize).min(width - 1);
                    for c in 0..channels {
                        output[[y, x, c]] = input[[sy, sx, c]];
                    }
                }
            }
        }
        Interpolation::Bilinear => {
            for y in 0..new_height {
                let fy = ((y as f32 + 0.5) * scale_y - 0.5).clamp(0.0, (height - 1) as f32);
                let y0 = fy.floor() as usize;
                let y1 = (y0 + 1).min(height - 1);
                let wy = fy - y0 as f32;

                for x in 0..new_width {
                    let fx = ((x as f32 + 0.5) * scale_x - 0.5).clamp(0.0, (width - 1) as f32);
                    let x0 = fx.floor() as usize;
                    let x1 = (x0 + 1).min(width - 1);
                    let wx = fx - x0 as f32;

                    for c in 0..channels {
                        let top = input[[y0, x0, c]] as f32 * (1.0 - wx) + input[[y0, x1, c]] as f32 * wx;
                        let bottom =
                            input[[y1, x0, c]] as f32 * (1.0 - wx) + input[[y1, x1, c]] as f32 * wx;
                        output[[y, x, c]] = saturate_u8(top * (1.0 - wy) + bottom * wy);
                    }
                }
            }
        }
    }

    Ok(output)
}
