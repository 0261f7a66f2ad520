//! Denoising filters: Median and Bilateral.
//!
//! Both operate per channel on the color channels with a replicated border;
//! alpha is preserved. Rows are computed in parallel with rayon.
//!
//! ## Supported Formats
//!
//! - **Grayscale**: (height, width, 1)
//! - **RGB**: (height, width, 3)
//! - **RGBA**: (height, width, 4) - RGB filtered, alpha copied

use ndarray::{Array3, ArrayView3, Axis};
use rayon::prelude::*;

use super::core::{
    check_image, check_kernel_size, clamp_index, color_channels, saturate_u8, MAX_KERNEL_SIZE,
};
use crate::error::{FilterError, Result};

/// Assemble an image from independently computed rows.
fn from_rows(rows: Vec<Vec<u8>>, height: usize, width: usize, channels: usize) -> Array3<u8> {
    let mut output = Array3::<u8>::zeros((height, width, channels));
    for (mut dst, row) in output.axis_iter_mut(Axis(0)).zip(rows) {
        for (d, v) in dst.iter_mut().zip(row) {
            *d = v;
        }
    }
    output
}

// ============================================================================
// Median Filter
// ============================================================================

/// Apply median filter.
///
/// Removes salt-and-pepper noise while keeping edges sharper than a blur.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `ksize` - Odd side length of the square neighborhood
///
/// # Returns
/// Median-filtered image with same dimensions
///
/// # Errors
/// `InvalidParameter` if `ksize` is zero, even, or above
/// [`MAX_KERNEL_SIZE`].
pub fn median_blur(input: ArrayView3<u8>, ksize: usize) -> Result<Array3<u8>> {
    check_image(&input)?;
    if ksize == 0 || ksize % 2 == 0 {
        return Err(FilterError::invalid(
            "ksize",
            format!("median window must be odd and positive, got {ksize}"),
        ));
    }
    check_kernel_size("ksize", ksize)?;
    if ksize == 1 {
        return Ok(input.to_owned());
    }

    let (height, width, channels) = input.dim();
    let radius = (ksize / 2) as isize;
    let color = color_channels(channels);

    let rows: Vec<Vec<u8>> = (0..height)
        .into_par_iter()
        .map(|y| {
            let mut row = Vec::with_capacity(width * channels);
            let mut values: Vec<u8> = Vec::with_capacity(ksize * ksize);
            for x in 0..width {
                for c in 0..channels {
                    if c >= color {
                        row.push(input[[y, x, c]]);
                        continue;
                    }
                    values.clear();
                    for dy in -radius..=radius {
                        let sy = clamp_index(y as isize + dy, height);
                        for dx in -radius..=radius {
                            let sx = clamp_index(x as isize + dx, width);
                            values.push(input[[sy, sx, c]]);
                        }
                    }
                    let mid = values.len() / 2;
                    let (_, median, _) = values.select_nth_unstable(mid);
                    row.push(*median);
                }
            }
            row
        })
        .collect();

    Ok(from_rows(rows, height, width, channels))
}

// ============================================================================
// Bilateral Filter
// ============================================================================

/// Apply bilateral filter.
///
/// Each neighbor is weighted by a spatial Gaussian on its distance from the
/// center and a range Gaussian on its color difference (mean absolute difference
/// across the color channels), so flat regions are smoothed while strong edges survive.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `diameter` - Neighborhood diameter; <= 0 derives a radius of
///   `round(1.5 * sigma_space)`, at least 1. A diameter of 1 leaves the
///   image unchanged.
/// * `sigma_color` - Range sigma in sample units (> 0)
/// * `sigma_space` - Spatial sigma in pixels (> 0)
///
/// # Returns
/// Filtered image with same dimensions
///
/// # Errors
/// `InvalidParameter` for non-positive sigmas or a window wider than
/// [`MAX_KERNEL_SIZE`].
pub fn bilateral_filter(
    input: ArrayView3<u8>,
    diameter: i32,
    sigma_color: f32,
    sigma_space: f32,
) -> Result<Array3<u8>> {
    check_image(&input)?;
    if !(sigma_color > 0.0 && sigma_color.is_finite()) {
        return Err(FilterError::invalid(
            "sigma_color",
            format!("must be positive, got {sigma_color}"),
        ));
    }
    if !(sigma_space > 0.0 && sigma_space.is_finite()) {
        return Err(FilterError::invalid(
            "sigma_space",
            format!("must be positive, got {sigma_space}"),
        ));
    }

    let radius = if diameter <= 0 {
        let derived = (sigma_space * 1.5).round().max(1.0);
        if derived > (MAX_KERNEL_SIZE / 2) as f32 {
            return Err(FilterError::invalid(
                "sigma_space",
                format!("derived radius {derived} exceeds the window limit of {MAX_KERNEL_SIZE}"),
            ));
        }
        derived as isize
    } else {
        check_kernel_size("diameter", diameter as usize)?;
        (diameter / 2) as isize
    };

    let (height, width, channels) = input.dim();
    let color = color_channels(channels);

    let space_coeff = -0.5 / (sigma_space * sigma_space);
    let color_coeff = -0.5 / (sigma_color * sigma_color);

    // Spatial weights within the circular window; None outside it.
    let side = (2 * radius + 1) as usize;
    let mut space_weights: Vec<Option<f32>> = Vec::with_capacity(side * side);
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let r2 = (dy * dy + dx * dx) as f32;
            space_weights.push(if r2.sqrt() > radius as f32 {
                None
            } else {
                Some((r2 * space_coeff).exp())
            });
        }
    }

    // Range weights indexed by L1 color distance.
    let color_lut: Vec<f32> = (0..=255 * color)
        .map(|d| {
            let d = d as f32 / color as f32;
            (d * d * color_coeff).exp()
        })
        .collect();

    let rows: Vec<Vec<u8>> = (0..height)
        .into_par_iter()
        .map(|y| {
            let mut row = Vec::with_capacity(width * channels);
            let mut sum = vec![0.0f32; color];
            for x in 0..width {
                sum.iter_mut().for_each(|s| *s = 0.0);
                let mut weight_sum = 0.0f32;

                let mut idx = 0;
                for dy in -radius..=radius {
                    let sy = clamp_index(y as isize + dy, height);
                    for dx in -radius..=radius {
                        let w_space = space_weights[idx];
                        idx += 1;
                        let Some(w_space) = w_space else { continue };
                        let sx = clamp_index(x as isize + dx, width);

                        let dist: usize = (0..color)
                            .map(|c| {
                                (input[[sy, sx, c]] as i32 - input[[y, x, c]] as i32).unsigned_abs()
                                    as usize
                            })
                            .sum();
                        let w = w_space * color_lut[dist];

                        for (c, s) in sum.iter_mut().enumerate() {
                            *s += input[[sy, sx, c]] as f32 * w;
                        }
                        weight_sum += w;
                    }
                }

                for c in 0..channels {
                    if c < color && weight_sum > 0.0 {
                        row.push(saturate_u8(sum[c] / weight_sum));
                    } else {
                        row.push(input[[y, x, c]]);
                    }
                }
            }
            row
        })
        .collect();

    Ok(from_rows(rows, height, width, channels))
}
