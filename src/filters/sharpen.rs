//! Sharpen filters: Unsharp Mask, Laplacian.
//!
//! Both act on each color channel independently and saturate to 0-255.
//!
//! ## Supported Formats
//!
//! - **Grayscale**: (height, width, 1) - processes the single channel
//! - **RGB**: (height, width, 3) - processes all 3 channels
//! - **RGBA**: (height, width, 4) - processes RGB, preserves alpha

use ndarray::{Array3, ArrayView3};
use serde::{Deserialize, Serialize};

use super::blur::gaussian_blur_f32;
use super::core::{check_image, color_channels, convolve_3x3_at, resolve_gaussian, saturate_u8};
use crate::error::{FilterError, Result};

// ============================================================================
// Unsharp Mask
// ============================================================================

/// Parameters for [`unsharp_mask`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnsharpParams {
    /// Odd Gaussian kernel size, 0 to derive from `sigma`
    pub ksize: usize,
    /// Gaussian sigma, <= 0 to derive from `ksize`
    pub sigma: f32,
    /// Gain applied to the detail layer (>= 0)
    pub amount: f32,
    /// Detail at or below this magnitude is left alone
    pub threshold: u8,
}

impl Default for UnsharpParams {
    fn default() -> Self {
        Self {
            ksize: 5,
            sigma: 1.0,
            amount: 1.0,
            threshold: 0,
        }
    }
}

/// Apply unsharp mask.
///
/// `out = clamp(image + amount * (image - gaussian(image)))`
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `params` - Blur size, gain and threshold
///
/// # Returns
/// Sharpened image with same dimensions
///
/// # Errors
/// `InvalidParameter` for a negative or non-finite amount, or invalid blur
/// parameters.
pub fn unsharp_mask(input: ArrayView3<u8>, params: &UnsharpParams) -> Result<Array3<u8>> {
    check_image(&input)?;
    if !(params.amount >= 0.0 && params.amount.is_finite()) {
        return Err(FilterError::invalid(
            "amount",
            format!("must be non-negative, got {}", params.amount),
        ));
    }
    let (ksize, sigma) = resolve_gaussian(params.ksize, params.sigma)?;

    let (height, width, channels) = input.dim();
    let mut output = input.to_owned();
    if params.amount == 0.0 {
        return Ok(output);
    }

    let blurred = gaussian_blur_f32(input, ksize, sigma);
    let color = color_channels(channels);
    let threshold = params.threshold as f32;

    for y in 0..height {
        for x in 0..width {
            for c in 0..color {
                let orig = input[[y, x, c]] as f32;
                let diff = orig - blurred[[y, x, c]];

                if diff.abs() > threshold {
                    output[[y, x, c]] = saturate_u8(orig + diff * params.amount);
                }
            }
        }
    }

    Ok(output)
}

// ============================================================================
// Laplacian
// ============================================================================

/// The two common 3x3 discrete Laplacians.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaplacianKernel {
    /// `[[0, 1, 0], [1, -4, 1], [0, 1, 0]]`
    #[default]
    FourNeighbor,
    /// `[[-1, -1, -1], [-1, 8, -1], [-1, -1, -1]]`
    EightNeighbor,
}

impl LaplacianKernel {
    pub fn weights(self) -> [[i32; 3]; 3] {
        match self {
            LaplacianKernel::FourNeighbor => [[0, 1, 0], [1, -4, 1], [0, 1, 0]],
            LaplacianKernel::EightNeighbor => [[-1, -1, -1], [-1, 8, -1], [-1, -1, -1]],
        }
    }

    /// Sign that turns the kernel response into an edge-brightening term.
    ///
    /// A negative center means the response is negative on the bright side
    /// of an edge, so it has to be subtracted.
    pub fn sharpen_sign(self) -> i32 {
        if self.weights()[1][1] < 0 {
            -1
        } else {
            1
        }
    }
}

/// Sharpen by adding the (sign-corrected) Laplacian response.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `kernel` - Which 3x3 Laplacian to use
///
/// # Returns
/// Sharpened image with same dimensions. Flat regions are unchanged; across
/// an edge the bright side gets brighter and the dark side darker.
pub fn laplacian_sharpen(input: ArrayView3<u8>, kernel: LaplacianKernel) -> Result<Array3<u8>> {
    check_image(&input)?;

    let (height, width, channels) = input.dim();
    let weights = kernel.weights();
    let sign = kernel.sharpen_sign();
    let color = color_channels(channels);
    let mut output = input.to_owned();

    for y in 0..height {
        for x in 0..width {
            for c in 0..color {
                let response = convolve_3x3_at(input, y, x, c, &weights);
                let v = input[[y, x, c]] as i32 + sign * response;
                output[[y, x, c]] = v.clamp(0, 255) as u8;
            }
        }
    }

    Ok(output)
}

/// Raw Laplacian magnitude, for visualizing edges.
///
/// Output is `|response|` saturated to 255, per channel.
pub fn laplacian_response(input: ArrayView3<u8>, kernel: LaplacianKernel) -> Result<Array3<u8>> {
    check_image(&input)?;

    let (height, width, channels) = input.dim();
    let weights = kernel.weights();
    let color = color_channels(channels);
    let mut output = input.to_owned();

    for y in 0..height {
        for x in 0..width {
            for c in 0..color {
                let response = convolve_3x3_at(input, y, x, c, &weights);
                output[[y, x, c]] = response.unsigned_abs().min(255) as u8;
            }
        }
    }

    Ok(output)
}
