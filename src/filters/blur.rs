//! Gaussian blur.
//!
//! Separable 2-pass convolution over the color channels with a replicated
//! border. Alpha, if present, is preserved.

use ndarray::{Array3, ArrayView3};

use super::core::{check_image, gaussian_kernel_1d, resolve_gaussian, saturate_u8, separable_convolve};
use crate::error::Result;

/// Apply Gaussian blur.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `ksize` - Odd kernel size, or 0 to derive it from `sigma`
/// * `sigma` - Standard deviation, or <= 0 to derive it from `ksize`
///
/// # Returns
/// Blurred image with same dimensions
///
/// # Errors
/// `InvalidParameter` for an even kernel size, both parameters zero, or an
/// empty image.
pub fn gaussian_blur(input: ArrayView3<u8>, ksize: usize, sigma: f32) -> Result<Array3<u8>> {
    check_image(&input)?;
    let (ksize, sigma) = resolve_gaussian(ksize, sigma)?;
    Ok(gaussian_blur_f32(input, ksize, sigma).mapv(saturate_u8))
}

/// Gaussian blur without rounding, for callers that combine the result
/// with the source (unsharp masking). Parameters must already be resolved.
pub(crate) fn gaussian_blur_f32(input: ArrayView3<u8>, ksize: usize, sigma: f32) -> Array3<f32> {
    let kernel = gaussian_kernel_1d(ksize, sigma);
    separable_convolve(input, &kernel)
}
