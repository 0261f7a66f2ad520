//! Core utilities shared by the neighborhood filters.
//!
//! - Gaussian kernel generation and parameter resolution
//! - Border handling (replicate / clamp-to-edge)
//! - Separable convolution into an f32 buffer
//! - 3x3 integer convolution

use ndarray::{Array3, ArrayView3};

use crate::error::{FilterError, Result};

/// Largest neighborhood side length any filter accepts.
pub const MAX_KERNEL_SIZE: usize = 1023;

/// Reject a window side length above [`MAX_KERNEL_SIZE`].
pub fn check_kernel_size(name: &'static str, size: usize) -> Result<()> {
    if size > MAX_KERNEL_SIZE {
        return Err(FilterError::invalid(
            name,
            format!("window of {size} pixels exceeds the limit of {MAX_KERNEL_SIZE}"),
        ));
    }
    Ok(())
}

/// Number of channels a filter should touch.
///
/// The fourth channel of an RGBA image is alpha and passes through unchanged.
#[inline]
pub fn color_channels(channels: usize) -> usize {
    if channels == 4 {
        3
    } else {
        channels
    }
}

/// Clamp a signed coordinate into `0..len` (replicate border).
#[inline]
pub fn clamp_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}

/// Sigma used when the caller passes a non-positive sigma for a given size.
#[inline]
pub fn sigma_for_size(ksize: usize) -> f32 {
    0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Kernel size covering about 6 sigma, always odd.
///
/// Saturates for huge sigma; callers bound the result with
/// [`check_kernel_size`].
#[inline]
pub fn size_for_sigma(sigma: f32) -> usize {
    ((sigma * 6.0).ceil() as usize) | 1
}

/// Resolve a (ksize, sigma) pair the way callers usually specify it.
///
/// Either value may be left at zero and is then derived from the other.
///
/// # Errors
/// `InvalidParameter` if the size is even, both values are zero, or the
/// resulting kernel is larger than [`MAX_KERNEL_SIZE`].
pub fn resolve_gaussian(ksize: usize, sigma: f32) -> Result<(usize, f32)> {
    if !sigma.is_finite() {
        return Err(FilterError::invalid("sigma", "must be finite"));
    }
    match (ksize, sigma > 0.0) {
        (0, false) => Err(FilterError::invalid(
            "ksize",
            "kernel size and sigma cannot both be zero",
        )),
        (0, true) => {
            let k = size_for_sigma(sigma);
            check_kernel_size("sigma", k)?;
            Ok((k, sigma))
        }
        (k, _) if k % 2 == 0 => Err(FilterError::invalid(
            "ksize",
            format!("kernel size must be odd, got {k}"),
        )),
        (k, positive) => {
            check_kernel_size("ksize", k)?;
            Ok((k, if positive { sigma } else { sigma_for_size(k) }))
        }
    }
}

/// Generate a normalized 1D Gaussian kernel of odd length `ksize`.
pub fn gaussian_kernel_1d(ksize: usize, sigma: f32) -> Vec<f32> {
    if ksize <= 1 || sigma <= 0.0 {
        return vec![1.0];
    }
    let half = ksize / 2;

    let mut kernel: Vec<f32> = (0..ksize)
        .map(|i| {
            let x = i as f32 - half as f32;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    // Normalize
    let sum: f32 = kernel.iter().sum();
    for v in kernel.iter_mut() {
        *v /= sum;
    }

    kernel
}

/// Separable convolution of the color channels with a 1D kernel.
///
/// Alpha (if present) is copied as-is. The result stays in f32 so callers
/// can combine it with the source before rounding.
pub fn separable_convolve(input: ArrayView3<u8>, kernel: &[f32]) -> Array3<f32> {
    let (height, width, channels) = input.dim();
    let half = kernel.len() / 2;
    let color = color_channels(channels);

    let mut temp = Array3::<f32>::zeros((height, width, channels));
    let mut result = Array3::<f32>::zeros((height, width, channels));

    // Horizontal pass
    for y in 0..height {
        for x in 0..width {
            for c in 0..color {
                let mut sum = 0.0f32;
                for (ki, &kv) in kernel.iter().enumerate() {
                    let sx = clamp_index(x as isize + ki as isize - half as isize, width);
                    sum += input[[y, sx, c]] as f32 * kv;
                }
                temp[[y, x, c]] = sum;
            }
        }
    }

    // Vertical pass
    for y in 0..height {
        for x in 0..width {
            for c in 0..color {
                let mut sum = 0.0f32;
                for (ki, &kv) in kernel.iter().enumerate() {
                    let sy = clamp_index(y as isize + ki as isize - half as isize, height);
                    sum += temp[[sy, x, c]] * kv;
                }
                result[[y, x, c]] = sum;
            }
            if channels == 4 {
                result[[y, x, 3]] = input[[y, x, 3]] as f32;
            }
        }
    }

    result
}

/// Convolve one channel at (y, x) with a 3x3 integer kernel.
#[inline]
pub fn convolve_3x3_at(
    input: ArrayView3<u8>,
    y: usize,
    x: usize,
    c: usize,
    kernel: &[[i32; 3]; 3],
) -> i32 {
    let (height, width, _) = input.dim();
    let mut sum = 0i32;
    for (ky, row) in kernel.iter().enumerate() {
        let sy = clamp_index(y as isize + ky as isize - 1, height);
        for (kx, &kv) in row.iter().enumerate() {
            let sx = clamp_index(x as isize + kx as isize - 1, width);
            sum += input[[sy, sx, c]] as i32 * kv;
        }
    }
    sum
}

/// Round and saturate an f32 sample into the u8 range.
#[inline]
pub fn saturate_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Reject images with a zero-sized axis or unsupported channel count.
pub fn check_image(input: &ArrayView3<u8>) -> Result<()> {
    let (height, width, channels) = input.dim();
    if height == 0 || width == 0 {
        return Err(FilterError::invalid(
            "image",
            format!("image must be non-empty, got {height}x{width}"),
        ));
    }
    if !matches!(channels, 1 | 3 | 4) {
        return Err(FilterError::invalid(
            "image",
            format!("expected 1, 3 or 4 channels, got {channels}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_kernel_normalized() {
        let kernel = gaussian_kernel_1d(5, 1.0);
        assert_eq!(kernel.len(), 5);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        // Symmetric, peak in the middle
        assert!((kernel[0] - kernel[4]).abs() < 1e-6);
        assert!(kernel[2] > kernel[1]);
    }

    #[test]
    fn test_resolve_gaussian() {
        assert_eq!(resolve_gaussian(0, 1.0).unwrap(), (7, 1.0));
        let (k, s) = resolve_gaussian(3, 0.0).unwrap();
        assert_eq!(k, 3);
        assert!((s - 0.8).abs() < 1e-6);
        assert!(resolve_gaussian(4, 1.0).is_err());
        assert!(resolve_gaussian(0, 0.0).is_err());
        assert!(resolve_gaussian(3, f32::NAN).is_err());
    }

    #[test]
    fn test_resolve_gaussian_rejects_oversized_kernel() {
        assert!(resolve_gaussian(MAX_KERNEL_SIZE, 0.0).is_ok());
        assert!(matches!(
            resolve_gaussian(MAX_KERNEL_SIZE + 2, 0.0),
            Err(FilterError::InvalidParameter { name: "ksize", .. })
        ));
        assert!(matches!(
            resolve_gaussian(usize::MAX, 1.0),
            Err(FilterError::InvalidParameter { name: "ksize", .. })
        ));
        assert!(matches!(
            resolve_gaussian(0, 1e30),
            Err(FilterError::InvalidParameter { name: "sigma", .. })
        ));
    }

    #[test]
    fn test_clamp_index_replicates_border() {
        assert_eq!(clamp_index(-2, 5), 0);
        assert_eq!(clamp_index(7, 5), 4);
        assert_eq!(clamp_index(3, 5), 3);
    }

    #[test]
    fn test_separable_convolve_preserves_alpha() {
        let mut img = Array3::<u8>::zeros((3, 3, 4));
        img[[1, 1, 0]] = 255;
        img[[1, 1, 3]] = 77;
        let out = separable_convolve(img.view(), &gaussian_kernel_1d(3, 1.0));
        assert_eq!(out[[1, 1, 3]], 77.0);
        assert_eq!(out[[0, 0, 3]], 0.0);
        assert!(out[[1, 1, 0]] < 255.0);
    }

    #[test]
    fn test_check_image() {
        assert!(check_image(&Array3::<u8>::zeros((0, 3, 3)).view()).is_err());
        assert!(check_image(&Array3::<u8>::zeros((2, 2, 2)).view()).is_err());
        assert!(check_image(&Array3::<u8>::zeros((2, 2, 1)).view()).is_ok());
    }
}
