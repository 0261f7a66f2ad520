//! Noise synthesis: Salt-and-Pepper, Gaussian.
//!
//! Used to produce reproducible noisy inputs for the denoising filters.
//! Both generators are deterministic for a given seed. Alpha is preserved.

use ndarray::{Array3, ArrayView3};

use super::core::{check_image, color_channels, saturate_u8};
use crate::error::{FilterError, Result};

// ============================================================================
// Simple RNG (deterministic across platforms)
// ============================================================================

/// Linear congruential generator with MINSTD parameters.
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        SimpleRng {
            state: seed.wrapping_add(1), // Avoid zero
        }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(48271).wrapping_add(1) % 2147483647;
        self.state as u32
    }

    /// Uniform f32 in [0, 1).
    fn next_f32(&mut self) -> f32 {
        unit_f32(self.next_u32())
    }

    /// Standard normal sample via Box-Muller.
    fn next_gaussian(&mut self) -> f32 {
        let u1 = self.next_f32().max(1e-10);
        let u2 = self.next_f32();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos()
    }
}

/// Map a MINSTD output (< 2^31) onto [0, 1) using the top 24 bits, which
/// f32 represents exactly.
#[inline]
fn unit_f32(v: u32) -> f32 {
    (v >> 7) as f32 / (1u32 << 24) as f32
}

// ============================================================================
// Salt and Pepper
// ============================================================================

/// Add impulse noise.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `density` - Fraction of pixels to corrupt (0.0-1.0)
/// * `seed` - Random seed
///
/// # Returns
/// Noisy image; corrupted pixels are 0 or 255 on every color channel
pub fn add_salt_and_pepper(input: ArrayView3<u8>, density: f32, seed: u64) -> Result<Array3<u8>> {
    check_image(&input)?;
    if !(0.0..=1.0).contains(&density) {
        return Err(FilterError::invalid(
            "density",
            format!("must lie in [0, 1], got {density}"),
        ));
    }

    let (height, width, channels) = input.dim();
    let color = color_channels(channels);
    let mut output = input.to_owned();
    let mut rng = SimpleRng::new(seed);

    for y in 0..height {
        for x in 0..width {
            if rng.next_f32() >= density {
                continue;
            }
            let value = if rng.next_f32() < 0.5 { 0 } else { 255 };
            for c in 0..color {
                output[[y, x, c]] = value;
            }
        }
    }

    Ok(output)
}

// ============================================================================
// Gaussian Noise
// ============================================================================

/// Add zero-mean Gaussian noise, independently per channel.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `sigma` - Standard deviation in sample units (>= 0)
/// * `seed` - Random seed
pub fn add_gaussian_noise(input: ArrayView3<u8>, sigma: f32, seed: u64) -> Result<Array3<u8>> {
    check_image(&input)?;
    if !(sigma >= 0.0 && sigma.is_finite()) {
        return Err(FilterError::invalid(
            "sigma",
            format!("must be non-negative, got {sigma}"),
        ));
    }

    let (height, width, channels) = input.dim();
    let color = color_channels(channels);
    let mut output = input.to_owned();
    let mut rng = SimpleRng::new(seed);

    for y in 0..height {
        for x in 0..width {
            for c in 0..color {
                let v = input[[y, x, c]] as f32 + rng.next_gaussian() * sigma;
                output[[y, x, c]] = saturate_u8(v);
            }
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_rgba(h: usize, w: usize) -> Array3<u8> {
        let mut img = Array3::<u8>::from_elem((h, w, 4), 128);
        for y in 0..h {
            for x in 0..w {
                img[[y, x, 3]] = 255;
            }
        }
        img
    }

    #[test]
    fn test_salt_and_pepper_deterministic() {
        let img = gray_rgba(8, 8);
        let a = add_salt_and_pepper(img.view(), 0.2, 7).unwrap();
        let b = add_salt_and_pepper(img.view(), 0.2, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_salt_and_pepper_density_bounds() {
        let img = gray_rgba(6, 6);
        assert_eq!(add_salt_and_pepper(img.view(), 0.0, 1).unwrap(), img);

        let full = add_salt_and_pepper(img.view(), 1.0, 1).unwrap();
        for y in 0..6 {
            for x in 0..6 {
                let v = full[[y, x, 0]];
                assert!(v == 0 || v == 255);
                assert_eq!(full[[y, x, 1]], v);
                assert_eq!(full[[y, x, 3]], 255);
            }
        }

        assert!(add_salt_and_pepper(img.view(), 1.5, 1).is_err());
    }

    #[test]
    fn test_unit_f32_stays_below_one() {
        assert_eq!(unit_f32(0), 0.0);
        assert!(unit_f32(2147483646) < 1.0);
        assert!(unit_f32(u32::MAX >> 1) < 1.0);
    }

    #[test]
    fn test_full_density_corrupts_every_pixel() {
        let img = Array3::<u8>::from_elem((16, 16, 1), 128);
        for seed in 0..32 {
            let out = add_salt_and_pepper(img.view(), 1.0, seed).unwrap();
            assert!(out.iter().all(|&v| v == 0 || v == 255), "seed {seed}");
        }
    }

    #[test]
    fn test_gaussian_noise_changes_values() {
        let img = gray_rgba(5, 5);
        let result = add_gaussian_noise(img.view(), 10.0, 42).unwrap();

        let has_change = (0..5).any(|y| (0..5).any(|x| result[[y, x, 0]] != 128));
        assert!(has_change);
        assert!((0..5).all(|y| (0..5).all(|x| result[[y, x, 3]] == 255)));
    }

    #[test]
    fn test_gaussian_noise_zero_sigma_is_identity() {
        let img = gray_rgba(3, 3);
        assert_eq!(add_gaussian_noise(img.view(), 0.0, 9).unwrap(), img);
    }
}
