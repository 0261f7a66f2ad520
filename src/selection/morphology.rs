//! Mask morphology: Dilate, Erode, Open, Close.
//!
//! All operations use a circular structuring element of the given radius.
//! Neighbors outside the image are skipped, which behaves like a replicated
//! border for min/max operations.

use ndarray::{Array2, ArrayView2};

use super::mask::Mask;
use crate::error::{FilterError, Result};

fn check_radius(radius: f32) -> Result<()> {
    if radius >= 0.0 && radius.is_finite() {
        Ok(())
    } else {
        Err(FilterError::invalid(
            "radius",
            format!("must be a non-negative number, got {radius}"),
        ))
    }
}

/// Offsets covered by a disk of the given radius.
fn disk_offsets(radius: f32) -> Vec<(isize, isize)> {
    let r_ceil = radius.ceil() as isize;
    let r_sq = radius * radius;
    let mut offsets = Vec::new();
    for dy in -r_ceil..=r_ceil {
        for dx in -r_ceil..=r_ceil {
            if (dx * dx + dy * dy) as f32 <= r_sq {
                offsets.push((dy, dx));
            }
        }
    }
    offsets
}

/// Visit the in-bounds neighbors of every pixel and combine them.
fn morph(mask: ArrayView2<bool>, radius: f32, any: bool) -> Array2<bool> {
    let (height, width) = mask.dim();
    let offsets = disk_offsets(radius);

    Array2::from_shape_fn((height, width), |(y, x)| {
        let mut neighbors = offsets.iter().filter_map(|&(dy, dx)| {
            let sy = y as isize + dy;
            let sx = x as isize + dx;
            if sy < 0 || sx < 0 || sy >= height as isize || sx >= width as isize {
                None
            } else {
                Some(mask[[sy as usize, sx as usize]])
            }
        });
        if any {
            neighbors.any(|v| v)
        } else {
            neighbors.all(|v| v)
        }
    })
}

/// Grow the kept region by `radius` pixels.
pub fn dilate_mask(mask: ArrayView2<bool>, radius: f32) -> Result<Mask> {
    check_radius(radius)?;
    Ok(morph(mask, radius, true))
}

/// Shrink the kept region by `radius` pixels.
pub fn erode_mask(mask: ArrayView2<bool>, radius: f32) -> Result<Mask> {
    check_radius(radius)?;
    Ok(morph(mask, radius, false))
}

/// Erode then dilate: removes specks smaller than the element.
pub fn open_mask(mask: ArrayView2<bool>, radius: f32) -> Result<Mask> {
    let eroded = erode_mask(mask, radius)?;
    dilate_mask(eroded.view(), radius)
}

/// Dilate then erode: fills holes smaller than the element.
pub fn close_mask(mask: ArrayView2<bool>, radius: f32) -> Result<Mask> {
    let dilated = dilate_mask(mask, radius)?;
    erode_mask(dilated.view(), radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::mask::circular_mask;

    fn count(mask: &Mask) -> usize {
        mask.iter().filter(|&&v| v).count()
    }

    #[test]
    fn test_dilate_single_pixel_gives_disk() {
        let seed = circular_mask(7, 7, (3.0, 3.0), 0.0).unwrap();
        let grown = dilate_mask(seed.view(), 2.0).unwrap();
        assert_eq!(grown, circular_mask(7, 7, (3.0, 3.0), 2.0).unwrap());
    }

    #[test]
    fn test_erode_removes_thin_line() {
        let mut mask = Array2::from_elem((5, 5), false);
        for x in 0..5 {
            mask[[2, x]] = true;
        }
        assert_eq!(count(&erode_mask(mask.view(), 1.0).unwrap()), 0);
    }

    #[test]
    fn test_open_removes_speck_keeps_blob() {
        let mut mask = circular_mask(12, 12, (4.0, 4.0), 3.0).unwrap();
        mask[[10, 10]] = true;

        let opened = open_mask(mask.view(), 1.0).unwrap();

        assert!(!opened[[10, 10]]);
        assert!(opened[[4, 4]]);
    }

    #[test]
    fn test_close_fills_hole() {
        let mut mask = Array2::from_elem((6, 6), true);
        mask[[3, 3]] = false;
        let closed = close_mask(mask.view(), 1.0).unwrap();
        assert_eq!(count(&closed), 36);
    }

    #[test]
    fn test_zero_radius_is_identity() {
        let mask = circular_mask(5, 5, (1.0, 2.0), 1.5).unwrap();
        assert_eq!(dilate_mask(mask.view(), 0.0).unwrap(), mask);
        assert_eq!(erode_mask(mask.view(), 0.0).unwrap(), mask);
    }

    #[test]
    fn test_negative_radius_rejected() {
        let mask = Array2::from_elem((2, 2), true);
        assert!(dilate_mask(mask.view(), -1.0).is_err());
    }
}
