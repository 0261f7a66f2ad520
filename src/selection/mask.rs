//! Boolean pixel masks.
//!
//! A [`Mask`] has shape (height, width). `true` marks a pixel to keep,
//! `false` a pixel that [`apply_mask`] replaces with the fill value.

use ndarray::{Array2, Array3, ArrayView2, ArrayView3};

use crate::error::{FilterError, Result};
use crate::filters::geometry::Roi;

pub type Mask = Array2<bool>;

/// Disk-shaped mask.
///
/// A pixel at column `x`, row `y` is `true` when
/// `(x - cx)^2 + (y - cy)^2 <= radius^2`; the boundary is included. Circles
/// extending past the image are clipped, so a center outside the image is
/// valid and may produce an all-`false` mask.
///
/// # Arguments
/// * `height`, `width` - Mask dimensions
/// * `center` - `(cx, cy)` in pixel coordinates
/// * `radius` - Radius in pixels (>= 0)
///
/// # Errors
/// `InvalidParameter` for a negative or non-finite radius or center.
pub fn circular_mask(height: usize, width: usize, center: (f32, f32), radius: f32) -> Result<Mask> {
    if !(radius >= 0.0 && radius.is_finite()) {
        return Err(FilterError::invalid(
            "radius",
            format!("must be a non-negative number, got {radius}"),
        ));
    }
    let (cx, cy) = center;
    if !(cx.is_finite() && cy.is_finite()) {
        return Err(FilterError::invalid(
            "center",
            format!("must be finite, got ({cx}, {cy})"),
        ));
    }

    let r2 = radius * radius;
    Ok(Array2::from_shape_fn((height, width), |(y, x)| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        dx * dx + dy * dy <= r2
    }))
}

/// Rectangle-shaped mask, clipped to the image.
pub fn rectangular_mask(height: usize, width: usize, roi: Roi) -> Mask {
    Array2::from_shape_fn((height, width), |(y, x)| {
        x >= roi.x
            && x < roi.x.saturating_add(roi.width)
            && y >= roi.y
            && y < roi.y.saturating_add(roi.height)
    })
}

/// Mask of pixels whose every channel lies in `lower[c]..=upper[c]`.
///
/// Typically applied to an HSV image to select a hue band.
///
/// # Errors
/// `ShapeMismatch` if the bound slices do not have one entry per channel.
pub fn in_range_mask(input: ArrayView3<u8>, lower: &[u8], upper: &[u8]) -> Result<Mask> {
    let (height, width, channels) = input.dim();
    for bound in [lower, upper] {
        if bound.len() != channels {
            return Err(FilterError::shape(&[channels], &[bound.len()]));
        }
    }

    Ok(Array2::from_shape_fn((height, width), |(y, x)| {
        (0..channels).all(|c| {
            let v = input[[y, x, c]];
            v >= lower[c] && v <= upper[c]
        })
    }))
}

/// Swap kept and removed pixels.
pub fn invert_mask(mask: ArrayView2<bool>) -> Mask {
    mask.mapv(|keep| !keep)
}

/// Zero out (or fill) every pixel the mask does not keep.
///
/// # Arguments
/// * `input` - Image (H, W, C)
/// * `mask` - Mask of shape (H, W)
/// * `fill` - Value written to every channel of removed pixels
///
/// # Returns
/// New image of the same shape; kept pixels are copied unchanged
///
/// # Errors
/// `ShapeMismatch` if the mask size differs from the image size.
pub fn apply_mask(input: ArrayView3<u8>, mask: ArrayView2<bool>, fill: u8) -> Result<Array3<u8>> {
    let (height, width, channels) = input.dim();
    if mask.dim() != (height, width) {
        let (mh, mw) = mask.dim();
        return Err(FilterError::shape(&[height, width], &[mh, mw]));
    }

    let mut output = input.to_owned();
    for ((y, x), &keep) in mask.indexed_iter() {
        if !keep {
            for c in 0..channels {
                output[[y, x, c]] = fill;
            }
        }
    }
    Ok(output)
}

/// [`apply_mask`] with a black fill.
pub fn apply_mask_black(input: ArrayView3<u8>, mask: ArrayView2<bool>) -> Result<Array3<u8>> {
    apply_mask(input, mask, 0)
}

/// Render a mask as a single-channel image (255 = kept, 0 = removed).
pub fn mask_to_image(mask: ArrayView2<bool>) -> Array3<u8> {
    let (height, width) = mask.dim();
    Array3::from_shape_fn((height, width, 1), |(y, x, _)| if mask[[y, x]] { 255 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(mask: &Mask) -> usize {
        mask.iter().filter(|&&v| v).count()
    }

    // ========================================================================
    // Circular mask
    // ========================================================================

    #[test]
    fn test_radius_zero_selects_center_only() {
        let mask = circular_mask(5, 6, (3.0, 2.0), 0.0).unwrap();
        assert_eq!(count(&mask), 1);
        assert!(mask[[2, 3]]);
    }

    #[test]
    fn test_radius_zero_outside_is_empty() {
        let mask = circular_mask(4, 4, (9.0, 9.0), 0.0).unwrap();
        assert_eq!(count(&mask), 0);
    }

    #[test]
    fn test_radius_one_is_plus_shape() {
        let mask = circular_mask(5, 5, (2.0, 2.0), 1.0).unwrap();
        assert_eq!(count(&mask), 5);
        for (y, x) in [(2, 2), (1, 2), (3, 2), (2, 1), (2, 3)] {
            assert!(mask[[y, x]], "({y}, {x})");
        }
        assert!(!mask[[1, 1]]);
    }

    #[test]
    fn test_boundary_included() {
        // (3, 4, 5) triangle: distance exactly 5
        let mask = circular_mask(10, 10, (0.0, 0.0), 5.0).unwrap();
        assert!(mask[[4, 3]]);
        assert!(mask[[0, 5]]);
        assert!(!mask[[0, 6]]);
    }

    #[test]
    fn test_circle_clipped_at_border() {
        let mask = circular_mask(5, 5, (0.0, 0.0), 1.0).unwrap();
        assert_eq!(count(&mask), 3);
    }

    #[test]
    fn test_negative_radius_rejected() {
        assert!(matches!(
            circular_mask(3, 3, (1.0, 1.0), -1.0),
            Err(FilterError::InvalidParameter { name: "radius", .. })
        ));
        assert!(circular_mask(3, 3, (1.0, 1.0), f32::NAN).is_err());
    }

    // ========================================================================
    // Other masks
    // ========================================================================

    #[test]
    fn test_rectangular_mask_clips() {
        let mask = rectangular_mask(4, 4, Roi::new(2, 1, 10, 2));
        assert_eq!(count(&mask), 4);
        assert!(mask[[1, 3]]);
        assert!(!mask[[0, 3]]);
    }

    #[test]
    fn test_rectangular_mask_huge_extent_clips() {
        let mask = rectangular_mask(4, 4, Roi::new(0, 1, 2, usize::MAX));
        assert_eq!(count(&mask), 6);
        assert!(!mask[[0, 0]]);
        assert!(mask[[3, 1]]);

        let offscreen = rectangular_mask(4, 4, Roi::new(usize::MAX, 0, 2, 1));
        assert_eq!(count(&offscreen), 0);
    }

    #[test]
    fn test_in_range_mask() {
        let mut img = Array3::<u8>::zeros((1, 3, 3));
        img[[0, 1, 0]] = 120;
        img[[0, 1, 1]] = 200;
        img[[0, 1, 2]] = 200;
        img[[0, 2, 0]] = 120;

        let mask = in_range_mask(img.view(), &[100, 50, 50], &[140, 255, 255]).unwrap();
        assert_eq!(mask.iter().copied().collect::<Vec<_>>(), vec![false, true, false]);

        assert!(in_range_mask(img.view(), &[0], &[255]).is_err());
    }

    #[test]
    fn test_invert_mask() {
        let mask = circular_mask(3, 3, (1.0, 1.0), 0.0).unwrap();
        assert_eq!(count(&invert_mask(mask.view())), 8);
    }

    // ========================================================================
    // Application
    // ========================================================================

    #[test]
    fn test_all_true_mask_is_identity() {
        let img = Array3::from_shape_fn((3, 4, 3), |(y, x, c)| (y * 40 + x * 10 + c) as u8);
        let mask = Array2::from_elem((3, 4), true);
        assert_eq!(apply_mask_black(img.view(), mask.view()).unwrap(), img);
    }

    #[test]
    fn test_all_false_mask_fills() {
        let img = Array3::from_elem((3, 4, 3), 99u8);
        let mask = Array2::from_elem((3, 4), false);
        assert_eq!(
            apply_mask_black(img.view(), mask.view()).unwrap(),
            Array3::<u8>::zeros((3, 4, 3))
        );
        assert_eq!(
            apply_mask(img.view(), mask.view(), 255).unwrap(),
            Array3::from_elem((3, 4, 3), 255u8)
        );
    }

    #[test]
    fn test_apply_mask_shape_mismatch() {
        let img = Array3::<u8>::zeros((3, 4, 1));
        let mask = Array2::from_elem((4, 3), true);
        assert!(matches!(
            apply_mask(img.view(), mask.view(), 0),
            Err(FilterError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_mask_to_image() {
        let mask = circular_mask(3, 3, (1.0, 1.0), 0.0).unwrap();
        let img = mask_to_image(mask.view());
        assert_eq!(img.dim(), (3, 3, 1));
        assert_eq!(img[[1, 1, 0]], 255);
        assert_eq!(img[[0, 0, 0]], 0);
    }
}
