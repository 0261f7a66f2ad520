//! Pixel selection for masking.
//!
//! - **Shape masks**: circular and rectangular regions
//! - **Color masks**: per-channel range test (e.g. a hue band in HSV)
//! - **Morphology**: dilate, erode, open and close with a disk element
//! - **Application**: replace unselected pixels with a fill value

pub mod mask;
pub mod morphology;

pub use mask::{
    apply_mask, apply_mask_black, circular_mask, in_range_mask, invert_mask, mask_to_image,
    rectangular_mask, Mask,
};
pub use morphology::{close_mask, dilate_mask, erode_mask, open_mask};
