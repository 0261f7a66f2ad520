//! Filter modules for microscopy preprocessing.
//!
//! ## Supported Formats
//!
//! All filters take an `ArrayView3<u8>` of shape (height, width, channels):
//!
//! | Format | Shape | Description |
//! |--------|-------|-------------|
//! | Grayscale | (H, W, 1) | Single luminance channel, 0-255 |
//! | RGB | (H, W, 3) | Red, green, blue, 0-255 |
//! | RGBA | (H, W, 4) | RGB + alpha, 0-255 |
//!
//! ## Conventions
//!
//! - **Shape preserving** - every filter except color conversion and
//!   geometry returns an image of the input's shape
//! - **Replicate border** - neighborhoods reaching past the edge reuse the
//!   nearest edge pixel
//! - **Alpha preservation** - the alpha channel (if present) is copied
//! - **Saturating** - results are rounded and clamped to 0-255, never wrapped
//!
//! ## Filter Categories
//!
//! - **Denoise**: gaussian_blur, median_blur, bilateral_filter
//! - **Sharpen**: unsharp_mask, laplacian_sharpen
//! - **Color**: convert_color, to_grayscale
//! - **Geometry**: crop, resize
//! - **Noise**: add_salt_and_pepper, add_gaussian_noise

pub mod blur;
pub mod color;
pub mod core;
pub mod denoise;
pub mod geometry;
pub mod noise;
pub mod sharpen;

pub use blur::gaussian_blur;
pub use color::{convert_color, to_grayscale, ColorSpace};
pub use denoise::{bilateral_filter, median_blur};
pub use geometry::{crop, resize, Interpolation, Roi};
pub use noise::{add_gaussian_noise, add_salt_and_pepper};
pub use sharpen::{laplacian_response, laplacian_sharpen, unsharp_mask, LaplacianKernel, UnsharpParams};
