//! Color-space conversion between RGB/BGR and HSV, grayscale, YCrCb, Lab, Luv.
//!
//! All color spaces are stored as 8-bit samples:
//!
//! | Space | Channels | Encoding |
//! |-------|----------|----------|
//! | Rgb / Bgr | 3 | 0-255 |
//! | Hsv | 3 | H = degrees / 2 (0-179), S and V 0-255 |
//! | Gray | 1 | BT.601 luma |
//! | YCrCb | 3 | Y 0-255, Cr/Cb offset by 128 |
//! | Lab | 3 | L * 255 / 100, a and b offset by 128 |
//! | Luv | 3 | L * 255 / 100, u from [-134, 220], v from [-140, 122] |
//!
//! Lab and Luv assume sRGB primaries with a D65 white point.
//! Grayscale conversion is many-to-one; converting gray back to RGB
//! replicates the luma into all three channels.

use std::str::FromStr;

use ndarray::{Array3, ArrayView3};
use serde::{Deserialize, Serialize};

use super::core::{check_image, saturate_u8};
use crate::error::{FilterError, Result};

/// BT.601 luma coefficients
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// D65 reference white
const WHITE_X: f32 = 0.950456;
const WHITE_Z: f32 = 1.088754;
const WHITE_U: f32 = 0.197_939_43;
const WHITE_V: f32 = 0.468_310_96;

const LAB_EPSILON: f32 = 0.008856;
const LAB_KAPPA: f32 = 903.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    Rgb,
    Bgr,
    Hsv,
    Gray,
    YCrCb,
    Lab,
    Luv,
}

impl ColorSpace {
    /// Number of channels an image in this space carries.
    pub fn channels(self) -> usize {
        match self {
            ColorSpace::Gray => 1,
            _ => 3,
        }
    }
}

impl FromStr for ColorSpace {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rgb" => Ok(ColorSpace::Rgb),
            "bgr" => Ok(ColorSpace::Bgr),
            "hsv" => Ok(ColorSpace::Hsv),
            "gray" | "grey" => Ok(ColorSpace::Gray),
            "ycrcb" => Ok(ColorSpace::YCrCb),
            "lab" => Ok(ColorSpace::Lab),
            "luv" => Ok(ColorSpace::Luv),
            other => Err(FilterError::invalid(
                "color_space",
                format!("unknown color space `{other}`"),
            )),
        }
    }
}

type PixelFn = fn([u8; 3]) -> [u8; 3];

/// Encoder from RGB into a derived space, if one exists.
fn encoder(space: ColorSpace) -> Option<PixelFn> {
    match space {
        ColorSpace::Hsv => Some(rgb_to_hsv),
        ColorSpace::YCrCb => Some(rgb_to_ycrcb),
        ColorSpace::Lab => Some(rgb_to_lab),
        ColorSpace::Luv => Some(rgb_to_luv),
        _ => None,
    }
}

/// Decoder from a derived space back to RGB, if one exists.
fn decoder(space: ColorSpace) -> Option<PixelFn> {
    match space {
        ColorSpace::Hsv => Some(hsv_to_rgb),
        ColorSpace::YCrCb => Some(ycrcb_to_rgb),
        ColorSpace::Lab => Some(lab_to_rgb),
        ColorSpace::Luv => Some(luv_to_rgb),
        _ => None,
    }
}

/// Convert an image between two color spaces.
///
/// # Arguments
/// * `input` - Image whose channel count matches `from`
/// * `from` - Color space of `input`
/// * `to` - Target color space
///
/// # Returns
/// Converted image with `to.channels()` channels
///
/// # Errors
/// * `UnsupportedConversion` for pairs that do not involve RGB or BGR,
///   reported before any shape check
/// * `ShapeMismatch` if `input` does not have `from.channels()` channels
pub fn convert_color(input: ArrayView3<u8>, from: ColorSpace, to: ColorSpace) -> Result<Array3<u8>> {
    let rgb_order = |space: ColorSpace| matches!(space, ColorSpace::Rgb | ColorSpace::Bgr);
    if from != to && !rgb_order(from) && !rgb_order(to) {
        return Err(FilterError::UnsupportedConversion { from, to });
    }
    check_image(&input)?;
    let (height, width, channels) = input.dim();
    if channels != from.channels() {
        return Err(FilterError::shape(
            &[height, width, from.channels()],
            &[height, width, channels],
        ));
    }
    if from == to {
        return Ok(input.to_owned());
    }

    use ColorSpace::*;
    let converted = match (from, to) {
        (Rgb, Bgr) | (Bgr, Rgb) => map_pixels(input, swap_rb),
        (Rgb, Gray) => rgb_to_gray(input, false),
        (Bgr, Gray) => rgb_to_gray(input, true),
        (Gray, Rgb) | (Gray, Bgr) => gray_to_rgb(input),
        (Rgb, target) => match encoder(target) {
            Some(encode) => map_pixels(input, encode),
            None => return Err(FilterError::UnsupportedConversion { from, to }),
        },
        (Bgr, target) => match encoder(target) {
            Some(encode) => map_pixels(input, |p| encode(swap_rb(p))),
            None => return Err(FilterError::UnsupportedConversion { from, to }),
        },
        (source, Rgb) => match decoder(source) {
            Some(decode) => map_pixels(input, decode),
            None => return Err(FilterError::UnsupportedConversion { from, to }),
        },
        (source, Bgr) => match decoder(source) {
            Some(decode) => map_pixels(input, |p| swap_rb(decode(p))),
            None => return Err(FilterError::UnsupportedConversion { from, to }),
        },
        _ => return Err(FilterError::UnsupportedConversion { from, to }),
    };

    Ok(converted)
}

/// Reduce an image to a single luma channel.
///
/// Single-channel input is returned unchanged, so the operation is
/// idempotent. Three- and four-channel input is read as RGB / RGBA; alpha
/// is dropped.
pub fn to_grayscale(input: ArrayView3<u8>) -> Result<Array3<u8>> {
    check_image(&input)?;
    match input.dim().2 {
        1 => Ok(input.to_owned()),
        _ => Ok(rgb_to_gray(input, false)),
    }
}

// ============================================================================
// Image-level helpers
// ============================================================================

fn map_pixels(input: ArrayView3<u8>, f: impl Fn([u8; 3]) -> [u8; 3]) -> Array3<u8> {
    let (height, width, _) = input.dim();
    let mut output = Array3::<u8>::zeros((height, width, 3));
    for y in 0..height {
        for x in 0..width {
            let out = f([input[[y, x, 0]], input[[y, x, 1]], input[[y, x, 2]]]);
            for (c, v) in out.into_iter().enumerate() {
                output[[y, x, c]] = v;
            }
        }
    }
    output
}

fn rgb_to_gray(input: ArrayView3<u8>, bgr: bool) -> Array3<u8> {
    let (height, width, _) = input.dim();
    let (ri, bi) = if bgr { (2, 0) } else { (0, 2) };
    let mut output = Array3::<u8>::zeros((height, width, 1));
    for y in 0..height {
        for x in 0..width {
            let r = input[[y, x, ri]] as f32;
            let g = input[[y, x, 1]] as f32;
            let b = input[[y, x, bi]] as f32;
            output[[y, x, 0]] = saturate_u8(LUMA_R * r + LUMA_G * g + LUMA_B * b);
        }
    }
    output
}

fn gray_to_rgb(input: ArrayView3<u8>) -> Array3<u8> {
    let (height, width, _) = input.dim();
    let mut output = Array3::<u8>::zeros((height, width, 3));
    for y in 0..height {
        for x in 0..width {
            let v = input[[y, x, 0]];
            for c in 0..3 {
                output[[y, x, c]] = v;
            }
        }
    }
    output
}

// ============================================================================
// Pixel conversions
// ============================================================================

#[inline]
fn swap_rb(p: [u8; 3]) -> [u8; 3] {
    [p[2], p[1], p[0]]
}

fn rgb_to_hsv(p: [u8; 3]) -> [u8; 3] {
    let (r, g, b) = (p[0] as f32, p[1] as f32, p[2] as f32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max > 0.0 { 255.0 * delta / max } else { 0.0 };
    let mut h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    // 360 degrees wraps to 0 after halving
    let h = (h / 2.0).round() as u32 % 180;
    [h as u8, saturate_u8(s), max as u8]
}

fn hsv_to_rgb(p: [u8; 3]) -> [u8; 3] {
    let h = (p[0] as f32 * 2.0) % 360.0;
    let s = p[1] as f32 / 255.0;
    let v = p[2] as f32 / 255.0;

    let c = v * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = v - c;
    [
        saturate_u8((r + m) * 255.0),
        saturate_u8((g + m) * 255.0),
        saturate_u8((b + m) * 255.0),
    ]
}

fn rgb_to_ycrcb(p: [u8; 3]) -> [u8; 3] {
    let (r, g, b) = (p[0] as f32, p[1] as f32, p[2] as f32);
    let y = LUMA_R * r + LUMA_G * g + LUMA_B * b;
    let cr = (r - y) * 0.713 + 128.0;
    let cb = (b - y) * 0.564 + 128.0;
    [saturate_u8(y), saturate_u8(cr), saturate_u8(cb)]
}

fn ycrcb_to_rgb(p: [u8; 3]) -> [u8; 3] {
    let y = p[0] as f32;
    let cr = p[1] as f32 - 128.0;
    let cb = p[2] as f32 - 128.0;
    [
        saturate_u8(y + 1.403 * cr),
        saturate_u8(y - 0.714 * cr - 0.344 * cb),
        saturate_u8(y + 1.773 * cb),
    ]
}

#[inline]
fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
fn linear_to_srgb(c: f32) -> f32 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.003_130_8 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn rgb_to_xyz(p: [u8; 3]) -> (f32, f32, f32) {
    let r = srgb_to_linear(p[0] as f32 / 255.0);
    let g = srgb_to_linear(p[1] as f32 / 255.0);
    let b = srgb_to_linear(p[2] as f32 / 255.0);
    (
        0.412453 * r + 0.357580 * g + 0.180423 * b,
        0.212671 * r + 0.715160 * g + 0.072169 * b,
        0.019334 * r + 0.119193 * g + 0.950227 * b,
    )
}

fn xyz_to_rgb(x: f32, y: f32, z: f32) -> [u8; 3] {
    let r = 3.240479 * x - 1.537150 * y - 0.498535 * z;
    let g = -0.969256 * x + 1.875991 * y + 0.041556 * z;
    let b = 0.055648 * x - 0.204043 * y + 1.057311 * z;
    [
        saturate_u8(linear_to_srgb(r) * 255.0),
        saturate_u8(linear_to_srgb(g) * 255.0),
        saturate_u8(linear_to_srgb(b) * 255.0),
    ]
}

/// CIE lightness (0-100) from relative luminance.
#[inline]
fn lightness(y: f32) -> f32 {
    if y > LAB_EPSILON {
        116.0 * y.cbrt() - 16.0
    } else {
        LAB_KAPPA * y
    }
}

/// Relative luminance from CIE lightness.
#[inline]
fn luminance(l: f32) -> f32 {
    if l > LAB_KAPPA * LAB_EPSILON {
        ((l + 16.0) / 116.0).powi(3)
    } else {
        l / LAB_KAPPA
    }
}

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

#[inline]
fn lab_f_inv(t: f32) -> f32 {
    let t3 = t * t * t;
    if t3 > LAB_EPSILON {
        t3
    } else {
        (t - 16.0 / 116.0) / 7.787
    }
}

fn rgb_to_lab(p: [u8; 3]) -> [u8; 3] {
    let (x, y, z) = rgb_to_xyz(p);
    let fx = lab_f(x / WHITE_X);
    let fy = lab_f(y);
    let fz = lab_f(z / WHITE_Z);

    let l = lightness(y);
    let a = 500.0 * (fx - fy);
    let b = 200.0 * (fy - fz);
    [saturate_u8(l * 255.0 / 100.0), saturate_u8(a + 128.0), saturate_u8(b + 128.0)]
}

fn lab_to_rgb(p: [u8; 3]) -> [u8; 3] {
    let l = p[0] as f32 * 100.0 / 255.0;
    let a = p[1] as f32 - 128.0;
    let b = p[2] as f32 - 128.0;

    let y = luminance(l);
    let fy = lab_f(y);
    let x = WHITE_X * lab_f_inv(fy + a / 500.0);
    let z = WHITE_Z * lab_f_inv(fy - b / 200.0);
    xyz_to_rgb(x, y, z)
}

fn rgb_to_luv(p: [u8; 3]) -> [u8; 3] {
    let (x, y, z) = rgb_to_xyz(p);
    let l = lightness(y);
    let denom = x + 15.0 * y + 3.0 * z;
    let (u, v) = if denom > 0.0 {
        let up = 4.0 * x / denom;
        let vp = 9.0 * y / denom;
        (13.0 * l * (up - WHITE_U), 13.0 * l * (vp - WHITE_V))
    } else {
        (0.0, 0.0)
    };
    [
        saturate_u8(l * 255.0 / 100.0),
        saturate_u8((u + 134.0) * 255.0 / 354.0),
        saturate_u8((v + 140.0) * 255.0 / 262.0),
    ]
}

fn luv_to_rgb(p: [u8; 3]) -> [u8; 3] {
    let l = p[0] as f32 * 100.0 / 255.0;
    if l <= 0.0 {
        return [0, 0, 0];
    }
    let u = p[1] as f32 * 354.0 / 255.0 - 134.0;
    let v = p[2] as f32 * 262.0 / 255.0 - 140.0;

    let up = u / (13.0 * l) + WHITE_U;
    let vp = v / (13.0 * l) + WHITE_V;
    let y = luminance(l);
    if vp.abs() < f32::EPSILON {
        return xyz_to_rgb(0.0, y, 0.0);
    }
    let x = y * 9.0 * up / (4.0 * vp);
    let z = y * (12.0 - 3.0 * up - 20.0 * vp) / (4.0 * vp);
    xyz_to_rgb(x, y, z)
}
