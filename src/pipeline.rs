//! Filter pipeline.
//!
//! Every operation is a variant of the closed [`Filter`] enum and shares the
//! [`ImageTransform`] capability. A [`Pipeline`] applies its steps in order
//! and stops at the first error, so a run either produces a complete image
//! or nothing.

use log::{debug, warn};
use ndarray::{Array3, ArrayView3};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::filters::blur::gaussian_blur;
use crate::filters::color::{convert_color, ColorSpace};
use crate::filters::denoise::{bilateral_filter, median_blur};
use crate::filters::geometry::{crop, resize, Interpolation, Roi};
use crate::filters::sharpen::{laplacian_sharpen, unsharp_mask, LaplacianKernel, UnsharpParams};
use crate::selection::{apply_mask, circular_mask, close_mask, in_range_mask, open_mask};

/// An image-to-image transform.
pub trait ImageTransform {
    fn apply(&self, input: ArrayView3<u8>) -> Result<Array3<u8>>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

fn default_sigma_color() -> f32 {
    75.0
}

fn default_sigma_space() -> f32 {
    75.0
}

fn default_diameter() -> i32 {
    9
}

fn default_ksize() -> usize {
    5
}

/// One preprocessing step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Filter {
    Gaussian {
        #[serde(default = "default_ksize")]
        ksize: usize,
        #[serde(default)]
        sigma: f32,
    },
    Median {
        #[serde(default = "default_ksize")]
        ksize: usize,
    },
    Bilateral {
        #[serde(default = "default_diameter")]
        diameter: i32,
        #[serde(default = "default_sigma_color")]
        sigma_color: f32,
        #[serde(default = "default_sigma_space")]
        sigma_space: f32,
    },
    UnsharpMask(UnsharpParams),
    Laplacian {
        #[serde(default)]
        kernel: LaplacianKernel,
    },
    ConvertColor {
        from: ColorSpace,
        to: ColorSpace,
    },
    /// Keep a disk; `center` defaults to the image center.
    CircularMask {
        #[serde(default)]
        center: Option<(f32, f32)>,
        radius: f32,
        #[serde(default)]
        fill: u8,
    },
    /// Keep pixels whose color, converted from RGB to `space`, lies in
    /// `lower..=upper`. The output stays in RGB. A positive `clean_radius`
    /// opens then closes the mask before it is applied.
    RangeMask {
        space: ColorSpace,
        lower: Vec<u8>,
        upper: Vec<u8>,
        #[serde(default)]
        fill: u8,
        #[serde(default)]
        clean_radius: f32,
    },
    Crop(Roi),
    Resize {
        height: usize,
        width: usize,
        #[serde(default)]
        interpolation: Interpolation,
    },
}

impl ImageTransform for Filter {
    fn apply(&self, input: ArrayView3<u8>) -> Result<Array3<u8>> {
        match self {
            Filter::Gaussian { ksize, sigma } => gaussian_blur(input, *ksize, *sigma),
            Filter::Median { ksize } => median_blur(input, *ksize),
            Filter::Bilateral {
                diameter,
                sigma_color,
                sigma_space,
            } => bilateral_filter(input, *diameter, *sigma_color, *sigma_space),
            Filter::UnsharpMask(params) => unsharp_mask(input, params),
            Filter::Laplacian { kernel } => laplacian_sharpen(input, *kernel),
            Filter::ConvertColor { from, to } => convert_color(input, *from, *to),
            Filter::CircularMask {
                center,
                radius,
                fill,
            } => {
                let (height, width, _) = input.dim();
                let center = center.unwrap_or((
                    (width as f32 - 1.0) / 2.0,
                    (height as f32 - 1.0) / 2.0,
                ));
                let mask = circular_mask(height, width, center, *radius)?;
                apply_mask(input, mask.view(), *fill)
            }
            Filter::RangeMask {
                space,
                lower,
                upper,
                fill,
                clean_radius,
            } => {
                let converted = convert_color(input, ColorSpace::Rgb, *space)?;
                let mut mask = in_range_mask(converted.view(), lower, upper)?;
                if *clean_radius > 0.0 {
                    mask = open_mask(mask.view(), *clean_radius)?;
                    mask = close_mask(mask.view(), *clean_radius)?;
                }
                apply_mask(input, mask.view(), *fill)
            }
            Filter::Crop(roi) => crop(input, *roi),
            Filter::Resize {
                height,
                width,
                interpolation,
            } => resize(input, *height, *width, *interpolation),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Filter::Gaussian { .. } => "gaussian",
            Filter::Median { .. } => "median",
            Filter::Bilateral { .. } => "bilateral",
            Filter::UnsharpMask(_) => "unsharp_mask",
            Filter::Laplacian { .. } => "laplacian",
            Filter::ConvertColor { .. } => "convert_color",
            Filter::CircularMask { .. } => "circular_mask",
            Filter::RangeMask { .. } => "range_mask",
            Filter::Crop(_) => "crop",
            Filter::Resize { .. } => "resize",
        }
    }
}

/// Ordered list of steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub steps: Vec<Filter>,
}

impl Pipeline {
    pub fn new(steps: Vec<Filter>) -> Self {
        Self { steps }
    }

    /// Append a step (builder style).
    pub fn then(mut self, step: Filter) -> Self {
        self.steps.push(step);
        self
    }

    /// Run every step in order.
    pub fn run(&self, input: ArrayView3<u8>) -> Result<Array3<u8>> {
        if self.steps.is_empty() {
            warn!("pipeline has no steps, returning input unchanged");
        }
        let total = self.steps.len();
        let mut current = input.to_owned();
        for (i, step) in self.steps.iter().enumerate() {
            current = step.apply(current.view())?;
            debug!(
                "step {}/{} {} -> {:?}",
                i + 1,
                total,
                step.name(),
                current.dim()
            );
        }
        Ok(current)
    }
}

impl ImageTransform for Pipeline {
    fn apply(&self, input: ArrayView3<u8>) -> Result<Array3<u8>> {
        self.run(input)
    }

    fn name(&self) -> &'static str {
        "pipeline"
    }
}
