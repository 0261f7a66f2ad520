//! cellprep
//!
//! Preprocessing filters for blood-cell microscopy images: cropping,
//! resizing, masking, denoising, sharpening and color-space conversion,
//! with optional Python bindings via PyO3.
//!
//! ## Image Format
//! Images are `ndarray` arrays of shape (height, width, channels) with `u8`
//! samples:
//! - **Grayscale**: (height, width, 1)
//! - **RGB**: (height, width, 3)
//! - **RGBA**: (height, width, 4), alpha passed through by the filters
//!
//! Masks are `Array2<bool>` of shape (height, width); `true` keeps a pixel.
//!
//! ## Operations
//! Every operation is a pure function returning a freshly allocated array.
//! Invalid parameters and mismatched shapes are reported as
//! [`FilterError`] before any pixel work starts. Steps can be chained with
//! [`Pipeline`], which is also loadable from JSON via [`config`].

pub mod config;
pub mod error;
pub mod filters;
pub mod io;
pub mod pipeline;
pub mod selection;

pub use error::{FilterError, Result};
pub use pipeline::{Filter, ImageTransform, Pipeline};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use std::path::Path;

    use numpy::{IntoPyArray, PyArray2, PyArray3, PyReadonlyArray2, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::error::FilterError;
    use crate::filters::blur as blur_mod;
    use crate::filters::color as color_mod;
    use crate::filters::denoise as denoise_mod;
    use crate::filters::geometry as geometry_mod;
    use crate::filters::noise as noise_mod;
    use crate::filters::sharpen as sharpen_mod;
    use crate::io as io_mod;
    use crate::pipeline::{Filter, Pipeline};
    use crate::selection::mask as mask_mod;
    use crate::selection::morphology as morph_mod;

    impl From<FilterError> for PyErr {
        fn from(err: FilterError) -> PyErr {
            PyValueError::new_err(err.to_string())
        }
    }

    // ========================================================================
    // I/O
    // ========================================================================

    /// Load an image file as an (H, W, 3) RGB array.
    #[pyfunction]
    pub fn load_image<'py>(py: Python<'py>, path: &str) -> PyResult<Bound<'py, PyArray3<u8>>> {
        Ok(io_mod::load_image(Path::new(path))?.into_pyarray(py))
    }

    /// Load an image file as an (H, W, 1) grayscale array.
    #[pyfunction]
    pub fn load_grayscale<'py>(py: Python<'py>, path: &str) -> PyResult<Bound<'py, PyArray3<u8>>> {
        Ok(io_mod::load_grayscale(Path::new(path))?.into_pyarray(py))
    }

    #[pyfunction]
    pub fn save_image(image: PyReadonlyArray3<'_, u8>, path: &str) -> PyResult<()> {
        io_mod::save_image(image.as_array(), Path::new(path))?;
        Ok(())
    }

    // ========================================================================
    // Denoise
    // ========================================================================

    #[pyfunction]
    #[pyo3(signature = (image, ksize=5, sigma=0.0))]
    pub fn gaussian_blur<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        ksize: usize,
        sigma: f32,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let result = blur_mod::gaussian_blur(image.as_array(), ksize, sigma)?;
        Ok(result.into_pyarray(py))
    }

    #[pyfunction]
    #[pyo3(signature = (image, ksize=5))]
    pub fn median_blur<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        ksize: usize,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let result = denoise_mod::median_blur(image.as_array(), ksize)?;
        Ok(result.into_pyarray(py))
    }

    #[pyfunction]
    #[pyo3(signature = (image, diameter=9, sigma_color=75.0, sigma_space=75.0))]
    pub fn bilateral_filter<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        diameter: i32,
        sigma_color: f32,
        sigma_space: f32,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let result =
            denoise_mod::bilateral_filter(image.as_array(), diameter, sigma_color, sigma_space)?;
        Ok(result.into_pyarray(py))
    }

    // ========================================================================
    // Sharpen
    // ========================================================================

    #[pyfunction]
    #[pyo3(signature = (image, ksize=5, sigma=1.0, amount=1.0, threshold=0))]
    pub fn unsharp_mask<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        ksize: usize,
        sigma: f32,
        amount: f32,
        threshold: u8,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let params = sharpen_mod::UnsharpParams {
            ksize,
            sigma,
            amount,
            threshold,
        };
        let result = sharpen_mod::unsharp_mask(image.as_array(), &params)?;
        Ok(result.into_pyarray(py))
    }

    /// Laplacian sharpening; `eight_neighbor` selects the 8-connected kernel.
    #[pyfunction]
    #[pyo3(signature = (image, eight_neighbor=false))]
    pub fn laplacian_sharpen<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        eight_neighbor: bool,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let kernel = if eight_neighbor {
            sharpen_mod::LaplacianKernel::EightNeighbor
        } else {
            sharpen_mod::LaplacianKernel::FourNeighbor
        };
        let result = sharpen_mod::laplacian_sharpen(image.as_array(), kernel)?;
        Ok(result.into_pyarray(py))
    }

    #[pyfunction]
    #[pyo3(signature = (image, eight_neighbor=false))]
    pub fn laplacian_response<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        eight_neighbor: bool,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let kernel = if eight_neighbor {
            sharpen_mod::LaplacianKernel::EightNeighbor
        } else {
            sharpen_mod::LaplacianKernel::FourNeighbor
        };
        let result = sharpen_mod::laplacian_response(image.as_array(), kernel)?;
        Ok(result.into_pyarray(py))
    }

    // ========================================================================
    // Color
    // ========================================================================

    /// Convert between color spaces named "rgb", "bgr", "hsv", "gray",
    /// "ycrcb", "lab" or "luv".
    #[pyfunction]
    pub fn convert_color<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        from_space: &str,
        to_space: &str,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let from: color_mod::ColorSpace = from_space.parse()?;
        let to: color_mod::ColorSpace = to_space.parse()?;
        let result = color_mod::convert_color(image.as_array(), from, to)?;
        Ok(result.into_pyarray(py))
    }

    #[pyfunction]
    pub fn to_grayscale<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        Ok(color_mod::to_grayscale(image.as_array())?.into_pyarray(py))
    }

    // ========================================================================
    // Masks
    // ========================================================================

    #[pyfunction]
    pub fn circular_mask<'py>(
        py: Python<'py>,
        height: usize,
        width: usize,
        cx: f32,
        cy: f32,
        radius: f32,
    ) -> PyResult<Bound<'py, PyArray2<bool>>> {
        Ok(mask_mod::circular_mask(height, width, (cx, cy), radius)?.into_pyarray(py))
    }

    #[pyfunction]
    pub fn in_range_mask<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        lower: Vec<u8>,
        upper: Vec<u8>,
    ) -> PyResult<Bound<'py, PyArray2<bool>>> {
        Ok(mask_mod::in_range_mask(image.as_array(), &lower, &upper)?.into_pyarray(py))
    }

    #[pyfunction]
    pub fn rectangular_mask<'py>(
        py: Python<'py>,
        height: usize,
        width: usize,
        x: usize,
        y: usize,
        roi_width: usize,
        roi_height: usize,
    ) -> Bound<'py, PyArray2<bool>> {
        let roi = geometry_mod::Roi::new(x, y, roi_width, roi_height);
        mask_mod::rectangular_mask(height, width, roi).into_pyarray(py)
    }

    #[pyfunction]
    pub fn invert_mask<'py>(
        py: Python<'py>,
        mask: PyReadonlyArray2<'py, bool>,
    ) -> Bound<'py, PyArray2<bool>> {
        mask_mod::invert_mask(mask.as_array()).into_pyarray(py)
    }

    /// Render a mask as an (H, W, 1) image: 255 kept, 0 dropped.
    #[pyfunction]
    pub fn mask_to_image<'py>(
        py: Python<'py>,
        mask: PyReadonlyArray2<'py, bool>,
    ) -> Bound<'py, PyArray3<u8>> {
        mask_mod::mask_to_image(mask.as_array()).into_pyarray(py)
    }

    #[pyfunction]
    pub fn dilate_mask<'py>(
        py: Python<'py>,
        mask: PyReadonlyArray2<'py, bool>,
        radius: f32,
    ) -> PyResult<Bound<'py, PyArray2<bool>>> {
        Ok(morph_mod::dilate_mask(mask.as_array(), radius)?.into_pyarray(py))
    }

    #[pyfunction]
    pub fn erode_mask<'py>(
        py: Python<'py>,
        mask: PyReadonlyArray2<'py, bool>,
        radius: f32,
    ) -> PyResult<Bound<'py, PyArray2<bool>>> {
        Ok(morph_mod::erode_mask(mask.as_array(), radius)?.into_pyarray(py))
    }

    #[pyfunction]
    pub fn open_mask<'py>(
        py: Python<'py>,
        mask: PyReadonlyArray2<'py, bool>,
        radius: f32,
    ) -> PyResult<Bound<'py, PyArray2<bool>>> {
        Ok(morph_mod::open_mask(mask.as_array(), radius)?.into_pyarray(py))
    }

    #[pyfunction]
    pub fn close_mask<'py>(
        py: Python<'py>,
        mask: PyReadonlyArray2<'py, bool>,
        radius: f32,
    ) -> PyResult<Bound<'py, PyArray2<bool>>> {
        Ok(morph_mod::close_mask(mask.as_array(), radius)?.into_pyarray(py))
    }

    #[pyfunction]
    #[pyo3(signature = (image, mask, fill=0))]
    pub fn apply_mask<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        mask: PyReadonlyArray2<'py, bool>,
        fill: u8,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let result = mask_mod::apply_mask(image.as_array(), mask.as_array(), fill)?;
        Ok(result.into_pyarray(py))
    }

    #[pyfunction]
    pub fn apply_mask_black<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        mask: PyReadonlyArray2<'py, bool>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let result = mask_mod::apply_mask_black(image.as_array(), mask.as_array())?;
        Ok(result.into_pyarray(py))
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    #[pyfunction]
    pub fn crop<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let roi = geometry_mod::Roi::new(x, y, width, height);
        Ok(geometry_mod::crop(image.as_array(), roi)?.into_pyarray(py))
    }

    #[pyfunction]
    #[pyo3(signature = (image, height, width, bilinear=true))]
    pub fn resize<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        height: usize,
        width: usize,
        bilinear: bool,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let interpolation = if bilinear {
            geometry_mod::Interpolation::Bilinear
        } else {
            geometry_mod::Interpolation::Nearest
        };
        let result = geometry_mod::resize(image.as_array(), height, width, interpolation)?;
        Ok(result.into_pyarray(py))
    }

    // ========================================================================
    // Noise
    // ========================================================================

    #[pyfunction]
    #[pyo3(signature = (image, density, seed=0))]
    pub fn add_salt_and_pepper<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        density: f32,
        seed: u64,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let result = noise_mod::add_salt_and_pepper(image.as_array(), density, seed)?;
        Ok(result.into_pyarray(py))
    }

    #[pyfunction]
    #[pyo3(signature = (image, sigma, seed=0))]
    pub fn add_gaussian_noise<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        sigma: f32,
        seed: u64,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let result = noise_mod::add_gaussian_noise(image.as_array(), sigma, seed)?;
        Ok(result.into_pyarray(py))
    }

    // ========================================================================
    // Pipeline
    // ========================================================================

    /// Run a JSON list of steps, e.g. `[{"type": "median", "ksize": 3}]`.
    #[pyfunction]
    pub fn run_pipeline<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        steps_json: &str,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let steps: Vec<Filter> = serde_json::from_str(steps_json)
            .map_err(|e| PyValueError::new_err(format!("invalid pipeline steps: {e}")))?;
        let result = Pipeline::new(steps).run(image.as_array())?;
        Ok(result.into_pyarray(py))
    }

    /// cellprep Rust extension module
    #[pymodule]
    pub fn cellprep(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // I/O
        m.add_function(wrap_pyfunction!(load_image, m)?)?;
        m.add_function(wrap_pyfunction!(load_grayscale, m)?)?;
        m.add_function(wrap_pyfunction!(save_image, m)?)?;

        // Denoise
        m.add_function(wrap_pyfunction!(gaussian_blur, m)?)?;
        m.add_function(wrap_pyfunction!(median_blur, m)?)?;
        m.add_function(wrap_pyfunction!(bilateral_filter, m)?)?;

        // Sharpen
        m.add_function(wrap_pyfunction!(unsharp_mask, m)?)?;
        m.add_function(wrap_pyfunction!(laplacian_sharpen, m)?)?;
        m.add_function(wrap_pyfunction!(laplacian_response, m)?)?;

        // Color
        m.add_function(wrap_pyfunction!(convert_color, m)?)?;
        m.add_function(wrap_pyfunction!(to_grayscale, m)?)?;

        // Masks
        m.add_function(wrap_pyfunction!(circular_mask, m)?)?;
        m.add_function(wrap_pyfunction!(rectangular_mask, m)?)?;
        m.add_function(wrap_pyfunction!(in_range_mask, m)?)?;
        m.add_function(wrap_pyfunction!(invert_mask, m)?)?;
        m.add_function(wrap_pyfunction!(mask_to_image, m)?)?;
        m.add_function(wrap_pyfunction!(dilate_mask, m)?)?;
        m.add_function(wrap_pyfunction!(erode_mask, m)?)?;
        m.add_function(wrap_pyfunction!(open_mask, m)?)?;
        m.add_function(wrap_pyfunction!(close_mask, m)?)?;
        m.add_function(wrap_pyfunction!(apply_mask, m)?)?;
        m.add_function(wrap_pyfunction!(apply_mask_black, m)?)?;

        // Geometry
        m.add_function(wrap_pyfunction!(crop, m)?)?;
        m.add_function(wrap_pyfunction!(resize, m)?)?;

        // Noise
        m.add_function(wrap_pyfunction!(add_salt_and_pepper, m)?)?;
        m.add_function(wrap_pyfunction!(add_gaussian_noise, m)?)?;

        // Pipeline
        m.add_function(wrap_pyfunction!(run_pipeline, m)?)?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::cellprep;
