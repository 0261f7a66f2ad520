//! Error type shared by every filter, mask and pipeline operation.
//!
//! Parameter and shape checks run before any pixel is touched, so an
//! operation either returns a complete image or one of these errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::filters::color::ColorSpace;

#[derive(Debug, Error)]
pub enum FilterError {
    /// Two arrays that must agree in size do not.
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("unsupported color conversion {from:?} -> {to:?}")]
    UnsupportedConversion { from: ColorSpace, to: ColorSpace },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("image codec error for {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl FilterError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        FilterError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn shape(expected: &[usize], actual: &[usize]) -> Self {
        FilterError::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;
