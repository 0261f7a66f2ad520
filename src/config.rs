//! JSON pipeline configuration.
//!
//! ```json
//! {
//!   "input": "cells/blood_smear.jpg",
//!   "output": "out/smear_clean.png",
//!   "grayscale": false,
//!   "steps": [
//!     {"type": "median", "ksize": 5},
//!     {"type": "unsharp_mask", "amount": 1.2}
//!   ]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};
use crate::io::{load_grayscale, load_image, save_image};
use crate::pipeline::{Filter, Pipeline};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub input: PathBuf,
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// Load the input as a single luma channel instead of RGB.
    #[serde(default)]
    pub grayscale: bool,
    #[serde(default)]
    pub steps: Vec<Filter>,
}

impl PipelineConfig {
    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.steps.clone())
    }
}

pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let data = fs::read_to_string(path).map_err(|source| FilterError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| FilterError::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the input, run the steps, and save to `output` if one is set.
pub fn run_config(config: &PipelineConfig) -> Result<Array3<u8>> {
    let input = if config.grayscale {
        load_grayscale(&config.input)?
    } else {
        load_image(&config.input)?
    };

    let result = config.pipeline().run(input.view())?;

    if let Some(output) = &config.output {
        save_image(result.view(), output)?;
    } else {
        debug!("no output path configured, result not saved");
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("cellprep-config-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: PipelineConfig = serde_json::from_str(r#"{"input": "a.jpg"}"#).unwrap();
        assert_eq!(config.input, PathBuf::from("a.jpg"));
        assert_eq!(config.output, None);
        assert!(!config.grayscale);
        assert!(config.steps.is_empty());
    }

    #[test]
    fn test_bad_config_reports_path() {
        let path = scratch("bad.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let err = load_config(&path).unwrap_err();

        assert!(matches!(err, FilterError::Config { .. }));
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn test_run_config_end_to_end() {
        let input = scratch("in.png");
        let output = scratch("out/result.png");
        let img = Array3::<u8>::from_elem((6, 8, 3), 90);
        save_image(img.view(), &input).unwrap();

        let config_path = scratch("pipeline.json");
        let json = serde_json::json!({
            "input": input,
            "output": output,
            "grayscale": true,
            "steps": [
                {"type": "gaussian", "ksize": 3},
                {"type": "resize", "height": 3, "width": 4}
            ]
        });
        fs::write(&config_path, json.to_string()).unwrap();

        let config = load_config(&config_path).unwrap();
        let result = run_config(&config).unwrap();

        assert_eq!(result.dim(), (3, 4, 1));
        assert!(result.iter().all(|&v| v == 90));
        assert_eq!(load_grayscale(&output).unwrap(), result);
    }
}
