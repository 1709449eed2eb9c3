//! Estimator configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the artifacts live and how the model session is set up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// ONNX regression model
    pub model_path: PathBuf,

    /// Scaler parameters (JSON)
    pub scaler_path: PathBuf,

    /// Canonical column list (JSON array of strings)
    pub columns_path: PathBuf,

    /// Enable full graph optimization
    pub optimize_graph: bool,

    /// Threads used inside a single model run
    pub intra_threads: usize,

    /// Refuse to start when the column list and the form disagree
    pub strict_schema: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("House_price_prediction.onnx"),
            scaler_path: PathBuf::from("scaler.json"),
            columns_path: PathBuf::from("columns.json"),
            optimize_graph: true,
            intra_threads: 1, // single row per request
            strict_schema: false,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file. Missing keys take their defaults.
    pub fn from_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read config {}: {e}", path.display()))
        })?;
        let config: Config = serde_json::from_str(&content).map_err(|e| {
            Error::Configuration(format!("config {} is malformed: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve relative artifact paths against `dir`.
    pub fn with_artifact_dir(mut self, dir: &Path) -> Self {
        for path in [
            &mut self.model_path,
            &mut self.scaler_path,
            &mut self.columns_path,
        ] {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.intra_threads == 0 {
            return Err(Error::Configuration(
                "intra_threads must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
