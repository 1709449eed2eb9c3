//! Regression model interface and the ONNX Runtime implementation.

use crate::config::Config;
use crate::error::{Artifact, Error, Result};
use ndarray::ArrayView2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// A pretrained regressor predicting `ln(1 + price)`.
pub trait Regressor: Send + Sync {
    /// Predict one log-space value per input row.
    fn predict(&self, rows: ArrayView2<'_, f32>) -> Result<Vec<f32>>;
}

/// Regressor backed by an ONNX model file.
///
/// The model must take a single `f32` tensor of shape `[N, n_columns]` and
/// produce its prediction as the first output, one value per row.
pub struct OnnxRegressor {
    /// ONNX Runtime session; running it needs exclusive access
    session: Mutex<Session>,
}

impl OnnxRegressor {
    /// Load an ONNX model.
    ///
    /// # Example
    /// ```no_run
    /// use rent_inference::{Config, OnnxRegressor};
    /// use std::path::Path;
    ///
    /// let config = Config::default();
    /// let model = OnnxRegressor::from_file(
    ///     Path::new("House_price_prediction.onnx"),
    ///     &config,
    /// ).unwrap();
    /// ```
    pub fn from_file(path: &Path, config: &Config) -> Result<Self> {
        std::fs::metadata(path).map_err(|source| Error::ArtifactMissing {
            artifact: Artifact::Model,
            path: path.to_path_buf(),
            source,
        })?;

        let session = build_session(path, config).map_err(|e| {
            Error::Configuration(format!("model {} could not be loaded: {e}", path.display()))
        })?;

        info!(path = %path.display(), "Loaded ONNX model");

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

fn build_session(path: &Path, config: &Config) -> anyhow::Result<Session> {
    let session = Session::builder()?
        .with_optimization_level(if config.optimize_graph {
            GraphOptimizationLevel::Level3
        } else {
            GraphOptimizationLevel::Level1
        })?
        .with_intra_threads(config.intra_threads)?
        .commit_from_file(path)?;
    Ok(session)
}

impl Regressor for OnnxRegressor {
    fn predict(&self, rows: ArrayView2<'_, f32>) -> Result<Vec<f32>> {
        let n_rows = rows.nrows();
        let input = Tensor::from_array(rows.to_owned())
            .map_err(|e| Error::Inference(format!("could not build input tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| Error::Inference("model session lock poisoned".into()))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| Error::Inference(e.to_string()))?;

        let (_, values) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::Inference(format!("unexpected model output: {e}")))?;

        if values.len() != n_rows {
            return Err(Error::Inference(format!(
                "model returned {} values for {} rows",
                values.len(),
                n_rows
            )));
        }

        Ok(values.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_file() {
        let config = Config::default();
        let err = OnnxRegressor::from_file(Path::new("/nonexistent/model.onnx"), &config)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            Error::ArtifactMissing {
                artifact: Artifact::Model,
                ..
            }
        ));
    }

    #[test]
    fn test_garbage_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        std::fs::write(&path, b"not an onnx graph").unwrap();

        let err = OnnxRegressor::from_file(&path, &Config::default())
            .err()
            .unwrap();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
