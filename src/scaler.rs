//! Numeric feature standardization.
//!
//! The scaler was fitted on the numeric training columns only. It is applied
//! to the `BHK`, `Size`, `Bathroom`, `Floor` sub-row of an encoded vector,
//! always in that order.

use crate::attributes::NUMERIC_COLUMNS;
use crate::error::{Artifact, Error, Result};
use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Fixed-order transform over numeric feature rows.
pub trait Scaler: Send + Sync {
    /// Transform `rows` (one row per record) into a matrix of the same shape.
    fn transform(&self, rows: ArrayView2<'_, f64>) -> Result<Array2<f64>>;
}

/// Stored parameters, laid out like a fitted `StandardScaler`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerParams {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,

    /// Column names seen at fit time, if the exporter recorded them
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

/// Standard score scaler: `(x - mean) / scale` per column.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    pub fn new(params: ScalerParams) -> Result<Self> {
        if params.mean.is_empty() {
            return Err(Error::Configuration("scaler has no features".into()));
        }
        if params.mean.len() != params.scale.len() {
            return Err(Error::Configuration(format!(
                "scaler has {} means but {} scales",
                params.mean.len(),
                params.scale.len()
            )));
        }
        if let Some(i) = params
            .scale
            .iter()
            .position(|s| !s.is_finite() || *s == 0.0)
        {
            return Err(Error::Configuration(format!(
                "scaler scale for feature {i} is {}",
                params.scale[i]
            )));
        }
        if let Some(names) = &params.feature_names {
            if names.len() != params.mean.len() {
                return Err(Error::Configuration(format!(
                    "scaler names {} features but has parameters for {}",
                    names.len(),
                    params.mean.len()
                )));
            }
        }

        Ok(Self {
            mean: Array1::from(params.mean),
            scale: Array1::from(params.scale),
        })
    }

    /// Load scaler parameters from a JSON artifact.
    ///
    /// The artifact must describe exactly the numeric columns, in order.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ArtifactMissing {
            artifact: Artifact::Scaler,
            path: path.to_path_buf(),
            source,
        })?;
        let params: ScalerParams = serde_json::from_str(&content).map_err(|e| {
            Error::Configuration(format!("scaler {} is malformed: {e}", path.display()))
        })?;

        if let Some(names) = &params.feature_names {
            if names.iter().map(String::as_str).ne(NUMERIC_COLUMNS) {
                return Err(Error::Configuration(format!(
                    "scaler was fitted on {names:?}, expected {NUMERIC_COLUMNS:?}"
                )));
            }
        }

        let scaler = Self::new(params)?;
        if scaler.n_features() != NUMERIC_COLUMNS.len() {
            return Err(Error::Configuration(format!(
                "scaler expects {} features, encoder provides {}",
                scaler.n_features(),
                NUMERIC_COLUMNS.len()
            )));
        }

        info!(path = %path.display(), "Loaded scaler");
        Ok(scaler)
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }
}

impl Scaler for StandardScaler {
    fn transform(&self, rows: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        if rows.ncols() != self.n_features() {
            return Err(Error::Configuration(format!(
                "scaler expects {} columns, got {}",
                self.n_features(),
                rows.ncols()
            )));
        }

        let mut result = rows.to_owned();
        for (i, mut col) in result.columns_mut().into_iter().enumerate() {
            let (mean, scale) = (self.mean[i], self.scale[i]);
            col.mapv_inplace(|v| (v - mean) / scale);
        }
        Ok(result)
    }
}
