//! Rent estimation interface.
//!
//! Provides the [`PriceEstimator`] context: the loaded artifacts plus the
//! encode and predict steps that turn a property record into a monthly rent.

use crate::attributes::PropertyAttributes;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::features::{encode_with_schema, EncodedFeatureVector};
use crate::model::{OnnxRegressor, Regressor};
use crate::scaler::{Scaler, StandardScaler};
use crate::schema::{FeatureSchema, SchemaDrift};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Result of a rent prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Estimated monthly rent, whole currency units
    pub price: u64,

    /// Raw model output, `ln(1 + price)`
    pub log_price: f64,
}

/// Invert the `ln(1 + price)` training target.
///
/// Negative estimates clamp to zero; non-finite outputs are an inference error.
pub fn price_from_log(log_price: f64) -> Result<u64> {
    if !log_price.is_finite() {
        return Err(Error::Inference(format!(
            "model produced a non-finite output: {log_price}"
        )));
    }
    whole_price(log_price.exp_m1()).ok_or_else(|| {
        Error::Inference(format!("model output {log_price} is out of range"))
    })
}

/// Round to whole units; `None` when the result does not fit a `u64`.
fn whole_price(price: f64) -> Option<u64> {
    let price = price.round();
    // `u64::MAX as f64` rounds up to 2^64, which is already out of range.
    if !price.is_finite() || price >= u64::MAX as f64 {
        return None;
    }
    Some(price.max(0.0) as u64)
}

/// Run the model on one encoded row and convert its output to a price.
pub fn predict(vector: &EncodedFeatureVector, model: &dyn Regressor) -> Result<PredictionResult> {
    let outputs = model.predict(vector.as_row())?;
    let log_price = match outputs.as_slice() {
        [value] => f64::from(*value),
        other => {
            return Err(Error::Inference(format!(
                "expected 1 prediction, model returned {}",
                other.len()
            )))
        }
    };

    Ok(PredictionResult {
        price: price_from_log(log_price)?,
        log_price,
    })
}

/// Loaded artifacts, immutable for the life of the process.
pub struct PriceEstimator {
    schema: FeatureSchema,
    scaler: Box<dyn Scaler>,
    model: Box<dyn Regressor>,
}

impl PriceEstimator {
    /// Assemble an estimator from already loaded parts.
    ///
    /// Runs the model once on an all-zero row of the schema's width, so a
    /// model exported for a different column list fails here as a
    /// configuration error instead of on the first request.
    pub fn try_new(
        schema: FeatureSchema,
        scaler: Box<dyn Scaler>,
        model: Box<dyn Regressor>,
    ) -> Result<Self> {
        let zeros = Array2::<f32>::zeros((1, schema.len()));
        model.predict(zeros.view()).map_err(|e| {
            Error::Configuration(format!(
                "model rejects {} input columns: {e}",
                schema.len()
            ))
        })?;

        Ok(Self {
            schema,
            scaler,
            model,
        })
    }

    /// Load the column list, scaler and model named by `config`.
    ///
    /// Any failure here is fatal: the caller should not start serving.
    ///
    /// # Example
    /// ```no_run
    /// use rent_inference::{Config, PriceEstimator};
    /// use std::path::Path;
    ///
    /// let config = Config::default().with_artifact_dir(Path::new("artifacts"));
    /// let estimator = PriceEstimator::load(&config).unwrap();
    /// ```
    pub fn load(config: &Config) -> Result<Self> {
        config.validate()?;

        let schema = FeatureSchema::from_file(&config.columns_path)?;
        schema.check_drift(config.strict_schema)?;

        let scaler = StandardScaler::from_file(&config.scaler_path)?;
        let model = OnnxRegressor::from_file(&config.model_path, config)?;

        let estimator = Self::try_new(schema, Box::new(scaler), Box::new(model))?;
        info!(columns = estimator.schema.len(), "Estimator ready");
        Ok(estimator)
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn drift(&self) -> SchemaDrift {
        self.schema.drift()
    }

    /// Build the model input row for a record.
    pub fn encode(&self, attrs: &PropertyAttributes) -> Result<EncodedFeatureVector> {
        encode_with_schema(attrs, &self.schema, self.scaler.as_ref())
    }

    /// Predict the rent for an already encoded row.
    pub fn predict(&self, vector: &EncodedFeatureVector) -> Result<PredictionResult> {
        predict(vector, self.model.as_ref())
    }

    /// Validate, encode and predict in one step.
    pub fn estimate(&self, attrs: &PropertyAttributes) -> Result<PredictionResult> {
        attrs.validate()?;
        let vector = self.encode(attrs)?;
        let result = self.predict(&vector)?;
        debug!(
            city = %attrs.city,
            size = attrs.size,
            price = result.price,
            "Estimated rent"
        );
        Ok(result)
    }
}
