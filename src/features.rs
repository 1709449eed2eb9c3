//! Feature vector construction for model inputs.
//!
//! Builds the exact row the regressor was trained on: numeric fields as-is,
//! one indicator per categorical field named `{field}_{value}`, projected onto
//! the canonical column order (absent columns are zero, columns the model does
//! not know are dropped), then the numeric columns standardized in place.
//!
//! **Critical for correctness**: column names and the numeric column order
//! must match the training pipeline exactly to avoid train/serve skew.

use crate::attributes::{PropertyAttributes, NUMERIC_COLUMNS};
use crate::error::{Error, Result};
use crate::scaler::Scaler;
use crate::schema::FeatureSchema;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use std::sync::Arc;

/// A model-ready row with named slots in canonical column order.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFeatureVector {
    columns: Arc<[String]>,
    values: Array1<f32>,
}

impl EncodedFeatureVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &Array1<f32> {
        &self.values
    }

    /// Value of a named slot, `None` if the column is not part of the schema.
    pub fn get(&self, column: &str) -> Option<f32> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i])
    }

    /// `(column, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// The vector as a `1 x n` matrix.
    pub fn as_row(&self) -> ArrayView2<'_, f32> {
        self.values.view().insert_axis(Axis(0))
    }
}

/// Encode one record against a compiled schema.
pub fn encode_with_schema(
    attrs: &PropertyAttributes,
    schema: &FeatureSchema,
    scaler: &dyn Scaler,
) -> Result<EncodedFeatureVector> {
    let mut values = Array1::<f32>::zeros(schema.len());

    // Indicators; a value with no slot stays all-zero.
    let hot = [
        schema.area_type_slot(attrs.area_type),
        schema.city_slot(attrs.city),
        schema.furnishing_slot(attrs.furnishing),
        schema.tenant_preference_slot(attrs.tenant_preference),
        schema.contact_method_slot(attrs.contact_method),
    ];
    for slot in hot.into_iter().flatten() {
        values[slot] = 1.0;
    }

    let raw = Array2::from_shape_vec((1, NUMERIC_COLUMNS.len()), attrs.numeric_values().to_vec())
        .map_err(|e| Error::Configuration(format!("numeric feature shape: {e}")))?;
    let scaled = scaler.transform(raw.view())?;
    if scaled.dim() != raw.dim() {
        return Err(Error::Configuration(format!(
            "scaler returned shape {:?} for input {:?}",
            scaled.dim(),
            raw.dim()
        )));
    }

    for (slot, value) in schema.numeric_slots().into_iter().zip(scaled.row(0)) {
        values[slot] = *value as f32;
    }

    Ok(EncodedFeatureVector {
        columns: Arc::clone(schema.columns()),
        values,
    })
}

/// Encode one record against a raw canonical column list.
///
/// Compiles the schema on every call; long-lived callers should build a
/// [`FeatureSchema`] once and use [`encode_with_schema`].
pub fn encode(
    attrs: &PropertyAttributes,
    canonical_columns: &[String],
    scaler: &dyn Scaler,
) -> Result<EncodedFeatureVector> {
    let schema = FeatureSchema::new(canonical_columns.to_vec())?;
    encode_with_schema(attrs, &schema, scaler)
}
