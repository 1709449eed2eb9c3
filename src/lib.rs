//! Monthly rent estimation for residential listings.
//!
//! This crate turns a property record into the exact feature row a pretrained
//! regressor expects and runs ONNX model inference on it. The model, its
//! numeric scaler and its canonical column list are produced by the training
//! pipeline and loaded once at startup.

pub mod attributes;
pub mod config;
pub mod error;
pub mod features;
pub mod model;
pub mod predictor;
pub mod scaler;
pub mod schema;

pub use attributes::{
    AreaType, Category, City, ContactMethod, Furnishing, PropertyAttributes, TenantPreference,
};
pub use config::Config;
pub use error::{Artifact, Error, Result};
pub use features::{encode, encode_with_schema, EncodedFeatureVector};
pub use model::{OnnxRegressor, Regressor};
pub use predictor::{predict, price_from_log, PredictionResult, PriceEstimator};
pub use scaler::{Scaler, ScalerParams, StandardScaler};
pub use schema::{FeatureSchema, SchemaDrift};
