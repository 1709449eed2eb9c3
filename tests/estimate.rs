use ndarray::{Array2, ArrayView2};
use rent_inference::attributes::NUMERIC_COLUMNS;
use rent_inference::{
    Artifact, AreaType, Category, City, Config, ContactMethod, Error, FeatureSchema, Furnishing,
    PriceEstimator, PropertyAttributes, Regressor, Result, Scaler, ScalerParams, StandardScaler,
    TenantPreference,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Always predicts the same log-space value and counts its calls.
struct ConstantModel {
    log_price: f32,
    calls: Arc<AtomicUsize>,
}

impl Regressor for ConstantModel {
    fn predict(&self, rows: ArrayView2<'_, f32>) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![self.log_price; rows.nrows()])
    }
}

/// Fails like a model fed the wrong number of columns.
struct BrokenModel;

impl Regressor for BrokenModel {
    fn predict(&self, rows: ArrayView2<'_, f32>) -> Result<Vec<f32>> {
        Err(Error::Inference(format!(
            "Got invalid dimensions for input: expected 40, got {}",
            rows.ncols()
        )))
    }
}

/// Accepts the all-zero startup row but fails on real feature values.
struct RejectsFeatureValues;

impl Regressor for RejectsFeatureValues {
    fn predict(&self, rows: ArrayView2<'_, f32>) -> Result<Vec<f32>> {
        if rows.iter().any(|v| *v != 0.0) {
            return Err(Error::Inference("unsupported feature values".into()));
        }
        Ok(vec![0.0; rows.nrows()])
    }
}

struct Identity;

impl Scaler for Identity {
    fn transform(&self, rows: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        Ok(rows.to_owned())
    }
}

fn training_columns() -> Vec<String> {
    let mut columns: Vec<String> = NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.extend(AreaType::all().iter().map(|v| v.column_name()));
    columns.extend(City::all().iter().map(|v| v.column_name()));
    columns.extend(Furnishing::all().iter().map(|v| v.column_name()));
    columns.extend(TenantPreference::all().iter().map(|v| v.column_name()));
    columns.extend(ContactMethod::all().iter().map(|v| v.column_name()));
    columns
}

fn scaler() -> StandardScaler {
    StandardScaler::new(ScalerParams {
        mean: vec![2.1, 967.5, 1.97, 3.4],
        scale: vec![0.83, 634.2, 0.88, 5.8],
        feature_names: None,
    })
    .unwrap()
}

fn form_record() -> PropertyAttributes {
    serde_json::from_str(
        r#"{
            "bhk": 2, "size": 900, "bath": 2, "floor": 1,
            "area_type": "Super Area", "city": "Mumbai",
            "furnishing": "Unfurnished", "tenant": "Bachelors",
            "contact": "Contact Owner"
        }"#,
    )
    .unwrap()
}

#[test]
fn test_mumbai_listing_returns_model_price() {
    let calls = Arc::new(AtomicUsize::new(0));
    let model = ConstantModel {
        log_price: 15000.0_f64.ln_1p() as f32,
        calls: Arc::clone(&calls),
    };
    let schema = FeatureSchema::new(training_columns()).unwrap();
    let estimator = PriceEstimator::try_new(schema, Box::new(scaler()), Box::new(model)).unwrap();
    let at_startup = calls.load(Ordering::SeqCst);

    let result = estimator.estimate(&form_record()).unwrap();
    assert_eq!(result.price, 15000);
    assert_eq!(calls.load(Ordering::SeqCst) - at_startup, 1);
}

#[test]
fn test_broken_model_fails_prediction() {
    let schema = FeatureSchema::new(training_columns()).unwrap();
    let vector = rent_inference::encode_with_schema(&form_record(), &schema, &Identity).unwrap();

    let err = rent_inference::predict(&vector, &BrokenModel).unwrap_err();
    assert!(matches!(err, Error::Inference(_)));
    assert!(!err.is_fatal());
}

#[test]
fn test_column_count_mismatch_fails_at_startup() {
    let schema = FeatureSchema::new(training_columns()).unwrap();
    let err = PriceEstimator::try_new(schema, Box::new(Identity), Box::new(BrokenModel))
        .err()
        .unwrap();
    assert!(matches!(err, Error::Configuration(_)));
    assert!(err.is_fatal());
}

#[test]
fn test_request_failure_keeps_serving() {
    let schema = FeatureSchema::new(training_columns()).unwrap();
    let estimator =
        PriceEstimator::try_new(schema, Box::new(Identity), Box::new(RejectsFeatureValues))
            .unwrap();

    let err = estimator.estimate(&form_record()).unwrap_err();
    assert!(matches!(err, Error::Inference(_)));
    assert!(!err.is_fatal());

    // The estimator keeps serving after a failed request.
    let err = estimator.estimate(&form_record()).unwrap_err();
    assert!(matches!(err, Error::Inference(_)));
}

#[test]
fn test_vector_matches_training_columns() {
    let mut columns = training_columns();
    columns.insert(10, "City_Pune".to_string());
    let schema = FeatureSchema::new(columns.clone()).unwrap();
    let estimator = PriceEstimator::try_new(
        schema,
        Box::new(scaler()),
        Box::new(ConstantModel {
            log_price: 9.0,
            calls: Arc::default(),
        }),
    )
    .unwrap();

    let vector = estimator.encode(&form_record()).unwrap();
    assert_eq!(vector.columns(), columns.as_slice());
    assert_eq!(vector.get("City_Pune"), Some(0.0));
    assert_eq!(vector.get("City_Mumbai"), Some(1.0));
    assert!((vector.get("Size").unwrap() - ((900.0 - 967.5) / 634.2) as f32).abs() < 1e-6);

    let drift = estimator.drift();
    assert_eq!(drift.unreachable_columns, vec!["City_Pune".to_string()]);
    assert!(drift.missing_categories.is_empty());
}

fn write_artifacts(dir: &Path, columns: &[String]) {
    std::fs::write(
        dir.join("columns.json"),
        serde_json::to_string(columns).unwrap(),
    )
    .unwrap();
    std::fs::write(
        dir.join("scaler.json"),
        r#"{"mean": [2.1, 967.5, 1.97, 3.4], "scale": [0.83, 634.2, 0.88, 5.8],
            "feature_names": ["BHK", "Size", "Bathroom", "Floor"]}"#,
    )
    .unwrap();
}

#[test]
fn test_load_without_model_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path(), &training_columns());

    let config = Config::default().with_artifact_dir(dir.path());
    let err = PriceEstimator::load(&config).err().unwrap();
    assert!(err.is_fatal());
    assert!(matches!(
        err,
        Error::ArtifactMissing {
            artifact: Artifact::Model,
            ..
        }
    ));
}

#[test]
fn test_load_without_columns_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::default().with_artifact_dir(dir.path());
    let err = PriceEstimator::load(&config).err().unwrap();
    assert!(matches!(
        err,
        Error::ArtifactMissing {
            artifact: Artifact::Columns,
            ..
        }
    ));
}

#[test]
fn test_load_empty_columns_is_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path(), &[]);

    let config = Config::default().with_artifact_dir(dir.path());
    let err = PriceEstimator::load(&config).err().unwrap();
    assert!(matches!(err, Error::Configuration(_)));
}

#[test]
fn test_strict_schema_rejects_drift_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    let columns: Vec<String> = training_columns()
        .into_iter()
        .filter(|c| c != "City_Hyderabad")
        .collect();
    write_artifacts(dir.path(), &columns);

    let mut config = Config::default().with_artifact_dir(dir.path());
    config.strict_schema = true;
    let err = PriceEstimator::load(&config).err().unwrap();
    assert!(matches!(err, Error::Configuration(_)));
    assert!(err.to_string().contains("City_Hyderabad"));
}
