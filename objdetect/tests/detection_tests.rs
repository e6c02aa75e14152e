use nalgebra::{Point3, Vector3};
use pnp_core::{PointCloud, ServiceResult};
use pnp_features::{FeatureConfig, FeatureExtractor, NormalEstimator};
use pnp_objdetect::*;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

struct UpNormals;

impl NormalEstimator for UpNormals {
    fn estimate_normals(&self, cloud: &PointCloud, _: Duration) -> ServiceResult<Vec<Vector3<f32>>> {
        Ok(vec![Vector3::z(); cloud.len()])
    }
}

/// Hue-only model over 4-bin HSV + normal features (24 values).
/// Class "red" fires on the first hue bin, "blue" on the third.
fn hue_model_json() -> String {
    let dim = 24;
    let mut red = vec![0.0; dim];
    red[0] = 1.0;
    let mut blue = vec![0.0; dim];
    blue[2] = 1.0;
    serde_json::json!({
        "scaler": { "mean": vec![0.0; dim], "scale": vec![1.0; dim] },
        "classifier": { "coef": [red, blue], "intercept": [0.0, 0.0] },
        "classes": ["red", "blue"]
    })
    .to_string()
}

fn patch(color: Point3<f32>) -> PointCloud {
    let points: Vec<_> = (0..16)
        .map(|i| Point3::new((i % 4) as f32 * 0.01, (i / 4) as f32 * 0.01, 0.8))
        .collect();
    PointCloud::new(points).with_colors(vec![color; 16]).unwrap()
}

#[test]
fn test_classify_clusters_from_model_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(hue_model_json().as_bytes()).unwrap();

    let model = LinearModel::from_file(file.path()).unwrap();
    let classifier = ClusterClassifier::new(
        FeatureExtractor::new(FeatureConfig {
            bins: 4,
            ..FeatureConfig::default()
        }),
        Arc::new(UpNormals),
        Arc::new(model),
    );

    assert_eq!(classifier.classify(&patch(Point3::new(1.0, 0.0, 0.0))).unwrap(), "red");
    assert_eq!(classifier.classify(&patch(Point3::new(0.0, 0.0, 1.0))).unwrap(), "blue");
}

#[test]
fn test_wrong_bin_count_is_dimension_error() {
    let model = LinearModel::from_reader(hue_model_json().as_bytes()).unwrap();
    let classifier = ClusterClassifier::new(
        FeatureExtractor::default(),
        Arc::new(UpNormals),
        Arc::new(model),
    );

    let err = classifier.classify(&patch(Point3::new(1.0, 0.0, 0.0))).unwrap_err();
    assert!(matches!(err, DetectError::DimensionMismatch { expected: 24, actual: 192 }));
}

#[test]
fn test_missing_model_file() {
    let err = LinearModel::from_file("/nonexistent/model.json").unwrap_err();
    assert!(matches!(err, DetectError::Io(_)));
}
