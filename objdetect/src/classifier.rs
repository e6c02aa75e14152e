//! Classification boundary.
//!
//! A [`Classifier`] maps a feature vector to a label. The shipped
//! implementation, [`LinearModel`], is a fitted {scaler, one-vs-rest linear
//! classifier, label decoder} triple loaded once from a JSON artifact and
//! never modified afterwards.

use crate::{DetectError, Result};
use pnp_core::PointCloud;
use pnp_features::{FeatureExtractor, FeatureVector, NormalEstimator};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

/// Pretrained vector -> label model.
pub trait Classifier: Send + Sync {
    fn classify(&self, features: &FeatureVector) -> Result<String>;
}

/// Per-feature standardization: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f32>,
    pub scale: Vec<f32>,
}

impl StandardScaler {
    pub fn transform(&self, x: &[f32]) -> Vec<f32> {
        x.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (m, s))| {
                // Constant features are fitted with a zero scale.
                let s = if s.abs() > f32::EPSILON { *s } else { 1.0 };
                (v - m) / s
            })
            .collect()
    }
}

/// One-vs-rest linear decision functions, one row per class.
///
/// A single row with two classes is the binary form: positive score picks the second class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearDecision {
    pub coef: Vec<Vec<f32>>,
    pub intercept: Vec<f32>,
}

impl LinearDecision {
    fn scores(&self, x: &[f32]) -> Vec<f32> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(w, b)| w.iter().zip(x).map(|(wi, xi)| wi * xi).sum::<f32>() + b)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub scaler: StandardScaler,
    pub classifier: LinearDecision,
    /// Label decoder: class index -> label.
    pub classes: Vec<String>,
}

impl LinearModel {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let model: LinearModel = serde_json::from_reader(reader)?;
        model.validate()?;
        Ok(model)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let model = Self::from_reader(BufReader::new(file))?;
        tracing::info!(
            "loaded model from {} ({} classes, {} features)",
            path.as_ref().display(),
            model.classes.len(),
            model.dimension()
        );
        Ok(model)
    }

    pub fn dimension(&self) -> usize {
        self.scaler.mean.len()
    }

    fn validate(&self) -> Result<()> {
        let dim = self.dimension();
        if dim == 0 {
            return Err(DetectError::Model("scaler has no features".into()));
        }
        if self.scaler.scale.len() != dim {
            return Err(DetectError::Model(format!(
                "scaler mean has {} entries but scale has {}",
                dim,
                self.scaler.scale.len()
            )));
        }

        let rows = self.classifier.coef.len();
        let binary = rows == 1 && self.classes.len() == 2;
        if !binary && rows != self.classes.len() {
            return Err(DetectError::Model(format!(
                "{} decision rows for {} classes",
                rows,
                self.classes.len()
            )));
        }
        if self.classifier.intercept.len() != rows {
            return Err(DetectError::Model(format!(
                "{} intercepts for {} decision rows",
                self.classifier.intercept.len(),
                rows
            )));
        }
        if let Some(row) = self.classifier.coef.iter().find(|w| w.len() != dim) {
            return Err(DetectError::Model(format!(
                "decision row of length {} for {} features",
                row.len(),
                dim
            )));
        }
        Ok(())
    }
}

impl Classifier for LinearModel {
    fn classify(&self, features: &FeatureVector) -> Result<String> {
        if features.len() != self.dimension() {
            return Err(DetectError::DimensionMismatch {
                expected: self.dimension(),
                actual: features.len(),
            });
        }

        let x = self.scaler.transform(features.as_slice());
        let scores = self.classifier.scores(&x);

        let class = if scores.len() == 1 && self.classes.len() == 2 {
            usize::from(scores[0] > 0.0)
        } else {
            scores
                .iter()
                .enumerate()
                .fold((0, f32::NEG_INFINITY), |best, (i, &s)| if s > best.1 { (i, s) } else { best })
                .0
        };

        Ok(self.classes[class].clone())
    }
}

/// Feature extraction followed by classification, for one cluster at a time.
#[derive(Clone)]
pub struct ClusterClassifier {
    extractor: FeatureExtractor,
    normals: Arc<dyn NormalEstimator>,
    classifier: Arc<dyn Classifier>,
}

impl ClusterClassifier {
    pub fn new(
        extractor: FeatureExtractor,
        normals: Arc<dyn NormalEstimator>,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        Self {
            extractor,
            normals,
            classifier,
        }
    }

    pub fn classify(&self, cluster: &PointCloud) -> Result<String> {
        let features = self.extractor.extract(cluster, self.normals.as_ref())?;
        self.classifier.classify(&features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_model() -> LinearModel {
        LinearModel {
            scaler: StandardScaler {
                mean: vec![0.5, 0.5],
                scale: vec![0.5, 0.0],
            },
            classifier: LinearDecision {
                coef: vec![vec![1.0, 0.0], vec![-1.0, 0.0], vec![0.0, 1.0]],
                intercept: vec![0.0, 0.0, -10.0],
            },
            classes: vec!["soap".into(), "glue".into(), "book".into()],
        }
    }

    #[test]
    fn test_argmax_class() {
        let m = toy_model();
        assert_eq!(m.classify(&FeatureVector(vec![1.0, 0.5])).unwrap(), "soap");
        assert_eq!(m.classify(&FeatureVector(vec![0.0, 0.5])).unwrap(), "glue");
    }

    #[test]
    fn test_binary_form() {
        let m = LinearModel {
            scaler: StandardScaler { mean: vec![0.0], scale: vec![1.0] },
            classifier: LinearDecision { coef: vec![vec![2.0]], intercept: vec![-1.0] },
            classes: vec!["no".into(), "yes".into()],
        };
        assert_eq!(m.classify(&FeatureVector(vec![1.0])).unwrap(), "yes");
        assert_eq!(m.classify(&FeatureVector(vec![0.0])).unwrap(), "no");
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = toy_model().classify(&FeatureVector(vec![1.0])).unwrap_err();
        assert!(matches!(err, DetectError::DimensionMismatch { expected: 2, actual: 1 }));
    }

    #[test]
    fn test_load_rejects_inconsistent_model() {
        let json = r#"{
            "scaler": {"mean": [0.0, 0.0], "scale": [1.0, 1.0]},
            "classifier": {"coef": [[1.0, 0.0]], "intercept": [0.0]},
            "classes": ["a", "b", "c"]
        }"#;
        let err = LinearModel::from_reader(json.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("decision rows"));
    }

    #[test]
    fn test_load_from_json() {
        let json = serde_json::to_string(&toy_model()).unwrap();
        let m = LinearModel::from_reader(json.as_bytes()).unwrap();
        assert_eq!(m, toy_model());
        assert_eq!(m.dimension(), 2);
    }
}
