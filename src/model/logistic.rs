use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::{ModelError, ModelResult};
use super::features::FeatureEncoder;
use super::Scorer;
use crate::constants::ARTIFACT_FORMAT_VERSION;
use crate::table::EntityRow;

/// Trained logistic-regression pipeline: feature encoding plus a linear model.
///
/// Serialized to JSON as the persisted artifact. Never mutated after training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringModel {
    pub format_version: u32,
    pub encoder: FeatureEncoder,
    pub weights: Vec<f64>,
    pub bias: f64,
    pub trained_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ClassificationReport>,
}

impl ScoringModel {
    pub fn new(encoder: FeatureEncoder, weights: Vec<f64>, bias: f64) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            encoder,
            weights,
            bias,
            trained_at: Utc::now(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: ClassificationReport) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Probability of the positive class for one encoded vector.
    pub fn probability(&self, features: &[f64]) -> f64 {
        let z = self
            .weights
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias;
        sigmoid(z)
    }

    /// Reads an artifact as-is.
    ///
    /// A file that does not parse, or whose weights do not match its encoder,
    /// is reported as [`ModelError::Load`].
    pub fn load(path: &Path) -> ModelResult<Self> {
        let load_err = |reason: String| ModelError::Load {
            path: path.to_path_buf(),
            reason,
        };

        let text = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let model: ScoringModel =
            serde_json::from_str(&text).map_err(|e| load_err(e.to_string()))?;

        if model.weights.len() != model.encoder.dim() {
            return Err(load_err(format!(
                "artifact has {} weights for {} encoded features",
                model.weights.len(),
                model.encoder.dim()
            )));
        }
        if !model.bias.is_finite() || model.weights.iter().any(|w| !w.is_finite()) {
            return Err(load_err("artifact contains non-finite parameters".to_string()));
        }

        info!(
            path = %path.display(),
            features = model.weights.len(),
            trained_at = %model.trained_at,
            "Loaded model artifact"
        );

        Ok(model)
    }

    /// Writes the artifact via a temp file in the same directory, then renames.
    pub fn save(&self, path: &Path) -> ModelResult<()> {
        let save_err = |reason: String| ModelError::Save {
            path: path.to_path_buf(),
            reason,
        };

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => std::path::PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(|e| save_err(e.to_string()))?;

        let bytes = serde_json::to_vec_pretty(self).map_err(|e| save_err(e.to_string()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(|e| save_err(e.to_string()))?;
        tmp.write_all(&bytes).map_err(|e| save_err(e.to_string()))?;
        tmp.flush().map_err(|e| save_err(e.to_string()))?;
        tmp.persist(path).map_err(|e| save_err(e.error.to_string()))?;

        debug!(path = %path.display(), bytes = bytes.len(), "Wrote model artifact");
        Ok(())
    }
}

impl Scorer for ScoringModel {
    fn predict_proba(&self, rows: &[EntityRow]) -> ModelResult<Vec<f64>> {
        Ok(rows
            .iter()
            .map(|row| self.probability(&self.encoder.transform(row)))
            .collect())
    }
}

#[inline]
pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Per-class precision/recall/F1 on the held-out split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub negative: ClassMetrics,
    pub positive: ClassMetrics,
    pub accuracy: f64,
}

impl ClassificationReport {
    /// Builds the report from true labels and predicted labels.
    pub fn from_predictions(truth: &[bool], predicted: &[bool]) -> Self {
        let pairs = || truth.iter().zip(predicted);
        let count = |t: bool, p: bool| pairs().filter(|(a, b)| **a == t && **b == p).count();

        let tp = count(true, true);
        let tn = count(false, false);
        let fp = count(false, true);
        let fn_ = count(true, false);

        let total = truth.len();
        let accuracy = if total == 0 {
            0.0
        } else {
            (tp + tn) as f64 / total as f64
        };

        Self {
            positive: class_metrics(tp, fp, fn_),
            negative: class_metrics(tn, fn_, fp),
            accuracy,
        }
    }
}

impl std::fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "class      precision  recall  f1-score  support")?;
        for (label, m) in [("0", &self.negative), ("1", &self.positive)] {
            writeln!(
                f,
                "{:<10} {:>9.2} {:>7.2} {:>9.2} {:>8}",
                label, m.precision, m.recall, m.f1, m.support
            )?;
        }
        write!(
            f,
            "accuracy   {:>27.2} {:>8}",
            self.accuracy,
            self.negative.support + self.positive.support
        )
    }
}

fn class_metrics(true_pos: usize, false_pos: usize, false_neg: usize) -> ClassMetrics {
    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    let precision = ratio(true_pos, true_pos + false_pos);
    let recall = ratio(true_pos, true_pos + false_neg);
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };
    ClassMetrics {
        precision,
        recall,
        f1,
        support: true_pos + false_neg,
    }
}
