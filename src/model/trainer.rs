//! Batch training of the default scorer.
//!
//! Class-balanced logistic regression fitted by full-batch gradient descent on
//! a stratified split. The held-out part only feeds the logged report.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{info, warn};

use super::error::{ModelError, ModelResult};
use super::features::FeatureEncoder;
use super::logistic::{ClassificationReport, ScoringModel, sigmoid};
use crate::constants::{TRAINING_SPLIT_SEED, VALIDATION_FRACTION};
use crate::table::{EntityRow, EntityTable, TableError};

#[derive(Debug, Clone)]
pub struct TrainerConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    pub l2: f64,
    pub validation_fraction: f64,
    pub seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            epochs: 2000,
            learning_rate: 0.1,
            l2: 1e-4,
            validation_fraction: VALIDATION_FRACTION,
            seed: TRAINING_SPLIT_SEED,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogisticTrainer {
    config: TrainerConfig,
}

impl LogisticTrainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Trains on `table`, using `target_column` as the label and ignoring `id_column`.
    pub fn train(
        &self,
        table: &EntityTable,
        target_column: &str,
        id_column: &str,
    ) -> ModelResult<ScoringModel> {
        if table.is_empty() {
            return Err(TableError::EmptyPool {
                source_name: "training table".to_string(),
            }
            .into());
        }
        table.require_column(target_column, "training table")?;

        let labels = extract_labels(table, target_column)?;
        let positives = labels.iter().filter(|l| **l).count();
        let negatives = labels.len() - positives;
        if positives == 0 || negatives == 0 {
            return Err(ModelError::training(format!(
                "training table needs both classes, found {} positive and {} negative rows",
                positives, negatives
            )));
        }

        let excluded = [id_column, target_column];
        let features: Vec<EntityRow> = table.rows().iter().map(|r| r.without(&excluded)).collect();

        let (train_idx, val_idx) = self.stratified_split(&labels);

        let train_rows: Vec<EntityRow> = train_idx.iter().map(|&i| features[i].clone()).collect();
        let train_labels: Vec<bool> = train_idx.iter().map(|&i| labels[i]).collect();

        let encoder = FeatureEncoder::fit(&train_rows);
        let encoded: Vec<Vec<f64>> = train_rows.iter().map(|r| encoder.transform(r)).collect();
        let (weights, bias) = self.fit(&encoded, &train_labels, encoder.dim());

        let mut model = ScoringModel::new(encoder, weights, bias);

        if val_idx.is_empty() {
            warn!("Validation split is empty; skipping classification report");
        } else {
            let truth: Vec<bool> = val_idx.iter().map(|&i| labels[i]).collect();
            let predicted: Vec<bool> = val_idx
                .iter()
                .map(|&i| model.probability(&model.encoder.transform(&features[i])) >= 0.5)
                .collect();
            let report = ClassificationReport::from_predictions(&truth, &predicted);
            info!(
                accuracy = report.accuracy,
                positive_f1 = report.positive.f1,
                validation_rows = truth.len(),
                "Validation report\n{}",
                report
            );
            model = model.with_metrics(report);
        }

        info!(
            train_rows = train_idx.len(),
            features = model.weights.len(),
            "Trained scoring model"
        );

        Ok(model)
    }

    /// Splits row indices per class so both sides keep the class balance.
    /// Every class keeps at least one training row.
    fn stratified_split(&self, labels: &[bool]) -> (Vec<usize>, Vec<usize>) {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut train = Vec::new();
        let mut validation = Vec::new();

        for class in [false, true] {
            let mut idx: Vec<usize> = (0..labels.len()).filter(|&i| labels[i] == class).collect();
            idx.shuffle(&mut rng);
            let wanted = (idx.len() as f64 * self.config.validation_fraction).round() as usize;
            let n_val = wanted.min(idx.len().saturating_sub(1));
            validation.extend_from_slice(&idx[..n_val]);
            train.extend_from_slice(&idx[n_val..]);
        }

        train.sort_unstable();
        validation.sort_unstable();
        (train, validation)
    }

    fn fit(&self, x: &[Vec<f64>], y: &[bool], dim: usize) -> (Vec<f64>, f64) {
        let n = x.len() as f64;
        let positives = y.iter().filter(|l| **l).count() as f64;
        let negatives = n - positives;
        // Balanced weights: n / (classes * class_count).
        let class_weight = |label: bool| {
            if label {
                n / (2.0 * positives)
            } else {
                n / (2.0 * negatives)
            }
        };

        let mut weights = vec![0.0; dim];
        let mut bias = 0.0;
        let mut grad = vec![0.0; dim];

        for _ in 0..self.config.epochs {
            grad.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_bias = 0.0;

            for (row, &label) in x.iter().zip(y) {
                let z = weights.iter().zip(row).map(|(w, v)| w * v).sum::<f64>() + bias;
                let target = if label { 1.0 } else { 0.0 };
                let err = (sigmoid(z) - target) * class_weight(label);
                for (g, v) in grad.iter_mut().zip(row) {
                    *g += err * v;
                }
                grad_bias += err;
            }

            for (w, g) in weights.iter_mut().zip(&grad) {
                *w -= self.config.learning_rate * (g / n + self.config.l2 * *w);
            }
            bias -= self.config.learning_rate * grad_bias / n;
        }

        (weights, bias)
    }
}

fn extract_labels(table: &EntityTable, target_column: &str) -> ModelResult<Vec<bool>> {
    table
        .rows()
        .iter()
        .enumerate()
        .map(|(index, row)| {
            row.get_present(target_column)
                .and_then(|cell| cell.as_f64())
                .map(|v| v >= 0.5)
                .ok_or_else(|| {
                    ModelError::from(TableError::Schema {
                        reason: format!(
                            "row {} has no numeric value in label column '{}'",
                            index, target_column
                        ),
                    })
                })
        })
        .collect()
}
