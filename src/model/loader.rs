use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::error::{ModelError, ModelResult};
use super::logistic::ScoringModel;
use super::trainer::LogisticTrainer;
use super::Scorer;
use crate::table::{FileTableSource, TableSource};

/// Produces the scorer held by [`crate::cache::ModelCache`].
pub trait ModelLoader: Send + Sync {
    type Model: Scorer + 'static;

    /// Loads the model, training it first if the loader supports that and no
    /// persisted copy exists.
    fn load(&self) -> ModelResult<Self::Model>;

    /// Removes any persisted copy so the next [`load`](Self::load) retrains.
    fn discard(&self) -> ModelResult<()> {
        Ok(())
    }

    fn describe(&self) -> String;
}

/// Loads the JSON artifact, training and writing it when absent.
#[derive(Debug, Clone)]
pub struct ArtifactModelLoader {
    artifact_path: PathBuf,
    training: FileTableSource,
    id_column: String,
    target_column: String,
    trainer: LogisticTrainer,
}

impl ArtifactModelLoader {
    pub fn new(
        artifact_path: impl Into<PathBuf>,
        training_path: impl Into<PathBuf>,
        id_column: impl Into<String>,
        target_column: impl Into<String>,
    ) -> Self {
        let target_column = target_column.into();
        Self {
            artifact_path: artifact_path.into(),
            training: FileTableSource::new(training_path).require_column(target_column.clone()),
            id_column: id_column.into(),
            target_column,
            trainer: LogisticTrainer::default(),
        }
    }

    pub fn with_trainer(mut self, trainer: LogisticTrainer) -> Self {
        self.trainer = trainer;
        self
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    pub fn has_artifact(&self) -> bool {
        self.artifact_path.is_file()
    }
}

impl ModelLoader for ArtifactModelLoader {
    type Model = ScoringModel;

    fn load(&self) -> ModelResult<ScoringModel> {
        if self.artifact_path.exists() {
            return ScoringModel::load(&self.artifact_path);
        }

        info!(
            artifact = %self.artifact_path.display(),
            training = %self.training.describe(),
            "No model artifact found, training from labelled table"
        );

        let table = self.training.load()?;
        let model = self
            .trainer
            .train(&table, &self.target_column, &self.id_column)?;
        model.save(&self.artifact_path)?;

        Ok(model)
    }

    fn discard(&self) -> ModelResult<()> {
        match std::fs::remove_file(&self.artifact_path) {
            Ok(()) => {
                warn!(artifact = %self.artifact_path.display(), "Removed model artifact for retraining");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ModelError::Save {
                path: self.artifact_path.clone(),
                reason: e.to_string(),
            }),
        }
    }

    fn describe(&self) -> String {
        self.artifact_path.display().to_string()
    }
}

/// Scores each row by reading a numeric column; missing values score `0.0`.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Clone)]
pub struct MockScorer {
    signal_column: String,
    drop_last: bool,
}

#[cfg(any(test, feature = "mock"))]
impl MockScorer {
    pub const DEFAULT_SIGNAL_COLUMN: &'static str = "signal";

    pub fn new(signal_column: impl Into<String>) -> Self {
        Self {
            signal_column: signal_column.into(),
            drop_last: false,
        }
    }

    /// Returns one score too few, to exercise output validation.
    pub fn short_output(mut self) -> Self {
        self.drop_last = true;
        self
    }
}

#[cfg(any(test, feature = "mock"))]
impl Scorer for MockScorer {
    fn predict_proba(&self, rows: &[crate::table::EntityRow]) -> ModelResult<Vec<f64>> {
        let mut scores: Vec<f64> = rows
            .iter()
            .map(|row| {
                row.get(&self.signal_column)
                    .and_then(crate::table::CellValue::as_f64)
                    .unwrap_or(0.0)
            })
            .collect();
        if self.drop_last {
            scores.pop();
        }
        Ok(scores)
    }
}

/// Loader that hands out [`MockScorer`]s, counting loads and failing on request.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug)]
pub struct MockModelLoader {
    scorer: MockScorer,
    loads: std::sync::atomic::AtomicUsize,
    discards: std::sync::atomic::AtomicUsize,
    failures_left: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "mock"))]
impl Default for MockModelLoader {
    fn default() -> Self {
        Self::new(MockScorer::new(MockScorer::DEFAULT_SIGNAL_COLUMN))
    }
}

#[cfg(any(test, feature = "mock"))]
impl MockModelLoader {
    pub fn new(scorer: MockScorer) -> Self {
        Self {
            scorer,
            loads: Default::default(),
            discards: Default::default(),
            failures_left: Default::default(),
        }
    }

    /// Makes the next `n` loads fail with [`ModelError::Load`].
    pub fn fail_next(&self, n: usize) {
        self.failures_left
            .store(n, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn discard_count(&self) -> usize {
        self.discards.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "mock"))]
impl ModelLoader for MockModelLoader {
    type Model = MockScorer;

    fn load(&self) -> ModelResult<MockScorer> {
        use std::sync::atomic::Ordering;

        self.loads.fetch_add(1, Ordering::SeqCst);
        let should_fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(ModelError::Load {
                path: PathBuf::from("mock://model"),
                reason: "injected failure".to_string(),
            });
        }
        Ok(self.scorer.clone())
    }

    fn discard(&self) -> ModelResult<()> {
        self.discards
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "mock://model".to_string()
    }
}
