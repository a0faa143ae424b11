//! Recommendability scoring.
//!
//! A [`Scorer`] maps feature rows to the probability that each entity is worth
//! recommending. The default is a logistic model ([`ScoringModel`]) persisted
//! as a JSON artifact and trained from the labelled table when absent.

pub mod error;
pub mod features;
pub mod loader;
pub mod logistic;
pub mod trainer;


pub use error::{ModelError, ModelResult};
pub use features::FeatureEncoder;
pub use loader::{ArtifactModelLoader, ModelLoader};
#[cfg(any(test, feature = "mock"))]
pub use loader::{MockModelLoader, MockScorer};
pub use logistic::{ClassMetrics, ClassificationReport, ScoringModel};
pub use trainer::{LogisticTrainer, TrainerConfig};

use crate::table::EntityRow;

/// Probability-of-recommendability scorer.
pub trait Scorer: Send + Sync {
    /// One probability per input row, in input order.
    ///
    /// Callers validate the length; implementations should not rely on that.
    fn predict_proba(&self, rows: &[EntityRow]) -> ModelResult<Vec<f64>>;
}
