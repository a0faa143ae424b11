//! Jobrec library crate (used by the server and integration tests).
//!
//! # Public API Surface
//!
//! ## Data
//! - [`EntityTable`], [`EntityRow`], [`CellValue`] - Candidate and training tables
//! - [`TableSource`], [`FileTableSource`] - Where tables come from
//!
//! ## Scoring
//! - [`Scorer`], [`ModelLoader`] - Model seams
//! - [`ScoringModel`], [`LogisticTrainer`], [`ArtifactModelLoader`] - The shipped model
//!
//! ## Caches
//! - [`ModelCache`], [`CandidatePool`], [`RankedScoreCache`] - Load-once, invalidate-on-demand
//!
//! ## Recommendation
//! - [`Recommender`], [`FileRecommender`] - Selection, materialization and delivery
//! - [`SelectionPolicy`], [`DisplayRecord`], [`RecommendationSink`]
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod config;
pub mod constants;
pub mod gateway;
pub mod materialize;
pub mod model;
pub mod recommender;
pub mod selection;
pub mod sink;
pub mod table;

pub use cache::{
    CacheTarget, CandidatePool, JOBREC_STATUS_ERROR, JOBREC_STATUS_HEADER, JOBREC_STATUS_HEALTHY,
    JOBREC_STATUS_NOT_READY, JOBREC_STATUS_READY, Memo, ModelCache, RankedScoreCache,
    RankedScores, ScoredEntity,
};
pub use config::{Config, ConfigError};
pub use materialize::{DisplayRecord, PartialRecord, materialize, materialize_all};
#[cfg(any(test, feature = "mock"))]
pub use model::{MockModelLoader, MockScorer};
pub use model::{
    ArtifactModelLoader, ClassificationReport, LogisticTrainer, ModelError, ModelLoader,
    ModelResult, Scorer, ScoringModel, TrainerConfig,
};
pub use recommender::{FileRecommender, RecommendError, RecommendResult, Recommender};
pub use selection::{SelectionPolicy, random_block, top_n_excluding};
#[cfg(any(test, feature = "mock"))]
pub use sink::MemorySink;
pub use sink::{Delivery, JsonDirSink, RecommendationSink, SinkError, SinkResult, TracingSink};
#[cfg(any(test, feature = "mock"))]
pub use table::MockTableSource;
pub use table::{
    CellValue, DuplicateIdPolicy, EntityRow, EntityTable, FileTableSource, IdSource, TableError,
    TableResult, TableSource, read_table,
};
