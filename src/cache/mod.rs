//! Memoized model, candidate pool and ranking.
//!
//! Each cache loads on first access and keeps the result until invalidated.
//! Failed loads are not cached. The ranking depends on the other two; see
//! [`crate::recommender::Recommender`] for invalidation that spans caches.

pub mod memo;
pub mod model;
pub mod pool;
pub mod ranked;
pub mod types;


pub use memo::Memo;
pub use model::ModelCache;
pub use pool::CandidatePool;
pub use ranked::{RankedScoreCache, RankedScores, ScoredEntity};
pub use types::{
    CacheTarget, JOBREC_STATUS_ERROR, JOBREC_STATUS_HEADER, JOBREC_STATUS_HEALTHY,
    JOBREC_STATUS_NOT_READY, JOBREC_STATUS_READY,
};
