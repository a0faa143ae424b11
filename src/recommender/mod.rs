//! The recommendation facade: caches, selection, materialization and delivery.
//!
//! Every call works on one ranking snapshot, so a concurrent invalidation can
//! never mix two pool versions into the same answer.

pub mod error;


pub use error::{RecommendError, RecommendResult};

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::cache::{CacheTarget, CandidatePool, ModelCache, RankedScoreCache, RankedScores, ScoredEntity};
use crate::config::Config;
use crate::constants::{DEFAULT_MAX_N, DEFAULT_TOP_N};
use crate::materialize::{DisplayRecord, materialize_all};
use crate::model::{ArtifactModelLoader, ModelLoader};
use crate::selection::SelectionPolicy;
use crate::sink::{JsonDirSink, RecommendationSink, TracingSink};
use crate::table::{FileTableSource, TableSource};

/// Production recommender over files on disk.
pub type FileRecommender = Recommender<ArtifactModelLoader, FileTableSource>;

pub struct Recommender<L: ModelLoader, S: TableSource> {
    ranked: RankedScoreCache<L, S>,
    sink: Arc<dyn RecommendationSink>,
    rng: Mutex<StdRng>,
    default_n: usize,
    max_n: usize,
}

impl<L: ModelLoader, S: TableSource> std::fmt::Debug for Recommender<L, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recommender")
            .field("ranked", &self.ranked)
            .field("sink", &self.sink.describe())
            .field("default_n", &self.default_n)
            .field("max_n", &self.max_n)
            .finish()
    }
}

impl FileRecommender {
    /// Wires the file-backed caches and sink described by `config`.
    pub fn from_config(config: &Config) -> Self {
        let loader = ArtifactModelLoader::new(
            &config.model_path,
            &config.training_path,
            &config.id_column,
            &config.target_column,
        );
        let source = FileTableSource::new(&config.pool_path)
            .duplicate_ids(&config.id_column, config.duplicate_ids);

        let sink: Arc<dyn RecommendationSink> = match &config.sink_dir {
            Some(dir) => Arc::new(JsonDirSink::new(dir)),
            None => Arc::new(TracingSink),
        };

        let recommender = Recommender::new(
            ModelCache::new(loader),
            CandidatePool::new(source),
            &config.id_column,
            &config.target_column,
        )
        .with_sink(sink)
        .with_default_n(config.default_n)
        .with_max_n(config.max_n);

        match config.rng_seed {
            Some(seed) => recommender.with_seed(seed),
            None => recommender,
        }
    }
}

impl<L: ModelLoader, S: TableSource> Recommender<L, S> {
    pub fn new(
        model: ModelCache<L>,
        pool: CandidatePool<S>,
        id_column: impl Into<String>,
        target_column: impl Into<String>,
    ) -> Self {
        Self {
            ranked: RankedScoreCache::new(Arc::new(model), Arc::new(pool), id_column, target_column),
            sink: Arc::new(TracingSink),
            rng: Mutex::new(StdRng::from_entropy()),
            default_n: DEFAULT_TOP_N,
            max_n: DEFAULT_MAX_N,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn RecommendationSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Makes shuffles, blocks and fallbacks reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn with_default_n(mut self, n: usize) -> Self {
        self.default_n = n;
        self
    }

    /// Caps every selection; larger requests are clamped to this many records.
    pub fn with_max_n(mut self, n: usize) -> Self {
        self.max_n = n;
        self
    }

    pub fn default_n(&self) -> usize {
        self.default_n
    }

    pub fn max_n(&self) -> usize {
        self.max_n
    }

    pub fn model_cache(&self) -> &ModelCache<L> {
        self.ranked.model()
    }

    pub fn pool(&self) -> &CandidatePool<S> {
        self.ranked.pool()
    }

    pub fn ranked_cache(&self) -> &RankedScoreCache<L, S> {
        &self.ranked
    }

    pub fn sink(&self) -> &Arc<dyn RecommendationSink> {
        &self.sink
    }

    pub fn ranked_scores(&self) -> RecommendResult<Arc<RankedScores>> {
        Ok(self.ranked.ranked_scores()?)
    }

    /// Best `n` candidates not in `shown`, optionally shuffled first.
    pub fn recommend_jobs(
        &self,
        n: usize,
        shown: &HashSet<String>,
        randomize: bool,
    ) -> RecommendResult<Vec<ScoredEntity>> {
        let policy = SelectionPolicy::Top {
            shown: shown.clone(),
            randomize,
        };
        self.select(n, &policy)
    }

    /// `n` consecutive candidates from a random point in the ranking.
    pub fn random_block_jobs(&self, n: usize) -> RecommendResult<Vec<ScoredEntity>> {
        self.select(n, &SelectionPolicy::RandomBlock)
    }

    pub fn recommend_job_objects(
        &self,
        n: usize,
        shown: &HashSet<String>,
        randomize: bool,
    ) -> RecommendResult<Vec<DisplayRecord>> {
        let policy = SelectionPolicy::Top {
            shown: shown.clone(),
            randomize,
        };
        self.recommend_records(n, &policy)
    }

    pub fn random_block_job_objects(&self, n: usize) -> RecommendResult<Vec<DisplayRecord>> {
        self.recommend_records(n, &SelectionPolicy::RandomBlock)
    }

    /// Selects with `policy` and materializes against the same ranking snapshot.
    pub fn recommend_records(
        &self,
        n: usize,
        policy: &SelectionPolicy,
    ) -> RecommendResult<Vec<DisplayRecord>> {
        let n = self.clamp_count(n);
        let ranked = self.ranked_scores()?;
        let mut rng = self.rng.lock();
        let picks = policy.select(ranked.entries(), n, &mut *rng);
        let records = materialize_all(&ranked, &picks, &mut *rng);

        debug!(
            policy = policy.name(),
            requested = n,
            returned = records.len(),
            "Materialized recommendations"
        );
        Ok(records)
    }

    /// Hands `records` to the sink for `user_id`.
    pub fn deliver(&self, user_id: &str, records: &[DisplayRecord]) -> RecommendResult<()> {
        self.sink.deliver(user_id, records)?;
        info!(
            user_id = user_id,
            records = records.len(),
            sink = %self.sink.describe(),
            "Delivered recommendations"
        );
        Ok(())
    }

    /// Loads model, pool and ranking ahead of the first request.
    pub fn warm(&self) -> RecommendResult<()> {
        let ranked = self.ranked_scores()?;
        info!(candidates = ranked.len(), "Recommender warm");
        Ok(())
    }

    /// Model and pool are both loaded.
    pub fn is_ready(&self) -> bool {
        self.model_cache().is_loaded() && self.pool().is_loaded()
    }

    /// Drops the ranking only.
    pub fn invalidate_ranked(&self) {
        self.ranked.invalidate();
    }

    /// Drops the pool and the ranking built on it.
    pub fn invalidate_pool(&self) {
        self.pool().invalidate();
        self.ranked.invalidate();
    }

    /// Drops the model and the ranking built on it. The artifact is reloaded as-is.
    pub fn invalidate_model(&self) {
        self.model_cache().invalidate();
        self.ranked.invalidate();
    }

    pub fn invalidate_all(&self) {
        self.model_cache().invalidate();
        self.pool().invalidate();
        self.ranked.invalidate();
    }

    /// Clears pool and ranking, then recomputes the ranking from a fresh load.
    pub fn reload_pool(&self) -> RecommendResult<Arc<RankedScores>> {
        self.invalidate_pool();
        self.ranked_scores()
    }

    /// Discards the model artifact so the next access retrains.
    pub fn force_retrain(&self) -> RecommendResult<()> {
        self.model_cache().force_retrain()?;
        self.ranked.invalidate();
        Ok(())
    }

    pub fn invalidate(&self, target: CacheTarget) -> RecommendResult<()> {
        match target {
            CacheTarget::Pool => self.invalidate_pool(),
            CacheTarget::Model => self.invalidate_model(),
            CacheTarget::Ranked => self.invalidate_ranked(),
            CacheTarget::All => self.invalidate_all(),
            CacheTarget::Retrain => self.force_retrain()?,
        }
        info!(target = %target, "Cache invalidation requested");
        Ok(())
    }

    fn select(&self, n: usize, policy: &SelectionPolicy) -> RecommendResult<Vec<ScoredEntity>> {
        let n = self.clamp_count(n);
        let ranked = self.ranked_scores()?;
        let picks = policy.select(ranked.entries(), n, &mut *self.rng.lock());
        Ok(picks)
    }

    fn clamp_count(&self, n: usize) -> usize {
        if n > self.max_n {
            debug!(requested = n, max_n = self.max_n, "Clamping requested count");
        }
        n.min(self.max_n)
    }
}
