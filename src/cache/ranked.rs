use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::memo::Memo;
use super::model::ModelCache;
use super::pool::CandidatePool;
use crate::model::{ModelError, ModelLoader, ModelResult, Scorer};
use crate::table::{EntityRow, EntityTable, IdSource, TableSource};

/// One ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredEntity {
    pub entity_id: String,
    pub score: f64,
    /// Position of the scored row in the pool table.
    #[serde(skip)]
    pub row_index: usize,
}

impl ScoredEntity {
    pub fn new(entity_id: impl Into<String>, score: f64, row_index: usize) -> Self {
        Self {
            entity_id: entity_id.into(),
            score,
            row_index,
        }
    }
}

/// Candidates sorted by descending score, plus the table they were scored from.
///
/// Equal scores keep table order. Display rows are looked up in the same
/// table snapshot, so a selection never mixes two pool versions.
#[derive(Debug, Clone)]
pub struct RankedScores {
    entries: Vec<ScoredEntity>,
    table: Arc<EntityTable>,
    id_source: IdSource,
    first_row: HashMap<String, usize>,
}

impl RankedScores {
    /// Scores every row of `table` and sorts the result.
    ///
    /// The id and target columns are removed before scoring. Non-finite scores
    /// become `0.0`; everything is clamped to `[0, 1]`.
    pub fn compute<M: Scorer + ?Sized>(
        table: Arc<EntityTable>,
        scorer: &M,
        id_column: &str,
        target_column: &str,
    ) -> ModelResult<Self> {
        let id_source = table.id_source(id_column);
        let ids = table.entity_ids(&id_source);

        let excluded = [id_column, target_column];
        let features: Vec<EntityRow> = table.rows().iter().map(|r| r.without(&excluded)).collect();
        let scores = scorer.predict_proba(&features)?;

        if scores.len() != features.len() {
            return Err(ModelError::InvalidOutput {
                expected: features.len(),
                got: scores.len(),
            });
        }

        let non_finite = scores.iter().filter(|s| !s.is_finite()).count();
        if non_finite > 0 {
            warn!(rows = non_finite, "Model produced non-finite scores; using 0.0");
        }

        let mut entries: Vec<ScoredEntity> = ids
            .iter()
            .cloned()
            .zip(scores)
            .enumerate()
            .map(|(row_index, (entity_id, score))| {
                let score = if score.is_finite() {
                    score.clamp(0.0, 1.0)
                } else {
                    0.0
                };
                ScoredEntity::new(entity_id, score, row_index)
            })
            .collect();
        // `sort_by` is stable, so ties keep table order.
        entries.sort_by(|a, b| b.score.total_cmp(&a.score));

        Ok(Self::from_sorted(entries, &ids, table, id_source))
    }

    /// `ids` holds one identifier per table row, in row order.
    fn from_sorted(
        entries: Vec<ScoredEntity>,
        ids: &[String],
        table: Arc<EntityTable>,
        id_source: IdSource,
    ) -> Self {
        let mut first_row = HashMap::with_capacity(ids.len());
        for (index, id) in ids.iter().enumerate() {
            first_row.entry(id.clone()).or_insert(index);
        }
        Self {
            entries,
            table,
            id_source,
            first_row,
        }
    }

    pub fn entries(&self) -> &[ScoredEntity] {
        &self.entries
    }

    /// The first `limit` entries, or all of them.
    pub fn top(&self, limit: usize) -> &[ScoredEntity] {
        &self.entries[..limit.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn table(&self) -> &Arc<EntityTable> {
        &self.table
    }

    pub fn id_source(&self) -> &IdSource {
        &self.id_source
    }

    /// Row used to display `entity_id`: its first occurrence in the table.
    pub fn display_row(&self, entity_id: &str) -> Option<&EntityRow> {
        self.first_row
            .get(entity_id)
            .and_then(|&index| self.table.row(index))
    }
}

/// Memoized ranking over the current pool and model.
pub struct RankedScoreCache<L: ModelLoader, S: TableSource> {
    model: Arc<ModelCache<L>>,
    pool: Arc<CandidatePool<S>>,
    id_column: String,
    target_column: String,
    memo: Memo<RankedScores>,
}

impl<L: ModelLoader, S: TableSource> std::fmt::Debug for RankedScoreCache<L, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankedScoreCache")
            .field("id_column", &self.id_column)
            .field("target_column", &self.target_column)
            .field("memo", &self.memo)
            .finish()
    }
}

impl<L: ModelLoader, S: TableSource> RankedScoreCache<L, S> {
    pub fn new(
        model: Arc<ModelCache<L>>,
        pool: Arc<CandidatePool<S>>,
        id_column: impl Into<String>,
        target_column: impl Into<String>,
    ) -> Self {
        Self {
            model,
            pool,
            id_column: id_column.into(),
            target_column: target_column.into(),
            memo: Memo::new(),
        }
    }

    pub fn model(&self) -> &Arc<ModelCache<L>> {
        &self.model
    }

    pub fn pool(&self) -> &Arc<CandidatePool<S>> {
        &self.pool
    }

    pub fn ranked_scores(&self) -> ModelResult<Arc<RankedScores>> {
        self.memo.get_or_try_load(|| {
            let started = Instant::now();
            let table = self.pool.get_pool()?;
            let model = self.model.get_model()?;

            debug!(rows = table.len(), "Scoring candidate pool");
            let ranked =
                RankedScores::compute(table, model.as_ref(), &self.id_column, &self.target_column)?;

            info!(
                candidates = ranked.len(),
                positional_ids = ranked.id_source().column().is_none(),
                best_score = ranked.entries().first().map(|e| e.score),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Ranked candidate pool"
            );
            Ok(ranked)
        })
    }

    /// Drops the ranking only; pool and model stay cached.
    pub fn invalidate(&self) {
        if self.memo.invalidate() {
            info!("Ranking invalidated");
        }
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.memo.is_loaded()
    }

    #[inline]
    pub fn load_count(&self) -> usize {
        self.memo.load_count()
    }
}
