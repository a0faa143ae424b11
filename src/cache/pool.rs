use std::sync::Arc;

use tracing::{info, warn};

use super::memo::Memo;
use crate::table::{EntityTable, TableResult, TableSource};

/// Memoized candidate table.
///
/// An empty table is a valid value: selections on it come back empty.
pub struct CandidatePool<S: TableSource> {
    source: S,
    memo: Memo<EntityTable>,
}

impl<S: TableSource> std::fmt::Debug for CandidatePool<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidatePool")
            .field("source", &self.source.describe())
            .field("memo", &self.memo)
            .finish()
    }
}

impl<S: TableSource> CandidatePool<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            memo: Memo::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn get_pool(&self) -> TableResult<Arc<EntityTable>> {
        self.memo.get_or_try_load(|| {
            let table = self.source.load().inspect_err(|e| {
                warn!(source = %self.source.describe(), error = %e, "Candidate pool load failed");
            })?;
            if table.is_empty() {
                warn!(source = %self.source.describe(), "Candidate pool is empty");
            }
            Ok(table)
        })
    }

    pub fn invalidate(&self) {
        if self.memo.invalidate() {
            info!(source = %self.source.describe(), "Candidate pool invalidated");
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
