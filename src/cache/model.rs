use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use super::memo::Memo;
use crate::model::{ModelLoader, ModelResult};

/// Memoized access to the scoring model.
///
/// The first [`get_model`](Self::get_model) loads (or trains) through the
/// loader; later calls return the same `Arc` until invalidated.
pub struct ModelCache<L: ModelLoader> {
    loader: L,
    memo: Memo<L::Model>,
}

impl<L: ModelLoader> std::fmt::Debug for ModelCache<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCache")
            .field("loader", &self.loader.describe())
            .field("memo", &self.memo)
            .finish()
    }
}

impl<L: ModelLoader> ModelCache<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            memo: Memo::new(),
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn get_model(&self) -> ModelResult<Arc<L::Model>> {
        self.memo.get_or_try_load(|| {
            let started = Instant::now();
            let model = self.loader.load().inspect_err(|e| {
                warn!(source = %self.loader.describe(), error = %e, "Model load failed");
            })?;
            info!(
                source = %self.loader.describe(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Model ready"
            );
            Ok(model)
        })
    }

    /// Drops the cached model. The next call reloads the persisted artifact.
    pub fn invalidate(&self) {
        if self.memo.invalidate() {
            info!(source = %self.loader.describe(), "Model cache invalidated");
        }
    }

    /// Discards the persisted artifact, then invalidates, so the next call retrains.
    pub fn force_retrain(&self) -> ModelResult<()> {
        self.loader.discard()?;
        self.invalidate();
        Ok(())
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
