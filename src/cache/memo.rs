use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

/// A lazily computed value that stays cached until invalidated.
///
/// The lock is held across the load, so concurrent callers block on a
/// recompute instead of observing a half-built value. A failed load leaves the
/// slot empty; the next call retries.
pub struct Memo<T> {
    slot: Mutex<Option<Arc<T>>>,
    /// Mirrors `slot.is_some()`; only written while `slot` is locked.
    loaded: AtomicBool,
    loads: AtomicUsize,
}

impl<T> Memo<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            loaded: AtomicBool::new(false),
            loads: AtomicUsize::new(0),
        }
    }

    /// Returns the cached value, running `load` first if the slot is empty.
    pub fn get_or_try_load<E>(&self, load: impl FnOnce() -> Result<T, E>) -> Result<Arc<T>, E> {
        let mut slot = self.slot.lock();
        if let Some(value) = slot.as_ref() {
            return Ok(Arc::clone(value));
        }

        self.loads.fetch_add(1, Ordering::Relaxed);
        let value = Arc::new(load()?);
        *slot = Some(Arc::clone(&value));
        self.loaded.store(true, Ordering::Release);
        Ok(value)
    }

    /// The cached value, without loading.
    pub fn peek(&self) -> Option<Arc<T>> {
        self.slot.lock().clone()
    }

    /// Drops the cached value. Returns `true` if there was one.
    pub fn invalidate(&self) -> bool {
        let mut slot = self.slot.lock();
        self.loaded.store(false, Ordering::Release);
        slot.take().is_some()
    }

    /// Whether a value is cached. Never waits on a load in progress.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Number of load attempts so far, failed ones included.
    #[inline]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Memo<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo")
            .field("loaded", &self.is_loaded())
            .field("loads", &self.load_count())
            .finish()
    }
}
