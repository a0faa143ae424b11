//! Delivery of materialized recommendations, keyed by user.
//!
//! The recommender only hands over self-contained [`DisplayRecord`] lists; what
//! a sink does with them (files, logs, a queue) is its own business.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::{SinkError, SinkResult};

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::materialize::DisplayRecord;

pub trait RecommendationSink: Send + Sync {
    fn deliver(&self, user_id: &str, records: &[DisplayRecord]) -> SinkResult<()>;

    fn describe(&self) -> String;
}

/// What a sink persists for one delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub user_id: String,
    pub delivered_at: DateTime<Utc>,
    pub records: Vec<DisplayRecord>,
}

/// Writes each delivery to `<dir>/<user_id>.json`, replacing the previous one.
#[derive(Debug, Clone)]
pub struct JsonDirSink {
    dir: PathBuf,
}

impl JsonDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a user's deliveries land in.
    pub fn path_for(&self, user_id: &str) -> SinkResult<PathBuf> {
        let name = sanitize_user_id(user_id).ok_or_else(|| SinkError::InvalidUserId {
            user_id: user_id.to_string(),
        })?;
        Ok(self.dir.join(format!("{}.json", name)))
    }
}

impl RecommendationSink for JsonDirSink {
    fn deliver(&self, user_id: &str, records: &[DisplayRecord]) -> SinkResult<()> {
        let path = self.path_for(user_id)?;
        std::fs::create_dir_all(&self.dir)?;

        let delivery = Delivery {
            user_id: user_id.to_string(),
            delivered_at: Utc::now(),
            records: records.to_vec(),
        };
        let bytes = serde_json::to_vec_pretty(&delivery)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&bytes)?;
        tmp.persist(&path).map_err(|e| SinkError::Io(e.error))?;

        debug!(path = %path.display(), records = records.len(), "Wrote delivery");
        Ok(())
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

/// Logs deliveries instead of storing them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl RecommendationSink for TracingSink {
    fn deliver(&self, user_id: &str, records: &[DisplayRecord]) -> SinkResult<()> {
        info!(user_id = user_id, records = records.len(), "Delivering recommendations");
        for record in records {
            info!(
                user_id = user_id,
                record_id = %record.id,
                name = %record.name,
                ai_score = record.ai_score,
                "Recommendation"
            );
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "tracing".to_string()
    }
}

/// Keeps deliveries in memory.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Default)]
pub struct MemorySink {
    deliveries: parking_lot::Mutex<Vec<Delivery>>,
    failing: std::sync::atomic::AtomicBool,
}

#[cfg(any(test, feature = "mock"))]
impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every delivery fails with an I/O error.
    pub fn set_failing(&self, failing: bool) {
        self.failing
            .store(failing, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.deliveries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.lock().is_empty()
    }
}

#[cfg(any(test, feature = "mock"))]
impl RecommendationSink for MemorySink {
    fn deliver(&self, user_id: &str, records: &[DisplayRecord]) -> SinkResult<()> {
        if self.failing.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(SinkError::Io(std::io::Error::other("injected sink failure")));
        }
        self.deliveries.lock().push(Delivery {
            user_id: user_id.to_string(),
            delivered_at: Utc::now(),
            records: records.to_vec(),
        });
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Accepts a user id only if it is a single plain path segment.
fn sanitize_user_id(user_id: &str) -> Option<&str> {
    use std::path::Component;

    let trimmed = user_id.trim();
    if trimmed.is_empty() || trimmed.contains(['/', '\\', '\0']) {
        return None;
    }

    let mut components = Path::new(trimmed).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(trimmed),
        _ => None,
    }
}
