pub const JOBREC_STATUS_HEADER: &str = "X-Jobrec-Status";
pub const JOBREC_STATUS_HEALTHY: &str = "healthy";
pub const JOBREC_STATUS_READY: &str = "ready";
pub const JOBREC_STATUS_NOT_READY: &str = "not_ready";
pub const JOBREC_STATUS_ERROR: &str = "error";

/// Which cache an invalidation request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheTarget {
    /// Candidate table and the ranking built on it.
    Pool,
    /// Reload the model artifact; drops the ranking too.
    Model,
    Ranked,
    All,
    /// Delete the artifact so the next load retrains.
    Retrain,
}

impl CacheTarget {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheTarget::Pool => "pool",
            CacheTarget::Model => "model",
            CacheTarget::Ranked => "ranked",
            CacheTarget::All => "all",
            CacheTarget::Retrain => "retrain",
        }
    }
}

impl std::str::FromStr for CacheTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pool" => Ok(CacheTarget::Pool),
            "model" => Ok(CacheTarget::Model),
            "ranked" | "ranking" => Ok(CacheTarget::Ranked),
            "all" => Ok(CacheTarget::All),
            "retrain" => Ok(CacheTarget::Retrain),
            _ => Err(format!("Unknown cache target: {}", s)),
        }
    }
}

impl std::fmt::Display for CacheTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
