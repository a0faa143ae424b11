//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `JOBREC_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::num::ParseIntError;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{DEFAULT_ID_COLUMN, DEFAULT_MAX_N, DEFAULT_TARGET_COLUMN, DEFAULT_TOP_N};
use crate::table::DuplicateIdPolicy;

/// Service configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `JOBREC_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Persisted model artifact. Default: `./model.json`.
    pub model_path: PathBuf,

    /// Labelled table used when the artifact has to be trained. Default: `./training.json`.
    pub training_path: PathBuf,

    /// Candidate table that gets scored. Default: `./prediction.json`.
    pub pool_path: PathBuf,

    /// Identifier column name. Default: `firm_name`.
    pub id_column: String,

    /// Label column name (training only). Default: `label_recommendable`.
    pub target_column: String,

    /// What to do with repeated identifiers in the candidate table. Default: `first`.
    pub duplicate_ids: DuplicateIdPolicy,

    /// Records returned when a request does not say. Default: `3`.
    pub default_n: usize,

    /// Upper bound on records per request; larger counts are clamped. Default: `100`.
    pub max_n: usize,

    /// Directory for the JSON sink. `None` logs deliveries instead.
    pub sink_dir: Option<PathBuf>,

    /// Seed for selection and fallback randomness. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            model_path: PathBuf::from("./model.json"),
            training_path: PathBuf::from("./training.json"),
            pool_path: PathBuf::from("./prediction.json"),
            id_column: DEFAULT_ID_COLUMN.to_string(),
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            duplicate_ids: DuplicateIdPolicy::default(),
            default_n: DEFAULT_TOP_N,
            max_n: DEFAULT_MAX_N,
            sink_dir: None,
            rng_seed: None,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "JOBREC_PORT";
    const ENV_BIND_ADDR: &'static str = "JOBREC_BIND_ADDR";
    const ENV_MODEL_PATH: &'static str = "JOBREC_MODEL_PATH";
    const ENV_TRAINING_PATH: &'static str = "JOBREC_TRAINING_PATH";
    const ENV_POOL_PATH: &'static str = "JOBREC_POOL_PATH";
    const ENV_ID_COLUMN: &'static str = "JOBREC_ID_COLUMN";
    const ENV_TARGET_COLUMN: &'static str = "JOBREC_TARGET_COLUMN";
    const ENV_DUPLICATE_IDS: &'static str = "JOBREC_DUPLICATE_IDS";
    const ENV_DEFAULT_N: &'static str = "JOBREC_DEFAULT_N";
    const ENV_MAX_N: &'static str = "JOBREC_MAX_N";
    const ENV_SINK_DIR: &'static str = "JOBREC_SINK_DIR";
    const ENV_RNG_SEED: &'static str = "JOBREC_RNG_SEED";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let model_path = Self::parse_path_from_env(Self::ENV_MODEL_PATH, defaults.model_path);
        let training_path =
            Self::parse_path_from_env(Self::ENV_TRAINING_PATH, defaults.training_path);
        let pool_path = Self::parse_path_from_env(Self::ENV_POOL_PATH, defaults.pool_path);
        let id_column = Self::parse_column_from_env(Self::ENV_ID_COLUMN, defaults.id_column)?;
        let target_column =
            Self::parse_column_from_env(Self::ENV_TARGET_COLUMN, defaults.target_column)?;
        let duplicate_ids = Self::parse_duplicate_policy_from_env(defaults.duplicate_ids)?;
        let default_n = Self::parse_number_from_env(Self::ENV_DEFAULT_N)?.unwrap_or(defaults.default_n);
        let max_n = Self::parse_number_from_env(Self::ENV_MAX_N)?.unwrap_or(defaults.max_n);
        let sink_dir = Self::parse_optional_path_from_env(Self::ENV_SINK_DIR);
        let rng_seed = Self::parse_number_from_env(Self::ENV_RNG_SEED)?;

        Ok(Self {
            port,
            bind_addr,
            model_path,
            training_path,
            pool_path,
            id_column,
            target_column,
            duplicate_ids,
            default_n,
            max_n,
            sink_dir,
            rng_seed,
        })
    }

    /// Validates paths and basic invariants (does not create files or directories).
    ///
    /// Missing data files are not an error here: the caches report them on first
    /// use so a service can start before its tables are published.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for path in [&self.model_path, &self.training_path, &self.pool_path] {
            if path.exists() && !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }

        if let Some(ref dir) = self.sink_dir
            && dir.exists()
            && !dir.is_dir()
        {
            return Err(ConfigError::NotADirectory { path: dir.clone() });
        }

        if self.max_n == 0 || self.default_n > self.max_n {
            return Err(ConfigError::CountLimit {
                default_n: self.default_n,
                max_n: self.max_n,
            });
        }

        if self.id_column == self.target_column {
            return Err(ConfigError::ColumnClash {
                column: self.id_column.clone(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_duplicate_policy_from_env(
        default: DuplicateIdPolicy,
    ) -> Result<DuplicateIdPolicy, ConfigError> {
        match env::var(Self::ENV_DUPLICATE_IDS) {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidDuplicatePolicy { value }),
            Err(_) => Ok(default),
        }
    }

    fn parse_column_from_env(var_name: &'static str, default: String) -> Result<String, ConfigError> {
        match env::var(var_name) {
            Ok(value) => {
                let value = value.trim().to_string();
                if value.is_empty() {
                    return Err(ConfigError::EmptyColumnName { name: var_name });
                }
                Ok(value)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    /// `None` when unset; a set but malformed value is an error.
    fn parse_number_from_env<T>(var_name: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr<Err = ParseIntError>,
    {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|e| ConfigError::InvalidNumber {
                    name: var_name,
                    value,
                    source: e,
                }),
            Err(_) => Ok(None),
        }
    }
}
