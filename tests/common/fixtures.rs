//! On-disk tables and configs for end-to-end tests.

use std::path::{Path, PathBuf};

use jobrec::Config;
use serde_json::{Value, json};
use tempfile::TempDir;

pub const POOL_FILE: &str = "prediction.json";
pub const TRAINING_FILE: &str = "training.json";
pub const MODEL_FILE: &str = "model.json";
pub const SINK_DIR: &str = "deliveries";

/// Labelled firms: large fintechs are recommendable, small retailers are not.
pub fn training_rows() -> Vec<Value> {
    let mut rows = Vec::new();
    for i in 0..15 {
        rows.push(json!({
            "firm_name": format!("good-{i}"),
            "industry": "Fintech",
            "size_employees": 400 + i * 20,
            "label_recommendable": 1
        }));
        rows.push(json!({
            "firm_name": format!("bad-{i}"),
            "industry": "Retail",
            "size_employees": 8 + i,
            "label_recommendable": 0
        }));
    }
    rows
}

/// Unlabelled candidates with display attributes of varying completeness.
pub fn pool_rows() -> Vec<Value> {
    vec![
        json!({
            "firm_name": "Northwind Pay",
            "industry": "Fintech",
            "size_employees": 650,
            "primary_position": "Backend Engineer",
            "city": "Berlin",
            "country": "Germany",
            "benefits": "[\"Remote\", \"Equity\"]",
            "experience": "[2, 5]"
        }),
        json!({
            "firm_name": "Corner Shop",
            "industry": "Retail",
            "size_employees": 12
        }),
        json!({
            "firm_name": "Ledgerly",
            "industry": "Fintech",
            "size_employees": 420,
            "skills": "Rust; SQL; Kafka"
        }),
        json!({
            "firm_name": "Mom & Pop",
            "industry": "Retail",
            "size_employees": 9,
            "country": "Spain"
        }),
    ]
}

pub fn write_rows(path: &Path, rows: &[Value]) {
    std::fs::write(path, serde_json::to_string_pretty(rows).unwrap()).unwrap();
}

/// A temp directory holding training and pool files plus a config pointing at them.
pub struct Workspace {
    pub dir: TempDir,
    pub config: Config,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        write_rows(&dir.path().join(TRAINING_FILE), &training_rows());
        write_rows(&dir.path().join(POOL_FILE), &pool_rows());

        let config = Config {
            model_path: dir.path().join(MODEL_FILE),
            training_path: dir.path().join(TRAINING_FILE),
            pool_path: dir.path().join(POOL_FILE),
            sink_dir: Some(dir.path().join(SINK_DIR)),
            rng_seed: Some(11),
            ..Config::default()
        };

        Self { dir, config }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}
