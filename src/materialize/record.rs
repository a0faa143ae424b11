use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::parse::{list_cell, parse_experience};
use crate::constants::round_score;
use crate::table::{CellValue, EntityRow};

/// Location shown when neither city nor country is known.
pub const DEFAULT_LOCATION: &str = "Remote";

/// UI-ready recommendation. Built fresh per call and never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRecord {
    pub id: Uuid,
    pub name: String,
    pub position: Option<String>,
    pub industry: Option<String>,
    pub founded: Option<i32>,
    pub size: String,
    pub rating: f64,
    pub location: String,
    pub benefits: Vec<String>,
    /// RFC 3339.
    pub created_at: String,
    pub description: String,
    pub experience: [u32; 2],
    pub logo: String,
    pub posted: String,
    pub salary: String,
    pub skills: Vec<String>,
    #[serde(rename = "type")]
    pub job_type: String,
    pub ai_score: f64,
}

/// Deterministic part of a [`DisplayRecord`]: what the row says, nothing more.
///
/// `None` marks an optional field the row left empty; see
/// [`fill_fallbacks`](super::fill_fallbacks).
#[derive(Debug, Clone, PartialEq)]
pub struct PartialRecord {
    pub id: Uuid,
    pub name: String,
    pub position: Option<String>,
    pub industry: Option<String>,
    pub founded: Option<i32>,
    pub size: Option<String>,
    pub rating: Option<f64>,
    pub location: String,
    pub benefits: Option<Vec<String>>,
    pub created_at: String,
    pub description: Option<String>,
    pub experience: Option<[u32; 2]>,
    pub logo: Option<String>,
    pub posted: Option<String>,
    pub salary: Option<String>,
    pub skills: Option<Vec<String>>,
    pub job_type: Option<String>,
    pub ai_score: f64,
}

impl PartialRecord {
    /// Maps the known columns of `row`. A new record id is drawn on every call.
    pub fn from_row(entity_id: &str, row: &EntityRow, score: f64) -> Self {
        let text = |column: &str| row.get(column).and_then(CellValue::as_text);

        Self {
            id: Uuid::new_v4(),
            name: entity_id.to_string(),
            position: text("primary_position"),
            industry: text("industry"),
            founded: row
                .get("founded_year")
                .and_then(CellValue::as_f64)
                .filter(|y| y.fract() == 0.0 && y.abs() <= i32::MAX as f64)
                .map(|y| y as i32),
            size: text("size_employees"),
            rating: row.get("rating_1to5").and_then(CellValue::as_f64),
            location: location(row),
            benefits: row.get("benefits").and_then(list_cell),
            created_at: text("createdAt")
                .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
            description: text("description"),
            experience: row.get("experience").and_then(parse_experience),
            logo: text("logo"),
            posted: text("posted"),
            salary: text("salary"),
            skills: row.get("skills").and_then(list_cell),
            job_type: text("type"),
            ai_score: round_score(score),
        }
    }
}

fn location(row: &EntityRow) -> String {
    let parts: Vec<String> = ["city", "country"]
        .iter()
        .filter_map(|column| row.get(column).and_then(CellValue::as_text))
        .collect();
    if parts.is_empty() {
        DEFAULT_LOCATION.to_string()
    } else {
        parts.join(", ")
    }
}
