use serde::{Deserialize, Serialize};

/// One cell of an entity table.
///
/// Tables arrive as JSON, so cells keep JSON's shapes. Nested objects are kept
/// as their serialized text since no consumer reads them structurally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<CellValue>),
}

/// Spreadsheet exports spell missing cells in a handful of ways.
const MISSING_MARKERS: &[&str] = &["nan", "na", "n/a", "null", "none"];

impl CellValue {
    /// Returns `true` for null, blank text, NA markers, non-finite numbers and empty lists.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Bool(_) => false,
            CellValue::Number(n) => !n.is_finite(),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                trimmed.is_empty()
                    || MISSING_MARKERS
                        .iter()
                        .any(|m| trimmed.eq_ignore_ascii_case(m))
            }
            CellValue::List(items) => items.is_empty(),
        }
    }

    /// Numeric view of the cell, parsing text and mapping booleans to 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Text view of a scalar cell. Integral numbers render without a fraction.
    pub fn as_text(&self) -> Option<String> {
        if self.is_missing() {
            return None;
        }
        match self {
            CellValue::Text(s) => Some(s.trim().to_string()),
            CellValue::Number(n) => Some(format_number(*n)),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Null | CellValue::List(_) => None,
        }
    }

    /// Returns `true` when the cell holds text that is not a number.
    pub fn is_categorical(&self) -> bool {
        matches!(self, CellValue::Text(_)) && !self.is_missing() && self.as_f64().is_none()
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => CellValue::Null,
            Value::Bool(b) => CellValue::Bool(b),
            Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or(CellValue::Null),
            Value::String(s) => CellValue::Text(s),
            Value::Array(items) => CellValue::List(items.into_iter().map(CellValue::from).collect()),
            Value::Object(_) => CellValue::Text(value.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}
