//! Reading entity tables from disk.
//!
//! Accepted layouts:
//! - `.json`: a top-level array of objects
//! - `.jsonl` / `.ndjson`: one object per line, blank lines skipped
//! - `.xlsx` / `.xlsm` / `.xls` / `.ods`: first sheet, header row names the columns
//! - anything else: sniffed (workbook signature, else `[` means array, else lines)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use super::error::{TableError, TableResult};
use super::workbook::{looks_like_workbook, parse_workbook};
use super::{CellValue, DuplicateIdPolicy, EntityRow, EntityTable};

/// A place entity tables are loaded from.
pub trait TableSource: Send + Sync {
    /// Loads the full table. Called once per cache lifetime.
    fn load(&self) -> TableResult<EntityTable>;

    /// Human-readable name for logs and error messages.
    fn describe(&self) -> String;
}

/// Table file on local disk.
#[derive(Debug, Clone)]
pub struct FileTableSource {
    path: PathBuf,
    required_columns: Vec<String>,
    dedupe: Option<(String, DuplicateIdPolicy)>,
}

impl FileTableSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required_columns: Vec::new(),
            dedupe: None,
        }
    }

    /// Fails the load with a schema error if `column` is absent.
    pub fn require_column(mut self, column: impl Into<String>) -> Self {
        self.required_columns.push(column.into());
        self
    }

    /// Applies `policy` to repeated values of `id_column` after loading.
    pub fn duplicate_ids(mut self, id_column: impl Into<String>, policy: DuplicateIdPolicy) -> Self {
        self.dedupe = Some((id_column.into(), policy));
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableSource for FileTableSource {
    fn load(&self) -> TableResult<EntityTable> {
        let source_name = self.describe();
        let table = read_table(&self.path)?;

        for column in &self.required_columns {
            table.require_column(column, &source_name)?;
        }

        let table = match &self.dedupe {
            Some((id_column, policy)) => policy.apply(table, id_column, &source_name)?,
            None => table,
        };

        info!(
            path = %self.path.display(),
            rows = table.len(),
            columns = table.columns().len(),
            "Loaded entity table"
        );

        Ok(table)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Reads and parses a table file.
pub fn read_table(path: &Path) -> TableResult<EntityTable> {
    if !path.exists() {
        return Err(TableError::DataNotFound {
            path: path.to_path_buf(),
        });
    }
    if !path.is_file() {
        return Err(TableError::schema(format!(
            "expected a table file, found a directory: {}",
            path.display()
        )));
    }

    let bytes = std::fs::read(path)?;
    if looks_like_workbook(path, &bytes) {
        debug!(path = %path.display(), bytes = bytes.len(), "Parsing workbook table");
        return Ok(EntityTable::new(parse_workbook(bytes, path)?));
    }

    let text = String::from_utf8(bytes).map_err(|_| {
        TableError::schema(format!("{}: table file is not valid UTF-8", path.display()))
    })?;
    let layout = Layout::detect(path, &text);
    debug!(path = %path.display(), ?layout, bytes = text.len(), "Parsing table");

    let rows = match layout {
        Layout::Array => parse_array(&text, path)?,
        Layout::Lines => parse_lines(&text, path)?,
    };

    Ok(EntityTable::new(rows))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Array,
    Lines,
}

impl Layout {
    fn detect(path: &Path, text: &str) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Layout::Array,
            Some(ext) if ext.eq_ignore_ascii_case("jsonl") || ext.eq_ignore_ascii_case("ndjson") => {
                Layout::Lines
            }
            _ if text.trim_start().starts_with('[') => Layout::Array,
            _ => Layout::Lines,
        }
    }
}

fn parse_array(text: &str, path: &Path) -> TableResult<Vec<EntityRow>> {
    let values: Vec<Value> = serde_json::from_str(text).map_err(|e| {
        TableError::schema(format!("{}: malformed JSON table: {}", path.display(), e))
    })?;

    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| row_from_value(value, path, index + 1, "row"))
        .collect()
}

fn parse_lines(text: &str, path: &Path) -> TableResult<Vec<EntityRow>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            let value: Value = serde_json::from_str(line).map_err(|e| {
                TableError::schema(format!(
                    "{}: line {}: malformed JSON: {}",
                    path.display(),
                    index + 1,
                    e
                ))
            })?;
            row_from_value(value, path, index + 1, "line")
        })
        .collect()
}

fn row_from_value(value: Value, path: &Path, position: usize, unit: &str) -> TableResult<EntityRow> {
    match value {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(k, v)| (k, CellValue::from(v)))
            .collect()),
        other => Err(TableError::schema(format!(
            "{}: {} {}: expected an object, found {}",
            path.display(),
            unit,
            position,
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// In-memory source that counts loads and can be told to fail.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Default)]
pub struct MockTableSource {
    table: parking_lot::Mutex<EntityTable>,
    loads: std::sync::atomic::AtomicUsize,
    failures_left: std::sync::atomic::AtomicUsize,
    delay: Option<std::time::Duration>,
}

#[cfg(any(test, feature = "mock"))]
impl MockTableSource {
    pub fn new(table: EntityTable) -> Self {
        Self {
            table: parking_lot::Mutex::new(table),
            ..Default::default()
        }
    }

    pub fn from_rows(rows: Vec<EntityRow>) -> Self {
        Self::new(EntityTable::new(rows))
    }

    /// Makes every load sleep for `delay` before returning.
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replaces the table served by subsequent loads.
    pub fn replace(&self, table: EntityTable) {
        *self.table.lock() = table;
    }

    /// Makes the next `n` loads fail with `DataNotFound`.
    pub fn fail_next(&self, n: usize) {
        self.failures_left
            .store(n, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "mock"))]
impl TableSource for MockTableSource {
    fn load(&self) -> TableResult<EntityTable> {
        use std::sync::atomic::Ordering;

        self.loads.fetch_add(1, Ordering::SeqCst);
        let table = self.table.lock().clone();
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        let should_fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(TableError::DataNotFound {
                path: PathBuf::from("mock://table"),
            });
        }
        Ok(table)
    }

    fn describe(&self) -> String {
        "mock://table".to_string()
    }
}
