//! Entity tables: the candidate pool and the labelled training set.
//!
//! A table is a list of rows, each row a map from column name to [`CellValue`].
//! Files are JSON arrays of objects, JSON lines or spreadsheet workbooks (see [`loader`]).

pub mod error;
pub mod loader;
pub mod value;
mod workbook;

#[cfg(test)]
mod tests;

pub use error::{TableError, TableResult};
pub use loader::{FileTableSource, TableSource, read_table};
#[cfg(any(test, feature = "mock"))]
pub use loader::MockTableSource;
pub use value::CellValue;

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// One entity (firm/job posting) with its feature and display attributes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityRow {
    cells: BTreeMap<String, CellValue>,
}

impl EntityRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for fixtures.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        self.cells.insert(column.into(), value.into());
    }

    pub fn remove(&mut self, column: &str) -> Option<CellValue> {
        self.cells.remove(column)
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    /// Returns the cell only if it is present and not NA.
    pub fn get_present(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column).filter(|v| !v.is_missing())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Copy of the row without the given columns.
    pub fn without(&self, excluded: &[&str]) -> EntityRow {
        EntityRow {
            cells: self
                .cells
                .iter()
                .filter(|(k, _)| !excluded.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

impl FromIterator<(String, CellValue)> for EntityRow {
    fn from_iter<I: IntoIterator<Item = (String, CellValue)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

/// An in-memory table. Column order is first-seen order across rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityTable {
    columns: Vec<String>,
    rows: Vec<EntityRow>,
}

impl EntityTable {
    pub fn new(rows: Vec<EntityRow>) -> Self {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for row in &rows {
            for column in row.columns() {
                if seen.insert(column.to_string()) {
                    columns.push(column.to_string());
                }
            }
        }
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn rows(&self) -> &[EntityRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&EntityRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the identifier source for this table: the column if present,
    /// otherwise positional ids.
    pub fn id_source(&self, id_column: &str) -> IdSource {
        if self.has_column(id_column) {
            IdSource::Column(id_column.to_string())
        } else {
            IdSource::Positional
        }
    }

    /// One identifier per row, in row order.
    ///
    /// Rows without an id cell get their position as id. A positional id never
    /// reuses an identifier already present in the column; it takes a `~n`
    /// suffix instead.
    pub fn entity_ids(&self, source: &IdSource) -> Vec<String> {
        let cell_ids: Vec<Option<String>> = self.rows.iter().map(|row| source.cell_id(row)).collect();
        let mut taken: HashSet<String> = cell_ids.iter().flatten().cloned().collect();

        cell_ids
            .into_iter()
            .enumerate()
            .map(|(index, id)| match id {
                Some(id) => id,
                None => {
                    let mut fallback = index.to_string();
                    let mut attempt = 1usize;
                    while taken.contains(&fallback) {
                        fallback = format!("{index}~{attempt}");
                        attempt += 1;
                    }
                    taken.insert(fallback.clone());
                    fallback
                }
            })
            .collect()
    }

    /// Ensures `column` exists in the table.
    pub fn require_column(&self, column: &str, source_name: &str) -> TableResult<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(TableError::missing_column(column, source_name))
        }
    }
}

/// Where entity identifiers come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdSource {
    /// Read from this column.
    Column(String),
    /// The row's 0-based position in the table.
    Positional,
}

impl IdSource {
    /// The row's own identifier, if its id cell holds one.
    pub fn cell_id(&self, row: &EntityRow) -> Option<String> {
        match self {
            IdSource::Column(column) => row.get(column).and_then(CellValue::as_text),
            IdSource::Positional => None,
        }
    }

    pub fn column(&self) -> Option<&str> {
        match self {
            IdSource::Column(c) => Some(c),
            IdSource::Positional => None,
        }
    }
}

/// What to do when the candidate table repeats an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateIdPolicy {
    /// Keep the first row per id and drop the rest at load time.
    #[default]
    First,
    /// Keep every row. Duplicates rank independently; display uses the first row.
    Keep,
    /// Fail the load with a schema error.
    Reject,
}

impl std::str::FromStr for DuplicateIdPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first" | "dedupe" => Ok(Self::First),
            "keep" | "allow" => Ok(Self::Keep),
            "reject" | "error" => Ok(Self::Reject),
            _ => Err(format!("Unknown duplicate id policy: {}", s)),
        }
    }
}

impl DuplicateIdPolicy {
    /// Applies the policy to `table` keyed on `id_column`.
    ///
    /// Tables without the id column are returned untouched: positional ids
    /// cannot repeat.
    pub fn apply(
        self,
        table: EntityTable,
        id_column: &str,
        source_name: &str,
    ) -> TableResult<EntityTable> {
        if self == DuplicateIdPolicy::Keep || !table.has_column(id_column) {
            return Ok(table);
        }

        let source = IdSource::Column(id_column.to_string());
        let mut seen = HashSet::with_capacity(table.len());
        let mut kept = Vec::with_capacity(table.len());
        let mut dropped = 0usize;

        for row in table.rows {
            // Rows without an id get a unique positional id later; they never collide.
            let Some(id) = source.cell_id(&row) else {
                kept.push(row);
                continue;
            };
            if seen.insert(id.clone()) {
                kept.push(row);
                continue;
            }
            if self == DuplicateIdPolicy::Reject {
                return Err(TableError::schema(format!(
                    "duplicate identifier '{}' in column '{}' of {}",
                    id, id_column, source_name
                )));
            }
            dropped += 1;
        }

        if dropped > 0 {
            warn!(
                source = source_name,
                id_column = id_column,
                dropped = dropped,
                "Dropped rows with duplicate identifiers (kept first occurrence)"
            );
        }

        Ok(EntityTable {
            columns: table.columns,
            rows: kept,
        })
    }
}
