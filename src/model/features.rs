//! Row → feature vector encoding.
//!
//! Text columns are one-hot encoded (unknown categories encode as all zeros) and
//! numeric columns are standardized with the training mean and deviation.
//! Missing numeric cells take the training mean, so they encode as `0.0`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::table::{CellValue, EntityRow};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalFeature {
    pub column: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericFeature {
    pub column: String,
    pub mean: f64,
    pub std_dev: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureEncoder {
    pub categorical: Vec<CategoricalFeature>,
    pub numeric: Vec<NumericFeature>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Numeric,
    Categorical,
    Unusable,
}

impl FeatureEncoder {
    /// Learns categories and scaling parameters from `rows`.
    ///
    /// A column is numeric when every present cell is a number or boolean, and
    /// categorical when any present cell is text. List columns and columns with
    /// no present cells carry no signal and are skipped.
    pub fn fit(rows: &[EntityRow]) -> Self {
        let mut kinds: BTreeMap<&str, ColumnKind> = BTreeMap::new();
        for row in rows {
            for (column, cell) in row.iter() {
                if cell.is_missing() {
                    continue;
                }
                let cell_kind = match cell {
                    CellValue::Number(_) | CellValue::Bool(_) => ColumnKind::Numeric,
                    CellValue::Text(_) => ColumnKind::Categorical,
                    CellValue::List(_) | CellValue::Null => ColumnKind::Unusable,
                };
                let entry = kinds.entry(column).or_insert(cell_kind);
                *entry = match (*entry, cell_kind) {
                    (ColumnKind::Unusable, _) | (_, ColumnKind::Unusable) => ColumnKind::Unusable,
                    (ColumnKind::Categorical, _) | (_, ColumnKind::Categorical) => {
                        ColumnKind::Categorical
                    }
                    _ => ColumnKind::Numeric,
                };
            }
        }

        let mut encoder = FeatureEncoder::default();
        for (column, kind) in kinds {
            match kind {
                ColumnKind::Numeric => encoder.numeric.push(fit_numeric(column, rows)),
                ColumnKind::Categorical => encoder.categorical.push(fit_categorical(column, rows)),
                ColumnKind::Unusable => {
                    debug!(column = column, "Skipping list-valued column for features")
                }
            }
        }

        debug!(
            categorical = encoder.categorical.len(),
            numeric = encoder.numeric.len(),
            dim = encoder.dim(),
            "Fitted feature encoder"
        );

        encoder
    }

    /// Length of the encoded vector.
    pub fn dim(&self) -> usize {
        self.categorical
            .iter()
            .map(|c| c.categories.len())
            .sum::<usize>()
            + self.numeric.len()
    }

    pub fn transform(&self, row: &EntityRow) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.dim());

        for feature in &self.categorical {
            let value = row.get(&feature.column).and_then(category_of);
            out.extend(
                feature
                    .categories
                    .iter()
                    .map(|c| if Some(c) == value.as_ref() { 1.0 } else { 0.0 }),
            );
        }

        for feature in &self.numeric {
            let value = row
                .get(&feature.column)
                .and_then(CellValue::as_f64)
                .unwrap_or(feature.mean);
            out.push((value - feature.mean) / feature.std_dev);
        }

        out
    }
}

fn category_of(cell: &CellValue) -> Option<String> {
    cell.as_text()
}

fn fit_categorical(column: &str, rows: &[EntityRow]) -> CategoricalFeature {
    let categories: BTreeSet<String> = rows
        .iter()
        .filter_map(|row| row.get(column).and_then(category_of))
        .collect();
    CategoricalFeature {
        column: column.to_string(),
        categories: categories.into_iter().collect(),
    }
}

fn fit_numeric(column: &str, rows: &[EntityRow]) -> NumericFeature {
    let values: Vec<f64> = rows
        .iter()
        .filter_map(|row| row.get(column).and_then(CellValue::as_f64))
        .collect();

    let n = values.len().max(1) as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    NumericFeature {
        column: column.to_string(),
        mean,
        std_dev: if std_dev > f64::EPSILON { std_dev } else { 1.0 },
    }
}
