//! Spreadsheet tables (`.xlsx`, `.xls`, `.ods`).
//!
//! Only the first sheet is read. Its first row names the columns; every later
//! row with at least one non-empty cell becomes an [`EntityRow`].

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use chrono::SecondsFormat;

use super::CellValue;
use super::EntityRow;
use super::error::{TableError, TableResult};

/// Extensions read as workbooks.
pub(crate) const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

/// Zip archives (xlsx, ods) start with this signature.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
/// Legacy `.xls` files are OLE compound documents.
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

pub(crate) fn looks_like_workbook(path: &Path, bytes: &[u8]) -> bool {
    let by_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| WORKBOOK_EXTENSIONS.iter().any(|w| ext.eq_ignore_ascii_case(w)));
    by_extension || bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC)
}

pub(crate) fn parse_workbook(bytes: Vec<u8>, path: &Path) -> TableResult<Vec<EntityRow>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| {
        TableError::schema(format!("{}: unreadable workbook: {}", path.display(), e))
    })?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| {
            TableError::schema(format!("{}: unreadable first sheet: {}", path.display(), e))
        })?,
        None => {
            return Err(TableError::schema(format!(
                "{}: workbook has no sheets",
                path.display()
            )));
        }
    };

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let columns = column_names(header);

    Ok(rows
        .filter(|cells| cells.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|cells| {
            columns
                .iter()
                .zip(cells)
                .filter_map(|(name, cell)| name.as_ref().map(|n| (n.clone(), cell_value(cell))))
                .collect()
        })
        .collect())
}

/// Header cells as column names. Blank headers drop their column; repeats get
/// a `.1`, `.2`, ... suffix.
fn column_names(header: &[Data]) -> Vec<Option<String>> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    header
        .iter()
        .map(|cell| {
            let name = cell.to_string().trim().to_string();
            if name.is_empty() {
                return None;
            }
            let count = seen.entry(name.clone()).or_insert(0);
            let unique = if *count == 0 {
                name
            } else {
                format!("{}.{}", name, count)
            };
            *count += 1;
            Some(unique)
        })
        .collect()
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellValue::Text(naive.and_utc().to_rfc3339_opts(SecondsFormat::Secs, true)),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}
