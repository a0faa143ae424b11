//! Parsers for list-like cells that arrive as text.
//!
//! Spreadsheet exports store lists as JSON (`["a","b"]`), as bracketed literals
//! (`['a', 'b']`) or as delimited text (`a; b; c`). Nothing here evaluates its
//! input; text that fits none of the shapes becomes a one-element list.

use crate::table::CellValue;

/// Delimiters tried in order for plain text lists.
const DELIMITERS: [char; 3] = [';', '|', ','];

/// Parses text into a list of trimmed, non-empty items.
pub fn parse_list(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        if let Some(items) = parse_json_array(trimmed).or_else(|| parse_quoted_literals(trimmed)) {
            return items;
        }
        return vec![trimmed.to_string()];
    }

    for delimiter in DELIMITERS {
        if trimmed.contains(delimiter) {
            let items: Vec<String> = trimmed
                .split(delimiter)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            if items.is_empty() {
                return vec![trimmed.to_string()];
            }
            return items;
        }
    }

    vec![trimmed.to_string()]
}

/// List view of a cell. `None` when the cell is missing or yields no items.
pub fn list_cell(cell: &CellValue) -> Option<Vec<String>> {
    if cell.is_missing() {
        return None;
    }
    let items = match cell {
        CellValue::List(values) => values.iter().filter_map(CellValue::as_text).collect(),
        CellValue::Text(text) => parse_list(text),
        other => other.as_text().into_iter().collect(),
    };
    if items.is_empty() { None } else { Some(items) }
}

/// Reads a `[min, max]` years-of-experience range.
///
/// Accepts numeric lists, bracketed text lists, ranges such as `3-5 years`
/// and single numbers (`n` becomes `[n, n]`). Anything else is `None`.
pub fn parse_experience(cell: &CellValue) -> Option<[u32; 2]> {
    if cell.is_missing() {
        return None;
    }
    let numbers: Vec<u32> = match cell {
        CellValue::Number(n) => years(*n).into_iter().collect(),
        CellValue::List(values) => values
            .iter()
            .map(|v| v.as_f64().and_then(years))
            .collect::<Option<Vec<u32>>>()?,
        CellValue::Text(text) => {
            let text = text.trim();
            if text.starts_with('[') {
                parse_list(text)
                    .iter()
                    .map(|item| item.trim_matches(['"', '\'']).trim().parse::<f64>().ok().and_then(years))
                    .collect::<Option<Vec<u32>>>()?
            } else {
                integers_in(text)?
            }
        }
        CellValue::Bool(_) | CellValue::Null => return None,
    };

    match numbers.as_slice() {
        [] => None,
        [n] => Some([*n, *n]),
        [a, b, ..] => Some([*a.min(b), *a.max(b)]),
    }
}

fn years(n: f64) -> Option<u32> {
    if n.is_finite() && n >= 0.0 && n <= u32::MAX as f64 {
        Some(n.round() as u32)
    } else {
        None
    }
}

/// Integer runs in text that starts with a digit, e.g. `3-5 years` or `5+ yrs`.
fn integers_in(text: &str) -> Option<Vec<u32>> {
    if !text.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let numbers: Vec<u32> = text
        .split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .map(str::parse::<u32>)
        .collect::<Result<_, _>>()
        .ok()?;
    Some(numbers)
}

fn parse_json_array(text: &str) -> Option<Vec<String>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(text).ok()?;
    Some(
        values
            .into_iter()
            .map(CellValue::from)
            .filter_map(|v| v.as_text())
            .collect(),
    )
}

/// `['a', "b", 'c']`: every item must be a quoted literal.
fn parse_quoted_literals(text: &str) -> Option<Vec<String>> {
    let inner = &text[1..text.len() - 1];
    let mut items = Vec::new();
    let mut chars = inner.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let Some(quote) = chars.next() else {
            break;
        };
        if quote != '\'' && quote != '"' {
            return None;
        }

        let mut item = String::new();
        let mut closed = false;
        while let Some(c) = chars.next() {
            match c {
                '\\' => item.push(chars.next()?),
                c if c == quote => {
                    closed = true;
                    break;
                }
                c => item.push(c),
            }
        }
        if !closed {
            return None;
        }
        let item = item.trim();
        if !item.is_empty() {
            items.push(item.to_string());
        }

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            Some(',') | None => {}
            Some(_) => return None,
        }
    }

    Some(items)
}
