use super::*;
use std::io::Write;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

fn firm(name: &str, industry: &str) -> EntityRow {
    EntityRow::new()
        .with("firm_name", name)
        .with("industry", industry)
}

#[test]
fn test_cell_missing_markers() {
    assert!(CellValue::Null.is_missing());
    assert!(CellValue::Text("   ".into()).is_missing());
    assert!(CellValue::Text("NaN".into()).is_missing());
    assert!(CellValue::Text("n/a".into()).is_missing());
    assert!(CellValue::Number(f64::NAN).is_missing());
    assert!(CellValue::List(vec![]).is_missing());

    assert!(!CellValue::Text("Berlin".into()).is_missing());
    assert!(!CellValue::Number(0.0).is_missing());
    assert!(!CellValue::Bool(false).is_missing());
}

#[test]
fn test_cell_text_and_numeric_views() {
    assert_eq!(CellValue::Number(2015.0).as_text().as_deref(), Some("2015"));
    assert_eq!(CellValue::Number(4.5).as_text().as_deref(), Some("4.5"));
    assert_eq!(CellValue::Text(" Acme ".into()).as_text().as_deref(), Some("Acme"));
    assert_eq!(CellValue::Text("42".into()).as_f64(), Some(42.0));
    assert_eq!(CellValue::Bool(true).as_f64(), Some(1.0));
    assert_eq!(CellValue::Text("Fintech".into()).as_f64(), None);

    assert!(CellValue::Text("Fintech".into()).is_categorical());
    assert!(!CellValue::Text("12".into()).is_categorical());
    assert!(!CellValue::Number(12.0).is_categorical());
}

#[test]
fn test_cell_from_json_object_keeps_text() {
    let cell = CellValue::from(serde_json::json!({"a": 1}));
    assert_eq!(cell, CellValue::Text("{\"a\":1}".to_string()));
}

#[test]
fn test_table_columns_first_seen_order() {
    let table = EntityTable::new(vec![
        EntityRow::new().with("b", 1i64).with("a", 2i64),
        EntityRow::new().with("c", 3i64),
    ]);
    // BTreeMap rows iterate sorted, so within a row the order is alphabetical.
    assert_eq!(table.columns(), &["a", "b", "c"]);
    assert!(table.has_column("c"));
    assert!(!table.has_column("d"));
}

#[test]
fn test_entity_ids_from_column_and_positional() {
    let table = EntityTable::new(vec![firm("Acme", "Retail"), firm("Globex", "Energy")]);

    let source = table.id_source("firm_name");
    assert_eq!(source, IdSource::Column("firm_name".into()));
    assert_eq!(table.entity_ids(&source), vec!["Acme", "Globex"]);

    let positional = table.id_source("company");
    assert_eq!(positional, IdSource::Positional);
    assert_eq!(table.entity_ids(&positional), vec!["0", "1"]);
}

#[test]
fn test_missing_id_cell_falls_back_to_position() {
    let table = EntityTable::new(vec![
        firm("Acme", "Retail"),
        EntityRow::new().with("firm_name", CellValue::Null),
    ]);
    let source = table.id_source("firm_name");
    assert_eq!(table.entity_ids(&source), vec!["Acme", "1"]);
}

#[test]
fn test_positional_fallback_skips_ids_in_use() {
    let table = EntityTable::new(vec![
        EntityRow::new().with("firm_name", "1").with("signal", 0.5),
        EntityRow::new().with("signal", 0.9),
        EntityRow::new().with("firm_name", "1~1"),
        EntityRow::new().with("signal", 0.2),
    ]);
    let source = table.id_source("firm_name");
    assert_eq!(table.entity_ids(&source), vec!["1", "1~2", "1~1", "3"]);
}

#[test]
fn test_rows_without_id_are_never_duplicates() {
    let rows = vec![
        EntityRow::new().with("firm_name", "1").with("signal", 0.5),
        EntityRow::new().with("signal", 0.9),
        EntityRow::new().with("firm_name", CellValue::Null),
    ];

    let first = DuplicateIdPolicy::First
        .apply(EntityTable::new(rows.clone()), "firm_name", "test")
        .unwrap();
    assert_eq!(first.len(), 3);

    let rejected = DuplicateIdPolicy::Reject.apply(EntityTable::new(rows), "firm_name", "test");
    assert!(rejected.is_ok());
}

#[test]
fn test_row_without_columns() {
    let row = firm("Acme", "Retail").with("label_recommendable", 1i64);
    let stripped = row.without(&["firm_name", "label_recommendable"]);
    assert_eq!(stripped.len(), 1);
    assert!(stripped.contains("industry"));
}

#[test]
fn test_duplicate_policy_parse() {
    assert_eq!("first".parse::<DuplicateIdPolicy>(), Ok(DuplicateIdPolicy::First));
    assert_eq!("KEEP".parse::<DuplicateIdPolicy>(), Ok(DuplicateIdPolicy::Keep));
    assert_eq!("reject".parse::<DuplicateIdPolicy>(), Ok(DuplicateIdPolicy::Reject));
    assert!("maybe".parse::<DuplicateIdPolicy>().is_err());
}

#[test]
fn test_duplicate_policy_first_keeps_first_row() {
    let table = EntityTable::new(vec![
        firm("Acme", "Retail"),
        firm("Globex", "Energy"),
        firm("Acme", "Mining"),
    ]);

    let deduped = DuplicateIdPolicy::First
        .apply(table, "firm_name", "test")
        .unwrap();
    assert_eq!(deduped.len(), 2);
    assert_eq!(
        deduped.row(0).unwrap().get("industry"),
        Some(&CellValue::Text("Retail".into()))
    );
}

#[test]
fn test_duplicate_policy_keep_and_reject() {
    let rows = vec![firm("Acme", "Retail"), firm("Acme", "Mining")];

    let kept = DuplicateIdPolicy::Keep
        .apply(EntityTable::new(rows.clone()), "firm_name", "test")
        .unwrap();
    assert_eq!(kept.len(), 2);

    let err = DuplicateIdPolicy::Reject
        .apply(EntityTable::new(rows), "firm_name", "test")
        .unwrap_err();
    assert!(matches!(err, TableError::Schema { .. }));
    assert!(err.to_string().contains("Acme"));
}

#[test]
fn test_duplicate_policy_ignores_positional_tables() {
    let table = EntityTable::new(vec![
        EntityRow::new().with("industry", "Retail"),
        EntityRow::new().with("industry", "Retail"),
    ]);
    let out = DuplicateIdPolicy::Reject
        .apply(table, "firm_name", "test")
        .unwrap();
    assert_eq!(out.len(), 2);
}

#[test]
fn test_read_json_array() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "pool.json",
        r#"[{"firm_name": "Acme", "size_employees": 120}, {"firm_name": "Globex", "skills": ["Rust", "SQL"]}]"#,
    );

    let table = read_table(&path).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(
        table.row(0).unwrap().get("size_employees"),
        Some(&CellValue::Number(120.0))
    );
    assert_eq!(
        table.row(1).unwrap().get("skills"),
        Some(&CellValue::List(vec!["Rust".into(), "SQL".into()]))
    );
}

#[test]
fn test_read_json_lines_skips_blank_lines() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "pool.jsonl",
        "{\"firm_name\": \"Acme\"}\n\n{\"firm_name\": \"Globex\"}\n",
    );

    let table = read_table(&path).unwrap();
    assert_eq!(table.len(), 2);
}

#[test]
fn test_read_sniffs_unknown_extension() {
    let dir = TempDir::new().unwrap();
    let array = write_file(&dir, "pool.data", "  [{\"firm_name\": \"Acme\"}]");
    let lines = write_file(&dir, "pool.txt", "{\"firm_name\": \"Acme\"}");

    assert_eq!(read_table(&array).unwrap().len(), 1);
    assert_eq!(read_table(&lines).unwrap().len(), 1);
}

#[test]
fn test_read_missing_file_is_data_not_found() {
    let dir = TempDir::new().unwrap();
    let err = read_table(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, TableError::DataNotFound { .. }));
}

#[test]
fn test_read_malformed_is_schema_error() {
    let dir = TempDir::new().unwrap();
    let broken = write_file(&dir, "broken.jsonl", "{\"firm_name\": \"Acme\"}\n{oops\n");
    let err = read_table(&broken).unwrap_err();
    assert!(matches!(err, TableError::Schema { .. }));
    assert!(err.to_string().contains("line 2"));

    let scalar_rows = write_file(&dir, "scalars.json", "[1, 2]");
    let err = read_table(&scalar_rows).unwrap_err();
    assert!(err.to_string().contains("expected an object"));
}

#[test]
fn test_file_source_required_column() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "training.json", r#"[{"firm_name": "Acme"}]"#);

    let source = FileTableSource::new(&path).require_column("label_recommendable");
    let err = source.load().unwrap_err();
    assert!(matches!(err, TableError::Schema { .. }));
    assert!(err.to_string().contains("label_recommendable"));
}

#[test]
fn test_file_source_applies_duplicate_policy() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "pool.json",
        r#"[{"firm_name": "Acme"}, {"firm_name": "Acme"}]"#,
    );

    let source = FileTableSource::new(&path).duplicate_ids("firm_name", DuplicateIdPolicy::First);
    assert_eq!(source.load().unwrap().len(), 1);
}

#[test]
fn test_empty_table_loads() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "pool.json", "[]");
    let table = FileTableSource::new(&path).load().unwrap();
    assert!(table.is_empty());
}

#[test]
fn test_mock_source_fail_next() {
    let source = MockTableSource::from_rows(vec![firm("Acme", "Retail")]);
    source.fail_next(1);

    assert!(source.load().is_err());
    assert_eq!(source.load().unwrap().len(), 1);
    assert_eq!(source.load_count(), 2);
}

#[test]
fn test_read_xlsx_first_sheet() {
    use rust_xlsxwriter::Workbook;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prediction.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in ["firm_name", "industry", "size_employees", "remote", "", "industry"]
        .iter()
        .enumerate()
    {
        sheet.write_string(0, col as u16, *name).unwrap();
    }
    sheet.write_string(1, 0, "Acme").unwrap();
    sheet.write_string(1, 1, "Retail").unwrap();
    sheet.write_number(1, 2, 120).unwrap();
    sheet.write_boolean(1, 3, true).unwrap();
    sheet.write_string(1, 4, "ignored").unwrap();
    sheet.write_string(1, 5, "Mining").unwrap();
    // Row 2 left blank on purpose.
    sheet.write_string(3, 0, "Globex").unwrap();
    sheet.write_number(3, 2, 8.5).unwrap();
    workbook.add_worksheet().write_string(0, 0, "other_sheet").unwrap();
    workbook.save(&path).unwrap();

    let table = read_table(&path).unwrap();
    assert_eq!(table.len(), 2);
    assert!(table.has_column("firm_name"));
    assert!(table.has_column("industry.1"));
    assert!(!table.has_column("other_sheet"));

    let acme = table.row(0).unwrap();
    assert_eq!(acme.get("size_employees"), Some(&CellValue::Number(120.0)));
    assert_eq!(acme.get("remote"), Some(&CellValue::Bool(true)));
    assert_eq!(acme.get("industry.1").and_then(CellValue::as_text).as_deref(), Some("Mining"));
    assert_eq!(acme.len(), 5);

    let globex = table.row(1).unwrap();
    assert_eq!(globex.get("firm_name").and_then(CellValue::as_text).as_deref(), Some("Globex"));
    assert_eq!(globex.get("size_employees"), Some(&CellValue::Number(8.5)));
    assert!(globex.get("industry").is_none_or(CellValue::is_missing));
}

#[test]
fn test_workbook_source_applies_duplicate_policy() {
    use rust_xlsxwriter::Workbook;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("training.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "firm_name").unwrap();
    sheet.write_string(0, 1, "label_recommendable").unwrap();
    for (row, name) in ["Acme", "Acme", "Initech"].iter().enumerate() {
        sheet.write_string(row as u32 + 1, 0, *name).unwrap();
        sheet.write_number(row as u32 + 1, 1, 1).unwrap();
    }
    workbook.save(&path).unwrap();

    let table = FileTableSource::new(&path)
        .require_column("label_recommendable")
        .duplicate_ids("firm_name", DuplicateIdPolicy::First)
        .load()
        .unwrap();
    assert_eq!(table.entity_ids(&table.id_source("firm_name")), vec!["Acme", "Initech"]);
}

#[test]
fn test_corrupt_workbook_is_schema_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.xlsx");
    std::fs::write(&path, b"PK\x03\x04 not really a zip").unwrap();

    let err = read_table(&path).unwrap_err();
    assert!(matches!(err, TableError::Schema { .. }));
}
