use std::collections::HashSet;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::fallback::*;
use super::*;
use crate::cache::RankedScores;
use crate::model::MockScorer;
use crate::table::{CellValue, EntityRow, EntityTable};

fn full_row() -> EntityRow {
    EntityRow::new()
        .with("firm_name", "Acme")
        .with("primary_position", "Backend Engineer")
        .with("industry", "Fintech")
        .with("founded_year", 2015i64)
        .with("size_employees", 120i64)
        .with("rating_1to5", 4.5)
        .with("city", "Berlin")
        .with("country", "Germany")
        .with("benefits", "['Remote work', 'Gym']")
        .with("createdAt", "2024-05-01T10:00:00Z")
        .with("description", "Payments infrastructure.")
        .with("experience", "3-5 years")
        .with("logo", "💳")
        .with("posted", "today")
        .with("salary", "€70,000")
        .with(
            "skills",
            CellValue::List(vec!["Rust".into(), "Postgres".into(), "Kafka".into()]),
        )
        .with("type", "Full-time")
}

fn assert_from_pools(record: &DisplayRecord) {
    assert!(SIZE_POOL.contains(&record.size.as_str()));
    assert!(RATING_POOL.contains(&record.rating));
    assert!(DESCRIPTION_POOL.contains(&record.description.as_str()));
    assert!(LOGO_POOL.contains(&record.logo.as_str()));
    assert!(POSTED_POOL.contains(&record.posted.as_str()));
    assert!(SALARY_POOL.contains(&record.salary.as_str()));
    assert!(TYPE_POOL.contains(&record.job_type.as_str()));
    assert!(EXPERIENCE_POOL.contains(&record.experience));
    assert!(BENEFITS_POOL.iter().any(|pool| *pool == record.benefits.as_slice()));
    assert!(SKILLS_POOL.iter().any(|pool| pool.as_slice() == record.skills.as_slice()));
}

#[test]
fn test_parse_list_json_and_literals() {
    assert_eq!(parse_list(r#"["Rust", "SQL"]"#), vec!["Rust", "SQL"]);
    assert_eq!(parse_list("['Rust', \"SQL\"]"), vec!["Rust", "SQL"]);
    assert_eq!(parse_list("['it\\'s fine']"), vec!["it's fine"]);
    assert_eq!(parse_list("[]"), Vec::<String>::new());
}

#[test]
fn test_parse_list_delimited() {
    assert_eq!(parse_list("Rust; SQL ;Go"), vec!["Rust", "SQL", "Go"]);
    assert_eq!(parse_list("Rust|SQL"), vec!["Rust", "SQL"]);
    assert_eq!(parse_list("Rust, SQL"), vec!["Rust", "SQL"]);
    assert_eq!(parse_list("Rust"), vec!["Rust"]);
    assert_eq!(parse_list("   "), Vec::<String>::new());
}

#[test]
fn test_parse_list_fails_closed() {
    let hostile = "[__import__('os').system('rm -rf /')]";
    assert_eq!(parse_list(hostile), vec![hostile]);
    assert_eq!(parse_list("['unterminated]"), vec!["['unterminated]"]);
    assert_eq!(parse_list("['a' 'b']"), vec!["['a' 'b']"]);
}

#[test]
fn test_list_cell_shapes() {
    assert_eq!(
        list_cell(&CellValue::List(vec!["a".into(), CellValue::Null, 3i64.into()])),
        Some(vec!["a".to_string(), "3".to_string()])
    );
    assert_eq!(list_cell(&CellValue::Text("a, b".into())), Some(vec!["a".into(), "b".into()]));
    assert_eq!(list_cell(&CellValue::Text("NaN".into())), None);
    assert_eq!(list_cell(&CellValue::Text("[]".into())), None);
}

#[test]
fn test_parse_experience_shapes() {
    assert_eq!(parse_experience(&CellValue::Text("3-5 years".into())), Some([3, 5]));
    assert_eq!(parse_experience(&CellValue::Text("5+ years".into())), Some([5, 5]));
    assert_eq!(parse_experience(&CellValue::Text("[2, 4]".into())), Some([2, 4]));
    assert_eq!(parse_experience(&CellValue::Text("['4', '2']".into())), Some([2, 4]));
    assert_eq!(parse_experience(&CellValue::Number(3.0)), Some([3, 3]));
    assert_eq!(
        parse_experience(&CellValue::List(vec![1i64.into(), 3i64.into()])),
        Some([1, 3])
    );
}

#[test]
fn test_parse_experience_rejects_other_text() {
    assert_eq!(parse_experience(&CellValue::Text("senior".into())), None);
    assert_eq!(parse_experience(&CellValue::Text("about 3 years".into())), None);
    assert_eq!(parse_experience(&CellValue::Number(-2.0)), None);
    assert_eq!(parse_experience(&CellValue::List(vec!["x".into()])), None);
    assert_eq!(parse_experience(&CellValue::Null), None);
}

#[test]
fn test_partial_record_maps_known_columns() {
    let partial = PartialRecord::from_row("Acme", &full_row(), 0.87654);

    assert_eq!(partial.name, "Acme");
    assert_eq!(partial.position.as_deref(), Some("Backend Engineer"));
    assert_eq!(partial.founded, Some(2015));
    assert_eq!(partial.size.as_deref(), Some("120"));
    assert_eq!(partial.rating, Some(4.5));
    assert_eq!(partial.location, "Berlin, Germany");
    assert_eq!(partial.benefits, Some(vec!["Remote work".into(), "Gym".into()]));
    assert_eq!(partial.created_at, "2024-05-01T10:00:00Z");
    assert_eq!(partial.experience, Some([3, 5]));
    assert_eq!(partial.ai_score, 0.877);
}

#[test]
fn test_complete_row_needs_no_fallbacks() {
    let mut rng = StdRng::seed_from_u64(1);
    let a = materialize("Acme", &full_row(), 0.5, &mut rng);
    let b = materialize("Acme", &full_row(), 0.5, &mut rng);

    assert_eq!(a.logo, "💳");
    assert_eq!(a.salary, "€70,000");
    assert_eq!(a.skills, vec!["Rust", "Postgres", "Kafka"]);
    assert_eq!(a.job_type, "Full-time");
    assert_ne!(a.id, b.id);
    assert_eq!(
        DisplayRecord { id: b.id, ..a.clone() },
        b
    );
}

#[test]
fn test_location_parts() {
    let only_country = EntityRow::new().with("country", "Spain");
    assert_eq!(PartialRecord::from_row("x", &only_country, 0.1).location, "Spain");

    let blank = EntityRow::new().with("city", "  ").with("country", CellValue::Null);
    assert_eq!(PartialRecord::from_row("x", &blank, 0.1).location, DEFAULT_LOCATION);
}

#[test]
fn test_empty_row_fills_every_optional_field_from_pools() {
    let mut rng = StdRng::seed_from_u64(42);
    let empty = EntityRow::new();

    let first = materialize("Ghost", &empty, 0.3, &mut rng);
    let second = materialize("Ghost", &empty, 0.3, &mut rng);

    assert_from_pools(&first);
    assert_from_pools(&second);
    assert_eq!(first.location, DEFAULT_LOCATION);
    assert!(first.position.is_none());
    assert_ne!(first.id, second.id);
}

#[test]
fn test_fallbacks_vary_across_calls() {
    let mut rng = StdRng::seed_from_u64(3);
    let empty = EntityRow::new();

    let logos: HashSet<String> = (0..50)
        .map(|_| materialize("Ghost", &empty, 0.3, &mut rng).logo)
        .collect();
    assert!(logos.len() > 1);
}

#[test]
fn test_na_cells_count_as_missing() {
    let mut rng = StdRng::seed_from_u64(8);
    let row = EntityRow::new()
        .with("salary", "NaN")
        .with("skills", "")
        .with("experience", "n/a")
        .with("rating_1to5", CellValue::Null);

    let record = materialize("Acme", &row, 0.4, &mut rng);
    assert_from_pools(&record);
}

#[test]
fn test_record_serializes_camel_case() {
    let mut rng = StdRng::seed_from_u64(4);
    let record = materialize("Acme", &full_row(), 0.12345, &mut rng);
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["aiScore"], serde_json::json!(0.123));
    assert_eq!(json["type"], serde_json::json!("Full-time"));
    assert_eq!(json["createdAt"], serde_json::json!("2024-05-01T10:00:00Z"));
    assert_eq!(json["experience"], serde_json::json!([3, 5]));
    assert!(json.get("jobType").is_none());
}

#[test]
fn test_materialize_all_uses_ranking_snapshot() {
    let table = EntityTable::new(vec![
        EntityRow::new()
            .with("firm_name", "Acme")
            .with("signal", 0.2)
            .with("industry", "Retail"),
        EntityRow::new()
            .with("firm_name", "Globex")
            .with("signal", 0.9)
            .with("industry", "Energy"),
    ]);
    let ranked = RankedScores::compute(
        Arc::new(table),
        &MockScorer::new("signal"),
        "firm_name",
        "label_recommendable",
    )
    .unwrap();

    let mut rng = StdRng::seed_from_u64(6);
    let records = materialize_all(&ranked, ranked.entries(), &mut rng);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "Globex");
    assert_eq!(records[0].industry.as_deref(), Some("Energy"));
    assert_eq!(records[0].ai_score, 0.9);
    assert_eq!(records[1].name, "Acme");
}
