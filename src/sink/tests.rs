use super::*;
use crate::materialize::materialize;
use crate::table::EntityRow;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::TempDir;

fn records(n: usize) -> Vec<DisplayRecord> {
    let mut rng = StdRng::seed_from_u64(1);
    (0..n)
        .map(|i| {
            let row = EntityRow::new().with("industry", "Retail");
            materialize(&format!("firm-{i}"), &row, 0.5, &mut rng)
        })
        .collect()
}

#[test]
fn test_sanitize_user_id() {
    assert_eq!(sanitize_user_id("alice"), Some("alice"));
    assert_eq!(sanitize_user_id(" user-42 "), Some("user-42"));
    assert_eq!(sanitize_user_id(""), None);
    assert_eq!(sanitize_user_id(".."), None);
    assert_eq!(sanitize_user_id("."), None);
    assert_eq!(sanitize_user_id("../etc/passwd"), None);
    assert_eq!(sanitize_user_id("a/b"), None);
    assert_eq!(sanitize_user_id("a\\b"), None);
}

#[test]
fn test_json_dir_sink_writes_delivery() {
    let dir = TempDir::new().unwrap();
    let sink = JsonDirSink::new(dir.path().join("deliveries"));
    let sent = records(2);

    sink.deliver("alice", &sent).unwrap();

    let path = dir.path().join("deliveries").join("alice.json");
    let delivery: Delivery = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(delivery.user_id, "alice");
    assert_eq!(delivery.records.len(), 2);
    assert_eq!(delivery.records[0].id, sent[0].id);
}

#[test]
fn test_json_dir_sink_replaces_previous_delivery() {
    let dir = TempDir::new().unwrap();
    let sink = JsonDirSink::new(dir.path());

    sink.deliver("bob", &records(3)).unwrap();
    sink.deliver("bob", &records(1)).unwrap();

    let path = sink.path_for("bob").unwrap();
    let delivery: Delivery = serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
    assert_eq!(delivery.records.len(), 1);
}

#[test]
fn test_json_dir_sink_rejects_traversal() {
    let dir = TempDir::new().unwrap();
    let sink = JsonDirSink::new(dir.path());

    let err = sink.deliver("../escape", &records(1)).unwrap_err();
    assert!(matches!(err, SinkError::InvalidUserId { .. }));
    assert!(!dir.path().join("../escape.json").exists());
}

#[test]
fn test_tracing_sink_accepts_everything() {
    assert!(TracingSink.deliver("anyone", &records(2)).is_ok());
    assert!(TracingSink.deliver("", &[]).is_ok());
}

#[test]
fn test_memory_sink_records_and_fails_on_request() {
    let sink = MemorySink::new();
    sink.deliver("carol", &records(2)).unwrap();
    assert_eq!(sink.len(), 1);
    assert_eq!(sink.deliveries()[0].records.len(), 2);

    sink.set_failing(true);
    assert!(matches!(sink.deliver("carol", &records(1)), Err(SinkError::Io(_))));
    assert_eq!(sink.len(), 1);
}
