use pretty_assertions::assert_eq;
use scopesync_cli::{check, load_registry, read_changes, replay, write_snapshot};
use scopesync_model::PartKind;
use scopesync_types::{codec, Changes, ObjectId};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

const GRAPH_BATCH: &str = r#"{
  "creates": [
    {"id": "1", "type": "Graph"},
    {"id": "2", "type": "Node"},
    {"id": "3", "type": "Node"},
    {"id": "4", "type": "Edge"}
  ],
  "updates": [
    {"id": "1", "values": {"nodes": [{"id": "2"}, {"id": "3"}], "edges": [{"id": "4"}]}},
    {"id": "4", "values": {"source": {"id": "2"}, "target": {"id": "3"}}}
  ],
  "deletes": []
}"#;

// ── Registry ─────────────────────────────────────────────────────

#[test]
fn default_registry_is_the_diagram() {
    let registry = load_registry(None).unwrap();
    for kind in PartKind::ALL {
        assert!(registry.contains(kind.type_name()));
    }
}

#[test]
fn registry_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "types.json",
        r#"{"types":[{"type_name":"Doc","transient":["cursor"]}]}"#,
    );
    let registry = load_registry(Some(&path)).unwrap();
    assert!(registry.is_transient("Doc", "cursor"));
}

#[test]
fn missing_registry_file_names_the_path() {
    let err = load_registry(Some(Path::new("/nonexistent/types.json"))).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/types.json"));
}

// ── Replay ───────────────────────────────────────────────────────

#[test]
fn replay_applies_batches_in_order() {
    let dir = TempDir::new().unwrap();
    let first = write(&dir, "1.json", GRAPH_BATCH);
    let second = write(&dir, "2.json", r#"{"deletes":[{"id":"3"}]}"#);

    let scope = replay(load_registry(None).unwrap(), None, &[first, second]).unwrap();
    assert_eq!(scope.len(), 3);
    assert!(!scope.contains(&ObjectId::from("3")));
    assert_eq!(
        scope.value(&ObjectId::from("4"), "target"),
        None,
        "deleted target is unlinked"
    );
}

#[test]
fn replay_round_trips_through_snapshot_file() {
    let dir = TempDir::new().unwrap();
    let batch = write(&dir, "batch.json", GRAPH_BATCH);
    let out = dir.path().join("out.json");

    let scope = replay(load_registry(None).unwrap(), None, &[batch]).unwrap();
    write_snapshot(&scope, Some(&out)).unwrap();

    let reloaded = replay(load_registry(None).unwrap(), Some(&out), &[]).unwrap();
    assert_eq!(reloaded.write_snapshot(), scope.write_snapshot());
}

#[test]
fn replay_reports_failing_file() {
    let dir = TempDir::new().unwrap();
    let bad = write(&dir, "bad.json", r#"{"updates":[{"id":"8","values":{}}]}"#);

    let err = replay(load_registry(None).unwrap(), None, &[bad]).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("bad.json"), "{message}");
    assert!(message.contains("unresolvable object ID: 8"), "{message}");
}

#[test]
fn malformed_change_set_reports_position() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "broken.json", "{\n  \"creates\": [\n    {\"id\": \"1\"}\n  ]\n}");
    let err = read_changes(&path).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("broken.json"), "{message}");
    assert!(message.contains("line 3"), "{message}");
}

// ── Check ────────────────────────────────────────────────────────

#[test]
fn check_lists_application_order() {
    let changes = codec::changes_from_str(GRAPH_BATCH).unwrap();
    let report = check(&changes).unwrap();
    assert_eq!(
        report.to_string(),
        "create 2 Node\n\
         create 3 Node\n\
         create 4 Edge\n\
         update 4 [source, target]\n\
         create 1 Graph\n\
         update 1 [nodes, edges]\n"
    );
    assert!(!report.creates_in_order(&changes));
}

#[test]
fn check_rejects_cycles() {
    let changes: Changes = codec::changes_from_str(
        r#"{"creates":[{"id":"a","type":"T"},{"id":"b","type":"T"}],
            "updates":[{"id":"a","values":{"x":{"id":"b"}}},{"id":"b","values":{"x":{"id":"a"}}}]}"#,
    )
    .unwrap();
    let err = check(&changes).unwrap_err();
    assert!(format!("{err:#}").contains("cyclic dependency: a -> b -> a"));
}
