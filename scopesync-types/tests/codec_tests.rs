use pretty_assertions::assert_eq;
use scopesync_types::codec::{
    changes_from_str, changes_to_string, read_changes, read_snapshot, snapshot_from_str,
    snapshot_to_string, write_changes,
};
use scopesync_types::{Changes, Create, Delete, Error, ObjectState, Snapshot, Update, Value};

fn sample_changes() -> Changes {
    Changes::new()
        .with(Create::new("1", "Node"))
        .with(
            Update::new("1")
                .with_value("name", "foo")
                .with_value("graph", Value::reference("0"))
                .with_value("tags", Value::List(vec!["a".into(), "b".into()])),
        )
        .with(Delete::new("4"))
}

// ── Change-sets ──────────────────────────────────────────────────

#[test]
fn changes_serialize_to_wire_format() {
    let json = changes_to_string(&sample_changes()).unwrap();
    assert_eq!(
        json,
        concat!(
            r#"{"creates":[{"id":"1","type":"Node"}],"#,
            r#""updates":[{"id":"1","values":{"name":"foo","graph":{"id":"0"},"tags":["a","b"]}}],"#,
            r#""deletes":[{"id":"4"}]}"#
        )
    );
}

#[test]
fn changes_survive_writer_and_reader() {
    let original = sample_changes();
    let mut buf = Vec::new();
    write_changes(&mut buf, &original).unwrap();
    let parsed = read_changes(buf.as_slice()).unwrap();
    assert_eq!(parsed, original);
}

#[test]
fn empty_lists_may_be_omitted() {
    let changes = changes_from_str(r#"{"creates":[{"id":"5","type":"Foo"}]}"#).unwrap();
    assert_eq!(changes.creates, vec![Create::new("5", "Foo")]);
    assert!(changes.updates.is_empty());
    assert!(changes.deletes.is_empty());
}

#[test]
fn property_order_in_updates_is_preserved() {
    let changes =
        changes_from_str(r#"{"updates":[{"id":"1","values":{"z":1,"a":2,"m":3}}]}"#).unwrap();
    let keys: Vec<_> = changes.updates[0].values.keys().cloned().collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[test]
fn unknown_top_level_property_is_rejected() {
    let err = changes_from_str(r#"{"creates":[],"moves":[]}"#).unwrap_err();
    match err {
        Error::MalformedJson { message, .. } => assert!(message.contains("moves")),
        other => panic!("expected MalformedJson, got {other:?}"),
    }
}

#[test]
fn unknown_property_in_create_is_rejected() {
    let result = changes_from_str(r#"{"creates":[{"id":"1","type":"A","x":1}]}"#);
    assert!(matches!(result, Err(Error::MalformedJson { .. })));
}

#[test]
fn syntax_error_reports_line_and_column() {
    let err = changes_from_str("{\n  \"creates\": [\n    {\"id\": }\n  ]\n}").unwrap_err();
    match err {
        Error::MalformedJson { line, column, .. } => {
            assert_eq!(line, 3);
            assert!(column > 0);
        }
        other => panic!("expected MalformedJson, got {other:?}"),
    }
}

#[test]
fn truncated_input_is_malformed() {
    assert!(matches!(
        changes_from_str(r#"{"creates":["#),
        Err(Error::MalformedJson { .. })
    ));
}

// ── Snapshots ────────────────────────────────────────────────────

#[test]
fn snapshot_serializes_objects_and_last_id() {
    let snapshot = Snapshot {
        objects: vec![ObjectState::new("1", "Graph").with_property("name", "g")],
        last_id: Some(3),
    };
    assert_eq!(
        snapshot_to_string(&snapshot).unwrap(),
        r#"{"objects":[{"id":"1","type":"Graph","properties":{"name":"g"}}],"last-id":3}"#
    );
}

#[test]
fn snapshot_without_last_id_parses() {
    let snapshot = snapshot_from_str(r#"{"objects":[{"id":"2","type":"Node"}]}"#).unwrap();
    assert_eq!(snapshot.last_id, None);
    assert_eq!(snapshot.objects, vec![ObjectState::new("2", "Node")]);
}

#[test]
fn snapshot_reader_rejects_unknown_object_property() {
    let json = r#"{"objects":[{"id":"2","type":"Node","color":"red"}]}"#;
    assert!(read_snapshot(json.as_bytes()).is_err());
}
