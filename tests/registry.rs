use brain_engine::registry::{TableRegistry, TransferColumn};
use serde_json::Value;
use std::collections::BTreeMap;

fn sample_columns() -> Vec<TransferColumn> {
    vec![
        TransferColumn::text("name", 1, false),
        TransferColumn::text("id", 0, true),
        TransferColumn::text("age", 2, false),
    ]
}

#[test]
fn register_sorts_by_column_index() {
    let registry = TableRegistry::new();
    let identifier = registry.register("users", sample_columns());
    let columns = registry.lookup(&identifier);
    let names: Vec<_> = columns.iter().map(|c| c.column_name.as_str()).collect();
    assert_eq!(names, vec!["id", "name", "age"]);
}

#[test]
fn register_ties_broken_by_name() {
    let registry = TableRegistry::new();
    let columns = vec![TransferColumn::text("b", 0, false), TransferColumn::text("a", 0, false)];
    let identifier = registry.register("t", columns);
    let columns = registry.lookup(&identifier);
    let names: Vec<_> = columns.iter().map(|c| c.column_name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn lookup_unknown_returns_empty() {
    let registry = TableRegistry::new();
    assert!(registry.lookup("nonexistent").is_empty());
}

#[test]
fn split_record_separates_primary_key() {
    let registry = TableRegistry::new();
    let identifier = registry.register("users", sample_columns());
    let mut payload = serde_json::Map::new();
    payload.insert("id".into(), Value::String("1".into()));
    payload.insert("name".into(), Value::String("a".into()));
    payload.insert("age".into(), Value::String("10".into()));
    let (pk, data) = registry.split_record(&identifier, &payload);
    assert_eq!(pk.len(), 1);
    assert!(pk.contains_key("id"));
    assert_eq!(data.len(), 3);
}

fn prefixed_marshal(value: &Value) -> String {
    match value {
        Value::String(s) => format!("#{s}"),
        other => format!("#{other}"),
    }
}

fn prefixed_unmarshal(text: &str) -> Value {
    Value::String(text.trim_start_matches('#').to_string())
}

#[test]
fn pack_row_calls_column_marshal() {
    let registry = TableRegistry::new();
    let identifier = registry.register(
        "users",
        vec![
            TransferColumn::new("id", 0, true, prefixed_marshal, prefixed_unmarshal),
            TransferColumn::text("name", 1, false),
        ],
    );

    let mut row = BTreeMap::new();
    row.insert("id".to_string(), Value::String("1".into()));
    row.insert("name".to_string(), Value::String("a".into()));

    let cells = registry.pack_row(&identifier, &row);
    assert_eq!(cells[0], Some(Value::String("#1".to_string())));
    assert_eq!(cells[1], Some(Value::String("a".to_string())));
}

#[test]
fn decode_row_calls_column_unmarshal() {
    let registry = TableRegistry::new();
    let identifier = registry.register("users", vec![TransferColumn::new("id", 0, true, prefixed_marshal, prefixed_unmarshal)]);

    let decoded = registry.decode_row(&identifier, &["#7".to_string()]);
    assert_eq!(decoded.get("id"), Some(&Value::String("7".to_string())));
}

#[test]
fn unmarshal_map_projects_registered_columns_and_passes_through_unknown() {
    let registry = TableRegistry::new();
    let identifier = registry.register("users", vec![TransferColumn::new("id", 0, true, prefixed_marshal, prefixed_unmarshal)]);

    let mut source = BTreeMap::new();
    source.insert("id".to_string(), "#9".to_string());
    source.insert("extra".to_string(), "plain".to_string());

    let unmarshalled = registry.unmarshal_map(&identifier, &source);
    assert_eq!(unmarshalled.get("id"), Some(&Value::String("9".to_string())));
    assert_eq!(unmarshalled.get("extra"), Some(&Value::String("plain".to_string())));
}
