use brain_engine::record::{RecordGenerator, RecordParser, WorkbookReader};
use brain_engine::registry::{TableRegistry, TransferColumn};
use serde_json::Value;
use std::collections::BTreeMap;

#[test]
fn generated_file_round_trips_through_parser() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.dat");

    let registry = TableRegistry::new();
    registry.register("users", vec![TransferColumn::text("id", 0, true), TransferColumn::text("name", 1, false)]);

    let mut generator = RecordGenerator::create(&path).unwrap();
    let mut row = BTreeMap::new();
    row.insert("id".to_string(), Value::String("1".into()));
    row.insert("name".to_string(), Value::String("a".into()));
    generator.append_data(false, "users", &row).unwrap();
    generator.append_data(true, "users", &row).unwrap();
    generator.close().unwrap();

    let mut parser = RecordParser::open(&path).unwrap();
    assert_eq!(parser.total_count(), 2);
    let mut records = Vec::new();
    parser.process(&registry, |record| records.push(record.clone())).unwrap();
    assert_eq!(records.len(), 2);
    assert!(!records[0].remove_operate);
    assert!(records[1].remove_operate);
    assert_eq!(records[0].primary_key.get("id"), Some(&"1".to_string()));
}

struct FixedWorkbook;

impl WorkbookReader for FixedWorkbook {
    fn table_names(&self) -> Vec<String> {
        vec!["customers".to_string()]
    }

    fn rows(&self, table_name: &str) -> Vec<Vec<String>> {
        assert_eq!(table_name, "customers");
        vec![vec!["1".to_string(), "Ada".to_string()], vec!["2".to_string(), "Grace".to_string()]]
    }
}

#[test]
fn append_from_workbook_decodes_every_sheet_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("workbook.dat");

    let registry = TableRegistry::new();
    registry.register("customers", vec![TransferColumn::text("id", 0, true), TransferColumn::text("name", 1, false)]);

    RecordGenerator::append_from_workbook(&path, &registry, &FixedWorkbook).unwrap();

    let mut parser = RecordParser::open(&path).unwrap();
    assert_eq!(parser.total_count(), 2);
    let mut records = Vec::new();
    parser.process(&registry, |record| records.push(record.clone())).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].data_map.get("id"), Some(&"1".to_string()));
    assert_eq!(records[1].data_map.get("name"), Some(&"Grace".to_string()));
}
