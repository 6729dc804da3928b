use brain_engine::record::{RecordGenerator, RecordParser};
use byteorder::{LittleEndian, ReadBytesExt};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

#[test]
fn multiple_tables_build_correct_type_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("multi.dat");

    let mut generator = RecordGenerator::create(&path).unwrap();
    let mut row = BTreeMap::new();
    row.insert("id".to_string(), Value::String("1".into()));
    generator.append_data(false, "A", &row).unwrap();
    generator.append_data(false, "B", &row).unwrap();
    generator.append_data(false, "A", &row).unwrap();
    generator.close().unwrap();

    let parser = RecordParser::open(&path).unwrap();
    assert_eq!(parser.type_table().len(), 2);
    assert_eq!(parser.total_count(), 3);
}

#[test]
fn footer_pointer_matches_body_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("footer.dat");
    let mut generator = RecordGenerator::create(&path).unwrap();
    let mut row = BTreeMap::new();
    row.insert("id".to_string(), Value::String("1".into()));
    generator.append_data(false, "T", &row).unwrap();
    generator.close().unwrap();

    let mut file = File::open(&path).unwrap();
    let body_end = file.read_u64::<LittleEndian>().unwrap();
    file.seek(SeekFrom::Start(body_end)).unwrap();
    let mut marker = [0u8; 8];
    file.read_exact(&mut marker).unwrap();
    let total_count = u64::from_le_bytes(marker);
    assert_eq!(total_count, 1);
}
