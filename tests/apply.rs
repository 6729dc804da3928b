use async_trait::async_trait;
use brain_engine::apply::{ApplyEngine, DataSource, Isolation};
use brain_engine::error::EngineError;
use brain_engine::record::DataRecord;
use brain_engine::registry::TableRegistry;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct FakeDataSource {
    locked_ids: Mutex<Vec<String>>,
    inserts: AtomicUsize,
    updates: AtomicUsize,
    deletes: AtomicUsize,
    fail_on_insert: bool,
}

#[async_trait]
impl DataSource for FakeDataSource {
    async fn begin_transactional(&self, _timeout_secs: u64, _isolation: Isolation) -> Result<(), EngineError> {
        Ok(())
    }
    async fn rollback(&self, _error: &EngineError) -> Result<(), EngineError> {
        Ok(())
    }
    async fn end_transactional(&self) -> Result<(), EngineError> {
        Ok(())
    }
    async fn lock_record(&self, table_id: &str, _filter: &BTreeMap<String, Value>) -> Result<bool, EngineError> {
        Ok(self.locked_ids.lock().contains(&table_id.to_string()))
    }
    async fn insert(&self, _table_id: &str, _data: &BTreeMap<String, Value>) -> Result<(), EngineError> {
        if self.fail_on_insert {
            return Err(EngineError::Insert("boom".into()));
        }
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
    async fn update(&self, _table_id: &str, _data: &BTreeMap<String, Value>, _filter: &BTreeMap<String, Value>) -> Result<(), EngineError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
    async fn delete(&self, _table_id: &str, _filter: &BTreeMap<String, Value>) -> Result<(), EngineError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
    async fn query(&self, _table_name: &str, _statement: &str) -> Result<Vec<BTreeMap<String, Value>>, EngineError> {
        Ok(Vec::new())
    }
}

fn sample_record(remove: bool) -> DataRecord {
    let mut primary_key = BTreeMap::new();
    primary_key.insert("id".to_string(), "1".to_string());
    let mut data_map = primary_key.clone();
    data_map.insert("name".to_string(), "a".to_string());
    DataRecord {
        remove_operate: remove,
        identify_code: "table1".to_string(),
        primary_key,
        data_map,
    }
}

#[tokio::test]
async fn unlocked_record_inserts() {
    let registry = TableRegistry::new();
    let data_source = FakeDataSource::default();
    let engine = ApplyEngine::new(&registry, &data_source);
    let outcome = engine.apply_all(vec![sample_record(false)], false, 0).await;
    assert_eq!(outcome.success_count, 1);
    assert_eq!(data_source.inserts.load(Ordering::SeqCst), 1);
    assert!(!outcome.has_error);
}

#[tokio::test]
async fn transactional_rollback_aborts_remaining_records() {
    let registry = TableRegistry::new();
    let data_source = FakeDataSource { fail_on_insert: true, ..Default::default() };
    let engine = ApplyEngine::new(&registry, &data_source);
    let records = vec![sample_record(false), sample_record(false)];
    let outcome = engine.apply_all(records, true, 30).await;
    assert!(outcome.has_error);
    assert_eq!(outcome.success_count, 0);
    assert_eq!(data_source.inserts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn non_transactional_continues_after_failure() {
    let registry = TableRegistry::new();
    let data_source = FakeDataSource { fail_on_insert: true, ..Default::default() };
    let engine = ApplyEngine::new(&registry, &data_source);
    let records = vec![sample_record(false), sample_record(false)];
    let outcome = engine.apply_all(records, false, 0).await;
    assert_eq!(outcome.failed_count, 2);
    assert_eq!(outcome.success_count, 0);
    assert!(outcome.has_error);
}
