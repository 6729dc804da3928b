//! Apply engine: per-record delete/upsert policy with optional
//! transactional batching and rollback classification.

use crate::error::EngineError;
use crate::record::DataRecord;
use crate::registry::TableRegistry;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

/// Isolation level requested for transactional imports. Only
/// `ReadCommitted` is used by this engine, but the type leaves room
/// for data sources that support more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Isolation {
    ReadCommitted,
}

/// External collaborator the apply engine drives. Out of scope for
/// this crate's own implementation; callers supply a concrete `DataSource`.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn begin_transactional(&self, timeout_secs: u64, isolation: Isolation) -> Result<(), EngineError>;
    async fn rollback(&self, error: &EngineError) -> Result<(), EngineError>;
    async fn end_transactional(&self) -> Result<(), EngineError>;

    async fn lock_record(&self, table_id: &str, filter: &BTreeMap<String, Value>) -> Result<bool, EngineError>;
    async fn insert(&self, table_id: &str, data: &BTreeMap<String, Value>) -> Result<(), EngineError>;
    async fn update(&self, table_id: &str, data: &BTreeMap<String, Value>, filter: &BTreeMap<String, Value>) -> Result<(), EngineError>;
    async fn delete(&self, table_id: &str, filter: &BTreeMap<String, Value>) -> Result<(), EngineError>;

    /// Runs one stored query, returning each row as a column→value map.
    async fn query(&self, table_name: &str, statement: &str) -> Result<Vec<BTreeMap<String, Value>>, EngineError>;
}

/// Outcome of applying one import's full record stream.
#[derive(Debug, Default)]
pub struct ApplyOutcome {
    pub success_count: u64,
    pub failed_count: u64,
    pub has_error: bool,
    pub error_message: Option<String>,
}

impl ApplyOutcome {
    fn append_error(&mut self, line: impl AsRef<str>) {
        self.has_error = true;
        match &mut self.error_message {
            Some(existing) => {
                existing.push_str("\r\n");
                existing.push_str(line.as_ref());
            }
            None => self.error_message = Some(line.as_ref().to_string()),
        }
    }
}

/// Drives one parsed record through lock/upsert-or-delete.
pub struct ApplyEngine<'a> {
    registry: &'a TableRegistry,
    data_source: &'a dyn DataSource,
}

impl<'a> ApplyEngine<'a> {
    pub fn new(registry: &'a TableRegistry, data_source: &'a dyn DataSource) -> Self {
        Self { registry, data_source }
    }

    /// Applies one record. `filter_map`/`convert_map` are projected from
    /// the record's already-split `primary_key`/`data_map` via the
    /// registry's per-column `unmarshal`.
    async fn apply_one(&self, record: &DataRecord) -> Result<(), EngineError> {
        let filter_map = self.registry.unmarshal_map(&record.identify_code, &record.primary_key);
        let convert_map = self.registry.unmarshal_map(&record.identify_code, &record.data_map);

        if record.remove_operate {
            self.data_source.delete(&record.identify_code, &filter_map).await?;
            return Ok(());
        }

        let locked = self.data_source.lock_record(&record.identify_code, &filter_map).await?;
        if locked {
            self.data_source.update(&record.identify_code, &convert_map, &filter_map).await
        } else {
            let mut all_map = filter_map.clone();
            all_map.extend(convert_map);
            self.data_source.insert(&record.identify_code, &all_map).await
        }
    }

    /// Applies every record yielded by `records`, honoring transactional
    /// rollback semantics when `transactional` is set.
    pub async fn apply_all(&self, records: Vec<DataRecord>, transactional: bool, timeout_secs: u64) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::default();

        if transactional {
            if let Err(err) = self.data_source.begin_transactional(timeout_secs, Isolation::ReadCommitted).await {
                outcome.append_error(format!("begin_transactional failed: {err}"));
                return outcome;
            }
        }

        let mut rolled_back = false;

        for record in &records {
            match self.apply_one(record).await {
                Ok(()) => outcome.success_count += 1,
                Err(err) => {
                    if transactional && err.is_rollback_kind() {
                        outcome.append_error(format!("rollback triggered: {err}"));
                        if let Err(rollback_err) = self.data_source.rollback(&err).await {
                            outcome.append_error(format!("rollback failed: {rollback_err}"));
                        }
                        rolled_back = true;
                        break;
                    }
                    outcome.failed_count += 1;
                    outcome.append_error(format!("record failed: {err}"));
                }
            }
        }

        if transactional {
            if let Err(err) = self.data_source.end_transactional().await {
                outcome.append_error(format!("end_transactional failed: {err}"));
            }
        }

        if rolled_back {
            outcome.has_error = true;
        } else if outcome.success_count + outcome.failed_count != records.len() as u64 {
            outcome.has_error = true;
        }

        outcome
    }
}
