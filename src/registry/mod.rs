//! Column-level marshalling registry.
//!
//! A process-wide mapping from table identifier to an ordered list of
//! [`TransferColumn`]s, used to decode spreadsheet rows into records,
//! encode rows back out for export, and split a parsed record's JSON
//! object into primary-key and non-primary-key maps.

use crate::hashing::table_identifier;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One column descriptor for a registered table.
#[derive(Clone)]
pub struct TransferColumn {
    pub column_name: String,
    /// External (spreadsheet) column index; `-1` when not externally projected.
    pub column_index: i32,
    pub is_primary_key: bool,
    marshal: Arc<dyn Fn(&Value) -> String + Send + Sync>,
    unmarshal: Arc<dyn Fn(&str) -> Value + Send + Sync>,
}

impl TransferColumn {
    pub fn new(
        column_name: impl Into<String>,
        column_index: i32,
        is_primary_key: bool,
        marshal: impl Fn(&Value) -> String + Send + Sync + 'static,
        unmarshal: impl Fn(&str) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            column_index,
            is_primary_key,
            marshal: Arc::new(marshal),
            unmarshal: Arc::new(unmarshal),
        }
    }

    /// A column whose marshal/unmarshal pair is the identity on strings,
    /// the common case for plain text columns.
    pub fn text(column_name: impl Into<String>, column_index: i32, is_primary_key: bool) -> Self {
        Self::new(
            column_name,
            column_index,
            is_primary_key,
            |value| match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
            |s| Value::String(s.to_string()),
        )
    }

    pub fn marshal(&self, value: &Value) -> String {
        (self.marshal)(value)
    }

    pub fn unmarshal(&self, text: &str) -> Value {
        (self.unmarshal)(text)
    }
}

/// Immutable, registered column list for one table.
pub type ColumnList = Arc<Vec<TransferColumn>>;

/// Process-wide (or per-engine) table registry.
///
/// Lists are stored behind an `Arc` and swapped on `register`, so readers
/// observing a list mid-iteration never see a torn update — they either
/// get the old list or the new one in full.
#[derive(Default)]
pub struct TableRegistry {
    tables: RwLock<BTreeMap<String, ColumnList>>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `columns` for `table_name`, sorted ascending by
    /// `column_index`, ties broken by `column_name`. Re-registering an
    /// already-known table identifier logs a warning and replaces the list.
    pub fn register(&self, table_name: &str, mut columns: Vec<TransferColumn>) -> String {
        columns.sort_by(|a, b| a.column_index.cmp(&b.column_index).then_with(|| a.column_name.cmp(&b.column_name)));
        let identifier = table_identifier(table_name);
        let mut tables = self.tables.write();
        if tables.contains_key(&identifier) {
            tracing::warn!(table = table_name, %identifier, "re-registering existing table identifier");
        }
        tables.insert(identifier.clone(), Arc::new(columns));
        identifier
    }

    /// Returns the column list for a table identifier, or an empty list if unknown.
    pub fn lookup(&self, table_identifier: &str) -> ColumnList {
        self.tables.read().get(table_identifier).cloned().unwrap_or_default()
    }

    /// Splits a record's decoded JSON object into `(primary_key, data_map)`
    /// string maps, using each column's `unmarshal`. Keys not present in the
    /// registered columns are ignored.
    pub fn split_record(&self, table_identifier: &str, payload: &serde_json::Map<String, Value>) -> (BTreeMap<String, String>, BTreeMap<String, String>) {
        let columns = self.lookup(table_identifier);
        let mut primary_key = BTreeMap::new();
        let mut data_map = BTreeMap::new();
        for column in columns.iter() {
            if let Some(value) = payload.get(&column.column_name) {
                let text = value_to_text(value);
                if column.is_primary_key {
                    primary_key.insert(column.column_name.clone(), text.clone());
                }
                data_map.insert(column.column_name.clone(), text);
            }
        }
        (primary_key, data_map)
    }

    /// Packs a row (column name → value) into a pre-sized cell slot array
    /// for export, using each column's external index and `marshal`.
    pub fn pack_row(&self, table_identifier: &str, row: &BTreeMap<String, Value>) -> Vec<Option<Value>> {
        let columns = self.lookup(table_identifier);
        let max_index = columns.iter().map(|c| c.column_index).filter(|&i| i >= 0).max().unwrap_or(-1);
        if max_index < 0 {
            return Vec::new();
        }
        let mut slots: Vec<Option<Value>> = vec![None; (max_index + 1) as usize];
        for column in columns.iter() {
            if column.column_index < 0 {
                continue;
            }
            if let Some(value) = row.get(&column.column_name) {
                slots[column.column_index as usize] = Some(Value::String(column.marshal(value)));
            }
        }
        slots
    }

    /// Decodes one spreadsheet row into a column→value map for import
    /// generation via `unmarshal`: only indices within the row participate.
    pub fn decode_row(&self, table_identifier: &str, row: &[String]) -> BTreeMap<String, Value> {
        let columns = self.lookup(table_identifier);
        let mut map = BTreeMap::new();
        for column in columns.iter() {
            if column.column_index >= 0 && (column.column_index as usize) < row.len() {
                map.insert(column.column_name.clone(), column.unmarshal(&row[column.column_index as usize]));
            }
        }
        map
    }

    /// Projects a string-keyed map (a parsed record's `primary_key` or
    /// `data_map`) into column→value via each column's `unmarshal`. Keys
    /// with no matching registered column pass through as plain strings.
    pub fn unmarshal_map(&self, table_identifier: &str, map: &BTreeMap<String, String>) -> BTreeMap<String, Value> {
        let columns = self.lookup(table_identifier);
        map.iter()
            .map(|(name, text)| {
                let value = match columns.iter().find(|c| &c.column_name == name) {
                    Some(column) => column.unmarshal(text),
                    None => Value::String(text.clone()),
                };
                (name.clone(), value)
            })
            .collect()
    }
}

/// Converts a JSON scalar to its plain-text wire representation, without
/// the surrounding quotes `Value`'s `Display` impl would add to a string.
fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
