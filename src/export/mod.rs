//! Export worker and the `WorkbookWriter` boundary it writes through.

pub mod xlsx;

use crate::apply::DataSource;
use crate::error::EngineError;
use crate::registry::TableRegistry;
use crate::task::ExportTask;
use serde_json::Value;

pub use xlsx::XlsxWorkbookWriter;

/// Spreadsheet writer boundary, treated as opaque
/// `sheet(name).appendRow(cells)` + `close()`.
pub trait WorkbookWriter {
    fn append_row(&mut self, sheet: &str, cells: &[Option<Value>]) -> Result<(), EngineError>;
    fn close(self: Box<Self>) -> Result<(), EngineError>;
}

/// Runs every query in an export task, packing each row through the
/// registry and appending it to the named sheet.
pub struct ExportWorker<'a> {
    registry: &'a TableRegistry,
    data_source: &'a dyn DataSource,
}

impl<'a> ExportWorker<'a> {
    pub fn new(registry: &'a TableRegistry, data_source: &'a dyn DataSource) -> Self {
        Self { registry, data_source }
    }

    pub async fn run(&self, task: &ExportTask, mut writer: Box<dyn WorkbookWriter>) -> Result<(), EngineError> {
        for query in &task.query_list {
            let rows = self.data_source.query(&query.table_name, &query.statement).await?;
            let table_id = crate::hashing::table_identifier(&query.table_name);
            for row in rows {
                let cells = self.registry.pack_row(&table_id, &row);
                writer.append_row(&query.table_name, &cells)?;
            }
        }
        writer.close()
    }
}
