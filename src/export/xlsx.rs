//! Concrete `WorkbookWriter` backed by `rust_xlsxwriter`, appending
//! arbitrary JSON-valued rows to a named sheet.

use super::WorkbookWriter;
use crate::error::EngineError;
use rust_xlsxwriter::{Workbook, Worksheet};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

pub struct XlsxWorkbookWriter {
    path: PathBuf,
    workbook: Workbook,
    sheet_rows: HashMap<String, u32>,
}

impl XlsxWorkbookWriter {
    pub fn create(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            workbook: Workbook::new(),
            sheet_rows: HashMap::new(),
        }
    }

    fn sheet_mut(&mut self, name: &str) -> Result<&mut Worksheet, EngineError> {
        if self.workbook.worksheets().iter().all(|sheet| sheet.name() != name) {
            let mut sheet = Worksheet::new();
            sheet.set_name(name).map_err(|err| EngineError::DataInvalid { reason: err.to_string() })?;
            self.workbook.push_worksheet(sheet);
            self.sheet_rows.insert(name.to_string(), 0);
        }
        self.workbook
            .worksheets_mut()
            .iter_mut()
            .find(|sheet| sheet.name() == name)
            .ok_or_else(|| EngineError::DataInvalid { reason: format!("sheet {name} not found") })
    }
}

impl WorkbookWriter for XlsxWorkbookWriter {
    fn append_row(&mut self, sheet_name: &str, cells: &[Option<Value>]) -> Result<(), EngineError> {
        let row = *self.sheet_rows.get(sheet_name).unwrap_or(&0);
        let sheet = self.sheet_mut(sheet_name)?;

        for (col, cell) in cells.iter().enumerate() {
            let write_result = match cell {
                Some(Value::String(s)) => sheet.write_string(row, col as u16, s),
                Some(Value::Number(n)) => sheet.write_number(row, col as u16, n.as_f64().unwrap_or_default()),
                Some(Value::Bool(b)) => sheet.write_boolean(row, col as u16, *b),
                Some(Value::Null) | None => continue,
                Some(other) => sheet.write_string(row, col as u16, other.to_string()),
            };
            write_result.map_err(|err| EngineError::DataInvalid { reason: err.to_string() })?;
        }

        *self.sheet_rows.get_mut(sheet_name).unwrap() = row + 1;
        Ok(())
    }

    fn close(mut self: Box<Self>) -> Result<(), EngineError> {
        self.workbook.save(&self.path).map_err(|err| EngineError::DataInvalid { reason: err.to_string() })?;
        Ok(())
    }
}
