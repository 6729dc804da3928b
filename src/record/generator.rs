//! Generator half of the binary record file.

use super::{HEADER_SIZE, RECORD_PREFIX_LEN};
use crate::hashing::{pad_type_identifier, table_identifier};
use crate::registry::TableRegistry;
use byteorder::{LittleEndian, WriteBytesExt};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Spreadsheet reader boundary for workbook-driven import generation,
/// treated as opaque `sheet(name).rows()` iteration. Out of scope for
/// this crate's own implementation; callers supply a concrete reader.
pub trait WorkbookReader {
    /// Logical table names present in the workbook, one per sheet.
    fn table_names(&self) -> Vec<String>;
    /// Rows of `table_name`'s sheet, each cell already in its external
    /// (spreadsheet) column-index order.
    fn rows(&self, table_name: &str) -> Vec<Vec<String>>;
}

/// Writes a `.dat` file: reserves the header, appends framed records,
/// then patches the header and writes the footer on close.
pub struct RecordGenerator {
    path: PathBuf,
    writer: BufWriter<File>,
    type_table: Vec<String>,
    type_index: BTreeMap<String, u32>,
    total_count: u64,
}

impl RecordGenerator {
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::create(&path)?;
        file.seek(SeekFrom::Start(HEADER_SIZE))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            type_table: Vec::new(),
            type_index: BTreeMap::new(),
            total_count: 0,
        })
    }

    /// Appends one framed record. Serialization failures are isolated: the
    /// record is skipped and logged, `total_count` is left unchanged, and
    /// no error is returned to the caller.
    pub fn append_data(&mut self, remove: bool, table_name: &str, data_map: &BTreeMap<String, Value>) -> io::Result<()> {
        let json = match serde_json::to_vec(data_map) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::debug!(table = table_name, error = %err, "skipping record: json encode failed");
                return Ok(());
            }
        };

        let identifier = table_identifier(table_name);
        let type_index = match self.type_index.get(&identifier) {
            Some(&index) => index,
            None => {
                let index = self.type_table.len() as u32;
                self.type_table.push(identifier.clone());
                self.type_index.insert(identifier, index);
                index
            }
        };

        let payload_len = (RECORD_PREFIX_LEN + json.len()) as u32;
        self.writer.write_u32::<LittleEndian>(payload_len)?;
        self.writer.write_u8(remove as u8)?;
        self.writer.write_u32::<LittleEndian>(type_index)?;
        self.writer.write_all(&json)?;

        self.total_count += 1;
        Ok(())
    }

    /// Writes the footer and patches the header pointer, consuming the generator.
    pub fn close(mut self) -> io::Result<PathBuf> {
        self.writer.flush()?;
        let mut file = self.writer.into_inner().map_err(|e| e.into_error())?;
        let body_end = file.stream_position()?;

        file.write_u64::<LittleEndian>(self.total_count)?;
        file.write_u32::<LittleEndian>(self.type_table.len() as u32)?;
        for identifier in &self.type_table {
            file.write_all(&pad_type_identifier(identifier))?;
        }

        file.seek(SeekFrom::Start(0))?;
        file.write_u64::<LittleEndian>(body_end)?;
        file.flush()?;

        Ok(self.path)
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Builds a `.dat` file at `path` by reading every sheet of `reader`
    /// and decoding each row through `registry` (the workbook-path
    /// counterpart to [`RecordGenerator::append_data`]).
    pub fn append_from_workbook(path: impl AsRef<Path>, registry: &TableRegistry, reader: &dyn WorkbookReader) -> io::Result<PathBuf> {
        let mut generator = Self::create(path)?;
        for table_name in reader.table_names() {
            let table_id = table_identifier(&table_name);
            for row in reader.rows(&table_name) {
                let data_map = registry.decode_row(&table_id, &row);
                generator.append_data(false, &table_name, &data_map)?;
            }
        }
        generator.close()
    }
}
