//! Parser half of the binary record file.

use super::{DataRecord, HEADER_SIZE, RECORD_PREFIX_LEN};
use crate::error::EngineError;
use crate::hashing::unpad_type_identifier;
use crate::registry::TableRegistry;
use byteorder::{LittleEndian, ReadBytesExt};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Reads a `.dat` file written by [`super::RecordGenerator`].
pub struct RecordParser {
    reader: BufReader<File>,
    body_end: u64,
    total_count: u64,
    type_table: Vec<String>,
}

impl RecordParser {
    /// Opens `path`, reading the header pointer and footer up front.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let mut file = File::open(path)?;

        let body_end = file.read_u64::<LittleEndian>()?;

        file.seek(SeekFrom::Start(body_end))?;
        let total_count = file.read_u64::<LittleEndian>()?;
        let type_table_size = file.read_u32::<LittleEndian>()?;
        let mut type_table = Vec::with_capacity(type_table_size as usize);
        let mut buf = [0u8; crate::hashing::TYPE_IDENTIFIER_WIDTH];
        for _ in 0..type_table_size {
            file.read_exact(&mut buf)?;
            type_table.push(unpad_type_identifier(&buf));
        }

        file.seek(SeekFrom::Start(HEADER_SIZE))?;

        Ok(Self {
            reader: BufReader::new(file),
            body_end,
            total_count,
            type_table,
        })
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn type_table(&self) -> &[String] {
        &self.type_table
    }

    /// Iterates the body, decoding each frame (splitting its JSON payload
    /// into primary-key and data maps via `registry`) and invoking `apply`
    /// on it.
    ///
    /// Terminates when the file position reaches `body_end`. Fails the
    /// whole task (`DataParse`) on a short read or an out-of-range
    /// `typeIndex`. Returns `Ok(())` only if `success_count + failed_count
    /// == total_count`.
    pub fn process(&mut self, registry: &TableRegistry, mut apply: impl FnMut(&DataRecord)) -> Result<(), EngineError> {
        let mut success_count = 0u64;
        let mut failed_count = 0u64;

        loop {
            let position = self.reader.stream_position()?;
            if position >= self.body_end {
                break;
            }

            let payload_len = match self.reader.read_u32::<LittleEndian>() {
                Ok(len) => len,
                Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                    return Err(EngineError::DataParse { offset: position });
                }
                Err(err) => return Err(err.into()),
            };

            if (payload_len as usize) < RECORD_PREFIX_LEN {
                return Err(EngineError::DataParse { offset: position });
            }

            let remove_flag = self.reader.read_u8()?;
            let type_index = self.reader.read_u32::<LittleEndian>()?;
            let json_len = payload_len as usize - RECORD_PREFIX_LEN;
            let mut json_bytes = vec![0u8; json_len];
            self.reader.read_exact(&mut json_bytes)?;

            let identify_code = match self.type_table.get(type_index as usize) {
                Some(identifier) => identifier.clone(),
                None => return Err(EngineError::DataParse { offset: position }),
            };

            match serde_json::from_slice::<serde_json::Map<String, serde_json::Value>>(&json_bytes) {
                Ok(payload) => {
                    let (primary_key, data_map) = registry.split_record(&identify_code, &payload);
                    let record = DataRecord {
                        remove_operate: remove_flag != 0,
                        identify_code,
                        primary_key,
                        data_map,
                    };
                    apply(&record);
                    success_count += 1;
                }
                Err(_) => {
                    failed_count += 1;
                }
            }
        }

        if success_count + failed_count != self.total_count {
            return Err(EngineError::DataParse { offset: self.body_end });
        }
        Ok(())
    }
}
