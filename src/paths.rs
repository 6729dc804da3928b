//! File-path conventions for import/export task artifacts.
//!
//! Resolve a base directory, ensure it exists, then join a file name onto it.

use std::path::{Path, PathBuf};

/// Extension used for export workbooks depending on compatibility mode.
pub fn export_extension(compatibility_mode: bool) -> &'static str {
    if compatibility_mode {
        ".xls"
    } else {
        ".xlsx"
    }
}

/// Ensures `base_path` exists, creating it (and parents) if necessary.
pub fn ensure_base_path(base_path: &Path) -> std::io::Result<()> {
    if !base_path.exists() {
        std::fs::create_dir_all(base_path)?;
    }
    Ok(())
}

/// `basePath/<hex(taskCode)>.dat`
pub fn import_data_path(base_path: &Path, task_code: u64) -> PathBuf {
    base_path.join(format!("{:016x}.dat", task_code))
}

/// `basePath/<hex(taskCode)><ext>`
pub fn export_output_path(base_path: &Path, task_code: u64, compatibility_mode: bool) -> PathBuf {
    base_path.join(format!("{:016x}{}", task_code, export_extension(compatibility_mode)))
}
