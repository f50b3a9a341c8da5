//! Whole-file ledger persistence with atomic rewrite
//!
//! The ledger file is read once at startup and rewritten wholesale after a
//! mutating command. The rewrite goes to a temp file in the same directory
//! which then atomically replaces the old file, so the ledger on disk is
//! always either the previous or the new version, never a partial write.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{LedgerError, LedgerResult};
use crate::store::TransactionStore;

/// Load a ledger file into a store; a missing file is an empty ledger
pub fn load_ledger<P: AsRef<Path>>(path: P) -> LedgerResult<TransactionStore> {
    let path = path.as_ref();

    if !path.exists() {
        return Ok(TransactionStore::new());
    }

    let file = File::open(path)
        .map_err(|e| LedgerError::Io(format!("failed to open {}: {}", path.display(), e)))?;
    TransactionStore::from_reader(BufReader::new(file))
}

/// Write a store to a ledger file atomically (write to temp, then rename)
pub fn save_ledger<P: AsRef<Path>>(path: P, store: &TransactionStore) -> LedgerResult<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                LedgerError::Io(format!(
                    "failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    // Temp file in the same directory, required for an atomic rename
    let temp_path = path.with_extension("tmp");

    let file = File::create(&temp_path)
        .map_err(|e| LedgerError::Io(format!("failed to create temp file: {e}")))?;
    let mut writer = BufWriter::new(file);
    store.write_to(&mut writer)?;
    writer
        .flush()
        .map_err(|e| LedgerError::Io(format!("failed to flush ledger: {e}")))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| LedgerError::Io(format!("failed to sync ledger: {e}")))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        LedgerError::Io(format!("failed to rename temp file: {e}"))
    })?;

    Ok(())
}
