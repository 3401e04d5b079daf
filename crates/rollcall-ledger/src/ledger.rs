//! The check-in ledger — in-memory mirror plus day-partitioned CSV files.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use rollcall_core::error::Result;
use rollcall_core::types::CheckinRecord;

use crate::csv_file;

/// File name of the full export, inside the records directory.
pub const EXPORT_FILE: &str = "checkins.csv";

/// Append-only check-in store.
///
/// The in-memory sequence only grows. Each append holds the lock across the
/// file write so the header-once rule holds under concurrent clicks.
pub struct Ledger {
    dir: PathBuf,
    records: Mutex<Vec<CheckinRecord>>,
}

impl Ledger {
    /// Open the ledger, creating the records directory if needed.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        tracing::debug!("📒 Ledger directory: {}", dir.display());
        Ok(Self {
            dir: dir.to_path_buf(),
            records: Mutex::new(Vec::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding one day's check-ins.
    pub fn day_file(&self, day: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("checkin_records_{}.csv", day.format("%Y-%m-%d")))
    }

    pub fn export_path(&self) -> PathBuf {
        self.dir.join(EXPORT_FILE)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CheckinRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a check-in: in memory first, then the record's day file.
    ///
    /// A failed file write leaves the in-memory entry in place.
    pub fn append(&self, record: CheckinRecord) -> Result<()> {
        let path = self.day_file(record.day());
        let mut records = self.lock();
        records.push(record);
        let count = records.len();
        csv_file::append_record(&path, &records[count - 1])?;
        tracing::debug!("📝 Check-in #{count} written to {}", path.display());
        Ok(())
    }

    /// Copy of every in-memory record, in arrival order.
    pub fn snapshot(&self) -> Vec<CheckinRecord> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Write every in-memory record to the export file, replacing it.
    pub fn export(&self) -> Result<PathBuf> {
        let path = self.export_path();
        let records = self.lock();
        csv_file::write_all(&path, &records)?;
        tracing::info!("📤 Exported {} check-ins to {}", records.len(), path.display());
        Ok(path)
    }
}
