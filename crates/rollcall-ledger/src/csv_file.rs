//! CSV writers for day files and exports.

use std::fs::OpenOptions;
use std::path::Path;

use rollcall_core::error::{Result, RollcallError};
use rollcall_core::types::CheckinRecord;

/// Column labels: user, check-in time, period.
pub const HEADER: [&str; 3] = ["使用者", "簽到時間", "時段"];

fn csv_err(path: &Path, e: csv::Error) -> RollcallError {
    RollcallError::Ledger(format!("CSV write to {} failed: {e}", path.display()))
}

/// Append one record, writing the header first if the file is new or empty.
pub fn append_record(path: &Path, record: &CheckinRecord) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let needs_header = file.metadata()?.len() == 0;

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if needs_header {
        wtr.write_record(HEADER).map_err(|e| csv_err(path, e))?;
    }
    wtr.write_record(record.to_row())
        .map_err(|e| csv_err(path, e))?;
    wtr.flush()?;
    Ok(())
}

/// Overwrite `path` with the header and every record.
pub fn write_all(path: &Path, records: &[CheckinRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| csv_err(path, e))?;

    wtr.write_record(HEADER).map_err(|e| csv_err(path, e))?;
    for record in records {
        wtr.write_record(record.to_row())
            .map_err(|e| csv_err(path, e))?;
    }

    wtr.flush()?;
    Ok(())
}
