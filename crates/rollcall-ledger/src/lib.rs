//! # Rollcall Ledger
//!
//! Check-ins live in two places: an in-memory sequence for the lifetime of
//! the process, and one append-only CSV file per calendar day.
//!
//! ```text
//! checkin_records/
//!   ├── checkin_records_2024-01-01.csv   (header once, then rows)
//!   ├── checkin_records_2024-01-02.csv
//!   └── checkins.csv                     (overwritten by every export)
//! ```

pub mod csv_file;
pub mod ledger;

pub use csv_file::HEADER;
pub use ledger::{EXPORT_FILE, Ledger};
