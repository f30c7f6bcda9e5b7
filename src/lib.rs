//! `volunteer-sheets-import` publishes a directory of volunteer sign-up CSV exports as sheets of
//! one spreadsheet workbook, cleaning the data on the way.
//!
//! A run is two-phase:
//!
//! 1. Every input file is scanned once to build a [`processing::ContactIndex`]: the first valid
//!    10-digit phone number seen for each email (trimmed, lowercased).
//! 2. Each file is then transformed and published on its own:
//!    - excluded columns are dropped and the `string` marker is stripped from field names
//!    - phone fields become `DDD.DDD.DDDD` (or empty)
//!    - date fields become spreadsheet serial numbers in US/Eastern wall-clock time
//!    - rows without a valid phone get the index entry for their email
//!
//! ## Quick example: transform and backfill in memory
//!
//! ```rust
//! use volunteer_sheets_import::processing::{build_dataset, ContactIndex, TransformOptions};
//! use volunteer_sheets_import::types::{CellValue, Record};
//!
//! let record = |pairs: &[(&str, &str)]| -> Record {
//!     pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
//! };
//! let people = vec![
//!     record(&[("email", "A@X.com"), ("phone", "(555) 123-4567"), ("status", "ok")]),
//!     record(&[("email", "a@x.com"), ("phone", "bad"), ("status", "ok")]),
//! ];
//!
//! let index = ContactIndex::build([&people]);
//! let built = build_dataset("people", &people, &TransformOptions::default(), &index);
//!
//! assert_eq!(built.grid.header, vec!["email", "phone"]);
//! assert_eq!(built.grid.rows[1][1], CellValue::Text("555.123.4567".to_string()));
//! ```
//!
//! ## Running an import
//!
//! ```no_run
//! use volunteer_sheets_import::import::{run_import, ImportOptions};
//! use volunteer_sheets_import::ingestion::discover_input_files;
//! use volunteer_sheets_import::publish::CsvDirectorySink;
//!
//! # fn main() -> Result<(), volunteer_sheets_import::ImportError> {
//! let files = discover_input_files("/data/volunteers/2025", "*.csv")?;
//! let mut sink = CsvDirectorySink::new("out");
//! let summary = run_import(&files, &mut sink, &ImportOptions::default());
//! println!("published={} failed={}", summary.published.len(), summary.failed.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: file discovery, CSV records, per-file observers
//! - [`processing`]: phone/date normalization, contact index, row transform, backfill
//! - [`publish`]: grid sinks (Google Sheets, local CSV directory)
//! - [`import`]: the two-phase run
//! - [`config`]: TOML configuration
//! - [`types`]: data model
//! - [`error`]: error type

pub mod config;
pub mod error;
pub mod import;
pub mod ingestion;
pub mod logging;
pub mod processing;
pub mod publish;
pub mod types;

pub use error::{ImportError, ImportResult};
