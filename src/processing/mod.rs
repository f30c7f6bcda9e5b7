//! Data normalization and cross-file reconciliation.
//!
//! The pipeline for a run is strictly two-phase:
//!
//! 1. Build a [`ContactIndex`] from every input file (first valid phone per email wins).
//! 2. For each file, transform its records ([`transform_record`]), assemble a grid and repair the
//!    phone column from the frozen index ([`build_dataset`] / [`backfill_phones`]).
//!
//! ## Example
//!
//! ```rust
//! use volunteer_sheets_import::processing::{build_dataset, ContactIndex, TransformOptions};
//! use volunteer_sheets_import::types::{CellValue, Record};
//!
//! let rows: Vec<Record> = vec![
//!     [("email", "A@X.com"), ("phone", "(555) 123-4567")]
//!         .into_iter()
//!         .map(|(k, v)| (k, v.to_string()))
//!         .collect(),
//!     [("email", "a@x.com"), ("phone", "bad")]
//!         .into_iter()
//!         .map(|(k, v)| (k, v.to_string()))
//!         .collect(),
//! ];
//!
//! let index = ContactIndex::build([&rows]);
//! let built = build_dataset("people", &rows, &TransformOptions::default(), &index);
//! assert_eq!(built.grid.rows[1][1], CellValue::Text("555.123.4567".to_string()));
//! ```

pub mod backfill;
pub mod contacts;
pub mod dataset;
pub mod dates;
pub mod phone;
pub mod transform;

pub use backfill::{backfill_phones, BackfillReport};
pub use contacts::{ContactIndex, ContactIndexBuilder};
pub use dataset::{build_dataset, BuiltDataset};
pub use phone::{normalize_phone, strict_phone};
pub use transform::{
    clean_field_name, transform_record, DataQualityDefect, DateConversion, TransformOptions,
    TransformOutcome, DEFAULT_EXCLUDED_COLUMNS, DEFAULT_STRIP_MARKER,
};
