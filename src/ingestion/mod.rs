//! Input side of the import: file enumeration, CSV record reading, and per-file outcome
//! observers.
//!
//! - [`discovery`]: lists input files in a directory by glob pattern
//! - [`csv`]: reads a CSV file into header-keyed [`crate::types::Record`]s
//! - [`observability`]: observer hooks for success/failure/alerts per file

pub mod csv;
pub mod discovery;
pub mod observability;

pub use self::csv::{read_records_from_path, read_records_from_reader};
pub use discovery::{discover_input_files, sheet_name_for, DEFAULT_INPUT_PATTERN};
pub use observability::{
    CompositeObserver, FileObserver, ImportContext, ImportObserver, ImportSeverity, ImportStats,
    TracingObserver,
};
