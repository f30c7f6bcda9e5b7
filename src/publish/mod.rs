//! Destinations for finished grids.
//!
//! - [`sheets`]: a Google Sheets workbook over the REST API
//! - [`csv_dir`]: one CSV file per grid in a local directory (dry runs)

pub mod csv_dir;
pub mod sheets;

use crate::error::ImportResult;
use crate::types::OutputGrid;

pub use csv_dir::CsvDirectorySink;
pub use sheets::{SheetProperties, SheetsClient, Workbook};

/// Stores one grid per destination, replacing whatever the destination held before.
pub trait GridSink {
    /// Write `grid` to the destination named [`OutputGrid::name`], clearing it first.
    fn publish(&mut self, grid: &OutputGrid) -> ImportResult<()>;

    /// Called once after every file has been attempted.
    fn finish(&mut self) -> ImportResult<()> {
        Ok(())
    }
}
