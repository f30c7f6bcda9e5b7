#![allow(dead_code)]

use std::path::PathBuf;

use volunteer_sheets_import::ingestion::discover_input_files;
use volunteer_sheets_import::publish::GridSink;
use volunteer_sheets_import::types::{CellValue, OutputGrid};
use volunteer_sheets_import::{ImportError, ImportResult};

pub const FIXTURE_DIR: &str = "tests/fixtures/volunteers";

/// Fixture files in a fixed order.
pub fn fixture_files() -> Vec<PathBuf> {
    let mut files = discover_input_files(FIXTURE_DIR, "*.csv").unwrap();
    files.sort();
    files
}

/// Keeps every published grid in memory; can be told to reject one sheet.
#[derive(Default)]
pub struct RecordingSink {
    pub grids: Vec<OutputGrid>,
    pub reject: Option<(String, u16)>,
    pub finished: bool,
}

impl RecordingSink {
    pub fn rejecting(sheet: &str, status: u16) -> Self {
        Self {
            reject: Some((sheet.to_string(), status)),
            ..Default::default()
        }
    }

    pub fn grid(&self, name: &str) -> &OutputGrid {
        self.grids
            .iter()
            .find(|g| g.name == name)
            .unwrap_or_else(|| panic!("no grid named {name}"))
    }
}

impl GridSink for RecordingSink {
    fn publish(&mut self, grid: &OutputGrid) -> ImportResult<()> {
        if let Some((sheet, status)) = &self.reject {
            if *sheet == grid.name {
                return Err(ImportError::SheetsApi {
                    status: *status,
                    message: format!("rejected {sheet}"),
                });
            }
        }
        self.grids.push(grid.clone());
        Ok(())
    }

    fn finish(&mut self) -> ImportResult<()> {
        self.finished = true;
        Ok(())
    }
}

pub fn text(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

pub fn assert_serial(cell: &CellValue, expected: f64) {
    match cell {
        CellValue::Serial(v) => assert!((v - expected).abs() < 1e-9, "expected {expected}, got {v}"),
        other => panic!("expected serial {expected}, got {other:?}"),
    }
}
