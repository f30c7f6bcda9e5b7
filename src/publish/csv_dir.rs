use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ImportResult;
use crate::types::OutputGrid;

use super::GridSink;

/// Writes each grid to `<dir>/<name>.csv`, overwriting any previous file.
///
/// Serial dates are written as plain numbers and empty cells as empty fields.
#[derive(Debug, Clone)]
pub struct CsvDirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl CsvDirectorySink {
    /// Create a sink rooted at `dir`. The directory is created on first publish.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            written: Vec::new(),
        }
    }

    /// Files written so far, in publish order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl GridSink for CsvDirectorySink {
    fn publish(&mut self, grid: &OutputGrid) -> ImportResult<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}.csv", grid.name));

        let mut wtr = csv::Writer::from_path(&path)?;
        if grid.header.is_empty() {
            wtr.flush()?;
            self.written.push(path);
            return Ok(());
        }
        wtr.write_record(&grid.header)?;
        for row in &grid.rows {
            wtr.write_record(row.iter().map(|cell| cell.to_string()))?;
        }
        wtr.flush()?;

        tracing::debug!(path = %path.display(), rows = grid.row_count(), "wrote grid");
        self.written.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;

    #[test]
    fn writes_header_and_rows_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvDirectorySink::new(dir.path().join("out"));
        let grid = OutputGrid::new(
            "people",
            vec!["email".into(), "phone".into(), "signupdate".into()],
            vec![vec![
                CellValue::Text("a@x.com".into()),
                CellValue::Empty,
                CellValue::Serial(45726.4375),
            ]],
        );

        sink.publish(&grid).unwrap();
        sink.publish(&grid).unwrap();

        let text = fs::read_to_string(dir.path().join("out/people.csv")).unwrap();
        assert_eq!(text, "email,phone,signupdate\na@x.com,,45726.4375\n");
        assert_eq!(sink.written().len(), 2);
    }

    #[test]
    fn empty_grid_truncates_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvDirectorySink::new(dir.path());
        let full = OutputGrid::new("empty", vec!["email".into()], vec![vec![CellValue::Text("a@x.com".into())]]);
        sink.publish(&full).unwrap();

        sink.publish(&OutputGrid::new("empty", Vec::new(), Vec::new())).unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("empty.csv")).unwrap(), "");
    }
}
