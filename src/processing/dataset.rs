//! Assembly of one file's [`OutputGrid`].

use crate::processing::backfill::{backfill_phones, BackfillReport};
use crate::processing::contacts::ContactIndex;
use crate::processing::transform::{transform_record, DataQualityDefect, TransformOptions};
use crate::types::{CellValue, OutputGrid, Record};

/// A grid ready for publishing, with what happened on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltDataset {
    /// Header + rows.
    pub grid: OutputGrid,
    /// Phone backfill counts.
    pub backfill: BackfillReport,
    /// Soft defects from every row, in row order.
    pub defects: Vec<DataQualityDefect>,
    /// Rows whose field set differed from the first row's.
    pub misaligned_rows: usize,
}

/// Transform every record of one file, then backfill phones from `index`.
///
/// The header is the field list of the first transformed row. Every row is projected onto that
/// header by name; a field missing from a row becomes an empty cell and extra fields are
/// dropped. Such rows are counted in [`BuiltDataset::misaligned_rows`].
pub fn build_dataset(
    name: impl Into<String>,
    records: &[Record],
    options: &TransformOptions,
    index: &ContactIndex,
) -> BuiltDataset {
    let mut defects = Vec::new();
    let mut header: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());
    let mut misaligned_rows = 0;

    for (i, record) in records.iter().enumerate() {
        let outcome = transform_record(record, options);
        defects.extend(outcome.defects);

        if i == 0 {
            header = outcome.row.keys().map(str::to_string).collect();
        }
        let same_shape = outcome.row.len() == header.len()
            && outcome.row.keys().zip(&header).all(|(k, h)| k == h);
        if !same_shape {
            misaligned_rows += 1;
        }

        let row: Vec<CellValue> = header
            .iter()
            .map(|h| outcome.row.get(h).cloned().unwrap_or(CellValue::Empty))
            .collect();
        rows.push(row);
    }

    let backfill = backfill_phones(&header, &mut rows, index);

    BuiltDataset {
        grid: OutputGrid::new(name, header, rows),
        backfill,
        defects,
        misaligned_rows,
    }
}
