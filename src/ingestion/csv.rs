//! CSV record source.

use std::path::Path;

use crate::error::ImportResult;
use crate::types::Record;

/// Read every row of a CSV file into header-keyed [`Record`]s.
///
/// Rules:
///
/// - The first line is the header.
/// - Column order and row order are preserved.
/// - A repeated header name keeps its first position; the later column's value wins.
/// - Short rows are padded with empty strings; cells beyond the header are ignored.
pub fn read_records_from_path(path: impl AsRef<Path>) -> ImportResult<Vec<Record>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    read_records_from_reader(&mut rdr)
}

/// Read records from an existing CSV reader.
pub fn read_records_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
) -> ImportResult<Vec<Record>> {
    let headers = rdr.headers()?.clone();

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let mut record = Record::new();
        for (idx, name) in headers.iter().enumerate() {
            record.insert(name, row.get(idx).unwrap_or("").to_owned());
        }
        records.push(record);
    }

    Ok(records)
}
