//! Per-record transformation: column exclusion, field renaming, phone normalization and
//! date-to-serial conversion.

use std::collections::BTreeSet;

use chrono_tz::Tz;

use crate::processing::dates::{self, DEFAULT_TIMEZONE};
use crate::processing::phone::normalize_phone;
use crate::types::{CellValue, Record, TransformedRow};

/// Columns dropped from every export.
pub const DEFAULT_EXCLUDED_COLUMNS: &[&str] = &[
    "amountpaid",
    "slotitemid",
    "hastime",
    "status",
    "starttime",
    "startdate",
    "phonetype",
    "offset",
    "endtime",
    "itemmemberid",
    "signupid",
    "signedupdate",
    "enddate",
    "waitlist",
];

/// Substring removed from field names.
pub const DEFAULT_STRIP_MARKER: &str = "string";

/// Settings for [`transform_record`].
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOptions {
    /// Exact, case-sensitive field names to drop.
    pub excluded_columns: BTreeSet<String>,
    /// Substring stripped from field names.
    pub strip_marker: String,
    /// Wall-clock zone for serial dates.
    pub timezone: Tz,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            excluded_columns: DEFAULT_EXCLUDED_COLUMNS.iter().map(|s| s.to_string()).collect(),
            strip_marker: DEFAULT_STRIP_MARKER.to_string(),
            timezone: DEFAULT_TIMEZONE,
        }
    }
}

impl TransformOptions {
    fn is_excluded(&self, name: &str) -> bool {
        self.excluded_columns.contains(name)
    }
}

/// Outcome of converting one date cell.
#[derive(Debug, Clone, PartialEq)]
pub enum DateConversion {
    /// Parsed and converted to a spreadsheet serial.
    Converted(f64),
    /// Could not be parsed; the original text is kept.
    Passthrough(String),
}

impl DateConversion {
    /// Convert `raw` using `tz` for the wall clock.
    pub fn of(raw: &str, tz: Tz) -> Self {
        match dates::parse_to_serial(raw, tz) {
            Some(serial) => DateConversion::Converted(serial),
            None => DateConversion::Passthrough(raw.to_string()),
        }
    }

    /// The cell to emit.
    pub fn into_cell(self) -> CellValue {
        match self {
            DateConversion::Converted(serial) => CellValue::Serial(serial),
            DateConversion::Passthrough(raw) => CellValue::Text(raw),
        }
    }
}

/// A soft data-quality problem found while transforming a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataQualityDefect {
    /// A date field kept its raw text because it could not be parsed.
    UnparseableDate { field: String, raw: String },
    /// A non-empty phone field did not reduce to ten digits and was cleared.
    InvalidPhone { field: String, raw: String },
}

/// A transformed row plus the defects found while producing it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransformOutcome {
    /// The transformed row.
    pub row: TransformedRow,
    /// Soft defects, in field order.
    pub defects: Vec<DataQualityDefect>,
}

/// Clean a field name: remove every `marker`, collapse `__` to `_`, trim underscores.
pub fn clean_field_name(name: &str, marker: &str) -> String {
    name.replace(marker, "")
        .replace("__", "_")
        .trim_matches('_')
        .to_string()
}

/// Transform one raw record.
///
/// Steps, in order:
///
/// 1. Drop excluded fields.
/// 2. Rename fields containing the marker. A renamed field moves to the end of the row unless
///    its cleaned name already exists, in which case that field's value is overwritten.
///    Renamed fields landing on an excluded name are dropped as well.
/// 3. Normalize every field whose name contains `phone` (case-insensitive).
/// 4. Convert every non-empty field whose name contains `date` (case-insensitive) to a
///    serial; unparseable values pass through unchanged and are reported as defects.
pub fn transform_record(record: &Record, options: &TransformOptions) -> TransformOutcome {
    let mut fields: Record = record
        .iter()
        .filter(|(name, _)| !options.is_excluded(name))
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();

    if !options.strip_marker.is_empty() {
        let marked: Vec<String> = fields
            .keys()
            .filter(|k| k.contains(options.strip_marker.as_str()))
            .map(str::to_string)
            .collect();
        for key in marked {
            let Some(value) = fields.remove(&key) else {
                continue;
            };
            let cleaned = clean_field_name(&key, &options.strip_marker);
            if options.is_excluded(&cleaned) {
                continue;
            }
            fields.insert(cleaned, value);
        }
    }

    let mut outcome = TransformOutcome::default();
    for (name, raw) in fields.iter() {
        let lower = name.to_lowercase();
        let mut cell = CellValue::Text(raw.clone());

        if lower.contains("phone") {
            let phone = normalize_phone(raw);
            if phone.is_none() && !raw.trim().is_empty() {
                outcome.defects.push(DataQualityDefect::InvalidPhone {
                    field: name.to_string(),
                    raw: raw.clone(),
                });
            }
            cell = CellValue::from(phone);
        }

        if lower.contains("date") {
            if let Some(text) = cell.as_text().filter(|t| !t.is_empty()) {
                let conversion = DateConversion::of(text, options.timezone);
                if let DateConversion::Passthrough(raw) = &conversion {
                    outcome.defects.push(DataQualityDefect::UnparseableDate {
                        field: name.to_string(),
                        raw: raw.clone(),
                    });
                }
                cell = conversion.into_cell();
            }
        }

        outcome.row.insert(name, cell);
    }

    outcome
}
