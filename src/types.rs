//! Core data model types for the import pipeline.
//!
//! Input rows are read into [`Record`]s (ordered field name → raw string), transformed into
//! [`TransformedRow`]s (ordered field name → [`CellValue`]) and finally assembled into one
//! [`OutputGrid`] per input file.

use std::fmt;

/// An insertion-ordered map keyed by field name.
///
/// Inserting an existing key overwrites its value in place (the key keeps its position);
/// inserting a new key appends it. This mirrors how header-driven CSV rows behave when a
/// column name is repeated or when a field is renamed.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for FieldMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> FieldMap<V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Returns the value stored under `key`, if present.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Remove `key` and return its value. Later entries shift left.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Iterate keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterate `(key, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for FieldMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// One CSV row: field name → raw string value, in header order.
pub type Record = FieldMap<String>;

/// A 10-digit US phone number formatted `DDD.DDD.DDDD`.
///
/// The only way to obtain one is through the normalizers in
/// [`crate::processing::phone`], so every value satisfies the format.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedPhone(String);

impl NormalizedPhone {
    /// Format exactly ten ASCII digits. Returns `None` for any other input.
    pub(crate) fn from_ten_digits(digits: &str) -> Option<Self> {
        if digits.len() != 10 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self(format!(
            "{}.{}.{}",
            &digits[0..3],
            &digits[3..6],
            &digits[6..10]
        )))
    }

    /// The formatted number.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical email used to join contacts across files: trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmailKey(String);

impl EmailKey {
    /// Canonicalize a raw email cell. Returns `None` when nothing remains after trimming.
    pub fn from_raw(raw: &str) -> Option<Self> {
        let key = raw.trim().to_lowercase();
        if key.is_empty() { None } else { Some(Self(key)) }
    }

    /// The canonical key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single output cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Absent value (written as an empty cell).
    Empty,
    /// Plain or normalized text.
    Text(String),
    /// Spreadsheet serial date: days since 1899-12-30, fraction = time of day.
    Serial(f64),
}

impl CellValue {
    /// Text content, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<NormalizedPhone> for CellValue {
    fn from(phone: NormalizedPhone) -> Self {
        CellValue::Text(phone.0)
    }
}

impl From<Option<NormalizedPhone>> for CellValue {
    fn from(phone: Option<NormalizedPhone>) -> Self {
        phone.map(CellValue::from).unwrap_or(CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Serial(v) => write!(f, "{v}"),
        }
    }
}

/// A row after column filtering, renaming and value conversion.
pub type TransformedRow = FieldMap<CellValue>;

/// Header plus data rows for one input file, destined for one worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputGrid {
    /// Destination worksheet name (the input file's base name).
    pub name: String,
    /// Cleaned field names.
    pub header: Vec<String>,
    /// Row-major cells, each row aligned with `header`.
    pub rows: Vec<Vec<CellValue>>,
}

impl OutputGrid {
    /// Create a grid.
    pub fn new(name: impl Into<String>, header: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            header,
            rows,
        }
    }

    /// Number of data rows (the header is not counted).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Returns `true` if the grid has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Index of the first header containing `needle`, compared case-insensitively.
pub fn find_column(header: &[String], needle: &str) -> Option<usize> {
    let needle = needle.to_lowercase();
    header.iter().position(|h| h.to_lowercase().contains(&needle))
}
