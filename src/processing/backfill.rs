//! Repair of the phone column from the cross-file contact index.

use crate::processing::contacts::ContactIndex;
use crate::processing::phone::normalize_phone;
use crate::types::{find_column, CellValue};

/// Counts from one [`backfill_phones`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BackfillReport {
    /// Rows whose phone cell was filled from the index.
    pub filled: usize,
    /// Rows left without a phone (no valid value and no index entry).
    pub missing: usize,
}

/// Repair the phone column of `rows` in place.
///
/// The phone column is the first header containing `phone` and the email column the first
/// containing `email` (both case-insensitive). If either is missing nothing is changed. A row
/// whose phone cell already normalizes is left as is; any other row gets the index entry for
/// its email, or an empty cell.
pub fn backfill_phones(
    header: &[String],
    rows: &mut [Vec<CellValue>],
    index: &ContactIndex,
) -> BackfillReport {
    let mut report = BackfillReport::default();
    let (Some(phone_idx), Some(email_idx)) = (find_column(header, "phone"), find_column(header, "email"))
    else {
        return report;
    };

    for row in rows.iter_mut() {
        let own = row
            .get(phone_idx)
            .and_then(CellValue::as_text)
            .and_then(normalize_phone);
        if let Some(phone) = own {
            if let Some(cell) = row.get_mut(phone_idx) {
                *cell = CellValue::from(phone);
            }
            continue;
        }

        let found = row
            .get(email_idx)
            .and_then(CellValue::as_text)
            .and_then(|email| index.lookup_raw(email))
            .cloned();
        match found {
            Some(_) => report.filled += 1,
            None => report.missing += 1,
        }
        if let Some(cell) = row.get_mut(phone_idx) {
            *cell = CellValue::from(found);
        }
    }

    report
}
