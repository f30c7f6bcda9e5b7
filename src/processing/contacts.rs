//! Cross-file email → phone index.
//!
//! The index is built in one pass over every input file before any output is produced, then
//! frozen. [`ContactIndexBuilder`] is the only mutable form; [`ContactIndex`] is read-only.

use std::collections::HashMap;

use crate::processing::phone::strict_phone;
use crate::types::{EmailKey, NormalizedPhone, Record};

/// Raw field holding the email address.
pub const EMAIL_FIELD: &str = "email";
/// Raw field holding the phone number.
pub const PHONE_FIELD: &str = "phone";

/// Accumulates the first valid phone seen for each email.
#[derive(Debug, Default)]
pub struct ContactIndexBuilder {
    map: HashMap<EmailKey, NormalizedPhone>,
}

impl ContactIndexBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw record. Returns `true` if it added a new entry.
    ///
    /// Uses the raw `email` and `phone` fields; the phone must have exactly ten digits. An
    /// email already present is never overwritten.
    pub fn add_record(&mut self, record: &Record) -> bool {
        let Some(email) = record.get(EMAIL_FIELD).and_then(|e| EmailKey::from_raw(e)) else {
            return false;
        };
        let Some(phone) = record.get(PHONE_FIELD).and_then(|p| strict_phone(p)) else {
            return false;
        };
        if self.map.contains_key(&email) {
            return false;
        }
        self.map.insert(email, phone);
        true
    }

    /// Feed every record of one file, in row order.
    pub fn add_records<'a>(&mut self, records: impl IntoIterator<Item = &'a Record>) {
        for record in records {
            self.add_record(record);
        }
    }

    /// Freeze the index.
    pub fn finish(self) -> ContactIndex {
        ContactIndex { map: self.map }
    }
}

/// Read-only mapping from [`EmailKey`] to a single [`NormalizedPhone`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactIndex {
    map: HashMap<EmailKey, NormalizedPhone>,
}

impl ContactIndex {
    /// Build from record sets visited in file order, then row order.
    pub fn build<'a, F, R>(files: F) -> Self
    where
        F: IntoIterator<Item = R>,
        R: IntoIterator<Item = &'a Record>,
    {
        let mut builder = ContactIndexBuilder::new();
        for records in files {
            builder.add_records(records);
        }
        builder.finish()
    }

    /// Phone recorded for `email`, if any.
    pub fn get(&self, email: &EmailKey) -> Option<&NormalizedPhone> {
        self.map.get(email)
    }

    /// Phone recorded for a raw email cell, if any.
    pub fn lookup_raw(&self, raw_email: &str) -> Option<&NormalizedPhone> {
        EmailKey::from_raw(raw_email).and_then(|key| self.map.get(&key))
    }

    /// Number of contacts.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no contact has a valid phone.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
