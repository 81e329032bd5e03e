/*!
 * In-memory collection of translation records for one parent.
 */

use crate::database::Record;
use crate::locales::LocaleKey;

/// Translation records of one parent, at most one per locale
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationSet {
    table: String,
    locale_key: String,
    records: Vec<Record>,
}

impl TranslationSet {
    /// Create an empty set
    pub fn new(table: impl Into<String>, locale_key: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            locale_key: locale_key.into(),
            records: Vec::new(),
        }
    }

    /// Create a set from loaded records
    pub fn from_records(
        table: impl Into<String>,
        locale_key: impl Into<String>,
        records: Vec<Record>,
    ) -> Self {
        Self {
            table: table.into(),
            locale_key: locale_key.into(),
            records,
        }
    }

    /// The translation table
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Name of the locale column
    pub fn locale_key(&self) -> &str {
        &self.locale_key
    }

    /// Locale of `record`
    pub fn locale_of(&self, record: &Record) -> Option<LocaleKey> {
        record.get(&self.locale_key).and_then(LocaleKey::from_value)
    }

    /// Index of the record for `locale`
    pub fn position(&self, locale: &LocaleKey) -> Option<usize> {
        self.records
            .iter()
            .position(|r| self.locale_of(r).as_ref() == Some(locale))
    }

    /// The record for `locale`
    pub fn find(&self, locale: &LocaleKey) -> Option<&Record> {
        self.position(locale).map(|i| &self.records[i])
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Record> {
        self.records.get_mut(index)
    }

    /// Append a fresh record for `locale`, even when one already exists
    pub fn create(&mut self, locale: &LocaleKey) -> &mut Record {
        let mut record = Record::new(self.table.clone());
        record.set(self.locale_key.clone(), locale.to_value());
        self.records.push(record);
        let last = self.records.len() - 1;
        &mut self.records[last]
    }

    /// The record for `locale`, created when missing
    pub fn get_or_create(&mut self, locale: &LocaleKey) -> &mut Record {
        match self.position(locale) {
            Some(index) => &mut self.records[index],
            None => self.create(locale),
        }
    }

    /// Add a record as is
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Whether `record` has modified attributes other than its locale
    pub fn is_dirty(&self, record: &Record) -> bool {
        record.dirty_keys().iter().any(|k| *k != self.locale_key)
    }

    /// Whether any record needs saving
    pub fn has_dirty(&self) -> bool {
        self.records.iter().any(|r| self.is_dirty(r))
    }

    /// Locales present in the set, in order
    pub fn locales(&self) -> Vec<LocaleKey> {
        self.records.iter().filter_map(|r| self.locale_of(r)).collect()
    }

    /// Drop every record whose locale is in `locales`, returning how many went
    pub fn remove_locales(&mut self, locales: &[LocaleKey]) -> usize {
        let before = self.records.len();
        let locale_key = self.locale_key.clone();
        self.records.retain(|r| {
            let locale = r.get(&locale_key).and_then(LocaleKey::from_value);
            !locale.is_some_and(|l| locales.contains(&l))
        });
        before - self.records.len()
    }

    /// Drop every record
    pub fn clear(&mut self) -> usize {
        let count = self.records.len();
        self.records.clear();
        count
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Record> {
        self.records.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
