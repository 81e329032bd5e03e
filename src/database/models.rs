/*!
 * Record model with dirty tracking.
 *
 * A `Record` is one row of any table: parent entities, translation rows and
 * language rows all share it. It remembers the attribute values it was
 * loaded with so that unsaved modifications can be detected.
 */

use serde_json::{Map, Value};

/// Default primary key column
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// A row with its original values
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Table the row lives in
    table: String,
    /// Primary key column name
    primary_key: String,
    /// Current attribute values
    attributes: Map<String, Value>,
    /// Values as last loaded or saved
    original: Map<String, Value>,
    /// Whether the row exists in storage
    exists: bool,
}

impl Record {
    /// Create a new, unsaved record
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            primary_key: DEFAULT_PRIMARY_KEY.to_string(),
            attributes: Map::new(),
            original: Map::new(),
            exists: false,
        }
    }

    /// Create a record for a row loaded from storage
    pub fn from_row(table: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self {
            table: table.into(),
            primary_key: DEFAULT_PRIMARY_KEY.to_string(),
            original: attributes.clone(),
            attributes,
            exists: true,
        }
    }

    /// Use a different primary key column
    pub fn with_primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = column.into();
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn primary_key_name(&self) -> &str {
        &self.primary_key
    }

    /// The primary key value, if set and not null
    pub fn key(&self) -> Option<&Value> {
        self.attributes.get(&self.primary_key).filter(|v| !v.is_null())
    }

    /// Whether the row exists in storage
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Read an attribute
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Write an attribute
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.attributes.insert(key.into(), value);
    }

    /// Write every entry of `values`
    pub fn fill(&mut self, values: Map<String, Value>) {
        for (key, value) in values {
            self.set(key, value);
        }
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Attributes whose value differs from the original
    pub fn dirty(&self) -> Map<String, Value> {
        self.attributes
            .iter()
            .filter(|(key, value)| self.original.get(*key) != Some(*value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Names of the modified attributes
    pub fn dirty_keys(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|(key, value)| self.original.get(*key) != Some(*value))
            .map(|(key, _)| key.as_str())
            .collect()
    }

    /// Whether any attribute was modified
    pub fn is_dirty(&self) -> bool {
        self.attributes
            .iter()
            .any(|(key, value)| self.original.get(key) != Some(value))
    }

    /// Whether `key` was modified
    pub fn is_attribute_dirty(&self, key: &str) -> bool {
        match self.attributes.get(key) {
            Some(value) => self.original.get(key) != Some(value),
            None => false,
        }
    }

    /// Mark the record as persisted with its current values
    pub fn sync_original(&mut self) {
        self.original = self.attributes.clone();
        self.exists = true;
    }

    /// Record the key assigned by storage after an insert
    pub fn set_key(&mut self, key: Value) {
        let column = self.primary_key.clone();
        self.attributes.insert(column, key);
    }

    /// Copy of the record as a new, unsaved row without its primary key and
    /// the attributes named in `except`
    pub fn replicate(&self, except: &[&str]) -> Record {
        let attributes = self
            .attributes
            .iter()
            .filter(|(key, _)| **key != self.primary_key && !except.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Record {
            table: self.table.clone(),
            primary_key: self.primary_key.clone(),
            attributes,
            original: Map::new(),
            exists: false,
        }
    }
}
