/*!
 * In-memory repository.
 *
 * Keeps rows in process memory and records every save attempt, which makes
 * it the repository of choice for tests and for callers that materialize
 * their data elsewhere:
 * - `fail_saves_on(table)` - every save into `table` is rejected
 * - `fail_saves_after(n)` - the first `n` saves succeed, the rest are rejected
 * - `save_log()` - every attempted save in order
 */

use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::models::{Record, DEFAULT_PRIMARY_KEY};
use super::repository::Repository;
use crate::errors::RepositoryError;

/// One attempted save
#[derive(Debug, Clone, PartialEq)]
pub struct SaveAttempt {
    /// Target table
    pub table: String,
    /// Key after the save, if any
    pub key: Option<Value>,
    /// Whether the save was accepted
    pub accepted: bool,
}

#[derive(Debug, Default)]
struct MemoryState {
    tables: BTreeMap<String, Vec<Map<String, Value>>>,
    next_ids: BTreeMap<String, i64>,
    failing_tables: BTreeSet<String>,
    remaining_saves: Option<usize>,
    save_log: Vec<SaveAttempt>,
}

impl MemoryState {
    fn next_id(&mut self, table: &str) -> i64 {
        let next = self.next_ids.entry(table.to_string()).or_insert(1);
        let id = *next;
        *next += 1;
        id
    }

    fn rejects(&mut self, table: &str) -> bool {
        if self.failing_tables.contains(table) {
            return true;
        }
        match self.remaining_saves.as_mut() {
            Some(0) => true,
            Some(remaining) => {
                *remaining -= 1;
                false
            }
            None => false,
        }
    }
}

/// Values match when equal, or when they print to the same key
/// (`1` and `"1"`), mirroring the loose comparisons of SQL storage.
fn values_match(left: &Value, right: &Value) -> bool {
    if left == right {
        return true;
    }
    match (left, right) {
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            n.to_string() == *s
        }
        _ => false,
    }
}

/// Repository backed by process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row directly, bypassing the save log.
    ///
    /// Assigns an `id` when the row has none and returns the row's key.
    pub fn insert_row(&self, table: &str, mut row: Map<String, Value>) -> Value {
        let mut state = self.state.lock();
        let key = match row.get(DEFAULT_PRIMARY_KEY).filter(|v| !v.is_null()) {
            Some(key) => {
                if let Some(id) = key.as_i64() {
                    let next = state.next_ids.entry(table.to_string()).or_insert(1);
                    *next = (*next).max(id + 1);
                }
                key.clone()
            }
            None => {
                let key = Value::Number(state.next_id(table).into());
                row.insert(DEFAULT_PRIMARY_KEY.to_string(), key.clone());
                key
            }
        };
        state.tables.entry(table.to_string()).or_default().push(row);
        key
    }

    /// Snapshot of every row in `table`
    pub fn rows(&self, table: &str) -> Vec<Map<String, Value>> {
        self.state.lock().tables.get(table).cloned().unwrap_or_default()
    }

    /// Reject every save into `table`
    pub fn fail_saves_on(&self, table: &str) {
        self.state.lock().failing_tables.insert(table.to_string());
    }

    /// Accept the next `count` saves and reject the rest
    pub fn fail_saves_after(&self, count: usize) {
        self.state.lock().remaining_saves = Some(count);
    }

    /// Accept saves again
    pub fn reset_failures(&self) {
        let mut state = self.state.lock();
        state.failing_tables.clear();
        state.remaining_saves = None;
    }

    /// Every attempted save, in order
    pub fn save_log(&self) -> Vec<SaveAttempt> {
        self.state.lock().save_log.clone()
    }
}

impl Repository for MemoryRepository {
    fn find_where(
        &self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Result<Option<Record>, RepositoryError> {
        let state = self.state.lock();
        Ok(state
            .tables
            .get(table)
            .and_then(|rows| {
                rows.iter()
                    .find(|row| row.get(column).is_some_and(|v| values_match(v, value)))
            })
            .map(|row| Record::from_row(table, row.clone())))
    }

    fn save(&self, record: &mut Record) -> Result<bool, RepositoryError> {
        let mut state = self.state.lock();
        let table = record.table().to_string();

        if state.rejects(&table) {
            state.save_log.push(SaveAttempt {
                table,
                key: record.key().cloned(),
                accepted: false,
            });
            return Ok(false);
        }

        let primary_key = record.primary_key_name().to_string();
        if record.exists() {
            let dirty = record.dirty();
            let row = record.key().and_then(|key| {
                state.tables.get_mut(&table).and_then(|rows| {
                    rows.iter_mut().find(|row| {
                        row.get(&primary_key).is_some_and(|v| values_match(v, key))
                    })
                })
            });
            // No key or no stored row: nothing to update
            let Some(row) = row else {
                state.save_log.push(SaveAttempt {
                    table,
                    key: record.key().cloned(),
                    accepted: false,
                });
                return Ok(false);
            };
            for (column, value) in dirty {
                row.insert(column, value);
            }
        } else {
            if record.key().is_none() {
                let id = state.next_id(&table);
                record.set_key(Value::Number(id.into()));
            }
            let row = record.attributes().clone();
            state.tables.entry(table.clone()).or_default().push(row);
        }

        record.sync_original();
        state.save_log.push(SaveAttempt {
            table,
            key: record.key().cloned(),
            accepted: true,
        });
        Ok(true)
    }

    fn query_related(
        &self,
        parent_key: &Value,
        child_table: &str,
        foreign_key: &str,
    ) -> Result<Vec<Record>, RepositoryError> {
        let state = self.state.lock();
        Ok(state
            .tables
            .get(child_table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row.get(foreign_key).is_some_and(|v| values_match(v, parent_key)))
                    .map(|row| Record::from_row(child_table, row.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn delete_related(
        &self,
        parent_key: &Value,
        child_table: &str,
        foreign_key: &str,
        filter: Option<(&str, &[Value])>,
    ) -> Result<usize, RepositoryError> {
        let mut state = self.state.lock();
        let Some(rows) = state.tables.get_mut(child_table) else {
            return Ok(0);
        };

        let before = rows.len();
        rows.retain(|row| {
            let belongs = row.get(foreign_key).is_some_and(|v| values_match(v, parent_key));
            let selected = match filter {
                Some((column, values)) => row
                    .get(column)
                    .is_some_and(|v| values.iter().any(|wanted| values_match(v, wanted))),
                None => true,
            };
            !(belongs && selected)
        });
        Ok(before - rows.len())
    }
}
