/*!
 * Repository layer for database operations.
 *
 * The translatable layer only talks to storage through the `Repository`
 * trait. `SqliteRepository` implements it over any SQLite schema whose table
 * and column names are plain identifiers; the tables themselves are managed
 * by the application.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection};
use serde_json::{Map, Number, Value};
use std::path::Path;

use super::connection::DatabaseConnection;
use super::models::Record;
use crate::errors::RepositoryError;

/// Storage capability consumed by the translatable layer
pub trait Repository {
    /// First row of `table` whose `column` equals `value`
    fn find_where(
        &self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Result<Option<Record>, RepositoryError>;

    /// Insert or update `record`.
    ///
    /// Returns `Ok(false)` when storage rejected the write without an I/O
    /// error. On success the record is marked as persisted and, for inserts,
    /// carries the key assigned by storage.
    fn save(&self, record: &mut Record) -> Result<bool, RepositoryError>;

    /// All rows of `child_table` whose `foreign_key` equals `parent_key`
    fn query_related(
        &self,
        parent_key: &Value,
        child_table: &str,
        foreign_key: &str,
    ) -> Result<Vec<Record>, RepositoryError>;

    /// Delete rows of `child_table` belonging to `parent_key`, optionally
    /// restricted to rows whose `filter.0` column is one of `filter.1`.
    /// Returns the number of deleted rows.
    fn delete_related(
        &self,
        parent_key: &Value,
        child_table: &str,
        foreign_key: &str,
        filter: Option<(&str, &[Value])>,
    ) -> Result<usize, RepositoryError>;
}

impl<R: Repository + ?Sized> Repository for &R {
    fn find_where(
        &self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Result<Option<Record>, RepositoryError> {
        (**self).find_where(table, column, value)
    }

    fn save(&self, record: &mut Record) -> Result<bool, RepositoryError> {
        (**self).save(record)
    }

    fn query_related(
        &self,
        parent_key: &Value,
        child_table: &str,
        foreign_key: &str,
    ) -> Result<Vec<Record>, RepositoryError> {
        (**self).query_related(parent_key, child_table, foreign_key)
    }

    fn delete_related(
        &self,
        parent_key: &Value,
        child_table: &str,
        foreign_key: &str,
        filter: Option<(&str, &[Value])>,
    ) -> Result<usize, RepositoryError> {
        (**self).delete_related(parent_key, child_table, foreign_key, filter)
    }
}

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier pattern"));

/// Quote a table or column name, rejecting anything but plain identifiers
fn quote_identifier(name: &str) -> Result<String, RepositoryError> {
    if IDENTIFIER.is_match(name) {
        Ok(format!("\"{}\"", name))
    } else {
        Err(RepositoryError::InvalidIdentifier(name.to_string()))
    }
}

/// Convert an attribute value into an SQLite value
fn to_sql(column: &str, value: &Value) -> Result<SqlValue, RepositoryError> {
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                SqlValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                SqlValue::Real(f)
            } else {
                return Err(RepositoryError::UnsupportedValue {
                    column: column.to_string(),
                    message: format!("number {} does not fit in 64 bits", n),
                });
            }
        }
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
    })
}

/// Convert an SQLite column value into an attribute value
fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn read_rows(
    conn: &Connection,
    sql: &str,
    params: &[SqlValue],
) -> Result<Vec<Map<String, Value>>, RepositoryError> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        let mut attributes = Map::new();
        for (index, name) in columns.iter().enumerate() {
            attributes.insert(name.clone(), from_sql(row.get_ref(index)?));
        }
        result.push(attributes);
    }

    Ok(result)
}

/// SQLite implementation of `Repository`
#[derive(Clone)]
pub struct SqliteRepository {
    /// Database connection
    db: DatabaseConnection,
}

impl SqliteRepository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Open a repository on the database file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        Ok(Self::new(DatabaseConnection::new(path)?))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self, RepositoryError> {
        Ok(Self::new(DatabaseConnection::new_in_memory()?))
    }

    /// The underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    fn insert(&self, record: &mut Record) -> Result<bool, RepositoryError> {
        let table = quote_identifier(record.table())?;
        let primary_key = record.primary_key_name().to_string();

        let mut columns = Vec::new();
        let mut params = Vec::new();
        for (column, value) in record.attributes() {
            // Let storage assign the key
            if *column == primary_key && value.is_null() {
                continue;
            }
            columns.push(quote_identifier(column)?);
            params.push(to_sql(column, value)?);
        }

        let sql = if columns.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", table)
        } else {
            let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table,
                columns.join(", "),
                placeholders.join(", ")
            )
        };
        debug!("{}", sql);

        let row_id = self.db.transaction(|tx| {
            tx.execute(&sql, params_from_iter(params.iter()))?;
            Ok(tx.last_insert_rowid())
        })?;

        if record.key().is_none() {
            record.set_key(Value::Number(row_id.into()));
        }
        Ok(true)
    }

    fn update(&self, record: &mut Record) -> Result<bool, RepositoryError> {
        let dirty = record.dirty();
        if dirty.is_empty() {
            return Ok(true);
        }

        let primary_key = record.primary_key_name().to_string();
        let key = record
            .key()
            .cloned()
            .ok_or_else(|| RepositoryError::UnsupportedValue {
                column: primary_key.clone(),
                message: "existing record has no primary key".to_string(),
            })?;

        let mut assignments = Vec::new();
        let mut params = Vec::new();
        for (index, (column, value)) in dirty.iter().enumerate() {
            assignments.push(format!("{} = ?{}", quote_identifier(column)?, index + 1));
            params.push(to_sql(column, value)?);
        }
        params.push(to_sql(&primary_key, &key)?);

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?{}",
            quote_identifier(record.table())?,
            assignments.join(", "),
            quote_identifier(&primary_key)?,
            params.len()
        );
        debug!("{}", sql);

        let affected = self
            .db
            .execute(|conn| Ok(conn.execute(&sql, params_from_iter(params.iter()))?))?;
        Ok(affected > 0)
    }
}

impl Repository for SqliteRepository {
    fn find_where(
        &self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Result<Option<Record>, RepositoryError> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?1 LIMIT 1",
            quote_identifier(table)?,
            quote_identifier(column)?
        );
        let params = [to_sql(column, value)?];
        debug!("{}", sql);

        let mut rows = self.db.execute(|conn| read_rows(conn, &sql, &params))?;
        Ok(rows.pop().map(|attributes| Record::from_row(table, attributes)))
    }

    fn save(&self, record: &mut Record) -> Result<bool, RepositoryError> {
        let saved = if record.exists() {
            self.update(record)?
        } else {
            self.insert(record)?
        };

        if saved {
            record.sync_original();
        }
        Ok(saved)
    }

    fn query_related(
        &self,
        parent_key: &Value,
        child_table: &str,
        foreign_key: &str,
    ) -> Result<Vec<Record>, RepositoryError> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?1",
            quote_identifier(child_table)?,
            quote_identifier(foreign_key)?
        );
        let params = [to_sql(foreign_key, parent_key)?];
        debug!("{}", sql);

        let rows = self.db.execute(|conn| read_rows(conn, &sql, &params))?;
        Ok(rows
            .into_iter()
            .map(|attributes| Record::from_row(child_table, attributes))
            .collect())
    }

    fn delete_related(
        &self,
        parent_key: &Value,
        child_table: &str,
        foreign_key: &str,
        filter: Option<(&str, &[Value])>,
    ) -> Result<usize, RepositoryError> {
        let mut sql = format!(
            "DELETE FROM {} WHERE {} = ?1",
            quote_identifier(child_table)?,
            quote_identifier(foreign_key)?
        );
        let mut params = vec![to_sql(foreign_key, parent_key)?];

        if let Some((column, values)) = filter {
            if values.is_empty() {
                return Ok(0);
            }
            let placeholders: Vec<String> =
                (0..values.len()).map(|i| format!("?{}", i + 2)).collect();
            sql.push_str(&format!(
                " AND {} IN ({})",
                quote_identifier(column)?,
                placeholders.join(", ")
            ));
            for value in values {
                params.push(to_sql(column, value)?);
            }
        }
        debug!("{}", sql);

        self.db
            .execute(|conn| Ok(conn.execute(&sql, params_from_iter(params.iter()))?))
    }
}
