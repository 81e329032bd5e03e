/*!
 * Database connection management.
 *
 * This module handles SQLite database connection creation and provides
 * serialized access to the connection for the repository.
 */

use log::{debug, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::errors::RepositoryError;

/// Database connection wrapper with thread-safe access
#[derive(Clone)]
pub struct DatabaseConnection {
    /// Path to the database file
    db_path: PathBuf,
    /// Thread-safe connection wrapped in Arc<Mutex>
    connection: Arc<Mutex<Connection>>,
}

impl DatabaseConnection {
    /// Open the database at the specified path
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, RepositoryError> {
        let db_path = db_path.as_ref().to_path_buf();

        info!("Opening database at: {:?}", db_path);

        let conn = Connection::open(&db_path)?;
        Self::configure(&conn)?;

        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self, RepositoryError> {
        debug!("Creating in-memory database");

        let conn = Connection::open_in_memory()?;
        Self::configure(&conn)?;

        Ok(Self {
            db_path: PathBuf::from(":memory:"),
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    fn configure(conn: &Connection) -> Result<(), RepositoryError> {
        // Translation rows reference their parent
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(())
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Execute a database operation with the connection
    ///
    /// This method acquires the mutex lock and executes the provided closure
    /// with access to the connection.
    pub fn execute<F, T>(&self, f: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&Connection) -> Result<T, RepositoryError>,
    {
        let conn = self
            .connection
            .lock()
            .map_err(|e| RepositoryError::LockPoisoned(e.to_string()))?;

        f(&conn)
    }

    /// Begin a transaction and execute operations within it
    pub fn transaction<F, T>(&self, f: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&rusqlite::Transaction) -> Result<T, RepositoryError>,
    {
        let mut conn = self
            .connection
            .lock()
            .map_err(|e| RepositoryError::LockPoisoned(e.to_string()))?;

        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;

        Ok(result)
    }
}
