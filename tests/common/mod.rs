/*!
 * Common test utilities for the transloc test suite
 */

use anyhow::Result;
use serde_json::{Map, Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use transloc::database::connection::DatabaseConnection;
use transloc::{EntityDefinition, MemoryRepository, SqliteRepository, TranslatableConfig};

/// Route library logs to the test output; set RUST_LOG to see them
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// The `post` entity with translated `title` and `body`
pub fn post_definition() -> Arc<EntityDefinition> {
    Arc::new(EntityDefinition::new("post", ["title", "body"]))
}

/// Locales `en`, `fr`, `de` with global fallback `en`
pub fn scenario_config() -> TranslatableConfig {
    TranslatableConfig::with_locales(["en", "fr", "de"]).fallback("en")
}

/// Build a row from key/value pairs
pub fn row(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

/// A memory repository with one post translated to `en` and `fr`
pub fn memory_with_post() -> (MemoryRepository, Value) {
    let repo = MemoryRepository::new();
    let key = repo.insert_row("posts", row(&[("slug", json!("hello"))]));
    for (locale, title) in [("en", "Hello"), ("fr", "Bonjour")] {
        repo.insert_row(
            "post_translations",
            row(&[
                ("post_id", key.clone()),
                ("locale", json!(locale)),
                ("title", json!(title)),
            ]),
        );
    }
    (repo, key)
}

/// Create the posts, post_translations and languages tables
pub fn create_schema(db: &DatabaseConnection) -> Result<()> {
    db.execute(|conn| {
        conn.execute_batch(
            r#"
            CREATE TABLE posts (id INTEGER PRIMARY KEY, slug TEXT, secret TEXT);
            CREATE TABLE post_translations (
                id INTEGER PRIMARY KEY,
                post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                locale TEXT NOT NULL,
                title TEXT,
                body TEXT,
                UNIQUE(post_id, locale)
            );
            CREATE TABLE languages (id INTEGER PRIMARY KEY, code TEXT NOT NULL UNIQUE, name TEXT);
            INSERT INTO languages (code, name) VALUES ('en', 'English'), ('fr', 'Français');
            "#,
        )?;
        Ok(())
    })?;
    Ok(())
}

/// An on-disk SQLite repository with the test schema
pub fn sqlite_repository(dir: &TempDir) -> Result<SqliteRepository> {
    let repo = SqliteRepository::open(dir.path().join("transloc.db"))?;
    create_schema(repo.connection())?;
    Ok(repo)
}
