/*!
 * Language directory.
 *
 * Maps external language codes to language rows stored through the
 * repository. A resolved `LanguageRecord` converts into the same `LocaleKey`
 * as its raw code, so translation lookups treat both uniformly.
 */

use log::debug;
use serde_json::Value;

use crate::app_config::LanguageDirectoryConfig;
use crate::database::{Record, Repository};
use crate::errors::RepositoryError;
use crate::language_utils;
use crate::locales::LocaleKey;

/// A language row resolved through the directory
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageRecord {
    /// Primary key of the row, if any
    pub key: Option<Value>,
    /// The language code
    pub code: LocaleKey,
    /// Human readable name stored with the row
    pub name: Option<String>,
}

impl LanguageRecord {
    fn from_record(record: &Record, config: &LanguageDirectoryConfig) -> Option<Self> {
        let code = record.get(&config.code_column).and_then(LocaleKey::from_value)?;
        let name = config
            .name_column
            .as_deref()
            .and_then(|column| record.get(column))
            .and_then(Value::as_str)
            .map(str::to_string);

        Some(Self {
            key: record.key().cloned(),
            code,
            name,
        })
    }

    /// Stored name, or the ISO 639 English name of the base language
    pub fn display_name(&self, separator: &str) -> Option<String> {
        self.name
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| language_utils::language_name(self.code.as_str(), separator))
    }
}

impl From<&LanguageRecord> for LocaleKey {
    fn from(language: &LanguageRecord) -> Self {
        language.code.clone()
    }
}

impl From<LanguageRecord> for LocaleKey {
    fn from(language: LanguageRecord) -> Self {
        language.code
    }
}

/// Directory of language rows keyed by code
pub struct LanguageDirectory<'a, R: Repository> {
    repo: &'a R,
    config: &'a LanguageDirectoryConfig,
    global_fallback: Option<&'a str>,
}

impl<'a, R: Repository> LanguageDirectory<'a, R> {
    /// Create a directory over `repo`.
    ///
    /// `global_fallback` is used when the directory has no fallback code of
    /// its own.
    pub fn new(
        repo: &'a R,
        config: &'a LanguageDirectoryConfig,
        global_fallback: Option<&'a str>,
    ) -> Self {
        Self {
            repo,
            config,
            global_fallback,
        }
    }

    /// Look a language up by its code
    pub fn lookup_by_code(
        &self,
        code: impl Into<LocaleKey>,
    ) -> Result<Option<LanguageRecord>, RepositoryError> {
        let code = code.into();
        let row = self
            .repo
            .find_where(&self.config.table, &self.config.code_column, &code.to_value())?;

        let language = row.and_then(|r| LanguageRecord::from_record(&r, self.config));
        if language.is_none() {
            debug!("Language '{}' not found in {}", code, self.config.table);
        }
        Ok(language)
    }

    /// The configured fallback code
    pub fn fallback_code(&self) -> Option<LocaleKey> {
        self.config
            .fallback_code
            .as_deref()
            .or(self.global_fallback)
            .filter(|c| !c.trim().is_empty())
            .map(LocaleKey::new)
    }

    /// The language row for the fallback code
    pub fn fallback_identifier(&self) -> Result<Option<LanguageRecord>, RepositoryError> {
        match self.fallback_code() {
            Some(code) => self.lookup_by_code(code),
            None => Ok(None),
        }
    }
}
