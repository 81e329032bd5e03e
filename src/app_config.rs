use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::locales::Locales;
use crate::translatable::EntityDefinition;

/// Application configuration module
/// This module handles the configuration of the translatable layer: the locale
/// catalog, the fallback flags, the language directory and the entity
/// definitions used by the command line tool.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Locale and fallback settings
    #[serde(default)]
    pub translatable: TranslatableConfig,

    /// Language directory settings
    #[serde(default)]
    pub languages: LanguageDirectoryConfig,

    /// Translatable entities known to the command line tool
    #[serde(default)]
    pub entities: Vec<EntityDefinition>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// One entry of a flat locale list: either a plain code or a base language
/// with its country variants, e.g. `"fr"` or `{"en": ["US", "GB"]}`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum LocaleEntry {
    /// Plain locale code
    Code(String),
    /// Base language mapped to its country codes
    Countries(BTreeMap<String, Vec<String>>),
}

/// The configured locale tree
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum LocalesSetting {
    /// `["en", "fr", {"es": ["MX", "CO"]}]`
    List(Vec<LocaleEntry>),
    /// `{"en": ["US", "GB"], "fr": []}`
    Tree(BTreeMap<String, Vec<String>>),
}

impl Default for LocalesSetting {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl LocalesSetting {
    /// Flattened `(base, countries)` pairs in configuration order
    pub fn entries(&self) -> Vec<(String, Vec<String>)> {
        match self {
            Self::List(entries) => entries
                .iter()
                .flat_map(|entry| match entry {
                    LocaleEntry::Code(code) => vec![(code.clone(), Vec::new())],
                    LocaleEntry::Countries(map) => map
                        .iter()
                        .map(|(base, countries)| (base.clone(), countries.clone()))
                        .collect(),
                })
                .collect(),
            Self::Tree(map) => map
                .iter()
                .map(|(base, countries)| (base.clone(), countries.clone()))
                .collect(),
        }
    }

    /// True when no locale is configured at all
    pub fn is_empty(&self) -> bool {
        match self {
            Self::List(entries) => entries.is_empty(),
            Self::Tree(map) => map.is_empty(),
        }
    }
}

/// Locale configuration shared by the catalog, the resolver and the router.
///
/// Loaded once and read-only during resolution.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslatableConfig {
    /// Valid locales, optionally with country variants
    #[serde(default)]
    pub locales: LocalesSetting,

    /// Global fallback locale
    #[serde(default)]
    pub fallback_locale: Option<String>,

    /// Forces the current locale; when unset the runtime locale is used
    #[serde(default)]
    pub locale: Option<String>,

    /// Name of the locale column on translation records
    #[serde(default = "default_locale_key")]
    pub locale_key: String,

    /// Separator between base language and country
    #[serde(default = "default_locale_separator")]
    pub locale_separator: String,

    /// Whether record-level fallback is enabled by default
    #[serde(default)]
    pub use_fallback: bool,

    /// Whether empty fields fall back to the global fallback locale
    #[serde(default)]
    pub use_property_fallback: bool,

    /// Whether `to_map` loads translations that are not loaded yet
    #[serde(default = "default_true")]
    pub to_array_always_loads_translations: bool,

    /// Suffix appended to the entity name to build the translation entity name
    #[serde(default = "default_translation_suffix")]
    pub translation_suffix: String,

    /// Optional namespace prefixed to derived translation entity names
    #[serde(default)]
    pub translation_model_namespace: Option<String>,
}

impl Default for TranslatableConfig {
    fn default() -> Self {
        Self {
            locales: LocalesSetting::default(),
            fallback_locale: None,
            locale: None,
            locale_key: default_locale_key(),
            locale_separator: default_locale_separator(),
            use_fallback: false,
            use_property_fallback: false,
            to_array_always_loads_translations: default_true(),
            translation_suffix: default_translation_suffix(),
            translation_model_namespace: None,
        }
    }
}

impl TranslatableConfig {
    /// Configuration with the given flat locale list and defaults elsewhere
    pub fn with_locales<I, S>(locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            locales: LocalesSetting::List(
                locales.into_iter().map(|l| LocaleEntry::Code(l.into())).collect(),
            ),
            ..Self::default()
        }
    }

    /// Set the global fallback locale
    pub fn fallback(mut self, locale: impl Into<String>) -> Self {
        self.fallback_locale = Some(locale.into());
        self
    }
}

/// Language directory configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LanguageDirectoryConfig {
    /// Table holding language rows
    #[serde(default = "default_language_table")]
    pub table: String,

    /// Column holding the external language code
    #[serde(default = "default_code_column")]
    pub code_column: String,

    /// Column holding a human readable name, if any
    #[serde(default = "default_name_column")]
    pub name_column: Option<String>,

    /// Fallback code; when unset the global fallback locale is used
    #[serde(default)]
    pub fallback_code: Option<String>,
}

impl Default for LanguageDirectoryConfig {
    fn default() -> Self {
        Self {
            table: default_language_table(),
            code_column: default_code_column(),
            name_column: default_name_column(),
            fallback_code: None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_locale_key() -> String {
    "locale".to_string()
}

fn default_locale_separator() -> String {
    "-".to_string()
}

fn default_translation_suffix() -> String {
    "Translation".to_string()
}

fn default_true() -> bool {
    true
}

fn default_language_table() -> String {
    "languages".to_string()
}

fn default_code_column() -> String {
    "code".to_string()
}

fn default_name_column() -> Option<String> {
    Some("name".to_string())
}

impl Config {
    /// Load a configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Building the catalog is what rejects an empty locale tree
        let locales = Locales::new(&self.translatable)?;

        if let Some(fallback) = &self.translatable.fallback_locale {
            if !locales.is_valid_locale(fallback) {
                log::warn!("Fallback locale '{}' is not a configured locale", fallback);
            }
        }

        for entity in &self.entities {
            entity.validate()?;
        }

        Ok(())
    }

    /// Find an entity definition by name
    pub fn entity(&self, name: &str) -> Option<&EntityDefinition> {
        self.entities.iter().find(|e| e.name == name)
    }
}
