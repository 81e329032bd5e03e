/*!
 * Locale catalog.
 *
 * Expands the configured locale tree into the flat set of valid locales
 * (`{en: [US, GB]}` becomes `en`, `en-US`, `en-GB`), decomposes country based
 * locales and tracks the current locale.
 */

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::app_config::TranslatableConfig;
use crate::errors::ConfigError;
use crate::language_utils;

/// A locale code with a single equality contract.
///
/// Raw strings, stored locale columns and language directory entries all
/// convert into this type, so they compare equal whenever they carry the
/// same code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocaleKey(String);

impl LocaleKey {
    /// Create a key from a code; surrounding whitespace is ignored
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_string())
    }

    /// The code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret a stored column value as a locale key.
    ///
    /// Numbers are accepted so that locale columns holding language ids
    /// compare equal to the same id given as a string.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::new(s)),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    /// The key as a value for a locale column
    pub fn to_value(&self) -> Value {
        Value::String(self.0.clone())
    }

    /// True for an empty code
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LocaleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LocaleKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LocaleKey {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for LocaleKey {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

impl From<&String> for LocaleKey {
    fn from(code: &String) -> Self {
        Self::new(code)
    }
}

impl From<&LocaleKey> for LocaleKey {
    fn from(key: &LocaleKey) -> Self {
        key.clone()
    }
}

impl PartialEq<str> for LocaleKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.trim()
    }
}

impl PartialEq<&str> for LocaleKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.trim()
    }
}

/// The set of valid locales plus the current locale
#[derive(Debug, Clone)]
pub struct Locales {
    /// Valid locales in configuration order, countries after their base
    locales: Vec<String>,
    /// Separator between base language and country
    separator: String,
    /// Locale forced by configuration
    forced: Option<String>,
    /// Runtime locale
    current: Option<String>,
    /// Global fallback locale
    fallback: Option<String>,
}

impl Locales {
    /// Build the catalog from configuration.
    ///
    /// Fails with `ConfigError::LocalesNotConfigured` when no locale is
    /// configured.
    pub fn new(config: &TranslatableConfig) -> Result<Self, ConfigError> {
        if config.locales.is_empty() {
            return Err(ConfigError::LocalesNotConfigured);
        }

        let separator = if config.locale_separator.is_empty() {
            "-".to_string()
        } else {
            config.locale_separator.clone()
        };

        let mut catalog = Self {
            locales: Vec::new(),
            separator,
            forced: config.locale.clone().filter(|l| !l.trim().is_empty()),
            current: None,
            fallback: config.fallback_locale.clone().filter(|l| !l.trim().is_empty()),
        };

        for (base, countries) in config.locales.entries() {
            let base = base.trim();
            if base.is_empty() {
                return Err(ConfigError::InvalidLocale("empty locale code".to_string()));
            }
            catalog.add(base);
            for country in countries {
                let country = country.trim();
                if country.is_empty() {
                    return Err(ConfigError::InvalidLocale(format!(
                        "empty country code under `{}`",
                        base
                    )));
                }
                let locale = catalog.country_locale(base, country);
                catalog.add(&locale);
            }
        }

        if catalog.locales.is_empty() {
            return Err(ConfigError::LocalesNotConfigured);
        }

        for locale in &catalog.locales {
            if !language_utils::is_iso_language(locale, &catalog.separator) {
                debug!("Locale '{}' is not an ISO 639 language code", locale);
            }
        }
        debug!("Locale catalog loaded: {}", catalog.locales.join(", "));

        Ok(catalog)
    }

    /// All valid locales
    pub fn all(&self) -> &[String] {
        &self.locales
    }

    /// Whether `code` is a configured locale, including country variants
    pub fn is_valid_locale(&self, code: &str) -> bool {
        let code = code.trim();
        self.locales.iter().any(|l| l == code)
    }

    /// Split a country based locale into `(base, country)`.
    ///
    /// Returns `None` when the separator is absent.
    pub fn decompose<'a>(&self, code: &'a str) -> Option<(&'a str, &'a str)> {
        code.trim().split_once(self.separator.as_str())
    }

    /// Whether `code` contains the locale separator
    pub fn is_country_based(&self, code: &str) -> bool {
        code.contains(self.separator.as_str())
    }

    /// Base language of a country based locale
    pub fn language_from_country_based<'a>(&self, code: &'a str) -> Option<&'a str> {
        self.decompose(code).map(|(base, _)| base)
    }

    /// Build `base<separator>country`
    pub fn country_locale(&self, base: &str, country: &str) -> String {
        format!("{}{}{}", base, self.separator, country)
    }

    /// Register a locale at runtime
    pub fn add(&mut self, code: &str) {
        let code = code.trim();
        if !code.is_empty() && !self.is_valid_locale(code) {
            self.locales.push(code.to_string());
        }
    }

    /// Remove a locale at runtime
    pub fn forget(&mut self, code: &str) {
        let code = code.trim();
        self.locales.retain(|l| l != code);
    }

    /// The locale separator
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// The global fallback locale, if configured
    pub fn fallback(&self) -> Option<LocaleKey> {
        self.fallback.as_deref().map(LocaleKey::new)
    }

    /// The current locale.
    ///
    /// A locale forced by configuration wins over the runtime locale; without
    /// either, the fallback locale and then the first configured locale are
    /// used.
    pub fn current(&self) -> LocaleKey {
        let code = self
            .forced
            .as_deref()
            .or(self.current.as_deref())
            .or(self.fallback.as_deref())
            .or_else(|| self.locales.first().map(String::as_str))
            .unwrap_or_default();
        LocaleKey::new(code)
    }

    /// Set the runtime locale
    pub fn set_current(&mut self, locale: impl Into<LocaleKey>) {
        let locale = locale.into();
        if !self.is_valid_locale(locale.as_str()) {
            debug!("Current locale set to unconfigured locale '{}'", locale);
        }
        self.current = Some(locale.as_str().to_string());
    }
}
