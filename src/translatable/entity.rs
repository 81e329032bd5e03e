/*!
 * Translatable entities.
 *
 * An `EntityDefinition` names the parent table, the translation table and
 * the attributes that live on translation rows. A `TranslatableModel` is one
 * parent row plus its (possibly not yet loaded) translations.
 */

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::translation_set::TranslationSet;
use crate::app_config::TranslatableConfig;
use crate::database::models::DEFAULT_PRIMARY_KEY;
use crate::database::Record;
use crate::errors::ConfigError;
use crate::locales::LocaleKey;

/// What counts as an empty translated value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmptyValuePolicy {
    /// Missing, null, empty string, empty array or empty object
    #[default]
    Blank,
    /// Blank values plus `0`, `"0"` and `false`
    Falsy,
}

impl EmptyValuePolicy {
    /// Whether `value` is empty under this policy
    pub fn is_empty(&self, value: Option<&Value>) -> bool {
        let Some(value) = value else {
            return true;
        };
        let blank = match value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::Object(o) => o.is_empty(),
            _ => false,
        };
        if blank || *self == Self::Blank {
            return blank;
        }
        match value {
            Value::Bool(b) => !b,
            Value::Number(n) => n.as_f64() == Some(0.0),
            Value::String(s) => s == "0",
            _ => false,
        }
    }
}

/// Static description of a translatable entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityDefinition {
    /// Singular snake case name, e.g. `blog_post`
    pub name: String,

    /// Parent table; defaults to the name with an `s` appended
    #[serde(default)]
    pub table: Option<String>,

    /// Parent primary key column
    #[serde(default = "default_primary_key")]
    pub primary_key: String,

    /// Attributes stored on translation rows
    pub translated_attributes: Vec<String>,

    /// Translation entity name; derived from the name and suffix when unset
    #[serde(default)]
    pub translation_entity: Option<String>,

    /// Translation table; derived from the translation entity name when unset
    #[serde(default)]
    pub translation_table: Option<String>,

    /// Column on translation rows referencing the parent
    #[serde(default)]
    pub translation_foreign_key: Option<String>,

    /// Attributes left out of serialized maps
    #[serde(default)]
    pub hidden: Vec<String>,

    /// Locale used instead of the current locale for this entity
    #[serde(default)]
    pub default_locale: Option<String>,

    /// Overrides the global `use_fallback` flag for this entity
    #[serde(default)]
    pub use_translation_fallback: Option<bool>,

    /// Empty-value policy for property fallback
    #[serde(default)]
    pub empty_values: EmptyValuePolicy,
}

fn default_primary_key() -> String {
    DEFAULT_PRIMARY_KEY.to_string()
}

/// `blog_post` -> `BlogPost`
fn pascal_case(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// `BlogPostTranslation` -> `blog_post_translation`
fn snake_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    for (index, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if index > 0 {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

impl EntityDefinition {
    /// Create a definition with derived table, translation table and key names
    pub fn new<I, S>(name: impl Into<String>, translated_attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            table: None,
            primary_key: default_primary_key(),
            translated_attributes: translated_attributes.into_iter().map(Into::into).collect(),
            translation_entity: None,
            translation_table: None,
            translation_foreign_key: None,
            hidden: Vec::new(),
            default_locale: None,
            use_translation_fallback: None,
            empty_values: EmptyValuePolicy::default(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_translation_table(mut self, table: impl Into<String>) -> Self {
        self.translation_table = Some(table.into());
        self
    }

    pub fn with_foreign_key(mut self, column: impl Into<String>) -> Self {
        self.translation_foreign_key = Some(column.into());
        self
    }

    pub fn with_hidden<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden = attributes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = Some(locale.into());
        self
    }

    pub fn with_translation_fallback(mut self, enabled: bool) -> Self {
        self.use_translation_fallback = Some(enabled);
        self
    }

    pub fn with_empty_values(mut self, policy: EmptyValuePolicy) -> Self {
        self.empty_values = policy;
        self
    }

    /// The parent table
    pub fn table_name(&self) -> String {
        self.table.clone().unwrap_or_else(|| format!("{}s", self.name))
    }

    /// The translation entity name, e.g. `PostTranslation`
    pub fn translation_entity_name(&self, config: &TranslatableConfig) -> String {
        if let Some(entity) = &self.translation_entity {
            return entity.clone();
        }
        let entity = format!("{}{}", pascal_case(&self.name), config.translation_suffix);
        match config.translation_model_namespace.as_deref() {
            Some(namespace) if !namespace.is_empty() => format!("{}::{}", namespace, entity),
            _ => entity,
        }
    }

    /// The translation table, e.g. `post_translations`
    pub fn translation_table_name(&self, config: &TranslatableConfig) -> String {
        if let Some(table) = &self.translation_table {
            return table.clone();
        }
        let entity = self.translation_entity_name(config);
        let short = entity.rsplit("::").next().unwrap_or(&entity);
        format!("{}s", snake_case(short))
    }

    /// Column on translation rows referencing the parent, e.g. `post_id`
    pub fn foreign_key(&self) -> String {
        self.translation_foreign_key
            .clone()
            .unwrap_or_else(|| format!("{}_{}", self.name, DEFAULT_PRIMARY_KEY))
    }

    /// Whether `attribute` lives on translation rows
    pub fn is_translation_attribute(&self, attribute: &str) -> bool {
        self.translated_attributes.iter().any(|a| a == attribute)
    }

    /// Whether `attribute` is left out of serialized maps
    pub fn is_hidden(&self, attribute: &str) -> bool {
        self.hidden.iter().any(|a| a == attribute)
    }

    /// Check the definition for inconsistencies
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidEntity {
            entity: self.name.clone(),
            message,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name is empty".to_string()));
        }
        if self.translated_attributes.is_empty() {
            return Err(invalid("no translated attributes".to_string()));
        }

        let foreign_key = self.foreign_key();
        for (index, attribute) in self.translated_attributes.iter().enumerate() {
            if attribute.is_empty() || attribute.contains(':') {
                return Err(invalid(format!("invalid translated attribute `{}`", attribute)));
            }
            if self.translated_attributes[..index].contains(attribute) {
                return Err(invalid(format!("duplicate translated attribute `{}`", attribute)));
            }
            if *attribute == self.primary_key || *attribute == foreign_key {
                return Err(invalid(format!("`{}` is a key column", attribute)));
            }
        }

        Ok(())
    }
}

/// A parent row with its translations
#[derive(Debug, Clone)]
pub struct TranslatableModel {
    definition: Arc<EntityDefinition>,
    record: Record,
    translations: Option<TranslationSet>,
    default_locale: Option<LocaleKey>,
    use_translation_fallback: Option<bool>,
}

impl TranslatableModel {
    /// A new, unsaved model
    pub fn new(definition: Arc<EntityDefinition>) -> Self {
        let record =
            Record::new(definition.table_name()).with_primary_key(definition.primary_key.clone());
        Self::from_record(definition, record)
    }

    /// Wrap a parent row; translations are not loaded
    pub fn from_record(definition: Arc<EntityDefinition>, record: Record) -> Self {
        let record = record.with_primary_key(definition.primary_key.clone());
        let default_locale = definition.default_locale.as_deref().map(LocaleKey::new);
        Self {
            definition,
            record,
            translations: None,
            default_locale,
            use_translation_fallback: None,
        }
    }

    pub fn definition(&self) -> &Arc<EntityDefinition> {
        &self.definition
    }

    /// The parent row
    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    /// The parent primary key
    pub fn key(&self) -> Option<&Value> {
        self.record.key()
    }

    pub fn exists(&self) -> bool {
        self.record.exists()
    }

    /// Whether the parent row has unsaved modifications
    pub fn is_dirty(&self) -> bool {
        self.record.is_dirty()
    }

    /// Loaded translations, if any
    pub fn translations(&self) -> Option<&TranslationSet> {
        self.translations.as_ref()
    }

    pub fn translations_mut(&mut self) -> Option<&mut TranslationSet> {
        self.translations.as_mut()
    }

    pub fn translations_loaded(&self) -> bool {
        self.translations.is_some()
    }

    /// Replace the in-memory translations
    pub fn set_translations(&mut self, translations: TranslationSet) {
        self.translations = Some(translations);
    }

    /// Forget the in-memory translations; they load again on next access
    pub fn unload_translations(&mut self) {
        self.translations = None;
    }

    /// The loaded translations, or a fresh empty set
    pub fn translations_or_empty(&mut self, config: &TranslatableConfig) -> &mut TranslationSet {
        let table = self.definition.translation_table_name(config);
        self.translations
            .get_or_insert_with(|| TranslationSet::new(table, config.locale_key.clone()))
    }

    /// Locale override for this model
    pub fn default_locale(&self) -> Option<&LocaleKey> {
        self.default_locale.as_ref()
    }

    pub fn set_default_locale(&mut self, locale: Option<LocaleKey>) {
        self.default_locale = locale;
    }

    /// Fallback override: runtime value, then the definition's
    pub fn use_translation_fallback(&self) -> Option<bool> {
        self.use_translation_fallback
            .or(self.definition.use_translation_fallback)
    }

    pub fn set_use_translation_fallback(&mut self, enabled: Option<bool>) {
        self.use_translation_fallback = enabled;
    }
}
