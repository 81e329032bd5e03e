/*!
 * Attribute routing.
 *
 * Keys are either plain attribute names or `attribute:locale`. Translated
 * attributes are read through the resolver and written to the translation
 * record of the target locale; everything else goes to the parent record.
 *
 * The router works on in-memory data only. Loading translations before
 * routing is the caller's job (see `Translator`).
 */

use log::{debug, warn};
use serde_json::{Map, Value};

use super::entity::TranslatableModel;
use super::resolver::TranslationResolver;
use crate::app_config::TranslatableConfig;
use crate::locales::{LocaleKey, Locales};

/// Separator between attribute and locale in attribute keys
pub const LOCALE_DELIMITER: char = ':';

/// Routes attribute reads and writes between parent and translations
#[derive(Debug, Clone, Copy)]
pub struct AttributeRouter<'a> {
    locales: &'a Locales,
    config: &'a TranslatableConfig,
}

impl<'a> AttributeRouter<'a> {
    pub fn new(locales: &'a Locales, config: &'a TranslatableConfig) -> Self {
        Self { locales, config }
    }

    fn resolver(&self) -> TranslationResolver<'a> {
        TranslationResolver::new(self.locales, self.config)
    }

    /// Locale used for `model` when none is requested
    pub fn locale_for(&self, model: &TranslatableModel) -> LocaleKey {
        model
            .default_locale()
            .cloned()
            .unwrap_or_else(|| self.locales.current())
    }

    /// Record-level fallback flag for `model`
    pub fn use_fallback_for(&self, model: &TranslatableModel) -> bool {
        self.resolver().use_fallback(model.use_translation_fallback())
    }

    /// Split `attribute:locale`; without a locale the model's locale is used
    pub fn split_key<'k>(&self, model: &TranslatableModel, key: &'k str) -> (&'k str, LocaleKey) {
        match key.split_once(LOCALE_DELIMITER) {
            Some((attribute, locale)) if !locale.trim().is_empty() => {
                (attribute, LocaleKey::new(locale))
            }
            Some((attribute, _)) => (attribute, self.locale_for(model)),
            None => (key, self.locale_for(model)),
        }
    }

    /// Whether `key` reads or writes a translation record
    pub fn is_translation_key(&self, model: &TranslatableModel, key: &str) -> bool {
        let (attribute, _) = self.split_key(model, key);
        model.definition().is_translation_attribute(attribute)
    }

    /// Read `key`; `None` when nothing resolves
    pub fn get_attribute(&self, model: &TranslatableModel, key: &str) -> Option<Value> {
        let (attribute, locale) = self.split_key(model, key);
        if !model.definition().is_translation_attribute(attribute) {
            return model.record().get(key).cloned();
        }

        let set = model.translations()?;
        let with_fallback = self.use_fallback_for(model);
        let resolver = self.resolver();
        // An absent record is reported as absent, not as a field fallback.
        resolver.resolve_index(set, &locale, with_fallback)?;
        resolver.resolve_field(
            set,
            attribute,
            &locale,
            with_fallback,
            model.definition().empty_values,
        )
    }

    /// Write `key`, creating the translation record when needed
    pub fn set_attribute(&self, model: &mut TranslatableModel, key: &str, value: Value) {
        let (attribute, locale) = self.split_key(model, key);
        if !model.definition().is_translation_attribute(attribute) {
            model.record_mut().set(key, value);
            return;
        }

        let attribute = attribute.to_string();
        model
            .translations_or_empty(self.config)
            .get_or_create(&locale)
            .set(attribute, value);
    }

    /// Assign many attributes at once.
    ///
    /// A key that is a valid locale with an object value fills that locale's
    /// translation. An `attribute:locale` key with a valid locale and a
    /// translated attribute fills that single field. A plain translated
    /// attribute goes to the model's locale. The rest fills the parent.
    pub fn fill(&self, model: &mut TranslatableModel, attributes: Map<String, Value>) {
        let mut remainder = Map::new();

        for (key, value) in attributes {
            if self.locales.is_valid_locale(&key) {
                match value {
                    Value::Object(values) => {
                        let locale = LocaleKey::new(&key);
                        for (attribute, value) in values {
                            if model.definition().is_translation_attribute(&attribute) {
                                model
                                    .translations_or_empty(self.config)
                                    .get_or_create(&locale)
                                    .set(attribute, value);
                            } else {
                                warn!("Ignoring '{}' for locale '{}': not translated", attribute, key);
                            }
                        }
                    }
                    value => {
                        remainder.insert(key, value);
                    }
                }
                continue;
            }

            if let Some((attribute, locale)) = key.split_once(LOCALE_DELIMITER) {
                if self.locales.is_valid_locale(locale)
                    && model.definition().is_translation_attribute(attribute)
                {
                    let locale = LocaleKey::new(locale);
                    let attribute = attribute.to_string();
                    model
                        .translations_or_empty(self.config)
                        .get_or_create(&locale)
                        .set(attribute, value);
                    continue;
                }
                debug!("Key '{}' does not address a translation", key);
            }

            if model.definition().is_translation_attribute(&key) {
                self.set_attribute(model, &key, value);
            } else {
                remainder.insert(key, value);
            }
        }

        model.record_mut().fill(remainder);
    }
}
