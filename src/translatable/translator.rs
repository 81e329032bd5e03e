/*!
 * Translator facade.
 *
 * Owns the repository, the locale catalog and the configuration, and exposes
 * every operation on translatable models. Translations of existing models are
 * loaded lazily on first access and stay in memory until reloaded.
 */

use log::{debug, info};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::entity::{EntityDefinition, TranslatableModel};
use super::persistence::{ModelObserver, PersistenceCoordinator};
use super::resolver::TranslationResolver;
use super::router::AttributeRouter;
use super::translation_set::TranslationSet;
use crate::app_config::{Config, LanguageDirectoryConfig, TranslatableConfig};
use crate::database::{Record, Repository};
use crate::errors::{ConfigError, TranslatableError};
use crate::language_directory::LanguageDirectory;
use crate::locales::{LocaleKey, Locales};

type Result<T> = std::result::Result<T, TranslatableError>;

/// Entry point for working with translatable models
pub struct Translator<R: Repository> {
    repo: R,
    config: TranslatableConfig,
    languages: LanguageDirectoryConfig,
    locales: Locales,
    observers: Vec<Box<dyn ModelObserver>>,
    autoload: Option<bool>,
}

impl<R: Repository> Translator<R> {
    /// Create a translator; fails when no locales are configured
    pub fn new(repo: R, config: TranslatableConfig) -> std::result::Result<Self, ConfigError> {
        let locales = Locales::new(&config)?;
        Ok(Self {
            repo,
            config,
            languages: LanguageDirectoryConfig::default(),
            locales,
            observers: Vec::new(),
            autoload: None,
        })
    }

    /// Create a translator from the application configuration
    pub fn from_config(repo: R, config: &Config) -> std::result::Result<Self, ConfigError> {
        Ok(Self::new(repo, config.translatable.clone())?
            .with_language_directory(config.languages.clone()))
    }

    pub fn with_language_directory(mut self, languages: LanguageDirectoryConfig) -> Self {
        self.languages = languages;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn config(&self) -> &TranslatableConfig {
        &self.config
    }

    pub fn locales(&self) -> &Locales {
        &self.locales
    }

    /// Mutable catalog, e.g. to change the current locale
    pub fn locales_mut(&mut self) -> &mut Locales {
        &mut self.locales
    }

    /// The language directory over this translator's repository
    pub fn languages(&self) -> LanguageDirectory<'_, R> {
        LanguageDirectory::new(
            &self.repo,
            &self.languages,
            self.config.fallback_locale.as_deref(),
        )
    }

    /// Register a save observer
    pub fn observe(&mut self, observer: impl ModelObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Always load translations when serializing
    pub fn enable_autoload_translations(&mut self) {
        self.autoload = Some(true);
    }

    /// Never load translations when serializing
    pub fn disable_autoload_translations(&mut self) {
        self.autoload = Some(false);
    }

    /// Follow `to_array_always_loads_translations` again
    pub fn default_autoload_translations(&mut self) {
        self.autoload = None;
    }

    pub fn resolver(&self) -> TranslationResolver<'_> {
        TranslationResolver::new(&self.locales, &self.config)
    }

    pub fn router(&self) -> AttributeRouter<'_> {
        AttributeRouter::new(&self.locales, &self.config)
    }

    fn coordinator(&self) -> PersistenceCoordinator<'_, R> {
        PersistenceCoordinator::new(&self.repo, &self.observers)
    }

    /// A new, unsaved model with an empty translation set
    pub fn new_model(&self, definition: &Arc<EntityDefinition>) -> TranslatableModel {
        let mut model = TranslatableModel::new(Arc::clone(definition));
        model.translations_or_empty(&self.config);
        model
    }

    /// Load a model by primary key; translations load on first access
    pub fn find(
        &self,
        definition: &Arc<EntityDefinition>,
        key: &Value,
    ) -> Result<Option<TranslatableModel>> {
        let record = self
            .repo
            .find_where(&definition.table_name(), &definition.primary_key, key)?;
        Ok(record.map(|r| TranslatableModel::from_record(Arc::clone(definition), r)))
    }

    /// Load translations unless already loaded
    pub fn load_translations(&self, model: &mut TranslatableModel) -> Result<()> {
        if model.translations_loaded() {
            return Ok(());
        }
        self.refresh_translations(model)
    }

    /// Reload translations from the repository, discarding in-memory ones
    pub fn refresh_translations(&self, model: &mut TranslatableModel) -> Result<()> {
        let table = model.definition().translation_table_name(&self.config);
        let records = match model.key() {
            Some(key) if model.exists() => {
                self.repo
                    .query_related(key, &table, &model.definition().foreign_key())?
            }
            _ => Vec::new(),
        };
        debug!("Loaded {} translation(s) from {}", records.len(), table);
        model.set_translations(TranslationSet::from_records(
            table,
            self.config.locale_key.clone(),
            records,
        ));
        Ok(())
    }

    /// Locale used for `model` when none is requested
    pub fn locale(&self, model: &TranslatableModel) -> LocaleKey {
        self.router().locale_for(model)
    }

    /// Record-level fallback flag for `model`
    pub fn use_fallback(&self, model: &TranslatableModel) -> bool {
        self.router().use_fallback_for(model)
    }

    /// The translation presented for `locale`.
    ///
    /// `None` for the locale means the model's locale; `None` for the flag
    /// means the model's override, then the global setting.
    pub fn translate<'m>(
        &self,
        model: &'m mut TranslatableModel,
        locale: Option<LocaleKey>,
        with_fallback: Option<bool>,
    ) -> Result<Option<&'m Record>> {
        self.load_translations(model)?;
        let model: &'m TranslatableModel = model;
        let locale = locale.unwrap_or_else(|| self.locale(model));
        let with_fallback = with_fallback.unwrap_or_else(|| self.use_fallback(model));
        Ok(model
            .translations()
            .and_then(|set| self.resolver().resolve(set, &locale, with_fallback)))
    }

    /// The translation for `locale` with fallback forced on
    pub fn translate_or_default<'m>(
        &self,
        model: &'m mut TranslatableModel,
        locale: Option<LocaleKey>,
    ) -> Result<Option<&'m Record>> {
        self.translate(model, locale, Some(true))
    }

    /// The translation for exactly `locale`, created when missing
    pub fn translate_or_new<'m>(
        &self,
        model: &'m mut TranslatableModel,
        locale: Option<LocaleKey>,
    ) -> Result<&'m mut Record> {
        self.load_translations(model)?;
        let locale = locale.unwrap_or_else(|| self.locale(model));
        Ok(model
            .translations_or_empty(&self.config)
            .get_or_create(&locale))
    }

    /// The translation for exactly `locale`, or `TranslationNotFound`
    pub fn translate_or_fail<'m>(
        &self,
        model: &'m mut TranslatableModel,
        locale: LocaleKey,
    ) -> Result<&'m Record> {
        self.load_translations(model)?;
        let model: &'m TranslatableModel = model;
        model
            .translations()
            .and_then(|set| set.find(&locale))
            .ok_or_else(|| TranslatableError::TranslationNotFound {
                entity: model.definition().name.clone(),
                locale: locale.to_string(),
            })
    }

    /// Append a fresh translation for `locale`, even when one exists
    pub fn new_translation<'m>(
        &self,
        model: &'m mut TranslatableModel,
        locale: LocaleKey,
    ) -> Result<&'m mut Record> {
        self.load_translations(model)?;
        Ok(model.translations_or_empty(&self.config).create(&locale))
    }

    /// Whether a translation exists for exactly `locale` (or the model's locale)
    pub fn has_translation(
        &self,
        model: &mut TranslatableModel,
        locale: Option<LocaleKey>,
    ) -> Result<bool> {
        self.load_translations(model)?;
        let locale = locale.unwrap_or_else(|| self.locale(model));
        Ok(model
            .translations()
            .is_some_and(|set| set.find(&locale).is_some()))
    }

    /// Read `name` or `name:locale`
    pub fn get_attribute(&self, model: &mut TranslatableModel, key: &str) -> Result<Option<Value>> {
        let router = self.router();
        if router.is_translation_key(model, key) {
            self.load_translations(model)?;
        }
        Ok(router.get_attribute(model, key))
    }

    /// Write `name` or `name:locale`
    pub fn set_attribute(
        &self,
        model: &mut TranslatableModel,
        key: &str,
        value: Value,
    ) -> Result<()> {
        let router = self.router();
        if router.is_translation_key(model, key) {
            self.load_translations(model)?;
        }
        router.set_attribute(model, key, value);
        Ok(())
    }

    /// Assign many attributes, routing translated ones to their locales
    pub fn fill(&self, model: &mut TranslatableModel, attributes: Map<String, Value>) -> Result<()> {
        self.load_translations(model)?;
        self.router().fill(model, attributes);
        Ok(())
    }

    /// Save the parent and its dirty translations
    pub fn save(&self, model: &mut TranslatableModel) -> Result<bool> {
        let saved = self.coordinator().save(model)?;
        if saved {
            info!(
                "Saved {} {}",
                model.definition().name,
                model.key().cloned().unwrap_or(Value::Null)
            );
        }
        Ok(saved)
    }

    /// Delete the translations for `locales`, or all of them.
    ///
    /// Stored translations are deleted through the repository and the set is
    /// reloaded. For a model that was never saved only the in-memory set
    /// changes. Returns the number of translations removed.
    pub fn delete_translations(
        &self,
        model: &mut TranslatableModel,
        locales: Option<&[LocaleKey]>,
    ) -> Result<usize> {
        let key = match model.key() {
            Some(key) if model.exists() => key.clone(),
            _ => {
                let Some(set) = model.translations_mut() else {
                    return Ok(0);
                };
                return Ok(match locales {
                    Some(locales) => set.remove_locales(locales),
                    None => set.clear(),
                });
            }
        };

        let table = model.definition().translation_table_name(&self.config);
        let values: Vec<Value> = locales
            .unwrap_or_default()
            .iter()
            .map(LocaleKey::to_value)
            .collect();
        let filter = locales.map(|_| (self.config.locale_key.as_str(), &values[..]));
        let deleted = self.repo.delete_related(
            &key,
            &table,
            &model.definition().foreign_key(),
            filter,
        )?;
        info!("Deleted {} translation(s) of {} {}", deleted, model.definition().name, key);

        self.refresh_translations(model)?;
        Ok(deleted)
    }

    /// Parent attributes merged with translated attributes resolved for the
    /// model's locale. Hidden attributes are left out.
    pub fn to_map(&self, model: &mut TranslatableModel) -> Result<Map<String, Value>> {
        let definition = Arc::clone(model.definition());
        let mut attributes: Map<String, Value> = model
            .record()
            .attributes()
            .iter()
            .filter(|(key, _)| !definition.is_hidden(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let include = match self.autoload {
            Some(autoload) => autoload,
            None => model.translations_loaded() || self.config.to_array_always_loads_translations,
        };
        if !include {
            return Ok(attributes);
        }
        self.load_translations(model)?;

        let locale = self.locale(model);
        let with_fallback = self.use_fallback(model);
        let resolver = self.resolver();
        for attribute in &definition.translated_attributes {
            if definition.is_hidden(attribute) {
                continue;
            }
            let value = model
                .translations()
                .and_then(|set| {
                    resolver.resolve_field(
                        set,
                        attribute,
                        &locale,
                        with_fallback,
                        definition.empty_values,
                    )
                })
                .unwrap_or(Value::Null);
            attributes.insert(attribute.clone(), value);
        }

        Ok(attributes)
    }

    /// Every translation as `locale -> {attribute -> value}`
    pub fn translations_map(
        &self,
        model: &mut TranslatableModel,
    ) -> Result<BTreeMap<String, Map<String, Value>>> {
        self.load_translations(model)?;
        let mut map = BTreeMap::new();
        let Some(set) = model.translations() else {
            return Ok(map);
        };

        for record in set.iter() {
            let Some(locale) = set.locale_of(record) else {
                continue;
            };
            let fields: Map<String, Value> = model
                .definition()
                .translated_attributes
                .iter()
                .filter_map(|a| record.get(a).map(|v| (a.clone(), v.clone())))
                .collect();
            map.insert(locale.to_string(), fields);
        }

        Ok(map)
    }

    /// Copy `model` and all its translations as new, unsaved records
    pub fn replicate_with_translations(
        &self,
        model: &mut TranslatableModel,
        except: &[&str],
    ) -> Result<TranslatableModel> {
        self.load_translations(model)?;

        let definition = Arc::clone(model.definition());
        let record = model.record().replicate(except);
        let mut replica = TranslatableModel::from_record(Arc::clone(&definition), record);
        replica.set_default_locale(model.default_locale().cloned());
        replica.set_use_translation_fallback(model.use_translation_fallback());

        let foreign_key = definition.foreign_key();
        let mut set = TranslationSet::new(
            definition.translation_table_name(&self.config),
            self.config.locale_key.clone(),
        );
        if let Some(translations) = model.translations() {
            for translation in translations.iter() {
                set.push(translation.replicate(&[foreign_key.as_str()]));
            }
        }
        replica.set_translations(set);

        Ok(replica)
    }
}
