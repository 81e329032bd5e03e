/*!
 * Translation resolution.
 *
 * Probe order for a requested locale `L` with fallback enabled:
 * 1. `L` itself
 * 2. the base language of `L` when `L` is country based and its base is a
 *    valid locale, otherwise the global fallback locale
 * 3. the global fallback locale, even when step 2 already tried it
 * 4. with no global fallback configured, every other configured locale in
 *    catalog order
 *
 * Without fallback only step 1 runs. The resolver never mutates the set.
 */

use log::debug;
use serde_json::Value;

use super::entity::EmptyValuePolicy;
use super::translation_set::TranslationSet;
use crate::app_config::TranslatableConfig;
use crate::database::Record;
use crate::locales::{LocaleKey, Locales};

/// Computes fallback chains and resolves translations against a set
#[derive(Debug, Clone, Copy)]
pub struct TranslationResolver<'a> {
    locales: &'a Locales,
    config: &'a TranslatableConfig,
}

impl<'a> TranslationResolver<'a> {
    pub fn new(locales: &'a Locales, config: &'a TranslatableConfig) -> Self {
        Self { locales, config }
    }

    /// Record-level fallback flag after applying an override
    pub fn use_fallback(&self, with_fallback: Option<bool>) -> bool {
        with_fallback.unwrap_or(self.config.use_fallback)
    }

    /// Whether empty fields fall back to the global fallback locale
    pub fn use_property_fallback(&self, with_fallback: bool) -> bool {
        with_fallback && self.config.use_property_fallback
    }

    /// The locale probed in step 2 for `locale`
    pub fn fallback_locale_for(&self, locale: &LocaleKey) -> Option<LocaleKey> {
        let code = locale.as_str();
        if self.locales.is_country_based(code) {
            let base = self
                .locales
                .language_from_country_based(code)
                .filter(|base| self.locales.is_valid_locale(base));
            if let Some(base) = base {
                return Some(LocaleKey::new(base));
            }
        }
        self.locales.fallback()
    }

    /// Locales probed for `locale`, in order. May contain duplicates.
    pub fn probe_order(&self, locale: &LocaleKey, with_fallback: bool) -> Vec<LocaleKey> {
        let mut order = vec![locale.clone()];
        if !with_fallback {
            return order;
        }

        let locale_fallback = self.fallback_locale_for(locale);
        if let Some(fallback) = &locale_fallback {
            order.push(fallback.clone());
        }

        match self.locales.fallback() {
            Some(global) => order.push(global),
            None => {
                for configured in self.locales.all() {
                    let configured = LocaleKey::new(configured);
                    if configured != *locale && Some(&configured) != locale_fallback.as_ref() {
                        order.push(configured);
                    }
                }
            }
        }

        order
    }

    /// Index in `set` of the first record along the probe order
    pub fn resolve_index(
        &self,
        set: &TranslationSet,
        locale: &LocaleKey,
        with_fallback: bool,
    ) -> Option<usize> {
        for (step, candidate) in self.probe_order(locale, with_fallback).iter().enumerate() {
            if let Some(index) = set.position(candidate) {
                if step > 0 {
                    debug!("Resolved '{}' through fallback '{}'", locale, candidate);
                }
                return Some(index);
            }
        }
        debug!(
            "No translation for '{}' in {} (fallback: {})",
            locale,
            set.table(),
            with_fallback
        );
        None
    }

    /// The translation presented for `locale`
    pub fn resolve<'s>(
        &self,
        set: &'s TranslationSet,
        locale: &LocaleKey,
        with_fallback: bool,
    ) -> Option<&'s Record> {
        self.resolve_index(set, locale, with_fallback)
            .and_then(|index| set.get(index))
    }

    /// The value of `attribute` presented for `locale`.
    ///
    /// When the resolved value is empty under `policy` and property fallback
    /// applies, the value of the global fallback locale's record is used
    /// instead, provided that record exists.
    pub fn resolve_field(
        &self,
        set: &TranslationSet,
        attribute: &str,
        locale: &LocaleKey,
        with_fallback: bool,
        policy: EmptyValuePolicy,
    ) -> Option<Value> {
        let value = self
            .resolve(set, locale, with_fallback)
            .and_then(|record| record.get(attribute));

        if self.use_property_fallback(with_fallback) && policy.is_empty(value) {
            let fallback = self
                .locales
                .fallback()
                .and_then(|global| set.find(&global))
                .and_then(|record| record.get(attribute));
            if let Some(fallback) = fallback {
                debug!("Empty '{}' for '{}', using fallback value", attribute, locale);
                return Some(fallback.clone());
            }
        }

        value.cloned()
    }
}
