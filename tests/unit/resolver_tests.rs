/*!
 * Tests for translation resolution through the public API
 */

use serde_json::json;
use transloc::app_config::TranslatableConfig;
use transloc::translatable::{TranslationResolver, TranslationSet};
use transloc::{LocaleKey, Locales, Record};
use crate::common;

fn set(locales: &[&str]) -> TranslationSet {
    let records = locales
        .iter()
        .map(|l| {
            Record::from_row(
                "post_translations",
                common::row(&[("locale", json!(l)), ("title", json!(format!("title {}", l)))]),
            )
        })
        .collect();
    TranslationSet::from_records("post_translations", "locale", records)
}

fn resolved(config: &TranslatableConfig, set: &TranslationSet, locale: &str, fallback: bool) -> Option<String> {
    let locales = Locales::new(config).unwrap();
    let resolver = TranslationResolver::new(&locales, config);
    resolver
        .resolve(set, &LocaleKey::from(locale), fallback)
        .and_then(|r| r.get("locale"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

/// Test the fallback chain when the country base is not a valid locale
#[test]
fn test_resolve_withInvalidCountryBase_shouldUseGlobalFallback() {
    let config = TranslatableConfig::with_locales(["en"]).fallback("en");
    let translations = set(&["en"]);

    assert_eq!(resolved(&config, &translations, "de-AT", true).as_deref(), Some("en"));
}

/// Test that a valid country base wins over the global fallback
#[test]
fn test_resolve_withValidCountryBase_shouldPreferBase() {
    let config = TranslatableConfig::with_locales(["de", "en"]).fallback("en");
    let translations = set(&["en", "de"]);

    assert_eq!(resolved(&config, &translations, "de-AT", true).as_deref(), Some("de"));
}

/// Test that the base language falls through to the global fallback when missing
#[test]
fn test_resolve_withMissingBaseRecord_shouldReachGlobalFallback() {
    let config = TranslatableConfig::with_locales(["de", "en"]).fallback("en");
    let translations = set(&["en"]);

    assert_eq!(resolved(&config, &translations, "de-AT", true).as_deref(), Some("en"));
}

/// Test strictness without fallback
#[test]
fn test_resolve_withoutFallback_shouldNotSubstitute() {
    let config = TranslatableConfig::with_locales(["en", "fr"]).fallback("en");
    let translations = set(&["en"]);

    assert_eq!(resolved(&config, &translations, "fr", false), None);
    assert_eq!(resolved(&config, &translations, "en", false).as_deref(), Some("en"));
}

/// Test that absence is representable when nothing matches
#[test]
fn test_resolve_withEmptySet_shouldReturnNone() {
    let config = common::scenario_config();
    let translations = set(&[]);

    assert_eq!(resolved(&config, &translations, "fr", true), None);
}

/// Test the configured-locale sweep without a global fallback
#[test]
fn test_resolve_withoutGlobalFallback_shouldSweepInCatalogOrder() {
    let config = TranslatableConfig::with_locales(["en", "fr", "de"]);
    let translations = set(&["de", "fr"]);

    assert_eq!(resolved(&config, &translations, "en", true).as_deref(), Some("fr"));
    assert_eq!(resolved(&config, &translations, "en", false), None);
}
