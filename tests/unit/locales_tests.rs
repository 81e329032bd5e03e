/*!
 * Tests for the locale catalog
 */

use std::collections::BTreeMap;
use transloc::app_config::{LocaleEntry, LocalesSetting, TranslatableConfig};
use transloc::errors::ConfigError;
use transloc::{LocaleKey, Locales};

fn tree_config() -> TranslatableConfig {
    let mut countries = BTreeMap::new();
    countries.insert("en".to_string(), vec!["US".to_string(), "GB".to_string()]);
    TranslatableConfig {
        locales: LocalesSetting::List(vec![
            LocaleEntry::Countries(countries),
            LocaleEntry::Code("fr".to_string()),
        ]),
        ..TranslatableConfig::default()
    }
}

/// Test membership with country variants
#[test]
fn test_isValidLocale_withCountryTree_shouldAcceptVariants() {
    let locales = Locales::new(&tree_config()).unwrap();

    for code in ["en", "en-US", "en-GB", "fr"] {
        assert!(locales.is_valid_locale(code), "{} should be valid", code);
    }
    assert!(!locales.is_valid_locale("en-AU"));
    assert!(!locales.is_valid_locale("de"));
}

/// Test decomposition on the configured separator
#[test]
fn test_decompose_withSeparator_shouldSplitOnce() {
    let config = TranslatableConfig {
        locale_separator: "_".to_string(),
        ..tree_config()
    };
    let locales = Locales::new(&config).unwrap();

    assert_eq!(locales.decompose("en_US"), Some(("en", "US")));
    assert_eq!(locales.decompose("en-US"), None);
    assert!(locales.is_valid_locale("en_GB"));
    assert_eq!(locales.country_locale("pt", "BR"), "pt_BR");
}

/// Test that empty configuration is fatal
#[test]
fn test_new_withEmptyConfiguration_shouldFail() {
    let result = Locales::new(&TranslatableConfig::default());
    assert_eq!(result.unwrap_err(), ConfigError::LocalesNotConfigured);
}

/// Test current locale precedence
#[test]
fn test_current_shouldPreferForcedThenRuntimeThenFallback() {
    let mut locales = Locales::new(&tree_config().fallback("fr")).unwrap();
    assert_eq!(locales.current(), LocaleKey::from("fr"));

    locales.set_current("en-GB");
    assert_eq!(locales.current(), LocaleKey::from("en-GB"));

    let forced = TranslatableConfig {
        locale: Some("en".to_string()),
        ..tree_config()
    };
    let mut locales = Locales::new(&forced).unwrap();
    locales.set_current("fr");
    assert_eq!(locales.current(), LocaleKey::from("en"));
}

/// Test runtime catalog edits
#[test]
fn test_addAndForget_shouldUpdateCatalog() {
    let mut locales = Locales::new(&tree_config()).unwrap();

    locales.add("nl");
    assert!(locales.is_valid_locale("nl"));

    locales.forget("en-US");
    assert!(!locales.is_valid_locale("en-US"));
    assert!(locales.is_valid_locale("en"));
}
