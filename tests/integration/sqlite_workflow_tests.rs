/*!
 * End-to-end tests over an on-disk SQLite database
 */

use anyhow::Result;
use serde_json::json;
use transloc::app_config::TranslatableConfig;
use transloc::errors::TranslatableError;
use transloc::translatable::EntityDefinition;
use transloc::{LocaleKey, SqliteRepository, Translator};
use std::sync::Arc;
use crate::common;

fn open_translator(repo: SqliteRepository) -> Result<Translator<SqliteRepository>> {
    common::init_logging();
    let config = TranslatableConfig {
        use_fallback: true,
        ..common::scenario_config()
    };
    Ok(Translator::new(repo, config)?)
}

/// Test creating, reading and reopening a translated record
#[test]
fn test_createAndReload_shouldPersistTranslations() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let definition = common::post_definition();

    let key = {
        let translator = open_translator(common::sqlite_repository(&temp_dir)?)?;
        let mut post = translator.new_model(&definition);
        translator.set_attribute(&mut post, "slug", json!("hello"))?;
        translator.set_attribute(&mut post, "title:en", json!("Hello"))?;
        translator.set_attribute(&mut post, "title:fr", json!("Bonjour"))?;
        assert!(translator.save(&mut post)?);
        post.key().cloned().expect("post should have a key")
    };

    let repo = SqliteRepository::open(temp_dir.path().join("transloc.db"))?;
    let translator = open_translator(repo)?;
    let mut post = translator.find(&definition, &key)?.expect("post should exist");

    assert_eq!(translator.get_attribute(&mut post, "title:fr")?, Some(json!("Bonjour")));
    assert_eq!(translator.get_attribute(&mut post, "title:de")?, Some(json!("Hello")));
    assert!(translator.has_translation(&mut post, Some("fr".into()))?);
    assert!(!translator.has_translation(&mut post, Some("de".into()))?);

    Ok(())
}

/// Test updating one translation and exporting all of them
#[test]
fn test_updateAndExport_shouldReflectChanges() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let translator = open_translator(common::sqlite_repository(&temp_dir)?)?;
    let definition = common::post_definition();

    let mut post = translator.new_model(&definition);
    translator.set_attribute(&mut post, "title:en", json!("Hello"))?;
    translator.set_attribute(&mut post, "body:en", json!("Text"))?;
    assert!(translator.save(&mut post)?);
    let key = post.key().cloned().expect("post should have a key");

    let mut post = translator.find(&definition, &key)?.expect("post should exist");
    translator.set_attribute(&mut post, "title:en", json!("Hi"))?;
    assert!(translator.save(&mut post)?);

    translator.refresh_translations(&mut post)?;
    let export = translator.translations_map(&mut post)?;
    assert_eq!(export.len(), 1);
    assert_eq!(export["en"].get("title"), Some(&json!("Hi")));
    assert_eq!(export["en"].get("body"), Some(&json!("Text")));

    Ok(())
}

/// Test deleting a subset of translations and then all of them
#[test]
fn test_deleteTranslations_shouldRemoveRowsAndReload() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let translator = open_translator(common::sqlite_repository(&temp_dir)?)?;
    let definition = common::post_definition();

    let mut post = translator.new_model(&definition);
    for (locale, title) in [("en", "Hello"), ("fr", "Bonjour"), ("de", "Hallo")] {
        translator.set_attribute(&mut post, &format!("title:{}", locale), json!(title))?;
    }
    assert!(translator.save(&mut post)?);

    let subset = [LocaleKey::from("fr"), LocaleKey::from("de")];
    assert_eq!(translator.delete_translations(&mut post, Some(&subset[..]))?, 2);
    assert_eq!(post.translations().map(|s| s.locales()), Some(vec![LocaleKey::from("en")]));

    assert_eq!(translator.delete_translations(&mut post, None)?, 1);
    assert!(post.translations().is_some_and(|s| s.is_empty()));

    Ok(())
}

/// Test serialization with hidden attributes and resolved translations
#[test]
fn test_toMap_shouldMergeResolvedTranslations() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut translator = open_translator(common::sqlite_repository(&temp_dir)?)?;
    let definition = Arc::new(EntityDefinition::new("post", ["title", "body"]).with_hidden(["secret"]));

    let mut post = translator.new_model(&definition);
    translator.set_attribute(&mut post, "secret", json!("s3cret"))?;
    translator.set_attribute(&mut post, "title:en", json!("Hello"))?;
    assert!(translator.save(&mut post)?);
    let key = post.key().cloned().expect("post should have a key");

    translator.locales_mut().set_current("de");
    let mut post = translator.find(&definition, &key)?.expect("post should exist");
    let map = translator.to_map(&mut post)?;

    assert_eq!(map.get("title"), Some(&json!("Hello")));
    assert_eq!(map.get("body"), Some(&json!(null)));
    assert_eq!(map.get("id"), Some(&key));
    assert!(!map.contains_key("secret"));

    Ok(())
}

/// Test replicating a record with its translations
#[test]
fn test_replicateWithTranslations_shouldCreateIndependentCopy() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let translator = open_translator(common::sqlite_repository(&temp_dir)?)?;
    let definition = common::post_definition();

    let mut post = translator.new_model(&definition);
    translator.set_attribute(&mut post, "slug", json!("original"))?;
    translator.set_attribute(&mut post, "title:en", json!("Hello"))?;
    translator.set_attribute(&mut post, "title:fr", json!("Bonjour"))?;
    assert!(translator.save(&mut post)?);

    let mut copy = translator.replicate_with_translations(&mut post, &[])?;
    translator.set_attribute(&mut copy, "slug", json!("copy"))?;
    assert!(translator.save(&mut copy)?);
    assert_ne!(copy.key(), post.key());

    let mut reloaded = translator
        .find(&definition, copy.key().expect("copy should have a key"))?
        .expect("copy should exist");
    assert_eq!(translator.get_attribute(&mut reloaded, "title:fr")?, Some(json!("Bonjour")));

    Ok(())
}

/// Test translate_or_fail on a missing locale
#[test]
fn test_translateOrFail_withMissingLocale_shouldReturnNotFound() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let translator = open_translator(common::sqlite_repository(&temp_dir)?)?;
    let definition = common::post_definition();

    let mut post = translator.new_model(&definition);
    translator.set_attribute(&mut post, "title:en", json!("Hello"))?;
    assert!(translator.save(&mut post)?);

    let error = translator.translate_or_fail(&mut post, "fr".into()).unwrap_err();
    assert!(matches!(error, TranslatableError::TranslationNotFound { .. }));
    assert!(translator.translate_or_fail(&mut post, "en".into()).is_ok());

    Ok(())
}

/// Test language directory lookups against SQLite
#[test]
fn test_languageDirectory_shouldResolveCodesAndFallback() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let translator = open_translator(common::sqlite_repository(&temp_dir)?)?;
    let languages = translator.languages();

    let french = languages.lookup_by_code("fr")?.expect("fr should exist");
    assert_eq!(french.name.as_deref(), Some("Français"));
    assert!(languages.lookup_by_code("nl")?.is_none());

    let fallback = languages.fallback_identifier()?.expect("fallback should exist");
    assert_eq!(LocaleKey::from(&fallback), LocaleKey::from("en"));

    Ok(())
}
