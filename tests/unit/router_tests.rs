/*!
 * Tests for attribute routing through the translator
 */

use anyhow::Result;
use serde_json::{Value, json};
use transloc::app_config::TranslatableConfig;
use transloc::translatable::EntityDefinition;
use transloc::{LocaleKey, MemoryRepository, Translator};
use std::sync::Arc;
use crate::common;

/// Test the end-to-end scenario: en Hello, fr Bonjour, fallback en
#[test]
fn test_getAttribute_scenario_shouldFollowFallbackFlag() -> Result<()> {
    let (repo, key) = common::memory_with_post();
    let translator = Translator::new(repo, common::scenario_config())?;
    let definition = common::post_definition();
    let mut post = translator.find(&definition, &key)?.expect("post should exist");

    assert_eq!(translator.get_attribute(&mut post, "title:fr")?, Some(json!("Bonjour")));
    assert_eq!(translator.get_attribute(&mut post, "title:de")?, None);

    post.set_use_translation_fallback(Some(true));
    assert_eq!(translator.get_attribute(&mut post, "title:de")?, Some(json!("Hello")));

    Ok(())
}

/// Test that the current locale drives plain attribute names
#[test]
fn test_getAttribute_withCurrentLocale_shouldResolveIt() -> Result<()> {
    let (repo, key) = common::memory_with_post();
    let mut translator = Translator::new(repo, common::scenario_config())?;
    translator.locales_mut().set_current("fr");
    let definition = common::post_definition();
    let mut post = translator.find(&definition, &key)?.expect("post should exist");

    assert_eq!(translator.get_attribute(&mut post, "title")?, Some(json!("Bonjour")));

    post.set_default_locale(Some(LocaleKey::from("en")));
    assert_eq!(translator.get_attribute(&mut post, "title")?, Some(json!("Hello")));
    assert_eq!(translator.get_attribute(&mut post, "slug")?, Some(json!("hello")));

    Ok(())
}

/// Test that writes reuse the loaded translation
#[test]
fn test_setAttribute_onExistingLocale_shouldUpdateLoadedRecord() -> Result<()> {
    let (repo, key) = common::memory_with_post();
    let translator = Translator::new(repo, common::scenario_config())?;
    let definition = common::post_definition();
    let mut post = translator.find(&definition, &key)?.expect("post should exist");

    translator.set_attribute(&mut post, "title:fr", json!("Salut"))?;
    assert_eq!(post.translations().map(|s| s.len()), Some(2));
    assert!(translator.save(&mut post)?);

    let rows = translator.repository().rows("post_translations");
    assert!(rows.iter().any(|r| r.get("title") == Some(&json!("Salut"))));
    assert_eq!(rows.len(), 2);

    Ok(())
}

/// Test bulk fill with locale maps and suffixed keys
#[test]
fn test_fill_withMixedKeys_shouldRouteEachEntry() -> Result<()> {
    let translator = Translator::new(MemoryRepository::new(), common::scenario_config())?;
    let definition = common::post_definition();
    let mut post = translator.new_model(&definition);

    let Value::Object(attributes) = json!({
        "slug": "greeting",
        "fr": {"title": "Bonjour", "body": "Texte"},
        "title:de": "Hallo",
        "title": "Hello"
    }) else {
        unreachable!()
    };
    translator.fill(&mut post, attributes)?;

    assert_eq!(post.record().get("slug"), Some(&json!("greeting")));
    assert_eq!(translator.get_attribute(&mut post, "body:fr")?, Some(json!("Texte")));
    assert_eq!(translator.get_attribute(&mut post, "title:de")?, Some(json!("Hallo")));
    assert_eq!(translator.get_attribute(&mut post, "title:en")?, Some(json!("Hello")));

    assert!(translator.save(&mut post)?);
    assert_eq!(translator.repository().rows("post_translations").len(), 3);

    Ok(())
}

/// Test property fallback for empty fields
#[test]
fn test_getAttribute_withEmptyField_shouldUsePropertyFallback() -> Result<()> {
    let config = TranslatableConfig {
        use_fallback: true,
        use_property_fallback: true,
        ..common::scenario_config()
    };
    let translator = Translator::new(MemoryRepository::new(), config)?;
    let definition = Arc::new(EntityDefinition::new("post", ["title", "body"]));
    let mut post = translator.new_model(&definition);

    translator.set_attribute(&mut post, "body:en", json!("English body"))?;
    translator.set_attribute(&mut post, "title:fr", json!("Bonjour"))?;
    translator.set_attribute(&mut post, "body:fr", json!(""))?;

    assert_eq!(translator.get_attribute(&mut post, "body:fr")?, Some(json!("English body")));
    assert_eq!(translator.get_attribute(&mut post, "title:fr")?, Some(json!("Bonjour")));

    Ok(())
}
