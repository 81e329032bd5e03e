/*!
 * Integration tests for saving parents together with their translations
 */

use anyhow::Result;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use transloc::translatable::{ModelEvent, ModelObserver, TranslatableModel};
use transloc::{MemoryRepository, Translator};
use crate::common;

struct EventLog(Arc<Mutex<Vec<ModelEvent>>>);

impl ModelObserver for EventLog {
    fn notify(&self, event: ModelEvent, _model: &TranslatableModel) {
        self.0.lock().push(event);
    }
}

struct RejectUnpublished;

impl ModelObserver for RejectUnpublished {
    fn saving(&self, model: &TranslatableModel) -> bool {
        model.record().get("published") == Some(&json!(true))
    }
}

/// Test that a rejected parent save attempts no translation save
#[test]
fn test_save_withRejectedParent_shouldAttemptNoTranslation() -> Result<()> {
    common::init_logging();
    let repo = MemoryRepository::new();
    repo.fail_saves_on("posts");
    let translator = Translator::new(repo, common::scenario_config())?;
    let definition = common::post_definition();

    let mut post = translator.new_model(&definition);
    translator.set_attribute(&mut post, "title:en", json!("Hello"))?;
    translator.set_attribute(&mut post, "title:fr", json!("Bonjour"))?;

    assert!(!translator.save(&mut post)?);
    let log = translator.repository().save_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].table, "posts");
    assert!(!log[0].accepted);

    Ok(())
}

/// Test that the parent commit completes before any translation commit
#[test]
fn test_save_withNewParent_shouldCommitParentFirst() -> Result<()> {
    let translator = Translator::new(MemoryRepository::new(), common::scenario_config())?;
    let definition = common::post_definition();

    let mut post = translator.new_model(&definition);
    translator.set_attribute(&mut post, "slug", json!("hello"))?;
    translator.set_attribute(&mut post, "title:en", json!("Hello"))?;
    translator.set_attribute(&mut post, "title:fr", json!("Bonjour"))?;
    translator.translate_or_new(&mut post, Some("de".into()))?;

    assert!(translator.save(&mut post)?);

    let log = translator.repository().save_log();
    let tables: Vec<&str> = log.iter().map(|a| a.table.as_str()).collect();
    assert_eq!(tables, vec!["posts", "post_translations", "post_translations"]);

    let key = post.key().cloned().expect("post should have a key");
    for row in translator.repository().rows("post_translations") {
        assert_eq!(row.get("post_id"), Some(&key));
    }

    Ok(())
}

/// Test translation-only saves on a clean existing parent
#[test]
fn test_save_withCleanParent_shouldSaveTranslationsAndNotify() -> Result<()> {
    let (repo, key) = common::memory_with_post();
    let mut translator = Translator::new(repo, common::scenario_config())?;
    let events = Arc::new(Mutex::new(Vec::new()));
    translator.observe(EventLog(events.clone()));

    let definition = common::post_definition();
    let mut post = translator.find(&definition, &key)?.expect("post should exist");
    translator.set_attribute(&mut post, "title:de", json!("Hallo"))?;

    assert!(translator.save(&mut post)?);
    let log = translator.repository().save_log();
    assert!(log.iter().all(|a| a.table == "post_translations"));
    assert_eq!(log.len(), 1);
    assert_eq!(*events.lock(), vec![ModelEvent::Saved, ModelEvent::Updated]);

    Ok(())
}

/// Test that a dirty parent that fails to save keeps translations unsaved
#[test]
fn test_save_withDirtyParentRejected_shouldNotSaveTranslations() -> Result<()> {
    let (repo, key) = common::memory_with_post();
    let translator = Translator::new(repo, common::scenario_config())?;
    let definition = common::post_definition();
    let mut post = translator.find(&definition, &key)?.expect("post should exist");

    translator.set_attribute(&mut post, "slug", json!("renamed"))?;
    translator.set_attribute(&mut post, "title:de", json!("Hallo"))?;
    translator.repository().fail_saves_on("posts");

    assert!(!translator.save(&mut post)?);
    assert_eq!(translator.repository().rows("post_translations").len(), 2);
    assert!(post.translations().is_some_and(|s| s.has_dirty()));

    Ok(())
}

/// Test that a failing translation stops the loop but keeps earlier saves
#[test]
fn test_save_withFailingTranslation_shouldReportFailure() -> Result<()> {
    let repo = MemoryRepository::new();
    repo.fail_saves_after(2);
    let translator = Translator::new(repo, common::scenario_config())?;
    let definition = common::post_definition();

    let mut post = translator.new_model(&definition);
    for locale in ["en", "fr", "de"] {
        translator.set_attribute(&mut post, &format!("title:{}", locale), json!(locale))?;
    }

    assert!(!translator.save(&mut post)?);
    assert_eq!(translator.repository().rows("posts").len(), 1);
    assert_eq!(translator.repository().rows("post_translations").len(), 1);

    Ok(())
}

/// Test that an observer can cancel a save
#[test]
fn test_save_withVetoingObserver_shouldWriteNothing() -> Result<()> {
    let mut translator = Translator::new(MemoryRepository::new(), common::scenario_config())?;
    translator.observe(RejectUnpublished);
    let definition = common::post_definition();

    let mut post = translator.new_model(&definition);
    translator.set_attribute(&mut post, "title", json!("Draft"))?;
    assert!(!translator.save(&mut post)?);
    assert!(translator.repository().save_log().is_empty());

    translator.set_attribute(&mut post, "published", json!(true))?;
    assert!(translator.save(&mut post)?);

    Ok(())
}
