/*!
 * Translatable models.
 *
 * This module provides:
 * - `EntityDefinition` and `TranslatableModel`: what is translated and one parent with its translations
 * - `TranslationSet`: the in-memory translation records of one parent
 * - `TranslationResolver`: fallback chains and field-level fallback
 * - `AttributeRouter`: `name` / `name:locale` reads, writes and bulk fills
 * - `PersistenceCoordinator`: saving a parent together with its dirty translations
 * - `Translator`: the facade tying them to a repository
 */

pub mod entity;
pub mod persistence;
pub mod resolver;
pub mod router;
pub mod translation_set;
pub mod translator;

// Re-export main types
pub use entity::{EmptyValuePolicy, EntityDefinition, TranslatableModel};
pub use persistence::{ModelEvent, ModelObserver, PersistenceCoordinator};
pub use resolver::TranslationResolver;
pub use router::{AttributeRouter, LOCALE_DELIMITER};
pub use translation_set::TranslationSet;
pub use translator::Translator;
