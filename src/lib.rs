/*!
 * # transloc - translatable records
 *
 * A Rust library that resolves per-locale translation records of a parent
 * entity, with configurable fallback when a locale or a field is missing.
 *
 * ## Features
 *
 * - Locale catalog with country variants (`en` → `en-US`, `en-GB`)
 * - Record-level fallback: country base, then global fallback locale
 * - Field-level fallback for empty values
 * - `name:locale` attribute access and bulk fill
 * - Saving a parent and its dirty translations as one logical unit
 * - SQLite and in-memory repositories
 * - ISO 639 language names for language directory entries
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `locales`: Locale catalog and the `LocaleKey` type
 * - `language_directory`: Language rows keyed by code
 * - `language_utils`: ISO language code utilities
 * - `database`: The `Repository` trait and its implementations
 * - `translatable`: Translation sets, resolution, routing and persistence
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod database;
pub mod errors;
pub mod language_directory;
pub mod language_utils;
pub mod locales;
pub mod translatable;

// Re-export main types for easier usage
pub use app_config::{Config, TranslatableConfig};
pub use database::{MemoryRepository, Record, Repository, SqliteRepository};
pub use errors::{AppError, ConfigError, RepositoryError, TranslatableError};
pub use language_directory::{LanguageDirectory, LanguageRecord};
pub use locales::{LocaleKey, Locales};
pub use translatable::{EntityDefinition, TranslatableModel, TranslationSet, Translator};
