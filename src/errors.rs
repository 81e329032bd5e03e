/*!
 * Error types for the transloc library.
 *
 * This module contains custom error types for the different layers of the
 * library, using the thiserror crate for ergonomic error definitions.
 *
 * A missing translation is never an error: lookups return `Option`. The only
 * translation-level error is `TranslationNotFound`, raised by the explicit
 * `translate_or_fail` API.
 */

use thiserror::Error;

/// Errors raised while building the locale catalog or entity definitions.
///
/// These are fatal: every resolution depends on a valid configuration, so
/// they surface when the catalog is constructed rather than per call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The `locales` setting is missing or empty
    #[error("No locales configured: set `translatable.locales` in the configuration")]
    LocalesNotConfigured,

    /// A locale entry could not be used
    #[error("Invalid locale entry: {0}")]
    InvalidLocale(String),

    /// An entity definition is incomplete or inconsistent
    #[error("Invalid entity definition `{entity}`: {message}")]
    InvalidEntity {
        /// Entity name as configured
        entity: String,
        /// What is wrong with it
        message: String,
    },
}

/// Errors that can occur inside a repository implementation
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Error reported by SQLite
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A table or column name that is not a plain identifier
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// The connection mutex was poisoned by a panicking holder
    #[error("Failed to acquire database lock: {0}")]
    LockPoisoned(String),

    /// A value that cannot be stored in the backing store
    #[error("Unsupported value for column `{column}`: {message}")]
    UnsupportedValue {
        /// Column the value was destined for
        column: String,
        /// Reason for the rejection
        message: String,
    },
}

/// Errors surfaced by the translatable layer
#[derive(Error, Debug)]
pub enum TranslatableError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from the repository
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Raised only by `translate_or_fail`
    #[error("No translation for locale `{locale}` on `{entity}`")]
    TranslationNotFound {
        /// Entity name
        entity: String,
        /// Requested locale
        locale: String,
    },

    /// Translations cannot be linked to a parent without a primary key
    #[error("Parent `{0}` has no primary key; save it before saving its translations")]
    MissingParentKey(String),
}

/// Main application error type used by the command line binary
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the translatable layer
    #[error("Translatable error: {0}")]
    Translatable(#[from] TranslatableError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        Self::Translatable(TranslatableError::Config(error))
    }
}

impl From<RepositoryError> for AppError {
    fn from(error: RepositoryError) -> Self {
        Self::Translatable(TranslatableError::Repository(error))
    }
}
