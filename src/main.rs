// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug, info, warn};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use transloc::app_config::{self, Config, LocaleEntry, LocalesSetting, TranslatableConfig};
use transloc::language_utils;
use transloc::{EntityDefinition, LocaleKey, SqliteRepository, Translator};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the configured locales
    Locales,

    /// Show a record with its translated attributes resolved
    Show {
        /// Entity name from the configuration
        entity: String,
        /// Primary key of the record
        id: String,
        /// Locale to resolve instead of the current one
        #[arg(long)]
        locale: Option<String>,
        /// Disable record-level fallback
        #[arg(long)]
        no_fallback: bool,
    },

    /// Export every translation of a record
    Export {
        /// Entity name from the configuration
        entity: String,
        /// Primary key of the record
        id: String,
    },

    /// Set an attribute (`name` or `name:locale`) and save
    Set {
        /// Entity name from the configuration
        entity: String,
        /// Primary key of the record
        id: String,
        /// Attribute key, e.g. `title:fr`
        key: String,
        /// New value; parsed as JSON when possible
        value: String,
    },

    /// Delete translations of a record
    DeleteTranslations {
        /// Entity name from the configuration
        entity: String,
        /// Primary key of the record
        id: String,
        /// Locales to delete; all when omitted
        locales: Vec<String>,
    },

    /// Generate shell completions for transloc
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// transloc - translatable records
///
/// Reads and writes per-locale translations of records stored in SQLite,
/// resolving missing locales through the configured fallback chain.
#[derive(Parser, Debug)]
#[command(name = "transloc")]
#[command(version = "1.0.0")]
#[command(about = "Translatable records with locale fallback")]
#[command(long_about = "transloc resolves per-locale translations of records stored in SQLite.

EXAMPLES:
    transloc locales                              # List configured locales
    transloc show post 1                          # Show post 1 in the current locale
    transloc show post 1 --locale de-AT           # Resolve through the fallback chain
    transloc show post 1 --locale de --no-fallback
    transloc export post 1                        # Every translation of post 1
    transloc set post 1 title:fr 'Bonjour'        # Write a translated attribute
    transloc delete-translations post 1 fr de     # Delete two translations
    transloc completions bash > transloc.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a starter
    one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// SQLite database path
    #[arg(short, long, default_value = "transloc.db", global = true)]
    database: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Colour and label for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, label) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                colour,
                now,
                label,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

fn main() -> Result<()> {
    // Initialize the logger once with trace level and narrow it below
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "transloc", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli.config_path, cli.log_level.clone())?;
    log::set_max_level(level_filter(&config.log_level));
    config.validate().context("Configuration validation failed")?;

    let repo = SqliteRepository::open(&cli.database)
        .with_context(|| format!("Failed to open database: {}", cli.database.display()))?;
    let translator = Translator::from_config(repo, &config)?;

    match cli.command {
        Commands::Locales => list_locales(&translator),
        Commands::Show {
            entity,
            id,
            locale,
            no_fallback,
        } => show(&translator, &config, &entity, &id, locale, no_fallback),
        Commands::Export { entity, id } => export(&translator, &config, &entity, &id),
        Commands::Set {
            entity,
            id,
            key,
            value,
        } => set(&translator, &config, &entity, &id, &key, &value),
        Commands::DeleteTranslations {
            entity,
            id,
            locales,
        } => delete_translations(&translator, &config, &entity, &id, &locales),
        Commands::Completions { .. } => Ok(()),
    }
}

/// Load the configuration, creating a starter file when it doesn't exist
fn load_config(config_path: &str, log_level: Option<CliLogLevel>) -> Result<Config> {
    let mut config = if Path::new(config_path).exists() {
        Config::load(config_path)?
    } else {
        warn!("Config file not found at '{}', creating starter config.", config_path);

        let config = starter_config();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    // Command line log level wins over the file
    if let Some(log_level) = log_level {
        config.log_level = log_level.into();
    }
    Ok(config)
}

fn starter_config() -> Config {
    Config {
        translatable: TranslatableConfig {
            locales: LocalesSetting::List(vec![LocaleEntry::Code("en".to_string())]),
            fallback_locale: Some("en".to_string()),
            ..TranslatableConfig::default()
        },
        entities: vec![EntityDefinition::new("post", ["title", "body"])],
        ..Config::default()
    }
}

fn definition(config: &Config, entity: &str) -> Result<Arc<EntityDefinition>> {
    config
        .entity(entity)
        .cloned()
        .map(Arc::new)
        .ok_or_else(|| anyhow!("Unknown entity '{}'", entity))
}

/// Numeric ids are looked up as numbers, anything else as text
fn parse_key(id: &str) -> Value {
    id.parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(id.to_string()))
}

fn parse_value(value: &str) -> Value {
    serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

fn find_model(
    translator: &Translator<SqliteRepository>,
    config: &Config,
    entity: &str,
    id: &str,
) -> Result<transloc::TranslatableModel> {
    let definition = definition(config, entity)?;
    translator
        .find(&definition, &parse_key(id))?
        .ok_or_else(|| anyhow!("No {} with id {}", entity, id))
}

fn list_locales(translator: &Translator<SqliteRepository>) -> Result<()> {
    let locales = translator.locales();
    let current = locales.current();
    let fallback = locales.fallback();

    for locale in locales.all() {
        let name = language_utils::language_name(locale, locales.separator())
            .unwrap_or_else(|| "-".to_string());
        let mut marks = Vec::new();
        if current == locale.as_str() {
            marks.push("current");
        }
        if fallback.as_ref().is_some_and(|f| f == locale.as_str()) {
            marks.push("fallback");
        }
        println!("{:<8} {:<24} {}", locale, name, marks.join(", "));
    }
    Ok(())
}

fn show(
    translator: &Translator<SqliteRepository>,
    config: &Config,
    entity: &str,
    id: &str,
    locale: Option<String>,
    no_fallback: bool,
) -> Result<()> {
    let mut model = find_model(translator, config, entity, id)?;
    if let Some(locale) = locale {
        if !translator.locales().is_valid_locale(&locale) {
            warn!("Locale '{}' is not configured", locale);
        }
        model.set_default_locale(Some(LocaleKey::new(locale)));
    }
    if no_fallback {
        model.set_use_translation_fallback(Some(false));
    }

    debug!(
        "Resolving {} {} in '{}' (fallback: {})",
        entity,
        id,
        translator.locale(&model),
        translator.use_fallback(&model)
    );
    let map = translator.to_map(&mut model)?;
    println!("{}", serde_json::to_string_pretty(&map)?);
    Ok(())
}

fn export(
    translator: &Translator<SqliteRepository>,
    config: &Config,
    entity: &str,
    id: &str,
) -> Result<()> {
    let mut model = find_model(translator, config, entity, id)?;
    let map = translator.translations_map(&mut model)?;
    println!("{}", serde_json::to_string_pretty(&map)?);
    Ok(())
}

fn set(
    translator: &Translator<SqliteRepository>,
    config: &Config,
    entity: &str,
    id: &str,
    key: &str,
    value: &str,
) -> Result<()> {
    let mut model = find_model(translator, config, entity, id)?;
    translator.set_attribute(&mut model, key, parse_value(value))?;

    if !translator.save(&mut model)? {
        return Err(anyhow!("Saving {} {} was rejected", entity, id));
    }
    info!("Updated {} of {} {}", key, entity, id);
    Ok(())
}

fn delete_translations(
    translator: &Translator<SqliteRepository>,
    config: &Config,
    entity: &str,
    id: &str,
    locales: &[String],
) -> Result<()> {
    let mut model = find_model(translator, config, entity, id)?;
    let locales: Vec<LocaleKey> = locales.iter().map(LocaleKey::new).collect();
    let filter = if locales.is_empty() {
        None
    } else {
        Some(locales.as_slice())
    };

    let deleted = translator.delete_translations(&mut model, filter)?;
    info!("Deleted {} translation(s) of {} {}", deleted, entity, id);
    Ok(())
}
