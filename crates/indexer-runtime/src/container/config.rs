//! # Indexer Configuration
//!
//! Loaded from a TOML file; every key is optional and falls back to the
//! defaults below. Two environment variables override the file:
//!
//! - `IX_DATABASE_DIR` - `indexer.database_directory`
//! - `IX_X_CONFIRMATIONS` - `indexer.x_confirmations`
//!
//! ```toml
//! [source]
//! path = "blocks.jsonl"
//! max_blocks = 0            # 0 = unlimited
//! publish_period_ms = 0     # 0 = no pacing
//! strict = false            # true = stop on the first malformed record
//!
//! [indexer]
//! x_confirmations = 6
//! database_directory = "./data/index"
//! channel_capacity = 1000
//!
//! [cache]
//! max_blocks = 0            # 0 = keep everything for the session
//!
//! [test]
//! run = false
//! num_block_test_cases = 0
//! num_address_test_cases = 0
//! block_test_directory = "./fixtures/blocks"
//! address_test_directory = "./fixtures/addresses"
//! ```

use ix_01_block_source::SourceConfig;
use ix_02_hot_cache::CacheConfig;
use serde::Deserialize;
use shared_bus::DEFAULT_CHANNEL_CAPACITY;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const ENV_DATABASE_DIR: &str = "IX_DATABASE_DIR";
pub const ENV_X_CONFIRMATIONS: &str = "IX_X_CONFIRMATIONS";

pub const DEFAULT_X_CONFIRMATIONS: u64 = 6;
pub const DEFAULT_DATABASE_DIR: &str = "./data/index";

/// Complete indexer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerConfig {
    pub source: SourceConfig,
    pub indexer: IndexerSettings,
    pub cache: CacheConfig,
    pub test: TestConfig,
}

/// Indexing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerSettings {
    /// Minimum confirmation count for a block to be indexed.
    pub x_confirmations: u64,
    /// Where the key-value store lives.
    pub database_directory: PathBuf,
    /// Bound of the reader → indexer channel.
    pub channel_capacity: usize,
}

impl Default for IndexerSettings {
    fn default() -> Self {
        Self {
            x_confirmations: DEFAULT_X_CONFIRMATIONS,
            database_directory: PathBuf::from(DEFAULT_DATABASE_DIR),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Fixture harness settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestConfig {
    pub run: bool,
    pub num_block_test_cases: usize,
    pub num_address_test_cases: usize,
    pub block_test_directory: PathBuf,
    pub address_test_directory: PathBuf,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            run: false,
            num_block_test_cases: 0,
            num_address_test_cases: 0,
            block_test_directory: PathBuf::from("./fixtures/blocks"),
            address_test_directory: PathBuf::from("./fixtures/addresses"),
        }
    }
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::new("blocks.jsonl"),
            indexer: IndexerSettings::default(),
            cache: CacheConfig::unbounded(),
            test: TestConfig::default(),
        }
    }
}

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid value {value:?} for {name}: {reason}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    source: SourceSection,
    #[serde(default)]
    indexer: IndexerSection,
    #[serde(default)]
    cache: CacheSection,
    #[serde(default)]
    test: TestSection,
}

#[derive(Debug, Deserialize, Default)]
struct SourceSection {
    path: Option<PathBuf>,
    max_blocks: Option<u64>,
    publish_period_ms: Option<u64>,
    strict: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct IndexerSection {
    x_confirmations: Option<u64>,
    database_directory: Option<PathBuf>,
    channel_capacity: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct CacheSection {
    max_blocks: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct TestSection {
    run: Option<bool>,
    num_block_test_cases: Option<usize>,
    num_address_test_cases: Option<usize>,
    block_test_directory: Option<PathBuf>,
    address_test_directory: Option<PathBuf>,
}

impl IndexerConfig {
    /// Load from a TOML file, then apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            message: e.to_string(),
        })?;

        let mut config = Self::parse(&content)?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Parse from a TOML string. No environment lookups.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let defaults = Self::default();

        let source = SourceConfig {
            path: file.source.path.unwrap_or(defaults.source.path),
            max_blocks: file.source.max_blocks.unwrap_or(0),
            publish_period: Duration::from_millis(file.source.publish_period_ms.unwrap_or(0)),
            strict: file.source.strict.unwrap_or(false),
        };

        let indexer = IndexerSettings {
            x_confirmations: file
                .indexer
                .x_confirmations
                .unwrap_or(defaults.indexer.x_confirmations),
            database_directory: file
                .indexer
                .database_directory
                .unwrap_or(defaults.indexer.database_directory),
            channel_capacity: file
                .indexer
                .channel_capacity
                .unwrap_or(defaults.indexer.channel_capacity),
        };

        let cache = CacheConfig::bounded(file.cache.max_blocks.unwrap_or(0));

        let t = file.test;
        let test = TestConfig {
            run: t.run.unwrap_or(defaults.test.run),
            num_block_test_cases: t.num_block_test_cases.unwrap_or(0),
            num_address_test_cases: t.num_address_test_cases.unwrap_or(0),
            block_test_directory: t
                .block_test_directory
                .unwrap_or(defaults.test.block_test_directory),
            address_test_directory: t
                .address_test_directory
                .unwrap_or(defaults.test.address_test_directory),
        };

        Ok(Self {
            source,
            indexer,
            cache,
            test,
        })
    }

    /// Apply `IX_*` overrides using `lookup` to read variables.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATABASE_DIR) {
            self.indexer.database_directory = PathBuf::from(dir);
        }
        if let Some(value) = lookup(ENV_X_CONFIRMATIONS) {
            self.indexer.x_confirmations =
                value.trim().parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::InvalidEnv {
                        name: ENV_X_CONFIRMATIONS,
                        value: value.clone(),
                        reason: e.to_string(),
                    }
                })?;
        }
        Ok(())
    }
}
