// ABOUTME: Dump and replay settings plus the optional TOML config file
// ABOUTME: CLI flags are layered over file values to build immutable configs

use crate::filters::DumpFilter;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::time::Duration;

pub const DEFAULT_MAX_CONNECTION_LIFETIME: Duration = Duration::from_secs(3600);

/// Settings for one `dump()` run
#[derive(Debug, Clone, Default)]
pub struct DumpConfig {
    /// Dump every user database on the server (system schemas excluded)
    pub all_databases: bool,
    pub filter: DumpFilter,
    /// Emit `DROP TABLE IF EXISTS` / `DROP VIEW IF EXISTS` before each create
    pub drop_table: bool,
    /// Export rows, not just structure
    pub include_data: bool,
    /// Emit `USE` even for a single database
    pub use_database: bool,
    /// Rows per INSERT statement; 0 or 1 writes one statement per row
    pub rows_per_insert: usize,
}

/// Settings for one `source()` run
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Target database; the URL path is used when unset
    pub database: Option<String>,
    /// Largest run of consecutive inserts merged into one; 0 or 1 disables merging
    pub merge_insert: usize,
    pub verify_insert_prefix: bool,
    pub reject_incomplete: bool,
    pub dry_run: bool,
    pub debug: bool,
    pub max_connection_lifetime: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            database: None,
            merge_insert: 0,
            verify_insert_prefix: false,
            reject_incomplete: false,
            dry_run: false,
            debug: false,
            max_connection_lifetime: DEFAULT_MAX_CONNECTION_LIFETIME,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub dump: DumpSection,
    #[serde(default)]
    pub source: SourceSection,
}

/// `[dump]` table; every key optional
#[derive(Debug, Deserialize, Default)]
pub struct DumpSection {
    pub databases: Option<Vec<String>>,
    pub exclude_databases: Option<Vec<String>>,
    pub all_databases: Option<bool>,
    pub tables: Option<Vec<String>>,
    pub exclude_tables: Option<Vec<String>>,
    pub drop_table: Option<bool>,
    pub include_data: Option<bool>,
    pub use_database: Option<bool>,
    pub rows_per_insert: Option<usize>,
}

/// `[source]` table; every key optional
#[derive(Debug, Deserialize, Default)]
pub struct SourceSection {
    pub database: Option<String>,
    pub merge_insert: Option<usize>,
    pub verify_insert_prefix: Option<bool>,
    pub reject_incomplete: Option<bool>,
    pub dry_run: Option<bool>,
    pub debug: Option<bool>,
    pub max_connection_lifetime_secs: Option<u64>,
}

pub fn load_config_file(path: &str) -> Result<ConfigFile> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path))?;
    let parsed: ConfigFile =
        toml::from_str(&raw).with_context(|| format!("Failed to parse TOML config at {}", path))?;

    Ok(parsed)
}

/// Dump options given on the command line; `None`/`false` defers to the file
#[derive(Debug, Default)]
pub struct DumpOverrides {
    pub databases: Option<Vec<String>>,
    pub exclude_databases: Option<Vec<String>>,
    pub all_databases: bool,
    pub tables: Option<Vec<String>>,
    pub exclude_tables: Option<Vec<String>>,
    pub drop_table: bool,
    pub include_data: bool,
    pub use_database: bool,
    pub rows_per_insert: Option<usize>,
}

impl DumpSection {
    pub fn resolve(self, cli: DumpOverrides) -> Result<DumpConfig> {
        let all_databases = cli.all_databases || self.all_databases.unwrap_or(false);
        let exclude_databases = cli.exclude_databases.or(self.exclude_databases);

        if !all_databases && exclude_databases.as_ref().is_some_and(|l| !l.is_empty()) {
            bail!("Invalid dump selection: --exclude-databases requires --all-databases");
        }

        let filter = DumpFilter::new(
            cli.databases.or(self.databases),
            exclude_databases,
            cli.tables.or(self.tables),
            cli.exclude_tables.or(self.exclude_tables),
        )
        .context("Invalid dump selection")?;

        Ok(DumpConfig {
            all_databases,
            filter,
            drop_table: cli.drop_table || self.drop_table.unwrap_or(false),
            include_data: cli.include_data || self.include_data.unwrap_or(false),
            use_database: cli.use_database || self.use_database.unwrap_or(false),
            rows_per_insert: cli.rows_per_insert.or(self.rows_per_insert).unwrap_or(0),
        })
    }
}

/// Replay options given on the command line; `None`/`false` defers to the file
#[derive(Debug, Default)]
pub struct SourceOverrides {
    pub database: Option<String>,
    pub merge_insert: Option<usize>,
    pub verify_insert_prefix: bool,
    pub reject_incomplete: bool,
    pub dry_run: bool,
    pub debug: bool,
}

impl SourceSection {
    pub fn resolve(self, cli: SourceOverrides) -> SourceConfig {
        let defaults = SourceConfig::default();

        SourceConfig {
            database: cli.database.or(self.database),
            merge_insert: cli
                .merge_insert
                .or(self.merge_insert)
                .unwrap_or(defaults.merge_insert),
            verify_insert_prefix: cli.verify_insert_prefix
                || self.verify_insert_prefix.unwrap_or(false),
            reject_incomplete: cli.reject_incomplete || self.reject_incomplete.unwrap_or(false),
            dry_run: cli.dry_run || self.dry_run.unwrap_or(false),
            debug: cli.debug || self.debug.unwrap_or(false),
            max_connection_lifetime: self
                .max_connection_lifetime_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.max_connection_lifetime),
        }
    }
}
