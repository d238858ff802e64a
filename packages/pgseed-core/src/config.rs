//! Seeding configuration.

use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SeedError;

/// Environment variable naming the read-only production database.
pub const SOURCE_DB_ENV: &str = "PG_READONLY";

/// Name of the local database that seeding writes into.
pub const TARGET_DB: &str = "local_prod";

/// Seeding configuration.
///
/// Passed explicitly into the pipeline; nothing here is read from ambient
/// process state after [`SeedConfig::load`] returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Tables downloaded in their entirety
    #[serde(default)]
    pub small_tables: Vec<String>,
    /// Tables too large to copy fully, mapped to a sampling fraction (0, 1]
    #[serde(default)]
    pub large_tables: BTreeMap<String, f64>,
    /// Raw SQL appended verbatim after the rewritten table definitions
    #[serde(default)]
    pub alterations: Vec<String>,
    /// Shop ids scoping sampled extraction; at least one required
    #[serde(default)]
    pub shop_ids: Vec<String>,
    /// Connection string of the read-only source database
    #[serde(skip)]
    pub source_db: String,
    /// Name of the local target database; fixed, not read from the file
    #[serde(skip, default = "default_target_db")]
    pub target_db: String,
    /// Parent directory of the raw/ and processed/ handoff directories
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
}

fn default_target_db() -> String {
    TARGET_DB.to_string()
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

impl SeedConfig {
    /// Loads the configuration file, resolves the source database from the
    /// environment, and validates the result.
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let text = fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: SeedConfig =
            serde_json::from_str(&text).map_err(|source| SeedError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        config.source_db = env::var(SOURCE_DB_ENV).map_err(|_| SeedError::MissingEnv {
            name: SOURCE_DB_ENV,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the classification and sampling invariants.
    ///
    /// Every table name must appear in exactly one classification, every
    /// sampling fraction must lie in (0, 1], and at least one shop id must
    /// be configured.
    pub fn validate(&self) -> Result<(), SeedError> {
        let mut seen = BTreeSet::new();
        for table in &self.small_tables {
            if !seen.insert(table.as_str()) {
                return Err(SeedError::InvalidConfig {
                    reason: format!("table '{}' listed more than once", table),
                });
            }
        }
        for table in self.large_tables.keys() {
            if !seen.insert(table.as_str()) {
                return Err(SeedError::InvalidConfig {
                    reason: format!("table '{}' classified as both small and large", table),
                });
            }
        }
        for (table, rate) in &self.large_tables {
            if !(*rate > 0.0 && *rate <= 1.0) {
                return Err(SeedError::InvalidConfig {
                    reason: format!("sampling rate {} for table '{}' not in (0, 1]", rate, table),
                });
            }
        }
        if self.shop_ids.is_empty() {
            return Err(SeedError::InvalidConfig {
                reason: "at least one shop id is required".to_string(),
            });
        }
        Ok(())
    }

    /// All configured tables, small tables first.
    ///
    /// This is the order used for schema download and local drops.
    pub fn all_tables(&self) -> Vec<&str> {
        self.small_tables
            .iter()
            .map(|t| t.as_str())
            .chain(self.large_tables.keys().map(|t| t.as_str()))
            .collect()
    }

    /// Directory holding the downloaded dumps.
    pub fn raw_dir(&self) -> PathBuf {
        self.work_dir.join("raw")
    }

    /// Directory holding the rewritten schema.
    pub fn processed_dir(&self) -> PathBuf {
        self.work_dir.join("processed")
    }

    /// Destination of the raw schema dump.
    pub fn raw_schema_path(&self) -> PathBuf {
        self.raw_dir().join("prod.schema.sql")
    }

    /// Destination of the rewritten schema.
    pub fn processed_schema_path(&self) -> PathBuf {
        self.processed_dir().join("prod.schema.sql")
    }

    /// Destination of the small-table data dump.
    pub fn raw_data_path(&self) -> PathBuf {
        self.raw_dir().join("prod.data.sql")
    }

    /// Destination of one sampled table's extract.
    ///
    /// The name carries the sampling rate so download and load agree on the
    /// file even across flows that apply no sampling.
    pub fn sample_path(&self, table: &str, rate: f64) -> PathBuf {
        self.raw_dir().join(format!("{}_{}.csv", table, rate))
    }
}
