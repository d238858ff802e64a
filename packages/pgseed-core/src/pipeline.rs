//! Ordered seeding flows over the external Postgres client tools.
//!
//! Every flow is a strictly linear sequence of steps. Steps run in order
//! regardless of earlier outcomes: expected failures (dropping a table that
//! does not exist, re-running against a populated database) are swallowed by
//! the silent run policy, and only the sampled-table load shows tool output
//! to the operator.

use std::fs;

use tracing::{error, info};

use crate::command::{Cmd, CommandRunner, RunPolicy};
use crate::config::SeedConfig;
use crate::schema;
use crate::sql::{psql_command, psql_file, shop_id_predicate};

/// One named operation in a seeding flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Drop and recreate the local database
    ResetDatabase,
    /// Dump the schema of every configured table from the source
    DownloadSchema,
    /// Rewrite the raw schema dump into the processed schema
    ProcessSchema,
    /// Drop every configured table locally, cascading constraints
    DropTables,
    /// Load the processed schema into the local database
    CreateTables,
    /// Dump full data for the small tables from the source
    DownloadSmallTableData,
    /// Extract a random sample of each large table, scoped to the shop ids
    DownloadLargeTableSamples,
    /// Extract all shop-id rows of each large table, no sampling
    DownloadLargeTablesForShops,
    /// Load the small-table data dump locally
    LoadSmallTableData,
    /// Load each large table's extract locally
    LoadLargeTableData,
    /// Truncate the local large tables before a shop-scoped refresh
    TruncateLargeTables,
}

impl Step {
    /// Stable name used in progress output.
    pub fn name(&self) -> &'static str {
        match self {
            Step::ResetDatabase => "reset_database",
            Step::DownloadSchema => "download_schema",
            Step::ProcessSchema => "process_schema",
            Step::DropTables => "drop_tables",
            Step::CreateTables => "create_tables",
            Step::DownloadSmallTableData => "download_data_for_small_tables",
            Step::DownloadLargeTableSamples => "download_sample_of_data_for_large_tables",
            Step::DownloadLargeTablesForShops => "download_shop_specific_data_for_large_tables",
            Step::LoadSmallTableData => "load_data_for_small_tables",
            Step::LoadLargeTableData => "load_data_for_large_tables",
            Step::TruncateLargeTables => "truncate_large_tables",
        }
    }
}

/// Steps for a data refresh against an existing local database.
///
/// Tables are dropped and recreated from the rewritten schema first, which
/// clears constraint-ordering problems before any data loads.
pub fn reload_flow() -> Vec<Step> {
    vec![
        Step::DownloadSchema,
        Step::ProcessSchema,
        Step::DropTables,
        Step::CreateTables,
        Step::DownloadSmallTableData,
        Step::DownloadLargeTableSamples,
        Step::LoadSmallTableData,
        Step::LoadLargeTableData,
    ]
}

/// Steps for a full rebuild: recreate the database, then reload.
pub fn full_flow() -> Vec<Step> {
    let mut steps = vec![Step::ResetDatabase];
    steps.extend(reload_flow());
    steps
}

/// Steps for refreshing the large tables for the configured shops only.
///
/// Truncating first keeps repeated refreshes from duplicating rows.
pub fn reload_shops_flow() -> Vec<Step> {
    vec![
        Step::TruncateLargeTables,
        Step::DownloadLargeTablesForShops,
        Step::LoadLargeTableData,
    ]
}

/// Executes a flow strictly in order, attempting every step.
pub struct Pipeline<'a> {
    config: &'a SeedConfig,
    runner: &'a dyn CommandRunner,
}

impl<'a> Pipeline<'a> {
    /// Creates a pipeline over an explicit configuration and runner.
    pub fn new(config: &'a SeedConfig, runner: &'a dyn CommandRunner) -> Self {
        Self { config, runner }
    }

    /// Runs every step in order, emitting start/done progress per step.
    pub fn run(&self, steps: &[Step]) {
        self.ensure_work_dirs();
        for step in steps {
            info!("{}...", step.name());
            self.run_step(*step);
            info!("{}...done", step.name());
        }
    }

    /// The handoff directories must exist before the first dump lands.
    fn ensure_work_dirs(&self) {
        for dir in [self.config.raw_dir(), self.config.processed_dir()] {
            if let Err(err) = fs::create_dir_all(&dir) {
                error!("could not create {}: {}", dir.display(), err);
            }
        }
    }

    fn run_step(&self, step: Step) {
        match step {
            Step::ResetDatabase => self.reset_database(),
            Step::DownloadSchema => self.download_schema(),
            Step::ProcessSchema => self.process_schema(),
            Step::DropTables => self.drop_tables(),
            Step::CreateTables => self.create_tables(),
            Step::DownloadSmallTableData => self.download_small_table_data(),
            Step::DownloadLargeTableSamples => self.download_large_table_samples(),
            Step::DownloadLargeTablesForShops => self.download_large_tables_for_shops(),
            Step::LoadSmallTableData => self.load_small_table_data(),
            Step::LoadLargeTableData => self.load_large_table_data(),
            Step::TruncateLargeTables => self.truncate_large_tables(),
        }
    }

    fn silent(&self, cmd: Cmd) {
        self.runner.run(&cmd, RunPolicy::Silent);
    }

    fn reset_database(&self) {
        self.silent(Cmd::new("dropdb").arg(&self.config.target_db));
        self.silent(Cmd::new("createdb").arg(&self.config.target_db));
    }

    fn download_schema(&self) {
        let mut cmd = Cmd::new("pg_dump").arg(&self.config.source_db).arg("-s");
        for table in self.config.all_tables() {
            cmd = cmd.arg("-t").arg(table);
        }
        cmd = cmd
            .arg("-f")
            .arg(self.config.raw_schema_path().display().to_string());
        self.silent(cmd);
    }

    fn process_schema(&self) {
        if let Err(err) = schema::write_processed_schema(self.config) {
            error!("schema processing failed: {}", err);
        }
    }

    fn drop_tables(&self) {
        for table in self.config.all_tables() {
            let sql = format!("drop table if exists {} cascade", table);
            self.silent(psql_command(&self.config.target_db, &sql));
        }
    }

    fn create_tables(&self) {
        self.silent(psql_file(
            &self.config.target_db,
            &self.config.processed_schema_path(),
        ));
    }

    fn download_small_table_data(&self) {
        if self.config.small_tables.is_empty() {
            return;
        }
        let mut cmd = Cmd::new("pg_dump").arg(&self.config.source_db).arg("-a");
        for table in &self.config.small_tables {
            cmd = cmd.arg("-t").arg(table);
        }
        cmd = cmd
            .arg("-f")
            .arg(self.config.raw_data_path().display().to_string());
        self.silent(cmd);
    }

    fn download_large_table_samples(&self) {
        let predicate = shop_id_predicate(&self.config.shop_ids);
        for (table, rate) in &self.config.large_tables {
            let sql = format!(
                "\\copy (select * from {} tablesample system ({}) where shop_id in {}) to '{}' with header csv",
                table,
                rate,
                predicate,
                self.config.sample_path(table, *rate).display(),
            );
            self.silent(psql_command(&self.config.source_db, &sql));
        }
    }

    fn download_large_tables_for_shops(&self) {
        let predicate = shop_id_predicate(&self.config.shop_ids);
        for (table, rate) in &self.config.large_tables {
            let sql = format!(
                "\\copy (select * from {} where shop_id in {}) to '{}' with header csv",
                table,
                predicate,
                self.config.sample_path(table, *rate).display(),
            );
            self.silent(psql_command(&self.config.source_db, &sql));
        }
    }

    fn load_small_table_data(&self) {
        if self.config.small_tables.is_empty() {
            return;
        }
        self.silent(psql_file(&self.config.target_db, &self.config.raw_data_path()));
    }

    fn load_large_table_data(&self) {
        for (table, rate) in &self.config.large_tables {
            let sql = format!(
                "\\copy {} from '{}' with csv header",
                table,
                self.config.sample_path(table, *rate).display(),
            );
            self.runner
                .run(&psql_command(&self.config.target_db, &sql), RunPolicy::Visible);
        }
    }

    fn truncate_large_tables(&self) {
        for table in self.config.large_tables.keys() {
            let sql = format!("truncate {}", table);
            self.silent(psql_command(&self.config.target_db, &sql));
        }
    }
}
