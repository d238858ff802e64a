//! Schema dump extraction and rewriting.
//!
//! The production schema dump carries sequences, ownership statements, and
//! sequence-backed defaults that do not exist in a fresh local database.
//! Only the table shapes are reproduced; everything else is dropped and the
//! configured alteration statements are appended instead.

use std::fs;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::SeedConfig;
use crate::error::SeedError;

/// One full CREATE TABLE statement, spanning newlines up to its terminator.
static CREATE_TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)CREATE TABLE .*?;").unwrap());

/// A column clause whose default is drawn from a sequence.
static SEQUENCE_DEFAULT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"bigint DEFAULT nextval.*,").unwrap());

/// Extracts every CREATE TABLE statement from a raw schema dump.
///
/// Sequences, views, ownership statements, and other DDL noise are
/// discarded by omission.
pub fn extract_create_tables(raw: &str) -> Vec<String> {
    CREATE_TABLE
        .find_iter(raw)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Rewrites sequence-backed bigint columns to `serial` declarations.
///
/// The sequence object referenced by the default will not exist in the
/// target database, so the column becomes self-incrementing instead.
/// Statements without such a clause come back unchanged.
pub fn rewrite_sequence_defaults(statement: &str) -> String {
    SEQUENCE_DEFAULT.replace_all(statement, "serial,").into_owned()
}

/// Produces the processed schema text.
///
/// Extracted table statements with defaults rewritten, followed by the
/// alteration statements verbatim, joined by blank lines.
pub fn process_schema(raw: &str, alterations: &[String]) -> String {
    let mut statements: Vec<String> = extract_create_tables(raw)
        .iter()
        .map(|s| rewrite_sequence_defaults(s))
        .collect();
    statements.extend(alterations.iter().cloned());
    statements.join("\n\n")
}

/// Reads the raw schema dump and writes the processed schema file.
pub fn write_processed_schema(config: &SeedConfig) -> Result<(), SeedError> {
    let raw_path = config.raw_schema_path();
    let raw = fs::read_to_string(&raw_path).map_err(|source| SeedError::Io {
        path: raw_path,
        source,
    })?;
    let processed = process_schema(&raw, &config.alterations);
    let out_path = config.processed_schema_path();
    fs::write(&out_path, processed).map_err(|source| SeedError::Io {
        path: out_path,
        source,
    })?;
    Ok(())
}
