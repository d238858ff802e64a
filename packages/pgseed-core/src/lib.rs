//! Seeding pipeline for local Postgres copies of production data.
//!
//! Copies small tables wholesale, samples large ones by fraction or shop id,
//! and rewrites the dumped schema so it loads into a fresh local database.

pub mod command;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod schema;
pub mod sql;

pub use command::{CommandRunner, RunPolicy, ShellRunner};
pub use config::SeedConfig;
pub use error::SeedError;
pub use pipeline::Pipeline;
