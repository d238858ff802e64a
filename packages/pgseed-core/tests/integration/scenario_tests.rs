//! End-to-end scenarios over the fake cluster.

use ntest::timeout;
use tempfile::tempdir;

use pgseed_core::pipeline::{full_flow, reload_flow, reload_shops_flow, Pipeline};

use crate::helpers::{sample_schema_dump, sample_source, test_config, FakeCluster};

#[timeout(1000)]
#[test]
fn test_reload_builds_a_populated_local_database() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let cluster = FakeCluster::new(&sample_schema_dump(), sample_source());

    Pipeline::new(&config, &cluster).run(&reload_flow());

    assert_eq!(cluster.target_tables(), vec!["events", "people"]);

    // Small table copied in full, large table restricted to the shop set.
    assert_eq!(cluster.target_rows("people").len(), 2);
    let events = cluster.target_rows("events");
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|row| row.shop_id == "shop_42"));
}

#[test]
fn test_reload_rewrites_sequence_defaults() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let cluster = FakeCluster::new(&sample_schema_dump(), sample_source());

    Pipeline::new(&config, &cluster).run(&reload_flow());

    let statements = cluster.applied_statements.borrow();
    let events = statements
        .iter()
        .find(|s| s.starts_with("CREATE TABLE events"))
        .expect("events table statement");
    assert!(events.contains("id serial,"));
    assert!(!events.contains("nextval"));
}

#[test]
fn test_reload_applies_alterations_last() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let cluster = FakeCluster::new(&sample_schema_dump(), sample_source());

    Pipeline::new(&config, &cluster).run(&reload_flow());

    let statements = cluster.applied_statements.borrow();
    assert_eq!(statements.last().unwrap(), &config.alterations[0]);
}

#[test]
fn test_reload_twice_does_not_duplicate_rows() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let cluster = FakeCluster::new(&sample_schema_dump(), sample_source());
    let pipeline = Pipeline::new(&config, &cluster);

    pipeline.run(&reload_flow());
    pipeline.run(&reload_flow());

    // Tables are dropped and recreated on every reload.
    assert_eq!(cluster.target_rows("people").len(), 2);
    assert_eq!(cluster.target_rows("events").len(), 2);
}

#[timeout(1000)]
#[test]
fn test_shop_refresh_twice_leaves_single_copy_of_each_row() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let cluster = FakeCluster::new(&sample_schema_dump(), sample_source());
    let pipeline = Pipeline::new(&config, &cluster);

    // Seed once, then refresh the shop data twice in a row.
    pipeline.run(&reload_flow());
    pipeline.run(&reload_shops_flow());
    pipeline.run(&reload_shops_flow());

    let events = cluster.target_rows("events");
    assert_eq!(events.len(), 2, "truncate must prevent duplication");
    assert!(events.iter().all(|row| row.shop_id == "shop_42"));

    // The full-copy table is untouched by the shop refresh.
    assert_eq!(cluster.target_rows("people").len(), 2);
}

#[test]
fn test_full_flow_starts_from_an_empty_database() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let cluster = FakeCluster::new(&sample_schema_dump(), sample_source());

    // Leftover state from an earlier run.
    cluster
        .local
        .borrow_mut()
        .get_mut("local_prod")
        .unwrap()
        .insert("stale".to_string(), Vec::new());

    Pipeline::new(&config, &cluster).run(&full_flow());

    assert_eq!(cluster.target_tables(), vec!["events", "people"]);
    assert_eq!(cluster.target_rows("events").len(), 2);
}

#[test]
fn test_empty_large_tables_reload_completes() {
    let dir = tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.large_tables.clear();
    let cluster = FakeCluster::new(&sample_schema_dump(), sample_source());

    Pipeline::new(&config, &cluster).run(&reload_flow());

    // Both tables exist (the schema dump defines them) but only the small
    // table is populated.
    assert_eq!(cluster.target_rows("people").len(), 2);
    assert!(cluster.target_rows("events").is_empty());
}
