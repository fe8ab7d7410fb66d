//! Shared test utilities for session integration tests
#![allow(dead_code)]

use std::path::PathBuf;

use ::common::prelude::*;
use tempfile::TempDir;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Set up a session with a freshly created database file
pub fn setup_test_env() -> (Session, NodeId, TempDir, PathBuf) {
    setup_test_env_with(EngineConfig::default())
}

pub fn setup_test_env_with(config: EngineConfig) -> (Session, NodeId, TempDir, PathBuf) {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test.adf");

    let mut session = Session::new(config);
    let root = session.open(&path, "NEW", "").unwrap();

    (session, root, temp_dir, path)
}

/// Create `name` under `parent` and give it a 1-D I4 payload
pub fn int_node(session: &mut Session, parent: NodeId, name: &str, values: &[i32]) -> NodeId {
    let node = session.create(parent, name).unwrap();
    session.set_dimensions(node, "I4", &[values.len()]).unwrap();
    session.write_all_from(node, values).unwrap();
    node
}
