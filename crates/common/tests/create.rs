//! Integration tests for node creation and the fixed attributes

mod common;

use ::common::prelude::*;

#[test]
fn test_create_node() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    let node = session.create(root, "Base").unwrap();
    assert_eq!(session.get_name(node).unwrap(), "Base");
    assert_eq!(session.get_label(node).unwrap(), "");
    assert_eq!(session.get_data_type(node).unwrap(), DataType::Empty);
    assert_eq!(session.number_of_dimensions(node).unwrap(), 0);
    assert_eq!(session.number_of_children(root).unwrap(), 1);
    assert!(session.has_child(root, "Base").unwrap());
}

#[test]
fn test_root_attributes() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    assert_eq!(session.get_name(root).unwrap(), "ADF MotherNode");
    assert_eq!(session.get_label(root).unwrap(), "Root Node of ADF File");
    assert_eq!(session.number_of_children(root).unwrap(), 0);
    assert!(session.children_names(root, 0, 10).unwrap().is_empty());
}

#[test]
fn test_create_trims_trailing_blanks() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    let node = session.create(root, "Zone   ").unwrap();
    assert_eq!(session.get_name(node).unwrap(), "Zone");
    assert!(session.has_child(root, "Zone").unwrap());
}

#[test]
fn test_create_trims_leading_blanks() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    let node = session.create(root, "  Lead").unwrap();
    assert_eq!(session.get_name(node).unwrap(), "Lead");
    assert_eq!(session.children_names(root, 0, 10).unwrap(), vec!["Lead"]);
}

#[test]
fn test_create_duplicate_name() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    session.create(root, "Base").unwrap();
    let result = session.create(root, "Base");
    assert!(matches!(result, Err(Error::DuplicateChildName(name)) if name == "Base"));
    assert_eq!(session.number_of_children(root).unwrap(), 1);
}

#[test]
fn test_create_invalid_names() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    assert!(matches!(session.create(root, ""), Err(Error::StringLengthZero)));
    assert!(matches!(session.create(root, "   "), Err(Error::StringLengthZero)));
    assert!(matches!(session.create(root, "a/b"), Err(Error::InvalidNodeName(_))));
    assert!(matches!(session.create(root, "."), Err(Error::InvalidNodeName(_))));

    let long = "x".repeat(33);
    assert!(matches!(
        session.create(root, &long),
        Err(Error::StringLengthTooBig(_))
    ));
    let max = "x".repeat(32);
    session.create(root, &max).unwrap();
}

#[test]
fn test_set_label() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    let node = session.create(root, "Base").unwrap();
    session.set_label(node, "CGNSBase_t").unwrap();
    assert_eq!(session.get_label(node).unwrap(), "CGNSBase_t");

    let long = "l".repeat(33);
    assert!(matches!(
        session.set_label(node, &long),
        Err(Error::StringLengthTooBig(_))
    ));
    session.set_label(node, "").unwrap();
    assert_eq!(session.get_label(node).unwrap(), "");
}

#[test]
fn test_root_and_same_node() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    let a = session.create(root, "A").unwrap();
    let b = session.create(a, "B").unwrap();

    let found_root = session.get_root_id(b).unwrap();
    assert_ne!(found_root, root);
    assert!(session.same_node(found_root, root).unwrap());
    assert!(!session.same_node(a, b).unwrap());

    let again = session.get_node_id(root, "/A/B").unwrap();
    assert!(session.same_node(again, b).unwrap());
    session.release(again).unwrap();
    session.release(found_root).unwrap();
}

#[test]
fn test_release_invalidates_handle() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    let node = session.create(root, "A").unwrap();
    session.release(node).unwrap();
    assert!(matches!(session.get_name(node), Err(Error::InvalidNodeId(_))));
    assert!(matches!(session.release(node), Err(Error::InvalidNodeId(_))));
}

#[test]
fn test_nodes_persist_across_reopen() {
    let (mut session, root, _temp, path) = common::setup_test_env();

    let base = session.create(root, "Base").unwrap();
    session.set_label(base, "CGNSBase_t").unwrap();
    session.create(base, "Zone").unwrap();
    session.close(root).unwrap();
    assert!(!session.is_open());

    let root = session.open(&path, "OLD", "").unwrap();
    let zone = session.get_node_id(root, "Base/Zone").unwrap();
    assert_eq!(session.get_name(zone).unwrap(), "Zone");
    let base = session.get_node_id(root, "/Base").unwrap();
    assert_eq!(session.get_label(base).unwrap(), "CGNSBase_t");
    session.close(root).unwrap();
}
