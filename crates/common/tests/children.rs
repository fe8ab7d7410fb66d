//! Integration tests for child listing and ordering

mod common;

use ::common::prelude::*;

fn populate(session: &mut Session, parent: NodeId, names: &[&str]) {
    for name in names {
        let id = session.create(parent, name).unwrap();
        session.release(id).unwrap();
    }
}

#[test]
fn test_creation_order() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    populate(&mut session, root, &["Zeta", "Alpha", "Mu"]);
    assert_eq!(
        session.children_names(root, 0, 10).unwrap(),
        vec!["Zeta", "Alpha", "Mu"]
    );
}

#[test]
fn test_paging() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    populate(&mut session, root, &["A", "B", "C", "D", "E"]);
    assert_eq!(session.children_names(root, 0, 2).unwrap(), vec!["A", "B"]);
    assert_eq!(session.children_names(root, 2, 2).unwrap(), vec!["C", "D"]);
    assert_eq!(session.children_names(root, 4, 2).unwrap(), vec!["E"]);
    assert!(session.children_names(root, 5, 2).unwrap().is_empty());

    let ids = session.children_ids(root, 1, 3).unwrap();
    let names: Vec<String> = ids
        .iter()
        .map(|id| session.get_name(*id).unwrap())
        .collect();
    assert_eq!(names, vec!["B", "C", "D"]);
    for id in ids {
        session.release(id).unwrap();
    }
}

#[test]
fn test_delete_keeps_order_dense() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    populate(&mut session, root, &["A", "B", "C"]);
    let b = session.get_node_id(root, "B").unwrap();
    session.delete(root, b).unwrap();
    populate(&mut session, root, &["D"]);

    assert_eq!(session.children_names(root, 0, 10).unwrap(), vec!["A", "C", "D"]);
}

#[test]
fn test_order_survives_reopen() {
    let (mut session, root, _temp, path) = common::setup_test_env();

    populate(&mut session, root, &["b", "c", "a"]);
    session.close(root).unwrap();

    let root = session.open(&path, "READ_ONLY", "").unwrap();
    assert_eq!(session.children_names(root, 0, 10).unwrap(), vec!["b", "c", "a"]);
    session.close(root).unwrap();
}

#[test]
fn test_name_ordering() {
    let config = EngineConfig {
        child_ordering: ChildOrdering::Name,
        ..EngineConfig::default()
    };
    let (mut session, root, _temp, _) = common::setup_test_env_with(config);

    populate(&mut session, root, &["Zeta", "Alpha", "Mu"]);
    assert_eq!(
        session.children_names(root, 0, 10).unwrap(),
        vec!["Alpha", "Mu", "Zeta"]
    );
}

#[test]
fn test_reserved_entries_hidden() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    common::int_node(&mut session, root, "N", &[1]);
    let leaf = session.create(root, "Leaf").unwrap();
    session.set_dimensions(leaf, "I4", &[2]).unwrap();

    // the payload entry never shows up as a child
    assert_eq!(session.number_of_children(leaf).unwrap(), 0);
    assert!(!session.has_child(leaf, " data").unwrap());
    assert_eq!(session.children_names(root, 0, 10).unwrap(), vec!["N", "Leaf"]);
}

#[test]
fn test_iterate_children() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    populate(&mut session, root, &["A", "B", "C"]);
    let children: Vec<_> = session.children(root).unwrap().collect();
    let names: Vec<&str> = children.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["A", "B", "C"]);

    let id = session.open_child(&children[1]).unwrap();
    assert_eq!(session.get_name(id).unwrap(), "B");
    session.release(id).unwrap();
}

#[test]
fn test_open_children_while_iterating() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    populate(&mut session, root, &["A", "B", "C"]);
    let mut seen = Vec::new();
    for child in session.children(root).unwrap() {
        let id = session.open_child(&child).unwrap();
        seen.push(session.get_name(id).unwrap());
        // changes made mid-walk do not disturb the snapshot
        let grandchild = session.create(id, "Grandchild").unwrap();
        session.release(grandchild).unwrap();
        session.release(id).unwrap();
    }
    assert_eq!(seen, vec!["A", "B", "C"]);
    assert_eq!(session.number_of_children(root).unwrap(), 3);
}
