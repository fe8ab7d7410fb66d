//! Integration tests for node deletion

mod common;

use ::common::prelude::*;

#[test]
fn test_delete_leaf() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    let node = session.create(root, "A").unwrap();
    session.delete(root, node).unwrap();

    assert!(!session.has_child(root, "A").unwrap());
    assert_eq!(session.number_of_children(root).unwrap(), 0);
    assert!(matches!(session.get_name(node), Err(Error::InvalidNodeId(_))));
}

#[test]
fn test_delete_subtree_invalidates_descendants() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    let a = session.create(root, "A").unwrap();
    let b = session.create(a, "B").unwrap();
    let c = common::int_node(&mut session, b, "C", &[1, 2, 3]);

    session.delete(root, a).unwrap();

    assert!(matches!(session.get_name(b), Err(Error::InvalidNodeId(_))));
    assert!(matches!(session.read_all_as::<i32>(c), Err(Error::InvalidNodeId(_))));
    assert!(matches!(
        session.get_node_id(root, "/A/B"),
        Err(Error::NodeNotFound(name)) if name == "A"
    ));
}

#[test]
fn test_delete_wrong_parent() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    let a = session.create(root, "A").unwrap();
    let b = session.create(root, "B").unwrap();
    let c = session.create(a, "C").unwrap();

    assert!(matches!(session.delete(b, c), Err(Error::ChildNotOfGivenParent)));
    assert!(matches!(session.delete(root, c), Err(Error::ChildNotOfGivenParent)));
    assert!(session.has_child(a, "C").unwrap());
}

#[test]
fn test_delete_link_leaves_target() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    let target = common::int_node(&mut session, root, "Target", &[7, 8]);
    let holder = session.create(root, "Holder").unwrap();
    let link = session.link(holder, "ToTarget", "", "/Target").unwrap();

    session.delete(holder, link).unwrap();

    assert!(!session.has_child(holder, "ToTarget").unwrap());
    assert_eq!(session.read_all_as::<i32>(target).unwrap(), vec![7, 8]);
}

#[test]
fn test_delete_below_link_refused() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    let a = session.create(root, "A").unwrap();
    let b = session.create(a, "B").unwrap();
    let link = session.link(root, "L", "", "/A").unwrap();

    assert!(matches!(session.delete(link, b), Err(Error::LinkDeleteNotAllowed)));
    assert!(session.has_child(a, "B").unwrap());
}

#[test]
fn test_delete_persists() {
    let (mut session, root, _temp, path) = common::setup_test_env();

    let a = session.create(root, "A").unwrap();
    session.create(root, "B").unwrap();
    session.delete(root, a).unwrap();
    session.close(root).unwrap();

    let root = session.open(&path, "READ_ONLY", "").unwrap();
    assert_eq!(session.children_names(root, 0, 10).unwrap(), vec!["B"]);
    session.close(root).unwrap();
}
