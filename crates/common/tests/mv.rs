//! Integration tests for moving nodes between parents

mod common;

use ::common::prelude::*;

#[test]
fn test_move_child() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    let a = session.create(root, "A").unwrap();
    let b = session.create(root, "B").unwrap();
    let c = common::int_node(&mut session, a, "C", &[1, 2]);

    session.move_child(a, c, b).unwrap();

    assert!(!session.has_child(a, "C").unwrap());
    assert!(session.has_child(b, "C").unwrap());
    // the handle follows the node
    assert_eq!(session.read_all_as::<i32>(c).unwrap(), vec![1, 2]);
    let found = session.get_node_id(root, "/B/C").unwrap();
    assert!(session.same_node(found, c).unwrap());
}

#[test]
fn test_move_appends_to_new_parent() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    let a = session.create(root, "A").unwrap();
    let b = session.create(root, "B").unwrap();
    let x = session.create(a, "X").unwrap();
    session.create(a, "Y").unwrap();
    session.create(b, "Z").unwrap();

    session.move_child(a, x, b).unwrap();

    assert_eq!(session.children_names(a, 0, 10).unwrap(), vec!["Y"]);
    assert_eq!(session.children_names(b, 0, 10).unwrap(), vec!["Z", "X"]);
}

#[test]
fn test_move_name_collision() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    let a = session.create(root, "A").unwrap();
    let b = session.create(root, "B").unwrap();
    let c = session.create(a, "C").unwrap();
    session.create(b, "C").unwrap();

    let result = session.move_child(a, c, b);
    assert!(matches!(result, Err(Error::DuplicateChildName(name)) if name == "C"));
    assert!(session.has_child(a, "C").unwrap());
}

#[test]
fn test_move_into_own_subtree() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    let a = session.create(root, "A").unwrap();
    let b = session.create(a, "B").unwrap();

    assert!(matches!(session.move_child(root, a, b), Err(Error::MoveIntoSelf)));
    assert!(session.has_child(root, "A").unwrap());
}

#[test]
fn test_move_wrong_parent() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    let a = session.create(root, "A").unwrap();
    let b = session.create(root, "B").unwrap();
    let c = session.create(a, "C").unwrap();

    assert!(matches!(session.move_child(b, c, root), Err(Error::ChildNotOfGivenParent)));
}

#[test]
fn test_move_through_link_refused() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    let a = session.create(root, "A").unwrap();
    let c = session.create(a, "C").unwrap();
    let link = session.link(root, "L", "", "/A").unwrap();

    assert!(matches!(session.move_child(a, c, link), Err(Error::LinkMoveNotAllowed)));
    assert!(matches!(session.move_child(link, c, root), Err(Error::LinkMoveNotAllowed)));
}

#[test]
fn test_move_across_files_refused() {
    let (mut session, root, temp, _) = common::setup_test_env();

    let other = session.open(temp.path().join("other.adf"), "NEW", "").unwrap();
    let a = session.create(root, "A").unwrap();

    assert!(matches!(session.move_child(root, a, other), Err(Error::NodesNotInSameFile)));
    session.close(other).unwrap();
}
