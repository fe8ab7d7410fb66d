//! Integration tests for same-file and external links

mod common;

use ::common::prelude::*;

#[test]
fn test_same_file_link() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    let a = session.create(root, "A").unwrap();
    common::int_node(&mut session, a, "B", &[1, 2, 3]);
    let link = session.link(root, "ToB", "", "A/B").unwrap();

    assert!(session.is_link(link).unwrap());
    assert!(!session.is_link(a).unwrap());
    assert_eq!(session.get_name(link).unwrap(), "ToB");
    assert_eq!(session.get_data_type(link).unwrap(), DataType::Int32);
    assert_eq!(session.read_all_as::<i32>(link).unwrap(), vec![1, 2, 3]);

    // relative targets are stored absolute
    assert_eq!(
        session.get_link_path(link).unwrap(),
        (String::new(), "/A/B".to_string())
    );
    assert_eq!(session.link_path_length(link).unwrap(), (0, 4));
    assert_eq!(session.link_path_length(a).unwrap(), (0, 0));
    assert!(matches!(session.get_link_path(a), Err(Error::NodeIsNotALink)));
}

#[test]
fn test_resolve() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    let target = common::int_node(&mut session, root, "T", &[5]);
    let first = session.link(root, "L1", "", "/T").unwrap();
    let second = session.link(root, "L2", "", "/L1").unwrap();

    let resolved = session.resolve(second).unwrap();
    assert!(session.same_node(resolved, target).unwrap());
    assert!(!session.same_node(second, first).unwrap());
    assert!(matches!(session.resolve(target), Err(Error::NodeIsNotALink)));
}

#[test]
fn test_path_through_link() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    let a = session.create(root, "A").unwrap();
    let b = session.create(a, "B").unwrap();
    let link = session.link(root, "L", "", "/A").unwrap();

    let via = session.get_node_id(root, "/L/B").unwrap();
    assert!(session.same_node(via, b).unwrap());

    // the last segment is not resolved
    let direct = session.get_node_id(root, "L").unwrap();
    assert!(session.same_node(direct, link).unwrap());

    assert_eq!(session.number_of_children(link).unwrap(), 1);
    assert_eq!(session.children_names(link, 0, 5).unwrap(), vec!["B"]);
    assert!(session.has_child(link, "B").unwrap());
}

#[test]
fn test_dangling_link() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    let link = session.link(root, "L", "", "/Missing").unwrap();
    assert!(matches!(
        session.resolve(link),
        Err(Error::LinkTargetNotThere(name)) if name == "Missing"
    ));
    assert!(matches!(
        session.get_node_id(root, "/L/Child"),
        Err(Error::LinkTargetNotThere(_))
    ));
    assert!(matches!(
        session.get_node_id(root, "/Nope"),
        Err(Error::NodeNotFound(_))
    ));
}

#[test]
fn test_cyclic_links() {
    let config = EngineConfig {
        max_link_depth: 10,
        ..EngineConfig::default()
    };
    let (mut session, root, _temp, _) = common::setup_test_env_with(config);

    let a = session.link(root, "A", "", "/B").unwrap();
    session.link(root, "B", "", "/A").unwrap();

    assert!(matches!(session.resolve(a), Err(Error::LinksTooDeep(10))));
}

#[test]
fn test_link_validation() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    assert!(matches!(session.link(root, "L", "", ""), Err(Error::StringLengthZero)));
    assert!(matches!(session.link(root, "", "", "/A"), Err(Error::StringLengthZero)));
    assert!(!session.has_child(root, "L").unwrap());

    let link = session.link(root, "L", "", "/A").unwrap();
    assert!(matches!(session.create(link, "Child"), Err(Error::ParentIsLink)));
}

#[test]
fn test_external_link() {
    let (mut session, root, temp, path) = common::setup_test_env();

    let other_path = temp.path().join("other.adf");
    let other = session.open(&other_path, "NEW", "").unwrap();
    let zone = session.create(other, "Zone").unwrap();
    common::int_node(&mut session, zone, "Data", &[11, 22]);
    session.close(other).unwrap();

    let link = session.link(root, "Ext", "other.adf", "/Zone").unwrap();
    assert_eq!(
        session.get_link_path(link).unwrap(),
        ("other.adf".to_string(), "/Zone".to_string())
    );
    assert_eq!(session.link_path_length(link).unwrap(), (9, 5));

    let data = session.get_node_id(root, "/Ext/Data").unwrap();
    assert_eq!(session.read_all_as::<i32>(data).unwrap(), vec![11, 22]);
    // linked files take no slot
    assert_eq!(session.open_file_count(), 1);
    session.close(root).unwrap();

    // the link survives a reopen
    let root = session.open(&path, "READ_ONLY", "").unwrap();
    let data = session.get_node_id(root, "Ext/Data").unwrap();
    assert_eq!(session.read_all_as::<i32>(data).unwrap(), vec![11, 22]);
    session.close(root).unwrap();
}

#[test]
fn test_external_link_missing_file() {
    let (mut session, root, _temp, _) = common::setup_test_env();

    let link = session.link(root, "Ext", "nowhere.adf", "/Zone").unwrap();
    assert!(matches!(
        session.resolve(link),
        Err(Error::LinkedToFileNotThere(file)) if file == "nowhere.adf"
    ));
}

#[test]
fn test_external_link_to_open_file_is_shared() {
    let (mut session, root, temp, _) = common::setup_test_env();

    let other = session
        .open(temp.path().join("other.adf"), "NEW", "")
        .unwrap();
    let zone = session.create(other, "Zone").unwrap();

    let link = session.link(root, "Ext", "other.adf", "/Zone").unwrap();
    let resolved = session.resolve(link).unwrap();
    assert!(session.same_node(resolved, zone).unwrap());

    // writes through the other handle are visible via the link
    session.create(zone, "Fresh").unwrap();
    assert!(session.has_child(link, "Fresh").unwrap());
    session.close(other).unwrap();
}
