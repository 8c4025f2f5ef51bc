//! Tests for loading engine configuration from disk.

use std::io::Write;

use horizon_arbor::TreeError;
use horizon_arbor::tree::{
    DragScope, FilterMode, InteractionEvent, SelectionMode, TreeConfig, TreeEngine, TreeNode,
};

#[test]
fn test_load_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    writeln!(
        file,
        r#"
selection_mode = "multiple"
meta_key_selection = true
filter_by = "label,key"
filter_mode = "strict"
draggable_nodes = true
droppable_nodes = true
droppable_scope = "files"
"#
    )
    .expect("Failed to write config");

    let config = TreeConfig::load(file.path()).expect("Failed to load config");
    assert_eq!(config.selection_mode, Some(SelectionMode::Multiple));
    assert!(config.meta_key_selection);
    assert_eq!(config.filter_mode, FilterMode::Strict);
    assert_eq!(config.droppable_scope, Some(DragScope::from("files")));
    assert_eq!(config.draggable_scope, None);

    let mut engine = TreeEngine::new(config).with_value(vec![
        TreeNode::new("alpha", "First"),
        TreeNode::new("beta", "Second"),
    ]);
    engine.filter("beta");
    assert_eq!(engine.rows().len(), 1);

    let beta = engine.find_by_key("beta").unwrap();
    engine.toggle_selection(beta, InteractionEvent::click());
    assert_eq!(engine.selection().keys(), vec!["beta"]);

    // A drag without a scope is refused by a scoped tree.
    assert!(engine.start_drag(beta));
    assert!(!engine.allow_drop(horizon_arbor::tree::DropTarget::Tree));
}

#[test]
fn test_load_rejects_bad_file() {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    writeln!(file, "filter_mode = 3").expect("Failed to write config");

    let err = TreeConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, TreeError::Config(_)));
    assert!(err.to_string().starts_with("Invalid tree configuration"));
}

#[test]
fn test_load_reports_missing_path() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("tree.toml");

    match TreeConfig::load(&path) {
        Err(TreeError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected an I/O error, got {other:?}"),
    }
}
