//! Tests for HierarchyService against files on disk.

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use rowtree::application::services::HierarchyService;
use rowtree::application::ApplicationError;
use rowtree::cli::CliError;
use rowtree::domain::{DomainError, FieldSelectors, LayoutConfig, Row, Scalar, SelectionUpdate};
use rowtree::exitcode;
use rowtree::infrastructure::traits::RealFileSystem;
use rowtree::util::testing;

fn setup() -> (TempDir, HierarchyService, FieldSelectors) {
    testing::init_test_setup();
    let temp = TempDir::new().unwrap();
    let service = HierarchyService::new(Arc::new(RealFileSystem));
    let selectors = FieldSelectors::new("Employee ID", "Manager ID", "Name");
    (temp, service, selectors)
}

fn write_rows(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("rows.json");
    std::fs::write(&path, content).expect("write rows");
    path
}

const STAFF: &str = r#"[
  {"Employee ID": 1, "Manager ID": null, "Name": "Ada"},
  {"Employee ID": 2, "Manager ID": 1, "Name": "Grace"},
  {"Employee ID": 3, "Manager ID": 1, "Name": ""},
  {"Employee ID": 4, "Manager ID": 99, "Name": "Lost"},
  {"Employee ID": 2, "Manager ID": 1, "Name": "Grace again"}
]"#;

#[test]
fn given_rows_file_when_rendering_then_builds_tree_and_reports_cleanup() {
    // Arrange
    let (temp, service, selectors) = setup();
    let path = write_rows(&temp, STAFF);

    // Act
    let rendered = service
        .render_file(&path, &selectors, LayoutConfig::default())
        .unwrap();

    // Assert
    assert_eq!(rendered.layout.nodes.len(), 3);
    assert_eq!(rendered.layout.edges.len(), 2);
    assert_eq!(rendered.dropped_rows, 1);
    assert_eq!(rendered.duplicates, vec!["2".to_string()]);
    assert_eq!(rendered.layout.node("2").unwrap().label, "Grace");
    assert_eq!(rendered.layout.node("3").unwrap().label, "3");
}

#[test]
fn given_rendered_tree_when_selecting_then_forwards_original_identifier() {
    let (temp, service, selectors) = setup();
    let path = write_rows(&temp, STAFF);
    let rendered = service
        .render_file(&path, &selectors, LayoutConfig::default())
        .unwrap();

    let command = service.select(&rendered, &selectors, "2").unwrap();

    assert_eq!(command.field, "Employee ID");
    assert_eq!(command.value, Scalar::Integer(2));
    assert_eq!(command.update, SelectionUpdate::Replace);
}

#[test]
fn given_unknown_node_when_selecting_then_not_found() {
    let (temp, service, selectors) = setup();
    let path = write_rows(&temp, STAFF);
    let rendered = service
        .render_file(&path, &selectors, LayoutConfig::default())
        .unwrap();

    let err = service.select(&rendered, &selectors, "42").unwrap_err();

    assert!(matches!(err, ApplicationError::NodeNotFound(id) if id == "42"));
}

#[test]
fn given_missing_file_when_loading_then_row_source_error() {
    let (temp, service, _) = setup();

    let err = service
        .load_rows(&temp.path().join("missing.json"))
        .unwrap_err();

    assert!(matches!(err, ApplicationError::RowSource { .. }));
}

#[test]
fn given_malformed_json_when_loading_then_row_source_error() {
    let (temp, service, _) = setup();
    let path = write_rows(&temp, r#"{"not": "an array"}"#);

    let err = service.load_rows(&path).unwrap_err();

    assert!(matches!(err, ApplicationError::RowSource { .. }));
}

#[test]
fn given_invalid_utf8_file_when_loading_then_io_error_with_ioerr_exit() {
    let (temp, service, _) = setup();
    let path = temp.path().join("rows.json");
    std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

    let err = service.load_rows(&path).unwrap_err();

    assert!(matches!(&err, ApplicationError::Io { action: "read rows", .. }));
    assert_eq!(CliError::from(err).exit_code(), exitcode::IOERR);
}

#[test]
fn given_child_of_dropped_orphan_when_rendering_then_structural_error() {
    let (_temp, service, selectors) = setup();
    let rows: Vec<Row> = serde_json::from_str(
        r#"[
          {"Employee ID": "A", "Manager ID": null, "Name": "Root"},
          {"Employee ID": "B", "Manager ID": "Z", "Name": "Orphan"},
          {"Employee ID": "C", "Manager ID": "B", "Name": "Grandchild"}
        ]"#,
    )
    .unwrap();

    let err = service
        .render(&rows, &selectors, LayoutConfig::default())
        .unwrap_err();

    assert!(err.is_structural());
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::UnresolvedParent { ref id, ref parent })
            if id == "C" && parent == "B"
    ));
}

#[test]
fn given_cyclic_rows_when_rendering_then_structural_error() {
    let (temp, service, selectors) = setup();
    let path = write_rows(
        &temp,
        r#"[
          {"Employee ID": "A", "Manager ID": "B", "Name": "X"},
          {"Employee ID": "B", "Manager ID": "A", "Name": "Y"}
        ]"#,
    );

    let err = service
        .render_file(&path, &selectors, LayoutConfig::default())
        .unwrap_err();

    assert!(err.is_structural());
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::CycleDetected(_))
    ));
}

#[test]
fn given_empty_array_when_rendering_then_empty_layout() {
    let (temp, service, selectors) = setup();
    let path = write_rows(&temp, "[]");

    let rendered = service
        .render_file(&path, &selectors, LayoutConfig::default())
        .unwrap();

    assert!(rendered.tree.is_empty());
    assert!(rendered.layout.is_empty());
}
