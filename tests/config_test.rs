//! Integration tests for Settings layered loading and the persisted record.
//!
//! Tests pass the global config path explicitly (or none), so the user's real
//! config never leaks in. ROWTREE_* variables are not set by any test.

use std::fs;

use tempfile::TempDir;

use rowtree::application::ApplicationError;
use rowtree::config::{local_config_path, save_record, Settings, SettingsRecord};
use rowtree::util::testing;

#[test]
fn given_no_config_files_when_loading_then_defaults_and_incomplete() {
    testing::init_test_setup();
    let project = TempDir::new().unwrap();

    let settings = Settings::load_from(None, Some(project.path())).unwrap();

    assert_eq!(settings.watch.debounce_ms, 200);
    assert_eq!(settings.layout.node_height, 26.0);
    let err = settings.field_selectors().unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::ConfigurationIncomplete { ref missing }
            if *missing == vec!["id_field", "parent_field", "label_field"]
    ));
}

#[test]
fn given_global_and_local_config_when_loading_then_local_wins() {
    testing::init_test_setup();
    let global_dir = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let global = global_dir.path().join("rowtree.toml");
    fs::write(
        &global,
        r#"
id_field = "Id"
parent_field = "Parent"
label_field = "Name"

[layout]
level_width = 150.0
"#,
    )
    .unwrap();
    fs::write(
        local_config_path(project.path()),
        r#"
label_field = "Title"

[watch]
debounce_ms = 500
"#,
    )
    .unwrap();

    let settings = Settings::load_from(Some(global.as_path()), Some(project.path())).unwrap();

    let selectors = settings.field_selectors().unwrap();
    assert_eq!(selectors.id, "Id");
    assert_eq!(selectors.parent, "Parent");
    assert_eq!(selectors.label, "Title");
    assert_eq!(settings.layout.level_width, 150.0);
    assert_eq!(settings.layout.node_height, 26.0);
    assert_eq!(settings.watch.debounce_ms, 500);
    assert_eq!(settings.watch.poll_ms, 50);
}

#[test]
fn given_invalid_toml_when_loading_then_config_error() {
    testing::init_test_setup();
    let project = TempDir::new().unwrap();
    fs::write(local_config_path(project.path()), "id_field = [").unwrap();

    let err = Settings::load_from(None, Some(project.path())).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
}

#[test]
fn given_zero_node_height_in_local_config_when_loading_then_config_error() {
    testing::init_test_setup();
    let project = TempDir::new().unwrap();
    fs::write(
        local_config_path(project.path()),
        "[layout]\nnode_height = 0.0\n",
    )
    .unwrap();

    let err = Settings::load_from(None, Some(project.path())).unwrap_err();

    match err {
        ApplicationError::Config { message } => assert!(message.contains("layout.node_height")),
        other => panic!("expected Config error, got {other:?}"),
    }
}

#[test]
fn given_nan_level_width_in_local_config_when_loading_then_config_error() {
    testing::init_test_setup();
    let project = TempDir::new().unwrap();
    fs::write(
        local_config_path(project.path()),
        "[layout]\nlevel_width = nan\n",
    )
    .unwrap();

    let err = Settings::load_from(None, Some(project.path())).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
}

#[test]
fn given_record_when_saving_then_loads_back_and_keeps_other_sections() {
    testing::init_test_setup();
    let project = TempDir::new().unwrap();
    let path = local_config_path(project.path());
    fs::write(&path, "[layout]\nnode_height = 30.0\n").unwrap();

    let record = SettingsRecord {
        source: Some("rows.json".to_string()),
        id_field: Some("Employee ID".to_string()),
        parent_field: Some("Manager ID".to_string()),
        label_field: Some("Name".to_string()),
    };
    save_record(&path, &record).unwrap();

    let settings = Settings::load_from(None, Some(project.path())).unwrap();
    assert_eq!(settings.source.as_deref(), Some("rows.json"));
    assert_eq!(settings.field_selectors().unwrap().id, "Employee ID");
    assert_eq!(settings.layout.node_height, 30.0);
}

#[test]
fn given_partial_record_when_saving_then_other_keys_untouched() {
    testing::init_test_setup();
    let project = TempDir::new().unwrap();
    let path = local_config_path(project.path());
    fs::write(&path, "id_field = \"Id\"\nlabel_field = \"Name\"\n").unwrap();

    let record = SettingsRecord {
        label_field: Some("Title".to_string()),
        ..Default::default()
    };
    save_record(&path, &record).unwrap();

    let settings = Settings::load_from(None, Some(project.path())).unwrap();
    assert_eq!(settings.id_field.as_deref(), Some("Id"));
    assert_eq!(settings.label_field.as_deref(), Some("Title"));
    assert!(settings.parent_field.is_none());
}

#[test]
fn given_template_when_parsing_then_is_valid_config() {
    let project = TempDir::new().unwrap();
    fs::write(local_config_path(project.path()), Settings::template()).unwrap();

    let settings = Settings::load_from(None, Some(project.path())).unwrap();

    assert_eq!(settings.layout.level_width, 200.0);
}
