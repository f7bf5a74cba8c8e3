//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rowtree/rowtree.toml`
//! 3. Local config: `<project_dir>/.rowtree.toml`
//! 4. Environment variables: `ROWTREE_*` prefix

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{FieldSelectors, LayoutConfig};

/// Layout spacing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutSettings {
    /// Vertical gap between sibling leaves
    pub node_height: f64,
    /// Horizontal gap between depth levels
    pub level_width: f64,
    /// Node marker radius
    pub marker_radius: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        let defaults = LayoutConfig::default();
        Self {
            node_height: defaults.node_height,
            level_width: defaults.level_width,
            marker_radius: defaults.marker_radius,
        }
    }
}

impl LayoutSettings {
    /// Every spacing must be a finite, positive length.
    fn validate(&self) -> ApplicationResult<()> {
        let fields = [
            ("node_height", self.node_height),
            ("level_width", self.level_width),
            ("marker_radius", self.marker_radius),
        ];
        match fields
            .into_iter()
            .find(|(_, value)| !(value.is_finite() && *value > 0.0))
        {
            Some((name, value)) => Err(ApplicationError::Config {
                message: format!("layout.{name} must be a positive number, got {value}"),
            }),
            None => Ok(()),
        }
    }
}

impl From<&LayoutSettings> for LayoutConfig {
    fn from(s: &LayoutSettings) -> Self {
        LayoutConfig {
            node_height: s.node_height,
            level_width: s.level_width,
            marker_radius: s.marker_radius,
        }
    }
}

/// Watch loop timing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WatchSettings {
    /// Quiet period before a rebuild
    pub debounce_ms: u64,
    /// How often the row source is checked for changes
    pub poll_ms: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 200,
            poll_ms: 50,
        }
    }
}

impl WatchSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }
}

/// Raw layout config for intermediate parsing (`None` → inherit from base).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLayoutSettings {
    pub node_height: Option<f64>,
    pub level_width: Option<f64>,
    pub marker_radius: Option<f64>,
}

/// Raw watch config for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawWatchSettings {
    pub debounce_ms: Option<u64>,
    pub poll_ms: Option<u64>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub source: Option<String>,
    pub id_field: Option<String>,
    pub parent_field: Option<String>,
    pub label_field: Option<String>,
    pub layout: RawLayoutSettings,
    pub watch: RawWatchSettings,
}

/// Unified configuration for rowtree.
///
/// The four string fields are the persisted settings record: the row source
/// and the three field selectors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    /// Row source (JSON file)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Field naming each entity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_field: Option<String>,
    /// Field naming an entity's parent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_field: Option<String>,
    /// Field with display text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_field: Option<String>,
    pub layout: LayoutSettings,
    pub watch: WatchSettings,
}

/// Get the XDG config directory for rowtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rowtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rowtree.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".rowtree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> ApplicationResult<RawSettings> {
    let content = std::fs::read_to_string(path).with_path_context("read config", path)?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Empty strings count as unset, as in a cleared settings form.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl Settings {
    /// Merge overlay config onto self (base); overlay wins where specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            source: overlay.source.clone().or_else(|| self.source.clone()),
            id_field: overlay.id_field.clone().or_else(|| self.id_field.clone()),
            parent_field: overlay
                .parent_field
                .clone()
                .or_else(|| self.parent_field.clone()),
            label_field: overlay
                .label_field
                .clone()
                .or_else(|| self.label_field.clone()),
            layout: LayoutSettings {
                node_height: overlay
                    .layout
                    .node_height
                    .unwrap_or(self.layout.node_height),
                level_width: overlay
                    .layout
                    .level_width
                    .unwrap_or(self.layout.level_width),
                marker_radius: overlay
                    .layout
                    .marker_radius
                    .unwrap_or(self.layout.marker_radius),
            },
            watch: WatchSettings {
                debounce_ms: overlay.watch.debounce_ms.unwrap_or(self.watch.debounce_ms),
                poll_ms: overlay.watch.poll_ms.unwrap_or(self.watch.poll_ms),
            },
        }
    }

    /// Expand shell variables and tilde in the source path.
    fn expand_paths(&mut self) {
        if let Some(source) = &self.source {
            self.source = Some(
                shellexpand::full(source)
                    .map(|s| s.into_owned())
                    .unwrap_or_else(|_| source.clone()),
            );
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional directory holding a local `.rowtree.toml`
    pub fn load(project_dir: Option<&Path>) -> ApplicationResult<Self> {
        let global = global_config_path().filter(|p| p.exists());
        Self::load_from(global.as_deref(), project_dir)
    }

    /// Same as [`Settings::load`] with an explicit global config file.
    pub fn load_from(global: Option<&Path>, project_dir: Option<&Path>) -> ApplicationResult<Self> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global {
            if global_path.exists() {
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = project_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.layout.validate()?;
        current.expand_paths();
        Ok(current)
    }

    /// Apply ROWTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> ApplicationResult<Self> {
        // Use config crate just for env var parsing
        let config = Config::builder()
            .add_source(Environment::with_prefix("ROWTREE").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("source") {
            settings.source = Some(val);
        }
        if let Ok(val) = config.get_string("id_field") {
            settings.id_field = Some(val);
        }
        if let Ok(val) = config.get_string("parent_field") {
            settings.parent_field = Some(val);
        }
        if let Ok(val) = config.get_string("label_field") {
            settings.label_field = Some(val);
        }
        if let Ok(val) = config.get_float("layout.node_height") {
            settings.layout.node_height = val;
        }
        if let Ok(val) = config.get_float("layout.level_width") {
            settings.layout.level_width = val;
        }
        if let Ok(val) = config.get_float("layout.marker_radius") {
            settings.layout.marker_radius = val;
        }
        if let Ok(val) = config.get::<u64>("watch.debounce_ms") {
            settings.watch.debounce_ms = val;
        }
        if let Ok(val) = config.get::<u64>("watch.poll_ms") {
            settings.watch.poll_ms = val;
        }

        Ok(settings)
    }

    /// The three field selectors, or which of them are still unset.
    pub fn field_selectors(&self) -> ApplicationResult<FieldSelectors> {
        let id = non_empty(&self.id_field);
        let parent = non_empty(&self.parent_field);
        let label = non_empty(&self.label_field);

        match (id, parent, label) {
            (Some(id), Some(parent), Some(label)) => Ok(FieldSelectors::new(id, parent, label)),
            _ => {
                let missing = [
                    ("id_field", id),
                    ("parent_field", parent),
                    ("label_field", label),
                ]
                .into_iter()
                .filter(|(_, v)| v.is_none())
                .map(|(name, _)| name)
                .collect();
                Err(ApplicationError::ConfigurationIncomplete { missing })
            }
        }
    }

    /// Row source as a path, if configured.
    pub fn source_path(&self) -> Option<PathBuf> {
        non_empty(&self.source).map(PathBuf::from)
    }

    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig::from(&self.layout)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# rowtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/rowtree/rowtree.toml
#   Local:  <project_dir>/.rowtree.toml
#   Env:    ROWTREE_* environment variables (e.g. ROWTREE_ID_FIELD, ROWTREE_LAYOUT__NODE_HEIGHT)

# Row source: JSON array of objects
# source = "rows.json"

# Field selectors (all three required)
# id_field = "Id"
# parent_field = "Parent Id"
# label_field = "Name"

[layout]
# Vertical gap between sibling leaves
# node_height = 26.0
# Horizontal gap between depth levels
# level_width = 200.0
# Node marker radius
# marker_radius = 5.0

[watch]
# Quiet period before a rebuild (ms)
# debounce_ms = 200
# Change polling interval (ms)
# poll_ms = 50
"#
        .to_string()
    }
}

/// Changes to the persisted settings record; `None` leaves a key untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsRecord {
    pub source: Option<String>,
    pub id_field: Option<String>,
    pub parent_field: Option<String>,
    pub label_field: Option<String>,
}

impl SettingsRecord {
    pub fn is_empty(&self) -> bool {
        self.source.is_none()
            && self.id_field.is_none()
            && self.parent_field.is_none()
            && self.label_field.is_none()
    }
}

/// Write the settings record into the config file at `path`.
///
/// Other keys and sections of an existing file are kept.
pub fn save_record(path: &Path, record: &SettingsRecord) -> ApplicationResult<()> {
    let mut table = if path.exists() {
        let content = std::fs::read_to_string(path).with_path_context("read config", path)?;
        content
            .parse::<toml::Table>()
            .map_err(|e| ApplicationError::Config {
                message: format!("parse {}: {}", path.display(), e),
            })?
    } else {
        toml::Table::new()
    };

    let updates = [
        ("source", &record.source),
        ("id_field", &record.id_field),
        ("parent_field", &record.parent_field),
        ("label_field", &record.label_field),
    ];
    for (key, value) in updates {
        if let Some(value) = value {
            table.insert(key.to_string(), toml::Value::String(value.clone()));
        }
    }

    let content = toml::to_string_pretty(&table).map_err(|e| ApplicationError::Config {
        message: format!("serialize config: {e}"),
    })?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_path_context("create config dir", parent)?;
        }
    }
    std::fs::write(path, content).with_path_context("write config", path)
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> Settings {
        Settings {
            id_field: Some("Id".into()),
            parent_field: Some("Parent".into()),
            label_field: Some("Name".into()),
            ..Settings::default()
        }
    }

    #[test]
    fn given_defaults_when_created_then_layout_uses_standard_spacing() {
        let settings = Settings::default();
        assert_eq!(settings.layout.node_height, 26.0);
        assert_eq!(settings.layout.level_width, 200.0);
        assert_eq!(settings.watch.debounce(), Duration::from_millis(200));
    }

    #[test]
    fn given_all_selectors_when_requesting_then_returns_them() {
        let selectors = complete().field_selectors().unwrap();
        assert_eq!(selectors, FieldSelectors::new("Id", "Parent", "Name"));
    }

    #[test]
    fn given_blank_selectors_when_requesting_then_lists_missing() {
        let settings = Settings {
            parent_field: Some("  ".into()),
            label_field: None,
            ..complete()
        };
        match settings.field_selectors() {
            Err(ApplicationError::ConfigurationIncomplete { missing }) => {
                assert_eq!(missing, vec!["parent_field", "label_field"]);
            }
            other => panic!("expected ConfigurationIncomplete, got {other:?}"),
        }
    }

    #[test]
    fn given_overlay_when_merging_then_overlay_wins_where_specified() {
        let base = complete();
        let overlay = RawSettings {
            label_field: Some("Title".into()),
            layout: RawLayoutSettings {
                level_width: Some(120.0),
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.id_field.as_deref(), Some("Id"));
        assert_eq!(merged.label_field.as_deref(), Some("Title"));
        assert_eq!(merged.layout.level_width, 120.0);
        assert_eq!(merged.layout.node_height, 26.0);
    }

    #[test]
    fn given_default_layout_when_validating_then_accepts() {
        assert!(LayoutSettings::default().validate().is_ok());
    }

    #[test]
    fn given_non_positive_or_non_finite_spacing_when_validating_then_names_field() {
        let cases = [
            (LayoutSettings { node_height: 0.0, ..Default::default() }, "layout.node_height"),
            (LayoutSettings { level_width: -200.0, ..Default::default() }, "layout.level_width"),
            (LayoutSettings { marker_radius: f64::NAN, ..Default::default() }, "layout.marker_radius"),
            (LayoutSettings { level_width: f64::INFINITY, ..Default::default() }, "layout.level_width"),
        ];
        for (layout, field) in cases {
            match layout.validate() {
                Err(ApplicationError::Config { message }) => {
                    assert!(message.starts_with(field), "{message}")
                }
                other => panic!("expected Config error for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn given_tilde_in_source_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            source: Some("~/rows.json".into()),
            ..Settings::default()
        };
        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let source = settings.source.unwrap();
        assert!(source.starts_with(&home), "source should expand ~: {source}");
    }

    #[test]
    fn given_settings_when_serializing_then_round_trips_through_toml() {
        let settings = complete();
        let text = settings.to_toml().unwrap();
        let raw: RawSettings = toml::from_str(&text).unwrap();
        assert_eq!(Settings::default().merge_with(&raw), settings);
    }
}
