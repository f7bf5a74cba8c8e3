//! Command dispatch: resolves settings, wires services, prints results.

use std::path::{Path, PathBuf};

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::{RenderedTree, WatchEvent, WatchOptions};
use crate::application::{ApplicationError, IoResultExt};
use crate::cli::args::{Cli, Commands, ConfigCommands, LayoutFormat, UpdateMode};
use crate::cli::display;
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{self, Settings, SettingsRecord};
use crate::domain::FieldSelectors;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = match &cli.project_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(|e| InfraError::io("current dir", e))?,
    };

    match &cli.command {
        Some(Commands::Config { command }) => _config(command, &project_dir),
        Some(Commands::Completion { .. }) | None => Ok(()),
        Some(command) => {
            let settings = Settings::load(Some(project_dir.as_path()))?;
            let container = ServiceContainer::new(settings);
            match command {
                Commands::Tree { rows } => _tree(&container, rows.as_deref()),
                Commands::Layout { rows, format } => _layout(&container, rows.as_deref(), *format),
                Commands::Svg { rows, output } => {
                    _svg(&container, rows.as_deref(), output.as_deref())
                }
                Commands::Select { id, rows, update } => {
                    _select(&container, rows.as_deref(), id, *update)
                }
                Commands::Watch { rows, output } => _watch(&container, rows.as_deref(), output),
                Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
            }
        }
    }
}

/// Explicit rows path, else the configured source.
fn rows_path(settings: &Settings, rows: Option<&Path>) -> CliResult<PathBuf> {
    rows.map(Path::to_path_buf)
        .or_else(|| settings.source_path())
        .ok_or_else(|| {
            ApplicationError::ConfigurationIncomplete {
                missing: vec!["source"],
            }
            .into()
        })
}

fn render(
    container: &ServiceContainer,
    rows: Option<&Path>,
) -> CliResult<(RenderedTree, FieldSelectors)> {
    let selectors = container.settings.field_selectors()?;
    let path = rows_path(&container.settings, rows)?;
    let rendered = container.hierarchy.render_file(
        &path,
        &selectors,
        container.settings.layout_config(),
    )?;
    report_anomalies(&rendered);
    Ok((rendered, selectors))
}

fn report_anomalies(rendered: &RenderedTree) {
    if rendered.dropped_rows > 0 {
        output::warning(&format!(
            "{} row(s) without identifier or parent dropped",
            rendered.dropped_rows
        ));
    }
    if !rendered.duplicates.is_empty() {
        output::warning(&format!(
            "duplicate identifiers, first row kept: {}",
            rendered.duplicates.iter().join(", ")
        ));
    }
}

#[instrument(skip(container))]
fn _tree(container: &ServiceContainer, rows: Option<&Path>) -> CliResult<()> {
    let (rendered, _) = render(container, rows)?;
    match display::render_labels(&rendered.tree) {
        Some(text) => output::info(text.trim_end()),
        None => output::warning("no rows to display"),
    }
    Ok(())
}

#[instrument(skip(container))]
fn _layout(container: &ServiceContainer, rows: Option<&Path>, format: LayoutFormat) -> CliResult<()> {
    let (rendered, _) = render(container, rows)?;
    match format {
        LayoutFormat::Json => {
            let json = serde_json::to_string_pretty(&rendered.layout).map_err(InfraError::from)?;
            output::info(&json);
        }
        LayoutFormat::Text => output::info(&display::layout_lines(&rendered.layout)),
    }
    Ok(())
}

#[instrument(skip(container))]
fn _svg(container: &ServiceContainer, rows: Option<&Path>, out: Option<&Path>) -> CliResult<()> {
    let (rendered, _) = render(container, rows)?;
    let svg = container.svg_renderer().render(&rendered.layout);
    match out {
        Some(path) => {
            container
                .fs
                .write(path, &svg)
                .with_path_context("write svg", path)?;
            output::success(&format!(
                "{} nodes written to {}",
                rendered.layout.nodes.len(),
                path.display()
            ));
        }
        None => output::info(&svg),
    }
    Ok(())
}

#[instrument(skip(container))]
fn _select(
    container: &ServiceContainer,
    rows: Option<&Path>,
    id: &str,
    update: UpdateMode,
) -> CliResult<()> {
    let (rendered, selectors) = render(container, rows)?;
    let mut command = container.hierarchy.select(&rendered, &selectors, id)?;
    command.update = update.into();
    debug!("selection: {:?}", command);
    container
        .selections
        .send(&command)
        .map_err(|e| InfraError::io("send selection", e))?;
    Ok(())
}

#[instrument(skip(container))]
fn _watch(container: &ServiceContainer, rows: Option<&Path>, out: &Path) -> CliResult<()> {
    let selectors = container.settings.field_selectors()?;
    let options = WatchOptions {
        rows: rows_path(&container.settings, rows)?,
        output: out.to_path_buf(),
        selectors,
        layout: container.settings.layout_config(),
        debounce: container.settings.watch.debounce(),
        poll_interval: container.settings.watch.poll_interval(),
    };
    output::header(&format!(
        "Watching {} -> {} (Ctrl-C to stop)",
        options.rows.display(),
        options.output.display()
    ));

    container.watch_service().run(&options, |event| {
        match event {
            WatchEvent::Rendered { nodes } => output::success(&format!("rendered {nodes} nodes")),
            WatchEvent::Kept { error } => {
                output::failure(&format!("{error} (previous diagram kept)"))
            }
            WatchEvent::Idle => {}
        }
        true
    })?;
    Ok(())
}

#[instrument]
fn _config(command: &ConfigCommands, project_dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(project_dir))?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            let global = config::global_config_path();
            let local = config::local_config_path(project_dir);
            output::header("Config paths");
            match global {
                Some(path) => output::detail(&format!(
                    "global: {}{}",
                    path.display(),
                    if path.exists() { "" } else { " (missing)" }
                )),
                None => output::detail("global: <no config directory>"),
            }
            output::detail(&format!(
                "local:  {}{}",
                local.display(),
                if local.exists() { "" } else { " (missing)" }
            ));
        }
        ConfigCommands::Init { global } => {
            let path = target_path(*global, project_dir)?;
            if path.exists() {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            RealFileSystem
                .write(&path, &Settings::template())
                .with_path_context("write config", &path)?;
            output::action("Created", &path.display());
        }
        ConfigCommands::Set {
            source,
            id_field,
            parent_field,
            label_field,
            global,
        } => {
            let record = SettingsRecord {
                source: source.clone(),
                id_field: id_field.clone(),
                parent_field: parent_field.clone(),
                label_field: label_field.clone(),
            };
            if record.is_empty() {
                return Err(CliError::InvalidArgs(
                    "nothing to set: pass --source, --id-field, --parent-field or --label-field"
                        .to_string(),
                ));
            }
            let path = target_path(*global, project_dir)?;
            config::save_record(&path, &record)?;
            output::action("Saved", &path.display());
        }
    }
    Ok(())
}

fn target_path(global: bool, project_dir: &Path) -> CliResult<PathBuf> {
    if global {
        config::global_config_path()
            .ok_or_else(|| CliError::Usage("cannot determine global config directory".to_string()))
    } else {
        Ok(config::local_config_path(project_dir))
    }
}
