//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::SelectionUpdate;

/// Turn parent/child row tables into laid-out, selectable tree diagrams
#[derive(Parser, Debug)]
#[command(name = "rowtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory holding .rowtree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the hierarchy as a text tree
    Tree {
        /// Rows file (default: configured source)
        #[arg(value_hint = ValueHint::FilePath)]
        rows: Option<PathBuf>,
    },

    /// Print positioned nodes and edges
    Layout {
        /// Rows file (default: configured source)
        #[arg(value_hint = ValueHint::FilePath)]
        rows: Option<PathBuf>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = LayoutFormat::Json)]
        format: LayoutFormat,
    },

    /// Render the diagram as SVG
    Svg {
        /// Rows file (default: configured source)
        #[arg(value_hint = ValueHint::FilePath)]
        rows: Option<PathBuf>,
        /// Output file (default: stdout)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Emit the selection command for a node
    Select {
        /// Node identifier
        id: String,
        /// Rows file (default: configured source)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        rows: Option<PathBuf>,
        /// How the host combines this with its current selection
        #[arg(short, long, value_enum, default_value_t = UpdateMode::Replace)]
        update: UpdateMode,
    },

    /// Re-render the SVG whenever the rows file changes
    Watch {
        /// Rows file (default: configured source)
        #[arg(value_hint = ValueHint::FilePath)]
        rows: Option<PathBuf>,
        /// Output file
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutFormat {
    Json,
    Text,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateMode {
    Replace,
    Add,
    Remove,
}

impl From<UpdateMode> for SelectionUpdate {
    fn from(mode: UpdateMode) -> Self {
        match mode {
            UpdateMode::Replace => SelectionUpdate::Replace,
            UpdateMode::Add => SelectionUpdate::Add,
            UpdateMode::Remove => SelectionUpdate::Remove,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Save the data source and field selectors
    Set {
        /// Rows file
        #[arg(long)]
        source: Option<String>,
        /// Identifier field
        #[arg(long)]
        id_field: Option<String>,
        /// Parent identifier field
        #[arg(long)]
        parent_field: Option<String>,
        /// Label field
        #[arg(long)]
        label_field: Option<String>,
        /// Write to the global config
        #[arg(short, long)]
        global: bool,
    },
}
