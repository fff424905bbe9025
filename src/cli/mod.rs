//! CLI module for Butterfly.
//!
//! Commands:
//! - show: expand, lay out and print the butterfly around a location
//! - resolve: print the function occurrence at a location
//! - jump: decode a renderer activation event

pub mod show;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::Theme;

#[derive(Parser)]
#[command(name = "butterfly")]
#[command(about = "Butterfly - bounded caller/callee graphs around one function", long_about = None)]
pub struct Cli {
    /// Path to butterfly.toml (defaults are used if missing)
    #[arg(short, long, default_value = "butterfly.toml")]
    pub config: PathBuf,

    /// More logging (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// A cursor position on the command line.
#[derive(clap::Args, Debug, Clone)]
pub struct LocationArgs {
    /// Source file
    pub file: PathBuf,
    /// Line (0-based)
    pub line: u32,
    /// Column (0-based)
    pub column: u32,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the butterfly around the function at a location
    Show {
        /// Call index JSON
        #[arg(short, long)]
        index: PathBuf,

        #[command(flatten)]
        location: LocationArgs,

        /// Caller wing depth (overrides config)
        #[arg(long)]
        caller_levels: Option<usize>,

        /// Callee wing depth (overrides config)
        #[arg(long)]
        callee_levels: Option<usize>,

        /// Bucket cap per (wing, depth) (overrides config)
        #[arg(long)]
        max_nodes: Option<usize>,

        /// Colour theme (overrides config)
        #[arg(long, value_enum)]
        theme: Option<ThemeArg>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the function at a location
    Resolve {
        /// Call index JSON
        #[arg(short, long)]
        index: PathBuf,

        #[command(flatten)]
        location: LocationArgs,
    },

    /// Decode a jump event sent by the renderer
    Jump {
        /// Event JSON, e.g. '{"file":"src/main.cpp","line":3,"column":4}'
        event: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Dot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeArg {
    Default,
    Dark,
    Light,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Default => Theme::Default,
            ThemeArg::Dark => Theme::Dark,
            ThemeArg::Light => Theme::Light,
        }
    }
}

/// Dispatch a parsed command line.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Show {
            index,
            location,
            caller_levels,
            callee_levels,
            max_nodes,
            theme,
            format,
        } => {
            let overrides = show::Overrides {
                caller_levels,
                callee_levels,
                max_nodes_per_level: max_nodes,
                theme: theme.map(Theme::from),
            };
            show::show(&cli.config, &index, &location, &overrides, format).await
        }
        Commands::Resolve { index, location } => show::resolve(&cli.config, &index, &location).await,
        Commands::Jump { event } => show::jump(&event),
    }
}
