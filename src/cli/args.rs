//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// DITA key space resolver
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: ditakeys.toml, searched upward)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Boundary root directories, replacing `[workspace] roots`
    #[arg(short, long = "boundary", global = true, value_name = "DIR", value_hint = clap::ValueHint::DirPath)]
    pub boundaries: Vec<PathBuf>,

    /// Disable path boundary checks entirely
    #[arg(long, global = true, conflicts_with = "boundaries")]
    pub no_boundary: bool,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Resolve a key reference (`key` or `key/element`) for a file
    #[command(visible_alias = "r")]
    Resolve {
        /// Key name, optionally followed by `/element-id`
        key: String,

        /// File the reference appears in
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        from: PathBuf,

        /// Print the result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List every key defined by a root map
    #[command(visible_alias = "k")]
    Keys {
        /// Root map to build
        #[arg(value_hint = clap::ValueHint::FilePath)]
        root_map: PathBuf,

        /// Print the key space as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the root map governing a file
    Root {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Rebuild a key space whenever its maps change
    #[command(visible_alias = "w")]
    Watch {
        /// Root map to keep built
        #[arg(value_hint = clap::ValueHint::FilePath)]
        root_map: PathBuf,
    },

    /// Build the given root maps and print cache statistics as JSON
    Stats {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        root_maps: Vec<PathBuf>,
    },
}
