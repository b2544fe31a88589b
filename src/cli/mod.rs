//! Command-line interface module.

mod args;
mod keys;
mod resolve;
mod watch;

pub use args::{Cli, Commands};

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::EngineConfig;
use crate::keyspace::KeyEngine;
use crate::utils::path::normalize_path;

/// Load `ditakeys.toml` and apply the global boundary flags.
///
/// `--boundary` directories are taken relative to the current directory,
/// not to the config file.
pub fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = EngineConfig::load(cli.config.as_deref()).context("failed to load config")?;

    if cli.no_boundary {
        config.workspace.roots.clear();
    } else if !cli.boundaries.is_empty() {
        config.workspace.roots = cli.boundaries.iter().map(|p| normalize_path(p)).collect();
    }
    Ok(config)
}

/// Execute the parsed command.
pub async fn run(cli: &Cli, config: EngineConfig) -> Result<()> {
    let engine = KeyEngine::with_config(config).context("invalid configuration")?;

    match &cli.command {
        Commands::Resolve { key, from, json } => resolve::resolve(&engine, key, from, *json).await,
        Commands::Keys { root_map, json } => keys::list_keys(&engine, root_map, *json).await,
        Commands::Root { file } => resolve::show_root(&engine, file).await,
        Commands::Watch { root_map } => watch::watch(&engine, root_map).await,
        Commands::Stats { root_maps } => keys::stats(&engine, root_maps).await,
    }
}

/// Fail early with a readable message for paths the user typed.
fn require_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        anyhow::bail!("not a file: {}", path.display());
    }
    Ok(())
}
