//! ditakeys - DITA key space resolver.

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use ditakeys::cli::{self, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    ditakeys::logger::set_verbose(cli.verbose);

    let config = cli::load_config(&cli)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(cli::run(&cli, config))
}
