//! vellum CLI - loads the persisted state blob, runs the built-in migrations,
//! and writes the result back.
//!
//! A failing migration never stops the pass: the blob's data is kept as it
//! was, the version stamp still advances, and the failure goes to the log.
//! Only problems outside the engine (unreadable blob, misordered built-in
//! migrations, bad config) end the process with an error.

mod args;
mod host;

use anyhow::{Context, Result};
use std::env;
use std::io;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use vellum_config::VellumConfig;
use vellum_core::steps::builtin_registry;
use vellum_store::{Durability, JsonFileStore};

use crate::args::{Args, Command, USAGE};
use crate::host::{PassOptions, run_pass};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let args = Args::parse(env::args().skip(1))?;
    if args.command == Command::Help {
        println!("{USAGE}");
        return Ok(());
    }

    let config = VellumConfig::load()
        .context("failed to load config")?
        .unwrap_or_default();

    // Misordered built-in steps are a build defect: refuse to touch the blob.
    let registry = builtin_registry().context("built-in migrations are misordered")?;

    let path = args
        .state_path
        .or_else(|| config.state_path())
        .context("could not determine the state path; pass STATE_PATH")?;
    let durability = if config.fsync() {
        Durability::Synced
    } else {
        Durability::Relaxed
    };
    let store = JsonFileStore::new(path).with_durability(durability);

    let options = PassOptions {
        target: config.target_version(),
        report_failures: config.diagnostics_enabled(),
        dry_run: args.command == Command::DryRun,
    };
    let summary = run_pass(&store, &registry, &options)?;
    println!("{summary}");

    Ok(())
}
