use std::path::PathBuf;

use anyhow::{Result, bail};

pub const USAGE: &str = "\
Usage: vellum [--dry-run] [STATE_PATH]

Bring the persisted state blob up to the current schema version.

Options:
  --dry-run   List the migrations that would run, change nothing
  -h, --help  Show this message

STATE_PATH defaults to [store] path in ~/.vellum/config.toml,
then ~/.vellum/state.json.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Migrate,
    DryRun,
    Help,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Args {
    pub command: Command,
    pub state_path: Option<PathBuf>,
}

impl Args {
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut command = Command::Migrate;
        let mut state_path = None;

        for arg in args {
            match arg.as_str() {
                "-h" | "--help" => command = Command::Help,
                "--dry-run" if command != Command::Help => command = Command::DryRun,
                "--dry-run" => {}
                flag if flag.starts_with('-') => bail!("unknown option `{flag}`\n\n{USAGE}"),
                _ if state_path.is_some() => bail!("more than one STATE_PATH given\n\n{USAGE}"),
                _ => state_path = Some(PathBuf::from(&arg)),
            }
        }

        Ok(Self {
            command,
            state_path,
        })
    }
}
