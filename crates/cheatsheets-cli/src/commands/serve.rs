use clap::{ArgMatches, Command};
use serde::Serialize;

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::{CliError, ExitStatus};
use crate::util;

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServeMode {
    Dynamic,
    Generated,
}

pub fn command() -> Command {
    Command::new("run").about("Serve cheatsheets, rendering markdown on every request")
}

pub fn prod_command() -> Command {
    Command::new("run-prod").about("Serve the directory written by `gen`")
}

pub fn run(session: &CliSession, _matches: &ArgMatches) -> Result<CommandResult, CliError> {
    util::runtime()?.block_on(cheatsheets_server::run_dynamic_server(&session.config))?;
    Ok(CommandResult::ServerStopped {
        mode: ServeMode::Dynamic,
    })
}

pub fn run_prod(session: &CliSession, _matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let dir = &session.config.generated_dir;
    if !dir.is_dir() {
        return Err(CliError::new(
            format!(
                "generated directory '{}' doesn't exist, run `cheatsheets gen` first",
                util::display_path(dir)
            ),
            ExitStatus::Config,
        ));
    }
    util::runtime()?.block_on(cheatsheets_server::run_prod_server(&session.config))?;
    Ok(CommandResult::ServerStopped {
        mode: ServeMode::Generated,
    })
}
