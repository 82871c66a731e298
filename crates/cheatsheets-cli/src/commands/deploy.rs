use clap::{ArgMatches, Command};

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::{CliError, ExitStatus};

pub fn command() -> Command {
    Command::new("deploy").about("Trigger a deploy by calling the deploy hook URL")
}

pub fn run(session: &CliSession, _matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let var = &session.config.deploy_hook_env;
    let url = std::env::var(var)
        .ok()
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| CliError::new(format!("need env variable {var}"), ExitStatus::Config))?;

    let (status, response) = match ureq::get(&url).call() {
        Ok(response) => (response.status(), response),
        Err(ureq::Error::Status(code, response)) => (code, response),
        Err(err) => {
            return Err(CliError::new(
                format!("failed to call deploy hook: {err}"),
                ExitStatus::Io,
            ));
        }
    };
    let body = response.into_string()?;
    tracing::info!(status, "called deploy hook");

    Ok(CommandResult::Deployed {
        status,
        response: body,
    })
}
