use std::ffi::OsString;
use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing_subscriber::EnvFilter;

use crate::commands;
use crate::context::CliSession;
use crate::error::{CliError, ExitStatus};
use crate::formatter::{OutputFormat, emit_result};
use crate::util::{Verbosity, display_path};

const NAME: &str = "cheatsheets";

pub fn run() -> ExitCode {
    match run_cli(std::env::args()) {
        Ok(code) => code,
        Err(err) => {
            err.print();
            err.exit_code()
        }
    }
}

/// Parses arguments, loads the site config and dispatches to the command.
/// Returns a `sysexits`-compatible `ExitCode`.
pub fn run_cli<I, S>(args: I) -> Result<ExitCode, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let command = build_cli();
    let matches = command.try_get_matches_from(args)?;

    let verbosity = Verbosity {
        json: matches.get_flag("json"),
        verbose: matches.get_flag("verbose"),
    };
    init_tracing(if verbosity.verbose { "debug" } else { "info" });
    let output = if verbosity.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let config_override = matches.get_one::<String>("config").cloned();
    let session = CliSession::bootstrap(config_override, verbosity)?;
    if session.verbosity.verbose {
        tracing::debug!(
            config = %session.config_path.as_deref().map(display_path).unwrap_or_default(),
            cheatsheets = %display_path(&session.config.cheatsheets_dir),
            www = %display_path(&session.config.www_dir),
            generated = %display_path(&session.config.generated_dir),
            "resolved site config"
        );
    }

    let result = dispatch(&session, &matches)?;
    emit_result(result, output)
}

/// Logs go to stderr so `--json` output stays parseable. `RUST_LOG`
/// overrides `default_filter`.
fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn build_cli() -> Command {
    Command::new(NAME)
        .about("Render, search and serve markdown cheatsheets")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .global(true)
                .help("Site config file. Defaults to ./cheatsheets.toml when present."),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Print results as JSON instead of text."),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Log debug output to stderr."),
        )
        .subcommand_required(true)
        .subcommand(commands::serve::command())
        .subcommand(commands::serve::prod_command())
        .subcommand(commands::generate::command())
        .subcommand(commands::toc::command())
        .subcommand(commands::search::command())
        .subcommand(commands::list::command())
        .subcommand(commands::deploy::command())
}

fn dispatch(
    session: &CliSession,
    matches: &ArgMatches,
) -> Result<commands::CommandResult, CliError> {
    match matches.subcommand() {
        Some(("run", sub)) => commands::serve::run(session, sub),
        Some(("run-prod", sub)) => commands::serve::run_prod(session, sub),
        Some(("gen", sub)) => commands::generate::run(session, sub),
        Some(("toc", sub)) => commands::toc::run(session, sub),
        Some(("search", sub)) => commands::search::run(session, sub),
        Some(("list", sub)) => commands::list::run(session, sub),
        Some(("deploy", sub)) => commands::deploy::run(session, sub),
        _ => Err(CliError::new("missing command", ExitStatus::Usage)),
    }
}
