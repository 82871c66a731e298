use std::path::PathBuf;
use std::time::Instant;

use cheatsheets::format_duration;
use clap::{Arg, ArgMatches, Command};

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::CliError;
use crate::util::display_path;

pub fn command() -> Command {
    Command::new("gen")
        .about("Render every page into the generated directory")
        .arg(
            Arg::new("zip")
                .long("zip")
                .value_name("PATH")
                .help("Write the pages into a zip archive instead"),
        )
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let start = Instant::now();
    let zip = matches.get_one::<String>("zip").map(PathBuf::from);
    let (target, summary) = match &zip {
        Some(path) => (
            path.clone(),
            cheatsheets_server::generate_zip(&session.config, path)?,
        ),
        None => (
            session.config.generated_dir.clone(),
            cheatsheets_server::generate(&session.config)?,
        ),
    };

    Ok(CommandResult::Generated {
        target: display_path(&target),
        zip: zip.is_some(),
        files: summary.files,
        total_bytes: summary.total_bytes,
        took: format_duration(start.elapsed()),
    })
}
