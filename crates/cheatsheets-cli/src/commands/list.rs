use cheatsheets::read_cheatsheets;
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::CliError;

#[derive(Clone, Debug, Serialize)]
pub struct CheatsheetSummary {
    pub name: String,
    pub title: String,
    pub url: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub in_main: bool,
}

pub fn command() -> Command {
    Command::new("list")
        .about("List the discovered cheatsheets")
        .arg(
            Arg::new("main")
                .long("main")
                .action(ArgAction::SetTrue)
                .help("Only list cheatsheets shown on the main index"),
        )
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let main_only = matches.get_flag("main");
    let mut cheatsheets: Vec<CheatsheetSummary> = read_cheatsheets(&session.config.cheatsheets_dir)?
        .into_iter()
        .filter(|cs| !main_only || cs.in_main)
        .map(|cs| CheatsheetSummary {
            url: cs.url(),
            category: cs.category().map(str::to_string),
            name: cs.name,
            title: cs.title,
            source: cs.md_file_name,
            in_main: cs.in_main,
        })
        .collect();
    cheatsheets.sort_by_cached_key(|cs| cs.title.to_lowercase());

    Ok(CommandResult::List { cheatsheets })
}
