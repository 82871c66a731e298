use std::path::PathBuf;

use cheatsheets::{Cheatsheet, MarkdownPreprocessor, base_name, flatten, render_markdown};
use clap::{Arg, ArgMatches, Command};
use serde::Serialize;

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::{CliError, ExitStatus};

#[derive(Clone, Debug, Serialize)]
pub struct TocLine {
    pub toc_level: usize,
    pub heading_level: u8,
    pub id: String,
    pub text: String,
}

pub fn command() -> Command {
    Command::new("toc")
        .about("Print the table of contents of a markdown file")
        .arg(Arg::new("file").value_name("FILE").required(true))
}

pub fn run(_session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let path = matches
        .get_one::<String>("file")
        .map(PathBuf::from)
        .ok_or_else(|| CliError::new("missing FILE", ExitStatus::Usage))?;
    if !path.is_file() {
        return Err(CliError::new(
            format!("'{}' is not a file", path.display()),
            ExitStatus::Usage,
        ));
    }

    let mut cheatsheet = Cheatsheet::new(base_name(&path), path);
    cheatsheet.load()?;
    let preprocessor = MarkdownPreprocessor::new()?;
    let mut rendered =
        render_markdown(&preprocessor, &cheatsheet.markdown, &cheatsheet.md_file_name)?;

    let entries = flatten(&mut rendered.navigation.toc)
        .into_iter()
        .map(|node| TocLine {
            toc_level: node.toc_level,
            heading_level: node.heading_level,
            id: node.id.clone(),
            text: node.content.clone(),
        })
        .collect();

    Ok(CommandResult::Toc {
        file: cheatsheet.md_file_name,
        title: cheatsheet.title,
        entries,
    })
}
