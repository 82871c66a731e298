use cheatsheets::{MarkdownPreprocessor, read_cheatsheets, render_markdown};
use clap::{Arg, ArgMatches, Command, value_parser};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde::Serialize;

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::{CliError, ExitStatus};

#[derive(Clone, Debug, Serialize)]
pub struct SearchHit {
    pub cheatsheet: String,
    pub title: String,
    pub text: String,
    pub url: String,
    pub toc_level: usize,
    pub score: i64,
}

pub fn command() -> Command {
    Command::new("search")
        .about("Fuzzy search the headings of every cheatsheet")
        .arg(Arg::new("query").value_name("QUERY").required(true))
        .arg(
            Arg::new("limit")
                .long("limit")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .default_value("20")
                .help("Maximum number of hits to print"),
        )
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let query = matches
        .get_one::<String>("query")
        .cloned()
        .ok_or_else(|| CliError::new("missing QUERY", ExitStatus::Usage))?;
    let limit = matches.get_one::<usize>("limit").copied().unwrap_or(20);

    let cheatsheets = read_cheatsheets(&session.config.cheatsheets_dir)?;
    let preprocessor = MarkdownPreprocessor::new()?;
    let matcher = SkimMatcherV2::default();

    let mut hits = Vec::new();
    for cheatsheet in &cheatsheets {
        let rendered =
            match render_markdown(&preprocessor, &cheatsheet.markdown, &cheatsheet.md_file_name) {
                Ok(rendered) => rendered,
                Err(err) if err.is_content_error() => {
                    tracing::warn!(cheatsheet = %cheatsheet.name, error = %err, "skipping cheatsheet");
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
        for entry in &rendered.navigation.search_index {
            let Some(score) = matcher.fuzzy_match(entry.text(), &query) else {
                continue;
            };
            hits.push(SearchHit {
                cheatsheet: cheatsheet.name.clone(),
                title: cheatsheet.title.clone(),
                text: entry.text().to_string(),
                url: format!("{}#{}", cheatsheet.url(), entry.id()),
                toc_level: entry.level(),
                score,
            });
        }
    }

    hits.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.cheatsheet.cmp(&b.cheatsheet))
            .then_with(|| a.url.cmp(&b.url))
    });
    hits.truncate(limit);
    tracing::debug!(query = %query, hits = hits.len(), "search finished");

    Ok(CommandResult::Search { query, hits })
}
