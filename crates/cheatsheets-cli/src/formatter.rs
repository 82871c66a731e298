use std::process::ExitCode;

use cheatsheets::format_size;

use crate::commands::CommandResult;
use crate::commands::serve::ServeMode;
use crate::commands::toc::TocLine;
use crate::error::CliError;

pub enum OutputFormat {
    Text,
    Json,
}

/// Prints `result` as text or a single JSON line and maps it to an exit code.
pub fn emit_result(result: CommandResult, format: OutputFormat) -> Result<ExitCode, CliError> {
    match format {
        OutputFormat::Text => print_text(&result),
        OutputFormat::Json => print_json(&result)?,
    };
    Ok(ExitCode::from(result.exit_status().code()))
}

fn print_text(result: &CommandResult) {
    match result {
        CommandResult::ServerStopped { mode } => {
            let mode = match mode {
                ServeMode::Dynamic => "dynamic",
                ServeMode::Generated => "generated",
            };
            println!("Server stopped ({mode})");
        }
        CommandResult::Generated {
            target,
            zip,
            files,
            total_bytes,
            took,
        } => {
            let kind = if *zip { "archive" } else { "directory" };
            println!(
                "Wrote {files} files ({}) to {kind} {target} in {took}",
                format_size(*total_bytes)
            );
        }
        CommandResult::Toc {
            file,
            title,
            entries,
        } => {
            println!("{title} ({file})");
            if entries.is_empty() {
                println!("  no headings");
            }
            for entry in entries {
                println!("{}", toc_line(entry));
            }
        }
        CommandResult::Search { query, hits } => {
            if hits.is_empty() {
                println!("No matches for '{query}'");
            }
            for hit in hits {
                println!("{:>4}  {}: {}  {}", hit.score, hit.title, hit.text, hit.url);
            }
        }
        CommandResult::List { cheatsheets } => {
            println!("Cheatsheets ({}):", cheatsheets.len());
            for cs in cheatsheets {
                let marker = if cs.in_main { "*" } else { " " };
                match cs.category.as_deref() {
                    Some(category) => {
                        println!("  {marker} {} [{category}] {} ({})", cs.title, cs.url, cs.source)
                    }
                    None => println!("  {marker} {} {} ({})", cs.title, cs.url, cs.source),
                }
            }
        }
        CommandResult::Deployed { status, response } => {
            println!("Deploy hook returned {status}");
            if !response.trim().is_empty() {
                println!("{}", response.trim_end());
            }
        }
    }
}

/// Two dots per nesting level, then one `#` per heading level.
fn toc_line(entry: &TocLine) -> String {
    format!(
        "{}{} {} (#{})",
        "..".repeat(entry.toc_level),
        "#".repeat(usize::from(entry.heading_level)),
        entry.text,
        entry.id
    )
}

fn print_json(result: &CommandResult) -> Result<(), CliError> {
    println!("{}", serde_json::to_string(result)?);
    Ok(())
}
