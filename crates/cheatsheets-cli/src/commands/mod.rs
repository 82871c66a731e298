use serde::Serialize;

use crate::error::ExitStatus;

pub mod deploy;
pub mod generate;
pub mod list;
pub mod search;
pub mod serve;
pub mod toc;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandResult {
    ServerStopped {
        mode: serve::ServeMode,
    },
    Generated {
        target: String,
        zip: bool,
        files: usize,
        total_bytes: u64,
        took: String,
    },
    Toc {
        file: String,
        title: String,
        entries: Vec<toc::TocLine>,
    },
    Search {
        query: String,
        hits: Vec<search::SearchHit>,
    },
    List {
        cheatsheets: Vec<list::CheatsheetSummary>,
    },
    Deployed {
        status: u16,
        response: String,
    },
}

impl CommandResult {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            CommandResult::Deployed { status, .. } if !(200..300).contains(status) => {
                ExitStatus::Software
            }
            _ => ExitStatus::Ok,
        }
    }
}
