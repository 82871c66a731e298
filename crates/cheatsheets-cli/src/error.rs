use std::fmt;
use std::process::ExitCode;

use cheatsheets::CheatsheetError;
use cheatsheets_server::ServerError;
use clap::error::ErrorKind as ClapErrorKind;

const EX_OK: u8 = 0;
const EX_USAGE: u8 = 64;
const EX_DATAERR: u8 = 65;
const EX_SOFTWARE: u8 = 70;
const EX_OSERR: u8 = 71;
const EX_CONFIG: u8 = 78;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Ok,
    Usage,
    Data,
    Io,
    Config,
    Software,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Ok => EX_OK,
            ExitStatus::Usage => EX_USAGE,
            ExitStatus::Data => EX_DATAERR,
            ExitStatus::Io => EX_OSERR,
            ExitStatus::Config => EX_CONFIG,
            ExitStatus::Software => EX_SOFTWARE,
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    message: String,
    status: ExitStatus,
}

impl CliError {
    pub fn new(message: impl Into<String>, status: ExitStatus) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    pub fn status(&self) -> ExitStatus {
        self.status
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.status.code())
    }

    pub fn print(&self) {
        if !self.message.is_empty() {
            eprintln!("{}", self.message);
        }
    }
}

fn cheatsheet_status(err: &CheatsheetError) -> ExitStatus {
    match err {
        CheatsheetError::DuplicateHeadingId { .. }
        | CheatsheetError::LevelSkip { .. }
        | CheatsheetError::FrontMatter(_) => ExitStatus::Data,
        CheatsheetError::Template(_) | CheatsheetError::Config(_) => ExitStatus::Config,
        CheatsheetError::Serialization(_) => ExitStatus::Software,
        CheatsheetError::Io(_) => ExitStatus::Io,
    }
}

impl From<CheatsheetError> for CliError {
    fn from(err: CheatsheetError) -> Self {
        CliError::new(err.to_string(), cheatsheet_status(&err))
    }
}

impl From<ServerError> for CliError {
    fn from(err: ServerError) -> Self {
        let status = match &err {
            ServerError::Cheatsheet(inner) => cheatsheet_status(inner),
            ServerError::Io(_) | ServerError::Zip(_) => ExitStatus::Io,
            ServerError::MissingFile { .. } => ExitStatus::Config,
            ServerError::UnknownCheatsheet(_) => ExitStatus::Usage,
        };
        CliError::new(err.to_string(), status)
    }
}

impl From<clap::Error> for CliError {
    fn from(err: clap::Error) -> Self {
        let status = match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => ExitStatus::Ok,
            _ => ExitStatus::Usage,
        };
        if status == ExitStatus::Ok {
            let _ = err.print();
            CliError::new(String::new(), status)
        } else {
            CliError::new(err.to_string(), status)
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::new(err.to_string(), ExitStatus::Io)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::new(err.to_string(), ExitStatus::Software)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}
