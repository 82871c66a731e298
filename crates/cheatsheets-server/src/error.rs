use std::io;

use cheatsheets::CheatsheetError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Cheatsheet(#[from] CheatsheetError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("file '{path}' for '{url}' doesn't exist")]
    MissingFile { url: String, path: String },
    #[error("no cheatsheet matches '{0}'")]
    UnknownCheatsheet(String),
}

impl ServerError {
    /// True when the failure comes from the content of a cheatsheet.
    pub fn is_content_error(&self) -> bool {
        matches!(self, ServerError::Cheatsheet(err) if err.is_content_error())
    }
}
