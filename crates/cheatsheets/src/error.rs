use std::fmt;

use thiserror::Error;

/// High-level error type shared across cheatsheet components.
///
/// `DuplicateHeadingId` and `LevelSkip` describe malformed source documents.
/// They abort the render of the document they were found in and are never
/// retried.
#[derive(Debug, Error)]
pub enum CheatsheetError {
    #[error("duplicate heading id '{id}' in '{path}'")]
    DuplicateHeadingId { id: String, path: String },
    #[error("skipping more than 1 level in '{path}', '{heading}'")]
    LevelSkip { path: String, heading: String },
    #[error("front matter error: {0}")]
    FrontMatter(String),
    #[error("template error: {0}")]
    Template(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for CheatsheetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<handlebars::RenderError> for CheatsheetError {
    fn from(err: handlebars::RenderError) -> Self {
        Self::Template(err.to_string())
    }
}

impl From<handlebars::TemplateError> for CheatsheetError {
    fn from(err: handlebars::TemplateError) -> Self {
        Self::Template(err.to_string())
    }
}

impl CheatsheetError {
    /// True for errors caused by the content of a cheatsheet rather than by
    /// the environment it is rendered in.
    pub fn is_content_error(&self) -> bool {
        matches!(
            self,
            CheatsheetError::DuplicateHeadingId { .. }
                | CheatsheetError::LevelSkip { .. }
                | CheatsheetError::FrontMatter(_)
        )
    }

    pub fn context<T: fmt::Display>(self, ctx: T) -> Self {
        match self {
            CheatsheetError::FrontMatter(msg) => {
                CheatsheetError::FrontMatter(format!("{ctx}: {msg}"))
            }
            CheatsheetError::Template(msg) => CheatsheetError::Template(format!("{ctx}: {msg}")),
            CheatsheetError::Config(msg) => CheatsheetError::Config(format!("{ctx}: {msg}")),
            CheatsheetError::Serialization(msg) => {
                CheatsheetError::Serialization(format!("{ctx}: {msg}"))
            }
            other => other,
        }
    }
}
