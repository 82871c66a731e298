use std::path::{Path, PathBuf};

use cheatsheets::SiteConfig;

use crate::error::CliError;
use crate::util::Verbosity;

pub struct CliSession {
    pub config: SiteConfig,
    /// Config file the session was loaded from, if any.
    pub config_path: Option<PathBuf>,
    pub verbosity: Verbosity,
}

impl CliSession {
    /// Loads the site config. Relative directories in an explicit config file
    /// resolve against the file's directory, otherwise against the working
    /// directory.
    pub fn bootstrap(config_override: Option<String>, verbosity: Verbosity) -> Result<Self, CliError> {
        let config_path = config_override.map(PathBuf::from);
        let mut config = SiteConfig::load(config_path.as_deref())?;
        if let Some(base) = config_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|dir| !dir.as_os_str().is_empty())
        {
            config = config.rooted_at(base);
        }

        Ok(Self {
            config,
            config_path,
            verbosity,
        })
    }
}
