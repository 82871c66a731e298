use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::CheatsheetError;

/// File looked up in the working directory when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "cheatsheets.toml";

/// A file under `www_dir` served at a fixed URL.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct StaticFile {
    pub url: String,
    pub file: String,
}

/// Site layout and serving options.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    #[serde(default = "default_cheatsheets_dir")]
    pub cheatsheets_dir: PathBuf,
    #[serde(default = "default_www_dir")]
    pub www_dir: PathBuf,
    #[serde(default = "default_generated_dir")]
    pub generated_dir: PathBuf,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_alpine_url")]
    pub alpine_url: String,
    #[serde(default = "default_static_files")]
    pub static_files: Vec<StaticFile>,
    /// Request paths with one of these prefixes are not logged.
    #[serde(default = "default_log_skip_prefixes")]
    pub log_skip_prefixes: Vec<String>,
    /// Environment variable holding the deploy hook URL.
    #[serde(default = "default_deploy_hook_env")]
    pub deploy_hook_env: String,
}

fn default_cheatsheets_dir() -> PathBuf {
    PathBuf::from("cheatsheets")
}

fn default_www_dir() -> PathBuf {
    PathBuf::from("www")
}

fn default_generated_dir() -> PathBuf {
    PathBuf::from("www_generated")
}

fn default_port() -> u16 {
    9033
}

fn default_alpine_url() -> String {
    "//unpkg.com/alpinejs@3.4.2/dist/cdn.min.js".to_string()
}

fn default_static_files() -> Vec<StaticFile> {
    [
        ("/s/cheatsheet.css", "cheatsheet.css"),
        ("/s/cheatsheet.js", "cheatsheet.js"),
        ("/404.html", "404.html"),
        ("/ping.txt", "ping.txt"),
    ]
    .into_iter()
    .map(|(url, file)| StaticFile {
        url: url.to_string(),
        file: file.to_string(),
    })
    .collect()
}

fn default_log_skip_prefixes() -> Vec<String> {
    vec!["/ping".to_string()]
}

fn default_deploy_hook_env() -> String {
    "CHEATSHEETS_DEPLOY_HOOK".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            cheatsheets_dir: default_cheatsheets_dir(),
            www_dir: default_www_dir(),
            generated_dir: default_generated_dir(),
            port: default_port(),
            alpine_url: default_alpine_url(),
            static_files: default_static_files(),
            log_skip_prefixes: default_log_skip_prefixes(),
            deploy_hook_env: default_deploy_hook_env(),
        }
    }
}

impl SiteConfig {
    pub fn from_toml(text: &str) -> Result<Self, CheatsheetError> {
        toml::from_str(text).map_err(|err| CheatsheetError::Config(err.to_string()))
    }

    /// Loads `path` when given (it must exist), otherwise `cheatsheets.toml`
    /// in the working directory when present, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, CheatsheetError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if !required && !path.is_file() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path).map_err(|err| {
            CheatsheetError::Config(format!("failed to read {}: {err}", path.display()))
        })?;
        let config = Self::from_toml(&text).map_err(|err| err.context(path.display()))?;
        tracing::debug!(path = %path.display(), "loaded site config");
        Ok(config)
    }

    /// Resolves relative directories against `base`.
    pub fn rooted_at(mut self, base: &Path) -> Self {
        for dir in [
            &mut self.cheatsheets_dir,
            &mut self.www_dir,
            &mut self.generated_dir,
        ] {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        self
    }

    /// Absolute location of a static file entry.
    pub fn static_file_path(&self, file: &StaticFile) -> PathBuf {
        self.www_dir.join(&file.file)
    }
}
