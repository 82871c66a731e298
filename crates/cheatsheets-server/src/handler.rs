//! URL handlers that make up a site. Each handler lists the URLs it serves
//! and produces their content on demand.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cheatsheets::{
    Cheatsheet, CheatsheetError, MarkdownPreprocessor, PageTemplates, RenderContext, SiteConfig,
    find_by_name, render_cheatsheet_html, render_index_html,
};
use ignore::WalkBuilder;

use crate::error::{Result, ServerError};

pub const CHEATSHEET_PREFIX: &str = "/cheatsheet/";
pub const INDEX_URL: &str = "/index.html";
pub const ALL_URL: &str = "/all.html";

pub trait ContentHandler: Send + Sync {
    /// Every URL this handler serves, used for static export.
    fn urls(&self) -> Vec<String>;

    /// Content for `uri`, or `None` when this handler does not serve it.
    fn get(&self, uri: &str) -> Option<Result<Vec<u8>>>;
}

/// Fixed URL to file mapping. URLs match case-insensitively.
pub struct FilesHandler {
    files: Vec<(String, PathBuf)>,
}

impl FilesHandler {
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Static files listed in the site config, resolved under `www_dir`.
    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        let mut handler = Self::new();
        for file in &config.static_files {
            handler.add_file(&file.url, config.static_file_path(file))?;
        }
        Ok(handler)
    }

    pub fn add_file(&mut self, url: &str, path: PathBuf) -> Result<()> {
        if !path.is_file() {
            return Err(ServerError::MissingFile {
                url: url.to_string(),
                path: path.display().to_string(),
            });
        }
        self.files.push((url.to_string(), path));
        Ok(())
    }
}

impl Default for FilesHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentHandler for FilesHandler {
    fn urls(&self) -> Vec<String> {
        self.files.iter().map(|(url, _)| url.clone()).collect()
    }

    fn get(&self, uri: &str) -> Option<Result<Vec<u8>>> {
        lookup_file(&self.files, uri)
    }
}

/// Serves every file under a directory at `url_prefix` + its relative path.
pub struct DirHandler {
    files: Vec<(String, PathBuf)>,
}

impl DirHandler {
    pub fn new(dir: &Path, url_prefix: &str) -> Self {
        let walker = WalkBuilder::new(dir).standard_filters(false).build();
        let mut files = Vec::new();
        for entry in walker.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Ok(relative) = path.strip_prefix(dir) else {
                continue;
            };
            let relative = relative.to_string_lossy().replace('\\', "/");
            let url = format!("{}/{}", url_prefix.trim_end_matches('/'), relative);
            files.push((url, path.to_path_buf()));
        }
        files.sort();
        tracing::debug!(dir = %dir.display(), files = files.len(), "indexed directory");
        Self { files }
    }
}

impl ContentHandler for DirHandler {
    fn urls(&self) -> Vec<String> {
        self.files.iter().map(|(url, _)| url.clone()).collect()
    }

    fn get(&self, uri: &str) -> Option<Result<Vec<u8>>> {
        lookup_file(&self.files, uri)
    }
}

fn lookup_file(files: &[(String, PathBuf)], uri: &str) -> Option<Result<Vec<u8>>> {
    files
        .iter()
        .find(|(url, _)| url.eq_ignore_ascii_case(uri))
        .map(|(_, path)| fs::read(path).map_err(ServerError::from))
}

/// State shared by the dynamic page handlers.
pub struct Catalog {
    pub cheatsheets: Vec<Cheatsheet>,
    pub preprocessor: MarkdownPreprocessor,
    pub www_dir: PathBuf,
    pub alpine_url: String,
}

impl Catalog {
    pub fn load(config: &SiteConfig) -> Result<Self> {
        Ok(Self {
            cheatsheets: cheatsheets::read_cheatsheets(&config.cheatsheets_dir)?,
            preprocessor: MarkdownPreprocessor::new()?,
            www_dir: config.www_dir.clone(),
            alpine_url: config.alpine_url.clone(),
        })
    }

    /// Templates are re-read on every render so edits show up at once.
    fn render_with<T>(
        &self,
        f: impl FnOnce(&RenderContext<'_>) -> std::result::Result<T, CheatsheetError>,
    ) -> Result<T> {
        let templates = PageTemplates::load(Some(&self.www_dir))?;
        let ctx = RenderContext {
            preprocessor: &self.preprocessor,
            templates: &templates,
            alpine_url: &self.alpine_url,
        };
        Ok(f(&ctx)?)
    }
}

/// `/cheatsheet/<name>.html`, re-read and re-rendered on every request.
pub struct CheatsheetPages {
    catalog: Arc<Catalog>,
}

impl CheatsheetPages {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    fn render(&self, name: &str) -> Result<Vec<u8>> {
        let mut cheatsheet = find_by_name(&self.catalog.cheatsheets, name)
            .cloned()
            .ok_or_else(|| ServerError::UnknownCheatsheet(name.to_string()))?;
        cheatsheet.load()?;
        let html = self
            .catalog
            .render_with(|ctx| render_cheatsheet_html(&cheatsheet, ctx))?;
        Ok(html.into_bytes())
    }
}

/// Name of the cheatsheet addressed by `uri`, when it has the page shape.
pub fn cheatsheet_name(uri: &str) -> Option<&str> {
    let prefix = uri.get(..CHEATSHEET_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(CHEATSHEET_PREFIX) {
        return None;
    }
    let file = &uri[CHEATSHEET_PREFIX.len()..];
    let stem_len = file.len().checked_sub(".html".len())?;
    let (stem, ext) = file.split_at_checked(stem_len)?;
    if !ext.eq_ignore_ascii_case(".html") || stem.is_empty() || stem.contains('/') {
        return None;
    }
    Some(stem)
}

impl ContentHandler for CheatsheetPages {
    fn urls(&self) -> Vec<String> {
        self.catalog.cheatsheets.iter().map(Cheatsheet::url).collect()
    }

    fn get(&self, uri: &str) -> Option<Result<Vec<u8>>> {
        let name = cheatsheet_name(uri)?;
        find_by_name(&self.catalog.cheatsheets, name)?;
        Some(self.render(name))
    }
}

/// `/index.html` lists the main cheatsheets, `/all.html` every cheatsheet.
pub struct IndexPages {
    catalog: Arc<Catalog>,
}

impl IndexPages {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

impl ContentHandler for IndexPages {
    fn urls(&self) -> Vec<String> {
        vec![INDEX_URL.to_string(), ALL_URL.to_string()]
    }

    fn get(&self, uri: &str) -> Option<Result<Vec<u8>>> {
        let all = match uri {
            INDEX_URL => false,
            ALL_URL => true,
            _ => return None,
        };
        tracing::debug!(uri, "rendering index page");
        let rendered = self
            .catalog
            .render_with(|ctx| render_index_html(&self.catalog.cheatsheets, all, ctx))
            .map(String::into_bytes);
        Some(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn cheatsheet_name_requires_prefix_and_html() {
        assert_eq!(cheatsheet_name("/cheatsheet/go.html"), Some("go"));
        assert_eq!(cheatsheet_name("/CheatSheet/Go.HTML"), Some("Go"));
        assert_eq!(cheatsheet_name("/cheatsheet/go"), None);
        assert_eq!(cheatsheet_name("/cheatsheet/.html"), None);
        assert_eq!(cheatsheet_name("/cheatsheet/a/b.html"), None);
        assert_eq!(cheatsheet_name("/go.html"), None);
    }

    #[test]
    fn files_handler_matches_case_insensitively() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ping.txt");
        fs::write(&path, "pong").unwrap();

        let mut handler = FilesHandler::new();
        handler.add_file("/ping.txt", path).unwrap();
        assert_eq!(handler.get("/PING.txt").unwrap().unwrap(), b"pong");
        assert!(handler.get("/pong.txt").is_none());
    }

    #[test]
    fn files_handler_rejects_missing_files() {
        let dir = tempdir().unwrap();
        let err = FilesHandler::new()
            .add_file("/x.css", dir.path().join("x.css"))
            .unwrap_err();
        assert!(matches!(err, ServerError::MissingFile { .. }));
    }

    #[test]
    fn dir_handler_lists_nested_files() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("cheatsheet")).unwrap();
        fs::write(dir.path().join("index.html"), "i").unwrap();
        fs::write(dir.path().join("cheatsheet/go.html"), "g").unwrap();

        let handler = DirHandler::new(dir.path(), "/");
        assert_eq!(
            handler.urls(),
            vec!["/cheatsheet/go.html".to_string(), "/index.html".to_string()]
        );
        assert_eq!(handler.get("/cheatsheet/go.html").unwrap().unwrap(), b"g");
    }
}
