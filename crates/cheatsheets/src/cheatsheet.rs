use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::Serialize;

use crate::error::CheatsheetError;
use crate::front_matter::{CheatsheetMeta, parse_meta, split_front_matter};
use crate::parse::normalize_newlines;

/// Path fragment marking a cheatsheet for the main index.
const MAIN_MARKER: &str = "good";

/// One markdown cheatsheet and its front matter.
#[derive(Clone, Debug, Serialize)]
pub struct Cheatsheet {
    /// Unique name derived from the file name, used in URLs.
    pub name: String,
    #[serde(skip)]
    pub md_path: PathBuf,
    /// Source path with forward slashes.
    pub md_file_name: String,
    pub title: String,
    pub meta: CheatsheetMeta,
    /// Listed on `/index.html`; every cheatsheet is listed on `/all.html`.
    pub in_main: bool,
    /// Markdown body without front matter.
    #[serde(skip)]
    pub markdown: String,
    pub path_html: String,
}

impl Cheatsheet {
    pub fn new(name: String, md_path: PathBuf) -> Self {
        let md_file_name = md_path.to_string_lossy().replace('\\', "/");
        let in_main = md_file_name.contains(MAIN_MARKER);
        Self {
            path_html: name.clone(),
            title: name.clone(),
            name,
            md_path,
            md_file_name,
            meta: CheatsheetMeta::new(),
            in_main,
            markdown: String::new(),
        }
    }

    pub fn url(&self) -> String {
        format!("/cheatsheet/{}.html", self.name)
    }

    pub fn category(&self) -> Option<&str> {
        self.meta
            .get("category")
            .map(String::as_str)
            .filter(|c| !c.is_empty())
    }

    /// Re-reads the source file, replacing the markdown body and metadata.
    pub fn load(&mut self) -> Result<(), CheatsheetError> {
        let raw = fs::read_to_string(&self.md_path)?;
        let text = normalize_newlines(&raw);
        let split = split_front_matter(&text)
            .map_err(|err| err.context(self.md_path.display()))?;
        self.meta = split.yaml.map(parse_meta).unwrap_or_default();
        self.title = self
            .meta
            .get("title")
            .filter(|t| !t.is_empty())
            .cloned()
            .unwrap_or_else(|| self.name.clone());
        self.markdown = split.body.to_string();
        Ok(())
    }
}

/// File name up to the first `.`.
pub fn base_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match file_name.split_once('.') {
        Some((base, _)) => base.to_string(),
        None => file_name,
    }
}

/// Finds every `*.md` file under `dir`, sorted by path. Hidden files are
/// skipped.
pub fn discover_markdown(dir: &Path) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(dir)
        .hidden(true)
        .ignore(true)
        .git_ignore(true)
        .build();

    let mut paths = Vec::new();
    for result in walker {
        match result {
            Ok(entry) => {
                let path = entry.path();
                if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
                    paths.push(path.to_path_buf());
                }
            }
            Err(err) => tracing::warn!(error = %err, "skipping unreadable entry"),
        }
    }
    paths.sort();
    paths
}

/// Gives every path a unique name: the base name, then `name1`, `name2`, ...
/// for later collisions.
pub fn unique_names(paths: &[PathBuf]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    paths
        .iter()
        .map(|path| {
            let base = base_name(path);
            let mut name = base.clone();
            let mut n = 0;
            while taken.contains(&name) {
                n += 1;
                name = format!("{base}{n}");
            }
            taken.insert(name.clone());
            name
        })
        .collect()
}

/// Discovers and loads all cheatsheets under `dir`. Files are read and
/// their front matter parsed in parallel.
pub fn read_cheatsheets(dir: &Path) -> Result<Vec<Cheatsheet>, CheatsheetError> {
    let paths = discover_markdown(dir);
    let names = unique_names(&paths);
    let mut cheatsheets: Vec<Cheatsheet> = names
        .into_iter()
        .zip(paths)
        .map(|(name, path)| Cheatsheet::new(name, path))
        .collect();

    cheatsheets
        .par_iter_mut()
        .map(Cheatsheet::load)
        .collect::<Result<Vec<()>, CheatsheetError>>()?;

    tracing::info!(count = cheatsheets.len(), dir = %dir.display(), "read cheatsheets");
    Ok(cheatsheets)
}

/// Looks a cheatsheet up by name, ignoring case.
pub fn find_by_name<'a>(cheatsheets: &'a [Cheatsheet], name: &str) -> Option<&'a Cheatsheet> {
    cheatsheets.iter().find(|cs| cs.name.eq_ignore_ascii_case(name))
}
