//! Static export: every URL a site serves, written out as files.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::Result;
use crate::site::Site;

const PROGRESS_EVERY: usize = 256;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub files: usize,
    pub total_bytes: u64,
}

impl ExportSummary {
    fn add(&mut self, uri: &str, len: usize) {
        self.files += 1;
        self.total_bytes += len as u64;
        if self.files % PROGRESS_EVERY == 0 {
            tracing::info!(files = self.files, uri, "exporting");
        }
    }
}

/// Calls `write` with each URL's path relative to the export root and its
/// content. URLs a handler lists but cannot produce are skipped.
fn for_each_page(
    site: &Site,
    mut write: impl FnMut(&str, &[u8]) -> Result<()>,
) -> Result<ExportSummary> {
    let mut summary = ExportSummary::default();
    for uri in site.urls() {
        let Some(body) = site.find_exact(&uri) else {
            tracing::warn!(uri = %uri, "listed url has no content");
            continue;
        };
        let body = body?;
        write(uri.trim_start_matches('/'), &body)?;
        summary.add(&uri, body.len());
    }
    Ok(summary)
}

/// Writes the site under `dir`, creating directories as needed.
pub fn write_site_to_dir(site: &Site, dir: &Path) -> Result<ExportSummary> {
    fs::create_dir_all(dir)?;
    let mut created: BTreeSet<PathBuf> = BTreeSet::new();
    let summary = for_each_page(site, |relative, body| {
        let path = dir.join(relative);
        if let Some(parent) = path.parent()
            && created.insert(parent.to_path_buf())
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, body)?;
        Ok(())
    })?;
    tracing::info!(
        dir = %dir.display(),
        files = summary.files,
        size = %cheatsheets::format_size(summary.total_bytes),
        "wrote site"
    );
    Ok(summary)
}

/// Writes the site into a deflate-compressed zip archive at `path`.
pub fn write_site_to_zip(site: &Site, path: &Path) -> Result<ExportSummary> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut zip = ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    let summary = for_each_page(site, |relative, body| {
        zip.start_file(relative, options)?;
        zip.write_all(body)?;
        Ok(())
    })?;
    zip.finish()?;
    tracing::info!(
        zip = %path.display(),
        files = summary.files,
        size = %cheatsheets::format_size(summary.total_bytes),
        "wrote site archive"
    );
    Ok(summary)
}
