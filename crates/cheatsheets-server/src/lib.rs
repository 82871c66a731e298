//! HTTP serving and static export for rendered cheatsheets.
//!
//! A [`Site`] is an ordered list of [`ContentHandler`]s. The dynamic site
//! renders markdown on every request; the production site serves a directory
//! written earlier by [`write_site_to_dir`].

mod error;
mod export;
mod handler;
mod server;
mod site;
mod telemetry;

pub use crate::error::{Result, ServerError};
pub use crate::export::{ExportSummary, write_site_to_dir, write_site_to_zip};
pub use crate::handler::{
    ALL_URL, CHEATSHEET_PREFIX, Catalog, CheatsheetPages, ContentHandler, DirHandler,
    FilesHandler, INDEX_URL, IndexPages, cheatsheet_name,
};
pub use crate::server::{
    SHUTDOWN_TIMEOUT, content_type_for, etag_for, router, run, serve, shutdown_signal,
};
pub use crate::site::{Found, Site, build_dynamic_site, build_prod_site, not_found_candidates};
pub use crate::telemetry::{RequestLog, RequestRecord, external_referer};

use cheatsheets::SiteConfig;

/// Renders cheatsheets from markdown on every request.
pub async fn run_dynamic_server(config: &SiteConfig) -> Result<()> {
    let site = build_dynamic_site(config)?;
    tracing::info!(
        cheatsheets = %config.cheatsheets_dir.display(),
        "serving cheatsheets dynamically"
    );
    run(site, config).await
}

/// Serves the previously generated directory.
pub async fn run_prod_server(config: &SiteConfig) -> Result<()> {
    let site = build_prod_site(&config.generated_dir);
    tracing::info!(dir = %config.generated_dir.display(), "serving generated site");
    run(site, config).await
}

/// Renders every page of the dynamic site into a freshly emptied generated
/// directory.
pub fn generate(config: &SiteConfig) -> Result<ExportSummary> {
    let site = build_dynamic_site(config)?;
    if config.generated_dir.exists() {
        std::fs::remove_dir_all(&config.generated_dir)?;
    }
    write_site_to_dir(&site, &config.generated_dir)
}

/// Renders every page of the dynamic site into a zip archive.
pub fn generate_zip(config: &SiteConfig, path: &std::path::Path) -> Result<ExportSummary> {
    let site = build_dynamic_site(config)?;
    write_site_to_zip(&site, path)
}
