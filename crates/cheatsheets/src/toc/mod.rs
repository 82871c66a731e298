//! Table-of-contents pipeline: heading extraction, nesting, mini tables of
//! contents, splicing and the search index.

mod builder;
mod extract;
mod mini;
mod search_index;
mod splice;

pub use builder::{
    INTRO_ID, TocNode, assign_bands, build_toc, find_by_node_mut, flatten, strip_intro,
};
pub use extract::{HeadingRecord, extract_headings};
pub use mini::{generate_fragments, qualifies, render_mini_toc};
pub use search_index::{SearchIndexEntry, build_search_index, search_index_json};
pub use splice::splice_fragments;

use crate::document::Document;
use crate::error::CheatsheetError;

/// Table of contents and search index of one document.
#[derive(Clone, Debug)]
pub struct Navigation {
    pub toc: Vec<TocNode>,
    pub search_index: Vec<SearchIndexEntry>,
}

/// Runs the whole pipeline over `doc`, splicing mini tables of contents into
/// it. On error the document is left untouched.
pub fn build_navigation(doc: &mut Document, path: &str) -> Result<Navigation, CheatsheetError> {
    let records = extract_headings(doc, path)?;
    let mut toc = build_toc(&records, path)?;
    generate_fragments(&mut toc);
    let spliced = splice_fragments(doc, &mut toc);
    let search_index = build_search_index(&flatten(&mut toc));
    tracing::debug!(
        path,
        headings = records.len(),
        spliced,
        "built table of contents"
    );
    Ok(Navigation { toc, search_index })
}
