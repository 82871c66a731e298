use serde::Serialize;

use crate::error::CheatsheetError;

use super::builder::TocNode;

/// `[text, lowercased text, id, toc level]`, consumed by the client-side
/// search script.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchIndexEntry(pub String, pub String, pub String, pub usize);

impl SearchIndexEntry {
    pub fn text(&self) -> &str {
        &self.0
    }

    pub fn lowercase(&self) -> &str {
        &self.1
    }

    pub fn id(&self) -> &str {
        &self.2
    }

    pub fn level(&self) -> usize {
        self.3
    }
}

/// One entry per flattened table-of-contents node, in the same order.
pub fn build_search_index(flat: &[&TocNode]) -> Vec<SearchIndexEntry> {
    flat.iter()
        .map(|node| {
            SearchIndexEntry(
                node.content.clone(),
                node.content.to_lowercase(),
                node.id.clone(),
                node.toc_level,
            )
        })
        .collect()
}

/// The JSON is embedded in an inline `<script>`, so `<`, `>` and `&` are
/// written as `\u` escapes.
pub fn search_index_json(entries: &[SearchIndexEntry]) -> Result<String, CheatsheetError> {
    let json = serde_json::to_string(entries)
        .map_err(|err| CheatsheetError::from(err).context("search index"))?;
    Ok(json
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026"))
}
