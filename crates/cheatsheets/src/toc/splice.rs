use crate::document::{Document, NodeKind};

use super::builder::{TocNode, find_by_node_mut};

/// Inserts each pending mini table of contents as a root child right after
/// the heading it belongs to. Returns the number of fragments inserted.
///
/// Positions are collected during a read-only scan of the root's children and
/// applied from the highest to the lowest, so earlier insertions never shift
/// later ones. Entries are marked processed, which makes a second call a
/// no-op.
pub fn splice_fragments(doc: &mut Document, forest: &mut [TocNode]) -> usize {
    let root = doc.root();
    let mut insertions: Vec<(usize, String)> = Vec::new();

    for (index, child) in doc.children(root).iter().enumerate() {
        if !doc.node(*child).is_heading() {
            continue;
        }
        // Headings stripped from the table of contents have no entry.
        let Some(entry) = find_by_node_mut(forest, *child) else {
            continue;
        };
        if entry.processed {
            continue;
        }
        let Some(fragment) = entry.fragment.take() else {
            continue;
        };
        entry.processed = true;
        insertions.push((index + 1, fragment));
    }

    let count = insertions.len();
    for (position, fragment) in insertions.into_iter().rev() {
        doc.insert_child(root, position, NodeKind::Html(fragment));
    }
    count
}
