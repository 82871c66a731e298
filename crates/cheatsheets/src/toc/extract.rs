use std::collections::HashSet;

use crate::document::{Document, NodeId, NodeKind, WalkEvent};
use crate::error::CheatsheetError;

/// One heading as it appears in the document, in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadingRecord {
    pub level: u8,
    /// Concatenated text of the heading's text descendants.
    pub text: String,
    pub id: String,
    /// Non-heading nodes entered after this heading closed and before the
    /// next heading opened.
    pub sibling_count: usize,
    pub node: NodeId,
}

/// Collects every heading of `doc` in a single traversal.
///
/// `path` only appears in error messages.
pub fn extract_headings(doc: &Document, path: &str) -> Result<Vec<HeadingRecord>, CheatsheetError> {
    let mut records: Vec<HeadingRecord> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut open: Option<HeadingRecord> = None;

    for event in doc.traverse() {
        match event {
            WalkEvent::Enter(id) => match doc.kind(id) {
                NodeKind::Heading(heading) => {
                    open = Some(HeadingRecord {
                        level: heading.level,
                        text: String::new(),
                        id: heading.id.clone(),
                        sibling_count: 0,
                        node: id,
                    });
                }
                NodeKind::Text(text) if open.is_some() => {
                    if let Some(record) = open.as_mut() {
                        record.text.push_str(text);
                    }
                }
                _ => {
                    if open.is_none() {
                        if let Some(current) = records.last_mut() {
                            current.sibling_count += 1;
                        }
                    }
                }
            },
            WalkEvent::Exit(id) => {
                if !doc.node(id).is_heading() {
                    continue;
                }
                let Some(record) = open.take() else {
                    continue;
                };
                if !seen.insert(record.id.clone()) {
                    return Err(CheatsheetError::DuplicateHeadingId {
                        id: record.id,
                        path: path.to_string(),
                    });
                }
                records.push(record);
            }
        }
    }

    Ok(records)
}
