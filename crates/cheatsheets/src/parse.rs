//! Markdown preprocessing and the comrak adapter that produces a [`Document`].

use comrak::nodes::{AstNode, NodeValue};
use comrak::{Arena, Options, format_html, parse_document};
use regex::Regex;

use crate::document::{Document, Heading, NodeId, NodeKind};
use crate::error::CheatsheetError;
use crate::slug::HeadingIds;

/// Kramdown-style attribute lists such as `{: data-line="1"}`.
const ATTRIBUTE_SPAN_PATTERN: &str = r"\{:.*\}";
/// Trailing `{#custom-id}` on a heading's source line.
const EXPLICIT_ID_PATTERN: &str = r"\s*\{#([A-Za-z0-9_:.\-]+)\}\s*$";
/// The same suffix after smart punctuation may have rewritten the id.
const RENDERED_ID_SUFFIX_PATTERN: &str = r"\s*\{#[^{}]*\}\s*$";

/// Compiled patterns and parser options, built once per process and shared
/// by reference with every render.
pub struct MarkdownPreprocessor {
    attribute_span: Regex,
    explicit_id: Regex,
    rendered_id_suffix: Regex,
    options: Options<'static>,
}

impl MarkdownPreprocessor {
    pub fn new() -> Result<Self, CheatsheetError> {
        let attribute_span = Regex::new(ATTRIBUTE_SPAN_PATTERN)
            .map_err(|err| CheatsheetError::Config(format!("attribute pattern: {err}")))?;
        let explicit_id = Regex::new(EXPLICIT_ID_PATTERN)
            .map_err(|err| CheatsheetError::Config(format!("heading id pattern: {err}")))?;
        let rendered_id_suffix = Regex::new(RENDERED_ID_SUFFIX_PATTERN)
            .map_err(|err| CheatsheetError::Config(format!("heading id pattern: {err}")))?;

        let mut options = Options::default();
        options.extension.table = true;
        options.extension.strikethrough = true;
        options.extension.autolink = true;
        options.parse.smart = true;
        options.render.r#unsafe = true;

        Ok(Self {
            attribute_span,
            explicit_id,
            rendered_id_suffix,
            options,
        })
    }

    /// Removes attribute spans and liquid `raw` markers left over from
    /// Jekyll-flavoured sources.
    pub fn cleanup(&self, md: &str) -> String {
        let without_attrs = self.attribute_span.replace_all(md, "");
        without_attrs
            .replace("{% raw %}", "")
            .replace("{% endraw %}", "")
    }

    /// Parses cleaned markdown into the document model.
    ///
    /// Every heading receives an id: an explicit `{#id}` suffix when present,
    /// otherwise a slug of its text. Top-level blocks keep the markup comrak
    /// renders for them so the document can be serialized after splicing.
    pub fn parse(&self, md: &str) -> Result<Document, CheatsheetError> {
        let arena = Arena::new();
        let root = parse_document(&arena, md, &self.options);

        let mut doc = Document::new();
        let mut ids = HeadingIds::new();
        let doc_root = doc.root();

        for block in root.children() {
            let kind = match block.data.borrow().value {
                NodeValue::Heading(ref heading) => NodeKind::Heading(Heading {
                    level: heading.level,
                    id: String::new(),
                    inner_html: None,
                }),
                _ => NodeKind::Block { html: None },
            };

            if let NodeKind::Heading(mut heading) = kind {
                let explicit = self.take_explicit_id(md, block);
                let label = inline_text(block);
                heading.id = match explicit {
                    Some(id) => ids.explicit(&id),
                    None => ids.automatic(&label),
                };
                heading.inner_html = Some(self.render_heading_inner(block, heading.level)?);
                let id = doc.append_child(doc_root, NodeKind::Heading(heading));
                mirror_children(block, &mut doc, id);
            } else {
                let html = self.render(block)?;
                let id = doc.append_child(doc_root, NodeKind::Block { html: Some(html) });
                mirror_children(block, &mut doc, id);
            }
        }

        Ok(doc)
    }

    /// Reads a `{#id}` suffix from the heading's source line, where smart
    /// punctuation has not touched it yet, then strips the suffix from the
    /// trailing text nodes.
    fn take_explicit_id<'a>(&self, md: &str, heading: &'a AstNode<'a>) -> Option<String> {
        let (setext, start, end) = {
            let data = heading.data.borrow();
            let NodeValue::Heading(ref value) = data.value else {
                return None;
            };
            (value.setext, data.sourcepos.start.line, data.sourcepos.end.line)
        };
        let mut lines = md
            .lines()
            .skip(start.checked_sub(1)?)
            .take(end.saturating_sub(start) + 1);
        let source = if setext {
            // Last content line above the `===` or `---` underline.
            lines
                .filter(|line| !is_setext_underline(line))
                .last()?
                .trim_end()
        } else {
            atx_content(lines.next()?)
        };
        let id = self.explicit_id.captures(source)?.get(1)?.as_str().to_string();

        let trailing: Vec<&'a AstNode<'a>> = {
            let mut nodes: Vec<_> = heading
                .reverse_children()
                .take_while(|node| matches!(node.data.borrow().value, NodeValue::Text(_)))
                .collect();
            nodes.reverse();
            nodes
        };
        let texts: Vec<String> = trailing
            .iter()
            .filter_map(|node| match node.data.borrow().value {
                NodeValue::Text(ref text) => Some(text.to_string()),
                _ => None,
            })
            .collect();
        let combined = texts.concat();
        let cut = self.rendered_id_suffix.find(&combined)?.start();

        let mut offset = 0;
        for (node, text) in trailing.iter().zip(&texts) {
            let start = offset;
            offset += text.len();
            if start >= cut {
                node.detach();
            } else if offset > cut {
                let kept = text[..cut - start].to_string();
                node.data.borrow_mut().value = NodeValue::Text(kept.into());
            }
        }
        Some(id)
    }

    fn render<'a>(&self, node: &'a AstNode<'a>) -> Result<String, CheatsheetError> {
        let mut html = String::new();
        format_html(node, &self.options, &mut html)
            .map_err(|err| CheatsheetError::Serialization(format!("render markdown: {err}")))?;
        Ok(html)
    }

    fn render_heading_inner<'a>(
        &self,
        heading: &'a AstNode<'a>,
        level: u8,
    ) -> Result<String, CheatsheetError> {
        let html = self.render(heading)?;
        let open = format!("<h{level}>");
        let close = format!("</h{level}>");
        let trimmed = html.trim_end();
        let inner = trimmed
            .strip_prefix(open.as_str())
            .and_then(|rest| rest.strip_suffix(close.as_str()))
            .unwrap_or(trimmed);
        Ok(inner.to_string())
    }
}

/// An ATX heading line without its optional closing `#` sequence.
fn atx_content(line: &str) -> &str {
    let line = line.trim_end();
    let without_hashes = line.trim_end_matches('#');
    if without_hashes.len() < line.len()
        && (without_hashes.is_empty() || without_hashes.ends_with([' ', '\t']))
    {
        without_hashes.trim_end()
    } else {
        line
    }
}

fn is_setext_underline(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && (line.bytes().all(|b| b == b'=') || line.bytes().all(|b| b == b'-'))
}

/// Converts CRLF and lone CR line endings to LF.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Plain text of a heading's inline content; inline code counts as text.
fn inline_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut out = String::new();
    for descendant in node.descendants() {
        match descendant.data.borrow().value {
            NodeValue::Text(ref text) => out.push_str(text),
            NodeValue::Code(ref code) => out.push_str(&code.literal),
            _ => {}
        }
    }
    out
}

/// Copies the shape of a comrak subtree into the document model. Text and
/// inline code become text nodes, everything else a markup-less block.
fn mirror_children<'a>(node: &'a AstNode<'a>, doc: &mut Document, parent: NodeId) {
    for child in node.children() {
        let kind = match child.data.borrow().value {
            NodeValue::Text(ref text) => NodeKind::Text(text.to_string()),
            NodeValue::Code(ref code) => NodeKind::Text(code.literal.clone()),
            _ => NodeKind::Block { html: None },
        };
        let id = doc.append_child(parent, kind);
        mirror_children(child, doc, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headings(doc: &Document) -> Vec<(u8, String, String)> {
        doc.children(doc.root())
            .iter()
            .filter_map(|id| match doc.kind(*id) {
                NodeKind::Heading(h) => Some((
                    h.level,
                    h.id.clone(),
                    h.inner_html.clone().unwrap_or_default(),
                )),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn normalize_newlines_handles_crlf_and_cr() {
        assert_eq!(normalize_newlines("a\r\nb\rc\n"), "a\nb\nc\n");
    }

    #[test]
    fn cleanup_strips_attribute_lists_and_raw_markers() {
        let pre = MarkdownPreprocessor::new().unwrap();
        let cleaned = pre.cleanup("# T\n{: data-line=\"1\"}\n{% raw %}{{ x }}{% endraw %}\n");
        assert_eq!(cleaned, "# T\n\n{{ x }}\n");
    }

    #[test]
    fn headings_get_slug_ids_and_rendered_content() {
        let pre = MarkdownPreprocessor::new().unwrap();
        let doc = pre
            .parse("# Getting *started*\n\ntext\n\n## Getting started\n")
            .unwrap();
        assert_eq!(
            headings(&doc),
            vec![
                (
                    1,
                    "getting-started".to_string(),
                    "Getting <em>started</em>".to_string()
                ),
                (2, "getting-started-1".to_string(), "Getting started".to_string()),
            ]
        );
    }

    #[test]
    fn explicit_heading_id_is_used_and_removed_from_label() {
        let pre = MarkdownPreprocessor::new().unwrap();
        let doc = pre.parse("## Install it {#setup}\n").unwrap();
        let heading = doc.children(doc.root())[0];
        assert_eq!(
            headings(&doc),
            vec![(2, "setup".to_string(), "Install it".to_string())]
        );
        assert_eq!(doc.text_content(heading), "Install it");
    }

    #[test]
    fn explicit_id_survives_smart_punctuation() {
        let pre = MarkdownPreprocessor::new().unwrap();
        let doc = pre
            .parse("## Foo {#foo--bar}\n\n## Wait... {#wait...more} ##\n\nSetext {#under--line}\n---\n")
            .unwrap();
        assert_eq!(
            headings(&doc),
            vec![
                (2, "foo--bar".to_string(), "Foo".to_string()),
                (2, "wait...more".to_string(), "Wait…".to_string()),
                (2, "under--line".to_string(), "Setext".to_string()),
            ]
        );
        let first = doc.children(doc.root())[0];
        assert_eq!(doc.text_content(first), "Foo");
    }

    #[test]
    fn inline_code_is_mirrored_as_text() {
        let pre = MarkdownPreprocessor::new().unwrap();
        let doc = pre.parse("### Use `git log`\n").unwrap();
        let heading = doc.children(doc.root())[0];
        assert_eq!(doc.text_content(heading), "Use git log");
        assert_eq!(headings(&doc)[0].1, "use-git-log");
    }

    #[test]
    fn top_level_blocks_carry_markup() {
        let pre = MarkdownPreprocessor::new().unwrap();
        let doc = pre.parse("para\n\n| a | b |\n|---|---|\n| 1 | 2 |\n").unwrap();
        let blocks: Vec<_> = doc
            .children(doc.root())
            .iter()
            .filter_map(|id| match doc.kind(*id) {
                NodeKind::Block { html } => html.clone(),
                _ => None,
            })
            .collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], "<p>para</p>\n");
        assert!(blocks[1].contains("<table>"));
    }
}
