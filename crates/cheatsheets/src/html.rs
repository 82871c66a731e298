use handlebars::html_escape;

use crate::document::{Document, NodeId, NodeKind};

/// Serializes the document back to HTML.
///
/// Blocks that carry parser markup are emitted verbatim; headings are
/// re-emitted with their `id` attribute so mini tables of contents can link
/// to them.
pub fn to_html(doc: &Document) -> String {
    let mut out = String::new();
    write_node(doc, doc.root(), &mut out);
    out
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    match doc.kind(id) {
        NodeKind::Document | NodeKind::Block { html: None } => write_children(doc, id, out),
        NodeKind::Block { html: Some(html) } => out.push_str(html),
        NodeKind::Html(html) => {
            out.push_str(html);
            out.push('\n');
        }
        NodeKind::Text(text) => out.push_str(&html_escape(text)),
        NodeKind::Heading(heading) => {
            let level = heading.level;
            out.push_str(&format!(r#"<h{level} id="{}">"#, html_escape(&heading.id)));
            match &heading.inner_html {
                Some(inner) => out.push_str(inner),
                None => write_children(doc, id, out),
            }
            out.push_str(&format!("</h{level}>\n"));
        }
    }
}

fn write_children(doc: &Document, id: NodeId, out: &mut String) {
    for child in doc.children(id) {
        write_node(doc, *child, out);
    }
}
