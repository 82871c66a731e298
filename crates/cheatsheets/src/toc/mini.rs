use handlebars::html_escape;

use super::builder::TocNode;

const SEPARATOR: &str = r#"<span class="tmb">&bull;</span>"#;

/// Renders the inline navigation for `parent`'s children. The child whose id
/// equals `active` is shown in bold instead of as a link.
pub fn render_mini_toc(parent: &TocNode, active: Option<&str>) -> String {
    let items: Vec<String> = parent
        .children
        .iter()
        .map(|child| {
            let label = html_escape(&child.content);
            if active == Some(child.id.as_str()) {
                format!("<b>{label}</b>")
            } else {
                format!(r##"<a href="#{}">{label}</a>"##, html_escape(&child.id))
            }
        })
        .collect();
    format!(r#"<div class="toc-mini">{}</div>"#, items.join(SEPARATOR))
}

/// Whether the entry at recursion `depth` (1 for top-level entries) gets a
/// mini table of contents.
pub fn qualifies(node: &TocNode, depth: usize) -> bool {
    !node.children.is_empty() && (depth >= 2 || node.sibling_count == 0)
}

/// Stores a pending fragment on every qualifying entry of the forest.
pub fn generate_fragments(forest: &mut [TocNode]) {
    fn visit(node: &mut TocNode, depth: usize) {
        if qualifies(node, depth) {
            node.fragment = Some(render_mini_toc(node, None));
        }
        for child in &mut node.children {
            visit(child, depth + 1);
        }
    }

    for node in forest {
        visit(node, 1);
    }
}
