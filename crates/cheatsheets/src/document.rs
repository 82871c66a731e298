//! Owned document tree used by the table-of-contents pipeline.
//!
//! Nodes live in a flat arena and refer to each other through [`NodeId`]
//! handles, so the table of contents can point back at heading nodes without
//! borrowing the tree it will later mutate.

/// Opaque handle of a node inside one [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Heading(Heading),
    /// Literal text; the only kind that contributes to heading labels.
    Text(String),
    /// Any other markdown construct. Top-level blocks carry the markup
    /// produced by the parser; nested blocks only exist for traversal.
    Block { html: Option<String> },
    /// Raw markup inserted after parsing, such as a mini table of contents.
    Html(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    pub id: String,
    /// Rendered inline content; when absent the children are serialized.
    pub inner_html: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_heading(&self) -> bool {
        matches!(self.kind, NodeKind::Heading(_))
    }
}

/// Enter/exit event produced by [`Document::traverse`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkEvent {
    Enter(NodeId),
    Exit(NodeId),
}

#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    /// Appends a new node as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.alloc(parent, kind);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Inserts a new node at `index` among the children of `parent`. An index
    /// past the end appends.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, kind: NodeKind) -> NodeId {
        let id = self.alloc(parent, kind);
        let children = &mut self.nodes[parent.0].children;
        if index >= children.len() {
            children.push(id);
        } else {
            children.insert(index, id);
        }
        id
    }

    fn alloc(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        id
    }

    /// Depth-first enter/exit events starting at the root.
    pub fn traverse(&self) -> Traverse<'_> {
        Traverse {
            doc: self,
            stack: vec![WalkEvent::Enter(self.root())],
        }
    }

    /// Concatenated text of every `Text` descendant of `id`.
    #[cfg(test)]
    pub(crate) fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    #[cfg(test)]
    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let NodeKind::Text(text) = self.kind(id) {
            out.push_str(text);
        }
        for child in self.children(id) {
            self.collect_text(*child, out);
        }
    }
}

pub struct Traverse<'a> {
    doc: &'a Document,
    stack: Vec<WalkEvent>,
}

impl Iterator for Traverse<'_> {
    type Item = WalkEvent;

    fn next(&mut self) -> Option<WalkEvent> {
        let event = self.stack.pop()?;
        if let WalkEvent::Enter(id) = event {
            self.stack.push(WalkEvent::Exit(id));
            for child in self.doc.children(id).iter().rev() {
                self.stack.push(WalkEvent::Enter(*child));
            }
        }
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(level: u8, id: &str) -> NodeKind {
        NodeKind::Heading(Heading {
            level,
            id: id.to_string(),
            inner_html: None,
        })
    }

    #[test]
    fn traverse_emits_enter_and_exit_in_document_order() {
        let mut doc = Document::new();
        let root = doc.root();
        let h = doc.append_child(root, heading(1, "a"));
        let t = doc.append_child(h, NodeKind::Text("A".into()));
        let p = doc.append_child(root, NodeKind::Block { html: None });

        let events: Vec<_> = doc.traverse().collect();
        assert_eq!(
            events,
            vec![
                WalkEvent::Enter(root),
                WalkEvent::Enter(h),
                WalkEvent::Enter(t),
                WalkEvent::Exit(t),
                WalkEvent::Exit(h),
                WalkEvent::Enter(p),
                WalkEvent::Exit(p),
                WalkEvent::Exit(root),
            ]
        );
    }

    #[test]
    fn insert_child_shifts_later_siblings() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append_child(root, NodeKind::Text("a".into()));
        let b = doc.append_child(root, NodeKind::Text("b".into()));
        let mid = doc.insert_child(root, 1, NodeKind::Html("<hr>".into()));
        let end = doc.insert_child(root, 99, NodeKind::Html("<br>".into()));

        assert_eq!(doc.children(root), &[a, mid, b, end]);
        assert_eq!(doc.node(mid).parent(), Some(root));
    }

    #[test]
    fn text_content_only_reads_text_nodes() {
        let mut doc = Document::new();
        let root = doc.root();
        let h = doc.append_child(root, heading(2, "x"));
        doc.append_child(h, NodeKind::Text("Hello ".into()));
        let em = doc.append_child(h, NodeKind::Block { html: None });
        doc.append_child(em, NodeKind::Text("world".into()));
        doc.append_child(h, NodeKind::Html("<br>".into()));

        assert_eq!(doc.text_content(h), "Hello world");
    }
}
