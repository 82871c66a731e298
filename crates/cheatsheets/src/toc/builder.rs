use serde::Serialize;

use crate::document::NodeId;
use crate::error::CheatsheetError;

use super::extract::HeadingRecord;

/// Id of a leading section that is dropped from the table of contents when
/// it has no subsections.
pub const INTRO_ID: &str = "intro";

const BAND_CLASSES: [&str; 2] = ["bgcol1", "bgcol2"];

/// Entry of the nested table of contents.
#[derive(Clone, Debug, Serialize)]
pub struct TocNode {
    pub content: String,
    pub heading_level: u8,
    pub id: String,
    pub sibling_count: usize,
    /// Depth in the forest, assigned by [`flatten`].
    pub toc_level: usize,
    pub css_class: String,
    pub children: Vec<TocNode>,
    #[serde(skip)]
    pub node: NodeId,
    /// Mini table of contents waiting to be spliced after the heading.
    #[serde(skip)]
    pub fragment: Option<String>,
    #[serde(skip)]
    pub processed: bool,
}

impl TocNode {
    fn from_record(record: &HeadingRecord) -> Self {
        Self {
            content: record.text.clone(),
            heading_level: record.level,
            id: record.id.clone(),
            sibling_count: record.sibling_count,
            toc_level: 0,
            css_class: String::new(),
            children: Vec::new(),
            node: record.node,
            fragment: None,
            processed: false,
        }
    }
}

/// Nests the flat heading sequence into a forest, strips an empty intro and
/// assigns banding classes.
///
/// Every child is exactly one level deeper than its parent; a heading that
/// skips a level aborts the build.
pub fn build_toc(records: &[HeadingRecord], path: &str) -> Result<Vec<TocNode>, CheatsheetError> {
    let mut forest = nest(records, path)?;
    strip_intro(&mut forest);
    assign_bands(&mut forest);
    Ok(forest)
}

fn nest(records: &[HeadingRecord], path: &str) -> Result<Vec<TocNode>, CheatsheetError> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    // Nodes are nested by index first and materialized once the shape is known.
    let mut kids: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    let mut roots: Vec<usize> = vec![0];
    let mut stack: Vec<usize> = vec![0];
    let level_of = |idx: usize| records[idx].level;

    for (idx, record) in records.iter().enumerate().skip(1) {
        let top = stack[stack.len() - 1];
        let level = record.level;
        let top_level = level_of(top);

        if level == top_level + 1 {
            kids[top].push(idx);
            stack.push(idx);
        } else if level > top_level + 1 {
            return Err(CheatsheetError::LevelSkip {
                path: path.to_string(),
                heading: record.text.clone(),
            });
        } else if level == top_level {
            stack.pop();
            match stack.last() {
                Some(&parent) => kids[parent].push(idx),
                None => roots.push(idx),
            }
            stack.push(idx);
        } else {
            loop {
                if stack.len() == 1 {
                    roots.push(idx);
                    stack = vec![idx];
                    break;
                }
                stack.pop();
                let top = stack[stack.len() - 1];
                if stack.len() >= 2 && level_of(top) == level {
                    stack.pop();
                    let parent = stack[stack.len() - 1];
                    kids[parent].push(idx);
                    stack.push(idx);
                    break;
                }
            }
        }
    }

    fn materialize(idx: usize, records: &[HeadingRecord], kids: &[Vec<usize>]) -> TocNode {
        let mut node = TocNode::from_record(&records[idx]);
        node.children = kids[idx]
            .iter()
            .map(|child| materialize(*child, records, kids))
            .collect();
        node
    }

    Ok(roots
        .into_iter()
        .map(|idx| materialize(idx, records, &kids))
        .collect())
}

/// Drops the first top-level entry when it is a childless intro section.
pub fn strip_intro(forest: &mut Vec<TocNode>) {
    let is_empty_intro = forest
        .first()
        .is_some_and(|first| first.id == INTRO_ID && first.children.is_empty());
    if is_empty_intro {
        forest.remove(0);
    }
}

/// Alternates banding classes over the top-level entries; descendants take
/// the class of their top-level ancestor.
pub fn assign_bands(forest: &mut [TocNode]) {
    fn apply(node: &mut TocNode, class: &str) {
        node.css_class = class.to_string();
        for child in &mut node.children {
            apply(child, class);
        }
    }

    for (idx, node) in forest.iter_mut().enumerate() {
        apply(node, BAND_CLASSES[idx % 2]);
    }
}

/// Assigns `toc_level` (0 for top-level entries) and returns the forest in
/// pre-order.
pub fn flatten(forest: &mut [TocNode]) -> Vec<&TocNode> {
    fn assign(nodes: &mut [TocNode], level: usize) {
        for node in nodes {
            node.toc_level = level;
            assign(&mut node.children, level + 1);
        }
    }

    fn collect<'a>(nodes: &'a [TocNode], out: &mut Vec<&'a TocNode>) {
        for node in nodes {
            out.push(node);
            collect(&node.children, out);
        }
    }

    assign(forest, 0);
    let mut out = Vec::new();
    collect(forest, &mut out);
    out
}

/// Depth-first lookup of the entry built from the heading `node`.
pub fn find_by_node_mut(forest: &mut [TocNode], node: NodeId) -> Option<&mut TocNode> {
    for entry in forest {
        if entry.node == node {
            return Some(entry);
        }
        if let Some(found) = find_by_node_mut(&mut entry.children, node) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, NodeKind};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn records(spec: &[(u8, &str)]) -> Vec<HeadingRecord> {
        // Real node ids are needed for the back-reference.
        let mut doc = Document::new();
        let root = doc.root();
        spec.iter()
            .map(|(level, id)| HeadingRecord {
                level: *level,
                text: id.to_uppercase(),
                id: id.to_string(),
                sibling_count: 0,
                node: doc.append_child(root, NodeKind::Block { html: None }),
            })
            .collect()
    }

    fn shape(forest: &[TocNode]) -> Vec<(String, u8, Vec<String>)> {
        forest
            .iter()
            .map(|n| {
                (
                    n.id.clone(),
                    n.heading_level,
                    n.children.iter().map(|c| c.id.clone()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn intro_is_stripped_only_when_childless() {
        let forest = build_toc(&records(&[(1, "intro"), (2, "a")]), "x.md").unwrap();
        // "a" is a child of intro, so intro keeps it
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, "intro");

        let forest = build_toc(&records(&[(1, "intro"), (1, "a")]), "x.md").unwrap();
        assert_eq!(shape(&forest), vec![("a".to_string(), 1, vec![])]);
    }

    #[test]
    fn intro_with_sibling_subsection_at_level_two() {
        let forest = build_toc(&records(&[(2, "intro"), (2, "a")]), "x.md").unwrap();
        assert_eq!(shape(&forest), vec![("a".to_string(), 2, vec![])]);
    }

    #[test]
    fn intro_is_only_stripped_in_first_position() {
        let forest = build_toc(&records(&[(1, "a"), (1, "intro")]), "x.md").unwrap();
        assert_eq!(forest.len(), 2);
    }

    #[test]
    fn siblings_and_new_roots() {
        let forest = build_toc(
            &records(&[(1, "x"), (2, "y"), (2, "z"), (1, "w")]),
            "x.md",
        )
        .unwrap();
        assert_eq!(
            shape(&forest),
            vec![
                ("x".to_string(), 1, vec!["y".to_string(), "z".to_string()]),
                ("w".to_string(), 1, vec![]),
            ]
        );
    }

    #[test]
    fn level_decrease_reattaches_to_matching_ancestor() {
        let forest = build_toc(
            &records(&[(1, "a"), (2, "b"), (3, "c"), (4, "d"), (2, "e")]),
            "x.md",
        )
        .unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(
            forest[0].children.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
            vec!["b", "e"]
        );
        assert_eq!(forest[0].children[0].children[0].children[0].id, "d");
    }

    #[test]
    fn level_decrease_below_first_root_starts_new_root() {
        let forest = build_toc(
            &records(&[(2, "a"), (3, "b"), (1, "c"), (2, "d")]),
            "x.md",
        )
        .unwrap();
        assert_eq!(
            shape(&forest),
            vec![
                ("a".to_string(), 2, vec!["b".to_string()]),
                ("c".to_string(), 1, vec!["d".to_string()]),
            ]
        );
    }

    #[test]
    fn skipped_level_is_fatal() {
        let err = build_toc(&records(&[(1, "a"), (3, "b")]), "skip.md").unwrap_err();
        assert_eq!(
            err.to_string(),
            "skipping more than 1 level in 'skip.md', 'B'"
        );
    }

    #[test]
    fn empty_input_gives_empty_forest() {
        assert!(build_toc(&[], "x.md").unwrap().is_empty());
    }

    #[test]
    fn bands_alternate_and_are_inherited() {
        let forest = build_toc(
            &records(&[(1, "a"), (2, "a1"), (3, "a11"), (1, "b"), (2, "b1"), (1, "c")]),
            "x.md",
        )
        .unwrap();
        assert_eq!(forest[0].css_class, "bgcol1");
        assert_eq!(forest[0].children[0].children[0].css_class, "bgcol1");
        assert_eq!(forest[1].css_class, "bgcol2");
        assert_eq!(forest[1].children[0].css_class, "bgcol2");
        assert_eq!(forest[2].css_class, "bgcol1");
    }

    #[test]
    fn flatten_is_pre_order_with_depths() {
        let mut forest = build_toc(
            &records(&[(1, "a"), (2, "b"), (3, "c"), (2, "d"), (1, "e")]),
            "x.md",
        )
        .unwrap();
        let flat: Vec<(String, usize)> = flatten(&mut forest)
            .into_iter()
            .map(|n| (n.id.clone(), n.toc_level))
            .collect();
        assert_eq!(
            flat,
            vec![
                ("a".to_string(), 0),
                ("b".to_string(), 1),
                ("c".to_string(), 2),
                ("d".to_string(), 1),
                ("e".to_string(), 0),
            ]
        );
    }

    #[test]
    fn find_by_node_searches_nested_entries() {
        let recs = records(&[(1, "a"), (2, "b"), (3, "c")]);
        let mut forest = build_toc(&recs, "x.md").unwrap();
        let found = find_by_node_mut(&mut forest, recs[2].node).map(|n| n.id.clone());
        assert_eq!(found.as_deref(), Some("c"));
    }

    fn assert_levels(nodes: &[TocNode]) {
        for node in nodes {
            for child in &node.children {
                assert_eq!(child.heading_level, node.heading_level + 1);
            }
            assert_levels(&node.children);
        }
    }

    fn assert_toc_depths(nodes: &[TocNode], depth: usize) {
        for node in nodes {
            assert_eq!(node.toc_level, depth, "toc level of {}", node.id);
            assert_toc_depths(&node.children, depth + 1);
        }
    }

    #[test]
    fn random_valid_sequences_nest_and_preserve_order() {
        let mut rng = StdRng::seed_from_u64(0x70c);
        for _ in 0..200 {
            let len = rng.gen_range(1..=40);
            let mut levels: Vec<u8> = vec![rng.gen_range(1..=3)];
            while levels.len() < len {
                let prev = levels[levels.len() - 1];
                levels.push(rng.gen_range(1..=(prev + 1).min(6)));
            }
            let ids: Vec<String> = (0..levels.len()).map(|i| format!("h{i}")).collect();
            let spec: Vec<(u8, &str)> = levels
                .iter()
                .zip(ids.iter())
                .map(|(level, id)| (*level, id.as_str()))
                .collect();

            let mut forest = build_toc(&records(&spec), "random.md").unwrap();
            assert_levels(&forest);
            let flat: Vec<String> = flatten(&mut forest).into_iter().map(|n| n.id.clone()).collect();
            assert_eq!(flat, ids);
            assert_toc_depths(&forest, 0);
        }
    }
}
