//! # Tree Mutation Primitives
//!
//! Pure operations on a [`Document`]. None of them look at statements or
//! paths except [`set`], which may need to re-resolve a deferred path.
//!
//! Every primitive takes node handles; a handle that is not in the arena is
//! an argument error, not a data condition.

use crate::error::{LensError, LensResult};
use crate::path::{build_path, Path};
use std::cmp::Ordering;
use tracing::debug;
use xmlens_document::{Document, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    /// Child element name
    Name,
    /// Child text content
    Text,
    /// Value of the named attribute on each child
    Attribute(String),
}

/// Accepted by `sort` statements but not applied; children always end up
/// in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Where a `set` writes
#[derive(Debug, Clone, PartialEq)]
pub enum SetTarget {
    /// Path fully existed; the first node is written
    Resolved(Vec<NodeId>),
    /// Path was missing; resolved again when the operation runs
    Deferred(Path),
}

/// Build a chain of new elements named by `names`, each the only child of
/// the previous, and append it under the first node of `parents`.
/// Returns the leaf of the chain.
pub fn add(doc: &mut Document, parents: &[NodeId], names: &[String]) -> LensResult<NodeId> {
    let parent = *parents
        .first()
        .ok_or_else(|| LensError::argument("add needs a parent node"))?;
    let (first, rest) = names
        .split_first()
        .ok_or_else(|| LensError::argument("add needs at least one element name"))?;

    let start = doc.create_element(first.as_str());
    let mut leaf = start;
    for name in rest {
        let child = doc.create_element(name.as_str());
        doc.append_child(leaf, child)?;
        leaf = child;
    }

    doc.append_child(parent, start)?;
    debug!(parent = %parent, chain = ?names, "Added element chain");
    Ok(leaf)
}

/// Remove all children, text and attributes of every node
pub fn clear(doc: &mut Document, nodes: &[NodeId]) -> LensResult<()> {
    for &node in nodes {
        doc.clear(node)?;
    }
    Ok(())
}

/// Assign `value` to `attribute` (or the text when `None`) of the target,
/// creating any missing trailing elements of a deferred path first.
pub fn set(
    doc: &mut Document,
    target: &SetTarget,
    value: &str,
    attribute: Option<&str>,
) -> LensResult<()> {
    let element = match target {
        SetTarget::Resolved(nodes) => *nodes
            .first()
            .ok_or_else(|| LensError::argument("set needs a target node"))?,
        SetTarget::Deferred(path) => {
            let resolved = build_path(doc, path)?;
            let start = resolved
                .first()
                .ok_or_else(|| LensError::argument("set needs a target node"))?;
            if resolved.exists {
                start
            } else {
                let mut current = start;
                for name in &resolved.remainder {
                    current = add(doc, &[current], std::slice::from_ref(name))?;
                }
                current
            }
        }
    };

    match attribute {
        Some(name) => doc.set_attribute(element, name, value)?,
        None => doc.set_text(element, Some(value.to_string()))?,
    }
    Ok(())
}

/// Detach every node from its parent; parentless nodes are left alone
pub fn rm(doc: &mut Document, nodes: &[NodeId]) -> LensResult<()> {
    for &node in nodes {
        doc.detach(node)?;
    }
    Ok(())
}

/// Reorder the direct children of every node by `key`, ascending.
/// `_order` is ignored.
pub fn sort(doc: &mut Document, nodes: &[NodeId], key: &SortKey, _order: SortOrder) -> LensResult<()> {
    for &node in nodes {
        let mut children = doc.node(node)?.children.clone();
        children.sort_by(|&a, &b| compare_children(doc, a, b, key));
        doc.reorder_children(node, children)?;
    }
    Ok(())
}

fn compare_children(doc: &Document, a: NodeId, b: NodeId, key: &SortKey) -> Ordering {
    match key {
        SortKey::Name => doc.name(a).cmp(&doc.name(b)),
        SortKey::Text => doc.text(a).cmp(&doc.text(b)),
        SortKey::Attribute(name) => doc.attribute(a, name).cmp(&doc.attribute(b, name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(doc: &Document, parent: NodeId) -> Vec<String> {
        doc.children(parent)
            .iter()
            .map(|&c| doc.name(c).unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_add_chain() {
        let mut doc = Document::parse("<a/>").unwrap();
        let root = doc.root().unwrap();
        let leaf = add(&mut doc, &[root], &["b".to_string(), "c".to_string()]).unwrap();

        assert_eq!(doc.to_xml(), "<a>\n  <b>\n    <c/>\n  </b>\n</a>\n");
        assert_eq!(doc.name(leaf), Some("c"));
    }

    #[test]
    fn test_add_uses_first_parent() {
        let mut doc = Document::parse("<a><b/><b/></a>").unwrap();
        let root = doc.root().unwrap();
        let bs = doc.children_named(&[root], "b");
        add(&mut doc, &bs, &["c".to_string()]).unwrap();

        assert_eq!(doc.children(bs[0]).len(), 1);
        assert!(doc.children(bs[1]).is_empty());
    }

    #[test]
    fn test_add_rejects_empty_inputs() {
        let mut doc = Document::parse("<a/>").unwrap();
        let root = doc.root().unwrap();
        assert!(add(&mut doc, &[], &["b".to_string()]).unwrap_err().is_argument_error());
        assert!(add(&mut doc, &[root], &[]).unwrap_err().is_argument_error());
    }

    #[test]
    fn test_clear() {
        let mut doc = Document::parse(r#"<a x="1" y="2">text<b/><c>d</c></a>"#).unwrap();
        let root = doc.root().unwrap();
        clear(&mut doc, &[root]).unwrap();

        assert!(doc.node(root).unwrap().is_empty());
        assert_eq!(doc.to_xml(), "<a/>\n");
    }

    #[test]
    fn test_clear_unknown_handle() {
        let mut doc = Document::parse("<a/>").unwrap();
        let stranger = Document::parse("<a><b/><c/></a>").unwrap();
        let root = stranger.root().unwrap();
        let c = stranger.children_named(&[root], "c")[0];
        assert!(clear(&mut doc, &[c]).unwrap_err().is_argument_error());
    }

    #[test]
    fn test_set_resolved() {
        let mut doc = Document::parse(r#"<a><b x="1"/><b x="2"/></a>"#).unwrap();
        let root = doc.root().unwrap();
        let bs = doc.children_named(&[root], "b");

        set(&mut doc, &SetTarget::Resolved(bs.clone()), "9", Some("x")).unwrap();
        set(&mut doc, &SetTarget::Resolved(bs.clone()), "t", None).unwrap();

        assert_eq!(doc.attribute(bs[0], "x"), Some("9"));
        assert_eq!(doc.attribute(bs[1], "x"), Some("2"));
        assert_eq!(doc.text(bs[0]), Some("t"));
    }

    #[test]
    fn test_set_deferred_materializes() {
        let mut doc = Document::parse("<a/>").unwrap();
        let target = SetTarget::Deferred(Path::parse("/a/b/c"));
        set(&mut doc, &target, "v", None).unwrap();
        assert_eq!(doc.to_xml(), "<a>\n  <b>\n    <c>v</c>\n  </b>\n</a>\n");

        // Second run finds the path in place
        set(&mut doc, &target, "w", Some("k")).unwrap();
        assert_eq!(doc.to_xml(), "<a>\n  <b>\n    <c k=\"w\">v</c>\n  </b>\n</a>\n");
    }

    #[test]
    fn test_rm() {
        let mut doc = Document::parse("<a><b/><c/></a>").unwrap();
        let root = doc.root().unwrap();
        let b = doc.children_named(&[root], "b");
        rm(&mut doc, &b).unwrap();
        assert_eq!(names(&doc, root), vec!["c"]);

        // Already detached: no-op
        rm(&mut doc, &b).unwrap();
        assert_eq!(names(&doc, root), vec!["c"]);
    }

    #[test]
    fn test_rm_parentless_is_noop() {
        let mut doc = Document::parse("<a/>").unwrap();
        let document = doc.document_node();
        rm(&mut doc, &[document]).unwrap();
        assert_eq!(doc.to_xml(), "<a/>\n");
    }

    #[test]
    fn test_sort_by_name() {
        let mut doc = Document::parse("<a><c/><b/><a/></a>").unwrap();
        let root = doc.root().unwrap();
        sort(&mut doc, &[root], &SortKey::Name, SortOrder::Ascending).unwrap();
        assert_eq!(names(&doc, root), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sort_by_text() {
        let mut doc = Document::parse("<a><i>z</i><i>m</i><i>a</i></a>").unwrap();
        let root = doc.root().unwrap();
        sort(&mut doc, &[root], &SortKey::Text, SortOrder::Ascending).unwrap();
        let texts: Vec<_> = doc.children(root).iter().map(|&c| doc.text(c).unwrap()).collect();
        assert_eq!(texts, vec!["a", "m", "z"]);
    }

    #[test]
    fn test_sort_ignores_descending() {
        let mut doc = Document::parse(r#"<a><b x="2"/><b x="1"/></a>"#).unwrap();
        let root = doc.root().unwrap();
        sort(
            &mut doc,
            &[root],
            &SortKey::Attribute("x".to_string()),
            SortOrder::Descending,
        )
        .unwrap();
        assert_eq!(doc.to_xml(), "<a>\n  <b x=\"1\"/>\n  <b x=\"2\"/>\n</a>\n");
    }

    #[test]
    fn test_sort_attribute_is_lexical() {
        let mut doc = Document::parse(r#"<a><b x="10"/><b x="9"/><b/></a>"#).unwrap();
        let root = doc.root().unwrap();
        sort(&mut doc, &[root], &SortKey::Attribute("x".to_string()), SortOrder::Ascending).unwrap();
        let xs: Vec<_> = doc.children(root).iter().map(|&c| doc.attribute(c, "x")).collect();
        assert_eq!(xs, vec![None, Some("10"), Some("9")]);
    }
}
