//! # Document Arena
//!
//! Every node of a tree lives in a single `Vec` owned by the [`Document`].
//! Parent/child links are [`NodeId`] handles, so detaching a node only
//! unlinks it: the node stays live in the arena and can be re-attached.
//!
//! Slot 0 always holds the document node, the synthetic parent of the
//! top-level element(s).

use crate::error::{TreeError, TreeResult};
use crate::node::{Node, NodeId, NodeKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDocument")]
pub struct Document {
    nodes: Vec<Node>,

    /// `<?xml ...?>` declaration, kept verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<String>,

    /// `<!DOCTYPE ...>`, kept verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctype: Option<String>,
}

/// Unchecked shape of a serialized [`Document`]
#[derive(Deserialize)]
struct RawDocument {
    nodes: Vec<Node>,
    #[serde(default)]
    declaration: Option<String>,
    #[serde(default)]
    doctype: Option<String>,
}

impl TryFrom<RawDocument> for Document {
    type Error = TreeError;

    fn try_from(raw: RawDocument) -> TreeResult<Self> {
        let doc = Document {
            nodes: raw.nodes,
            declaration: raw.declaration,
            doctype: raw.doctype,
        };
        doc.check_arena()?;
        Ok(doc)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document (document node only)
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
            declaration: None,
            doctype: None,
        }
    }

    /// Document with a single root element
    pub fn with_root(name: impl Into<String>) -> Self {
        let mut doc = Self::new();
        let root = doc.create_element(name);
        doc.nodes[0].children.push(root);
        doc.nodes[root.0].parent = Some(NodeId(0));
        doc
    }

    pub fn document_node(&self) -> NodeId {
        NodeId(0)
    }

    /// First top-level element
    pub fn root(&self) -> Option<NodeId> {
        self.children(self.document_node()).first().copied()
    }

    pub fn has_root(&self) -> bool {
        self.root().is_some()
    }

    /// Number of nodes in the arena, detached ones included
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Slot 0 is the document node, every other slot an element, every
    /// link in range and mirrored by its counterpart, and no parent chain
    /// loops.
    fn check_arena(&self) -> TreeResult<()> {
        let invalid = |message: String| Err(TreeError::InvalidArena(message));

        match self.nodes.first() {
            None => return invalid("missing document node".to_string()),
            Some(node) if node.kind != NodeKind::Document || node.parent.is_some() => {
                return invalid("slot 0 is not a parentless document node".to_string());
            }
            Some(_) => {}
        }

        for (index, node) in self.nodes.iter().enumerate() {
            let id = NodeId(index);
            if index > 0 && node.kind != NodeKind::Element {
                return invalid(format!("{} is a second document node", id));
            }
            for &child in &node.children {
                if self.get(child).and_then(|c| c.parent) != Some(id) {
                    return invalid(format!("child {} of {} does not point back", child, id));
                }
            }
            if let Some(parent) = node.parent {
                let listed = self
                    .get(parent)
                    .map(|p| p.children.iter().filter(|&&c| c == id).count());
                if listed != Some(1) {
                    return invalid(format!("{} is not listed once under its parent {}", id, parent));
                }
            }

            let mut current = node.parent;
            let mut steps = 0;
            while let Some(ancestor) = current {
                steps += 1;
                if steps > self.nodes.len() {
                    return invalid(format!("parent chain of {} loops", id));
                }
                current = self.get(ancestor).and_then(|n| n.parent);
            }
        }

        Ok(())
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn node(&self, id: NodeId) -> TreeResult<&Node> {
        self.get(id).ok_or(TreeError::NodeNotFound(id))
    }

    fn element_mut(&mut self, id: NodeId) -> TreeResult<&mut Node> {
        let node = self.nodes.get_mut(id.0).ok_or(TreeError::NodeNotFound(id))?;
        if node.kind != NodeKind::Element {
            return Err(TreeError::NotAnElement(id));
        }
        Ok(node)
    }

    /// Allocate a new, detached element
    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::element(name));
        id
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(|n| n.name.as_str())
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| n.text())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id).and_then(|n| n.attribute(name))
    }

    /// True if `ancestor` is `id` or one of its ancestors
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Direct element children of every node in `context` named `name`,
    /// in context order then document order. `*` matches any name.
    pub fn children_named(&self, context: &[NodeId], name: &str) -> Vec<NodeId> {
        context
            .iter()
            .flat_map(|&parent| self.children(parent).iter().copied())
            .filter(|&child| {
                self.get(child)
                    .map(|n| n.is_element() && (name == "*" || n.name == name))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        self.node(parent)?;
        self.element_mut(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(TreeError::CycleDetected);
        }

        self.detach(child)?;
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    /// Unlink `id` from its parent. Returns false if it had none.
    pub fn detach(&mut self, id: NodeId) -> TreeResult<bool> {
        let Some(parent) = self.node(id)?.parent else {
            return Ok(false);
        };

        self.nodes[parent.0].children.retain(|&c| c != id);
        self.nodes[id.0].parent = None;
        Ok(true)
    }

    pub fn set_text(&mut self, id: NodeId, text: Option<String>) -> TreeResult<()> {
        self.element_mut(id)?.text = text;
        Ok(())
    }

    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> TreeResult<()> {
        self.element_mut(id)?.set_attribute(name, value);
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> TreeResult<Option<String>> {
        Ok(self.element_mut(id)?.remove_attribute(name))
    }

    /// Drop all children, text and attributes of `id`
    pub fn clear(&mut self, id: NodeId) -> TreeResult<()> {
        let children = std::mem::take(&mut self.element_mut(id)?.children);
        for child in children {
            self.nodes[child.0].parent = None;
        }

        let node = &mut self.nodes[id.0];
        node.text = None;
        node.attributes.clear();
        Ok(())
    }

    /// Replace the child list of `id` with a permutation of itself
    pub fn reorder_children(&mut self, id: NodeId, order: Vec<NodeId>) -> TreeResult<()> {
        let node = self.node(id)?;
        let mut current = node.children.clone();
        let mut proposed = order.clone();
        current.sort();
        proposed.sort();
        if current != proposed {
            return Err(TreeError::NodeNotFound(
                order
                    .iter()
                    .copied()
                    .find(|c| !node.children.contains(c))
                    .unwrap_or(id),
            ));
        }

        self.nodes[id.0].children = order;
        Ok(())
    }
}
