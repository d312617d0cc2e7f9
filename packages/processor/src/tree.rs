//! Owned mutable document tree.
//!
//! `roxmltree` documents are read-only, so both filtering directions operate
//! on this arena-backed tree instead. Nodes are addressed by `NodeId`;
//! detached subtrees simply become unreachable from the root (documents are
//! small enough that the arena is never compacted during a pass).

/// Handle to a node inside a [`Fragment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Payload of a tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    /// An element with a local name and ordered attributes.
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    /// A text node.
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeEntry {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// A document fragment: one root element plus its subtree.
#[derive(Debug, Clone)]
pub struct Fragment {
    nodes: Vec<NodeEntry>,
    root: NodeId,
}

impl Fragment {
    /// Create a fragment with an empty root element.
    #[must_use]
    pub fn new(root_name: impl Into<String>) -> Self {
        let root_entry = NodeEntry {
            parent: None,
            children: Vec::new(),
            data: NodeData::Element {
                name: root_name.into(),
                attributes: Vec::new(),
            },
        };
        Self {
            nodes: vec![root_entry],
            root: NodeId(0),
        }
    }

    /// The root element.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached element node.
    pub fn new_element(&mut self, name: impl Into<String>) -> NodeId {
        self.push(NodeData::Element {
            name: name.into(),
            attributes: Vec::new(),
        })
    }

    /// Create a detached text node.
    pub fn new_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Text(text.into()))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeEntry {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// # Panics
    /// Panics in debug builds if `child` is still attached elsewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.nodes[child.0].parent.is_none());
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `child` under `parent` at `index`.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        debug_assert!(self.nodes[child.0].parent.is_none());
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(index, child);
    }

    /// Detach `node` from its parent. The subtree stays in the arena but is
    /// no longer reachable from the root.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    /// Remove `node` while promoting its children into its former position.
    ///
    /// Used when an element is structurally disallowed but its content is
    /// still valid. Does nothing for the root or text nodes.
    pub fn replace_by_children(&mut self, node: NodeId) {
        let Some(parent) = self.nodes[node.0].parent else {
            return;
        };
        let children = std::mem::take(&mut self.nodes[node.0].children);
        let index = self.position_in_parent(node).unwrap_or(0);
        self.detach(node);
        for (offset, child) in children.into_iter().enumerate() {
            self.nodes[child.0].parent = Some(parent);
            self.nodes[parent.0].children.insert(index + offset, child);
        }
    }

    /// Replace `node` with the subtree rooted at `replacement`
    /// (which must belong to this fragment and be detached).
    ///
    /// Returns the replacement id for convenience.
    pub fn replace_with(&mut self, node: NodeId, replacement: NodeId) -> NodeId {
        debug_assert!(self.nodes[replacement.0].parent.is_none());
        if let Some(parent) = self.nodes[node.0].parent {
            let index = self.position_in_parent(node).unwrap_or(0);
            self.detach(node);
            self.insert_child(parent, index, replacement);
        }
        replacement
    }

    /// Copy the subtree rooted at `src_root` of `other` into this arena,
    /// returning the detached copy's root.
    pub fn graft(&mut self, other: &Fragment, src_root: NodeId) -> NodeId {
        let copy = self.push(other.nodes[src_root.0].data.clone());
        for child in other.nodes[src_root.0].children.clone() {
            let child_copy = self.graft(other, child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    fn position_in_parent(&self, node: NodeId) -> Option<usize> {
        let parent = self.nodes[node.0].parent?;
        self.nodes[parent.0].children.iter().position(|c| *c == node)
    }

    /// Parent of `node`, if attached.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// Snapshot of the children of `node`.
    ///
    /// Returned by value so callers may mutate the tree while iterating.
    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes[node.0].children.clone()
    }

    /// Whether `node` is an element.
    #[must_use]
    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.0].data, NodeData::Element { .. })
    }

    /// Whether `node` is a text node.
    #[must_use]
    pub fn is_text(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.0].data, NodeData::Text(_))
    }

    /// Element local name, or `None` for text nodes.
    #[must_use]
    pub fn name(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].data {
            NodeData::Element { name, .. } => Some(name),
            NodeData::Text(_) => None,
        }
    }

    /// Rename an element. No-op for text nodes.
    pub fn set_name(&mut self, node: NodeId, new_name: impl Into<String>) {
        if let NodeData::Element { name, .. } = &mut self.nodes[node.0].data {
            *name = new_name.into();
        }
    }

    /// Text content of a text node.
    #[must_use]
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].data {
            NodeData::Text(text) => Some(text),
            NodeData::Element { .. } => None,
        }
    }

    /// Attribute value on an element.
    #[must_use]
    pub fn attribute(&self, node: NodeId, attr: &str) -> Option<&str> {
        match &self.nodes[node.0].data {
            NodeData::Element { attributes, .. } => attributes
                .iter()
                .find(|(name, _)| name == attr)
                .map(|(_, value)| value.as_str()),
            NodeData::Text(_) => None,
        }
    }

    /// Ordered attribute list of an element (empty for text nodes).
    #[must_use]
    pub fn attributes(&self, node: NodeId) -> &[(String, String)] {
        match &self.nodes[node.0].data {
            NodeData::Element { attributes, .. } => attributes,
            NodeData::Text(_) => &[],
        }
    }

    /// Set (or overwrite, in place) an attribute on an element.
    pub fn set_attribute(&mut self, node: NodeId, attr: impl Into<String>, value: impl Into<String>) {
        if let NodeData::Element { attributes, .. } = &mut self.nodes[node.0].data {
            let attr = attr.into();
            let value = value.into();
            match attributes.iter_mut().find(|(name, _)| *name == attr) {
                Some(slot) => slot.1 = value,
                None => attributes.push((attr, value)),
            }
        }
    }

    /// Remove an attribute; returns the removed value.
    pub fn remove_attribute(&mut self, node: NodeId, attr: &str) -> Option<String> {
        if let NodeData::Element { attributes, .. } = &mut self.nodes[node.0].data {
            let index = attributes.iter().position(|(name, _)| name == attr)?;
            return Some(attributes.remove(index).1);
        }
        None
    }

    /// Whether an element has no children at all.
    #[must_use]
    pub fn is_empty_element(&self, node: NodeId) -> bool {
        self.is_element(node) && self.nodes[node.0].children.is_empty()
    }

    /// Whether `node` has at least one child element named `name`.
    #[must_use]
    pub fn has_child_element(&self, node: NodeId, name: &str) -> bool {
        self.nodes[node.0]
            .children
            .iter()
            .any(|c| self.name(*c) == Some(name))
    }

    /// Concatenated text of the subtree rooted at `node`.
    #[must_use]
    pub fn collect_text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text_into(node, &mut out);
        out
    }

    fn collect_text_into(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element { .. } => {
                for child in &self.nodes[node.0].children {
                    self.collect_text_into(*child, out);
                }
            }
        }
    }

    /// Structural equality of two subtrees (names, attributes, text).
    #[must_use]
    pub fn subtree_eq(&self, node: NodeId, other: &Fragment, other_node: NodeId) -> bool {
        if self.nodes[node.0].data != other.nodes[other_node.0].data {
            return false;
        }
        let ours = &self.nodes[node.0].children;
        let theirs = &other.nodes[other_node.0].children;
        ours.len() == theirs.len()
            && ours
                .iter()
                .zip(theirs.iter())
                .all(|(a, b)| self.subtree_eq(*a, other, *b))
    }
}
