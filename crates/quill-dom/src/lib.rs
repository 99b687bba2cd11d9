//! DOM tree implementation for the Quill sanitizer.
//!
//! This crate provides an arena-based DOM tree structure following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/).
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access without borrow checker issues. Nodes detached by a
//! rewrite stay in the arena (unreachable from the root) until the tree is
//! dropped; a tree never outlives one sanitize call, so nothing is reclaimed.

mod attributes;

pub use attributes::{Attribute, AttributesMap};

/// A type-safe index into the DOM tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub children: Vec<NodeId>,
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
    ///
    /// Holds the raw declaration text between `<!` and `>` (for example
    /// `DOCTYPE html`), so the serializer reproduces the author's casing.
    Doctype(String),
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    ///
    /// Text is stored as it appeared in the source, character references
    /// included.
    Text(String),
    /// [§ 4.7 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
}

/// Element-specific data.
///
/// Per [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element):
/// "When an element is created, its local name is always given."
///
/// NOTE: Only the local name and the attribute list are stored. Namespaces
/// do not matter for AMP rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// "An element's local name", lowercased by the parser.
    pub tag_name: String,
    /// "An element has an associated attribute list"
    pub attrs: AttributesMap,
}

impl ElementData {
    /// Create element data with no attributes.
    #[must_use]
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            attrs: AttributesMap::new(),
        }
    }

    /// Create element data with the given attributes, in order.
    #[must_use]
    pub fn with_attrs<'a>(tag_name: &str, attrs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut data = Self::new(tag_name);
        for (name, value) in attrs {
            let _ = data.attrs.set(name, value);
        }
        data
    }

    /// Returns the value of the attribute `name`, if present.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name)
    }

    /// Returns true if the attribute is absent or has an empty value.
    #[must_use]
    pub fn attr_is_blank(&self, name: &str) -> bool {
        self.attrs.get(name).is_none_or(|v| v.trim().is_empty())
    }

    /// Whether this element is an AMP custom element (`amp-*`).
    #[must_use]
    pub fn is_amp_element(&self) -> bool {
        self.tag_name.starts_with("amp-")
    }
}

/// Arena-based DOM tree with O(1) node access.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree."
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes in the tree, indexed by `NodeId`.
    /// The Document node is always at index 0 (`NodeId::ROOT`).
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new DOM tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                node_type: NodeType::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Number of nodes in the arena, detached ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the Document node is allocated on construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Allocate a detached element.
    pub fn alloc_element(&mut self, data: ElementData) -> NodeId {
        self.alloc(NodeType::Element(data))
    }

    /// Allocate a detached text node.
    pub fn alloc_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeType::Text(text.to_string()))
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// `child` is detached from any previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// [§ 4.2.3 Pre-insert](https://dom.spec.whatwg.org/#concept-node-pre-insert)
    ///
    /// Insert `child` into `parent` immediately before `reference`. Falls back
    /// to appending if `reference` is not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        let index = children
            .iter()
            .position(|&id| id == reference)
            .unwrap_or(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Insert `child` as the first child of `parent`.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        match self.first_child(parent) {
            Some(first) => self.insert_before(parent, child, first),
            None => self.append_child(parent, child),
        }
    }

    /// [§ 4.2.4 Remove](https://dom.spec.whatwg.org/#concept-node-remove)
    ///
    /// Remove `child` from `parent`. Does nothing if it is not a child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        let children = &mut self.nodes[parent.0].children;
        if let Some(index) = children.iter().position(|&id| id == child) {
            let _ = children.remove(index);
            self.nodes[child.0].parent = None;
        }
    }

    /// Remove `id` from its parent, if it has one.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            self.remove_child(parent, id);
        }
    }

    /// [§ 4.2.5 Replace](https://dom.spec.whatwg.org/#concept-node-replace)
    ///
    /// Put `replacement` where `old` currently sits. `old` ends up detached.
    /// Does nothing if `old` has no parent.
    pub fn replace_node(&mut self, old: NodeId, replacement: NodeId) {
        let Some(parent) = self.parent(old) else {
            return;
        };
        self.insert_before(parent, replacement, old);
        self.remove_child(parent, old);
    }

    /// Move every child of `from` to the end of `to`, preserving order.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        let children = std::mem::take(&mut self.nodes[from.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
            self.append_child(to, child);
        }
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[][..], |n| n.children.as_slice())
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    ///
    /// "An object A's next sibling is the object immediately following A
    /// in the children of A's parent."
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let index = siblings.iter().position(|&s| s == id)?;
        siblings.get(index + 1).copied()
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let index = siblings.iter().position(|&s| s == id)?;
        index.checked_sub(1).map(|i| siblings[i])
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// Check if `descendant` is a descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over `id` and all of its descendants in tree order (pre-order).
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        DescendantIterator {
            tree: self,
            stack: vec![id],
        }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get mutable element data if this node is an element.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| match &mut n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Tag name of an element node.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.as_element(id).map(|e| e.tag_name.as_str())
    }

    /// First element in tree order (starting at and including `from`) with
    /// the given tag name.
    #[must_use]
    pub fn find_element(&self, from: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(from)
            .find(|&id| self.tag_name(id) == Some(tag))
    }

    /// All elements below and including `from` with the given tag name, in
    /// tree order.
    #[must_use]
    pub fn elements_by_tag_name(&self, from: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(from)
            .filter(|&id| self.tag_name(id) == Some(tag))
            .collect()
    }

    /// Concatenated text of all text descendants.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|d| self.as_text(d))
            .collect()
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .find(|&&id| self.as_element(id).is_some())
            .copied()
    }

    /// The document element, if it is an `html` element. A fragment rooted
    /// at `<section>` or `<div>` has none.
    #[must_use]
    pub fn html_element(&self) -> Option<NodeId> {
        self.document_element()
            .filter(|&id| self.tag_name(id) == Some("html"))
    }

    /// [§ 3.1.4 The head element](https://html.spec.whatwg.org/multipage/dom.html#the-head-element-2)
    ///
    /// "The head element of a document is the first head element that is a
    /// child of the html element, if there is one, or null otherwise."
    #[must_use]
    pub fn head(&self) -> Option<NodeId> {
        let html = self.html_element()?;
        self.children(html)
            .iter()
            .find(|&&id| self.tag_name(id) == Some("head"))
            .copied()
    }

    /// [§ 3.1.3 The body element](https://html.spec.whatwg.org/multipage/dom.html#the-body-element-2)
    ///
    /// "The body element of a document is the first of the html element's children
    /// that is either a body element or a frameset element, or null if there is
    /// no such element."
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        let html = self.html_element()?;
        self.children(html)
            .iter()
            .find(|&&id| matches!(self.tag_name(id), Some("body" | "frameset")))
            .copied()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Pre-order iterator over a subtree.
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
