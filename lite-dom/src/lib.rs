//! In-memory output tree used by the lite renderer.
//!
//! A [`Document`] is an arena of nodes addressed by [`NodeId`] handles.
//! Parent and sibling navigation goes through the arena, so handles can be
//! held freely by parts and values without owning anything.
//! Detached nodes stay in the arena; a handle never dangles.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use bitflags::bitflags;

pub mod diff;
pub mod events;
pub mod parse;
pub mod serialize;

pub use events::{Event, Listener};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Fragment,
    Element,
    Text,
    Comment,
}

bitflags! {
    /// Which node kinds [`Document::walk`] reports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NodeFilter: u8 {
        const ELEMENT = 0b001;
        const TEXT = 0b010;
        const COMMENT = 0b100;
        const ALL = Self::ELEMENT.bits() | Self::TEXT.bits() | Self::COMMENT.bits();
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Fragment,
    Element { tag: String, attrs: Vec<(String, String)> },
    Text(String),
    Comment(String),
}

struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    properties: HashMap<String, Rc<dyn Any>>,
    listeners: Vec<(String, Listener)>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            properties: HashMap::new(),
            listeners: Vec::new(),
        }
    }
}

struct Inner {
    nodes: RefCell<Vec<NodeData>>,
    mutations: Cell<u64>,
    node_data: RefCell<HashMap<NodeId, Rc<dyn Any>>>,
}

/// Shared handle to a node arena. Cloning is cheap and yields the same document.
#[derive(Clone)]
pub struct Document {
    inner: Rc<Inner>,
}

/// Non-owning handle to a [`Document`].
#[derive(Clone)]
pub struct WeakDocument {
    inner: Weak<Inner>,
}

impl WeakDocument {
    pub fn upgrade(&self) -> Option<Document> {
        self.inner.upgrade().map(|inner| Document { inner })
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.inner.nodes.borrow().len())
            .field("mutations", &self.inner.mutations.get())
            .finish()
    }
}

impl fmt::Debug for WeakDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakDocument")
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                nodes: RefCell::new(Vec::new()),
                mutations: Cell::new(0),
                node_data: RefCell::new(HashMap::new()),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument { inner: Rc::downgrade(&self.inner) }
    }

    pub fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of tree mutations performed on this document so far.
    /// Creating detached nodes does not count; inserting, removing and
    /// writing attributes, data, properties or listeners does.
    pub fn mutation_count(&self) -> u64 {
        self.inner.mutations.get()
    }

    fn mutated(&self) {
        self.inner.mutations.set(self.inner.mutations.get() + 1);
    }

    fn alloc(&self, kind: NodeKind) -> NodeId {
        let mut nodes = self.inner.nodes.borrow_mut();
        let id = NodeId(nodes.len() as u32);
        nodes.push(NodeData::new(kind));
        id
    }

    pub fn create_fragment(&self) -> NodeId {
        self.alloc(NodeKind::Fragment)
    }

    pub fn create_element(&self, tag: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Element { tag: tag.into(), attrs: Vec::new() })
    }

    pub fn create_text(&self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(text.into()))
    }

    pub fn create_comment(&self, data: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Comment(data.into()))
    }

    pub fn node_type(&self, id: NodeId) -> NodeType {
        match self.inner.nodes.borrow()[id.index()].kind {
            NodeKind::Fragment => NodeType::Fragment,
            NodeKind::Element { .. } => NodeType::Element,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Comment(_) => NodeType::Comment,
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<String> {
        match &self.inner.nodes.borrow()[id.index()].kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            _ => None,
        }
    }

    /// Character data of a text or comment node.
    pub fn data(&self, id: NodeId) -> Option<String> {
        match &self.inner.nodes.borrow()[id.index()].kind {
            NodeKind::Text(s) | NodeKind::Comment(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Replace the character data of a text or comment node. Other kinds are
    /// left untouched.
    pub fn set_data(&self, id: NodeId, data: impl Into<String>) {
        let mut nodes = self.inner.nodes.borrow_mut();
        match &mut nodes[id.index()].kind {
            NodeKind::Text(s) | NodeKind::Comment(s) => *s = data.into(),
            _ => return,
        }
        drop(nodes);
        self.mutated();
    }

    // ---- navigation ----

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.inner.nodes.borrow()[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.inner.nodes.borrow()[id.index()].children.clone()
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.inner.nodes.borrow()[id.index()].children.len()
    }

    pub fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.inner.nodes.borrow()[id.index()].children.get(index).copied()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.child_at(id, 0)
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.inner.nodes.borrow()[id.index()].children.last().copied()
    }

    fn position(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let nodes = self.inner.nodes.borrow();
        let parent = nodes[id.index()].parent?;
        let index = nodes[parent.index()].children.iter().position(|c| *c == id)?;
        Some((parent, index))
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.position(id)?;
        self.child_at(parent, index + 1)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.position(id)?;
        index.checked_sub(1).and_then(|i| self.child_at(parent, i))
    }

    /// Child indices leading from `root` down to `id`, or `None` when `id`
    /// is not inside `root`.
    pub fn index_path(&self, root: NodeId, id: NodeId) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut current = id;
        while current != root {
            let (parent, index) = self.position(current)?;
            path.push(index);
            current = parent;
        }
        path.reverse();
        Some(path)
    }

    pub fn node_at_path(&self, root: NodeId, path: &[usize]) -> Option<NodeId> {
        path.iter().try_fold(root, |node, &index| self.child_at(node, index))
    }

    /// Depth-first, pre-order list of the descendants of `root` (excluding
    /// `root` itself) whose kind is selected by `filter`.
    pub fn walk(&self, root: NodeId, filter: NodeFilter) -> Vec<NodeId> {
        let nodes = self.inner.nodes.borrow();
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = nodes[root.index()].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let data = &nodes[id.index()];
            let wanted = match data.kind {
                NodeKind::Element { .. } => filter.contains(NodeFilter::ELEMENT),
                NodeKind::Text(_) => filter.contains(NodeFilter::TEXT),
                NodeKind::Comment(_) => filter.contains(NodeFilter::COMMENT),
                NodeKind::Fragment => false,
            };
            if wanted {
                out.push(id);
            }
            stack.extend(data.children.iter().rev().copied());
        }
        out
    }

    // ---- structure mutation ----

    fn detach(&self, nodes: &mut [NodeData], id: NodeId) {
        if let Some(parent) = nodes[id.index()].parent.take() {
            nodes[parent.index()].children.retain(|c| *c != id);
        }
    }

    pub fn append_child(&self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// Insert `child` into `parent` before `reference` (at the end when
    /// `None`). A fragment is not inserted itself; its children move instead
    /// and the fragment is left empty. A `reference` that is not a child of
    /// `parent` appends.
    pub fn insert_before(&self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if self.node_type(child) == NodeType::Fragment {
            for grandchild in self.children(child) {
                self.insert_before(parent, grandchild, reference);
            }
            return;
        }
        let mut nodes = self.inner.nodes.borrow_mut();
        self.detach(&mut nodes, child);
        let siblings = &mut nodes[parent.index()].children;
        let index = reference
            .and_then(|r| siblings.iter().position(|c| *c == r))
            .unwrap_or(siblings.len());
        siblings.insert(index, child);
        nodes[child.index()].parent = Some(parent);
        drop(nodes);
        self.mutated();
    }

    /// Detach `id` from its parent. The node and its subtree stay usable.
    pub fn remove(&self, id: NodeId) {
        let mut nodes = self.inner.nodes.borrow_mut();
        if nodes[id.index()].parent.is_none() {
            return;
        }
        self.detach(&mut nodes, id);
        drop(nodes);
        self.mutated();
    }

    /// Siblings strictly between `start` and `end`, which must share a parent.
    /// When `end` is `None` the range runs to the last child.
    pub fn nodes_between(&self, start: NodeId, end: Option<NodeId>) -> Vec<NodeId> {
        let Some((parent, from)) = self.position(start) else {
            return Vec::new();
        };
        let nodes = self.inner.nodes.borrow();
        let siblings = &nodes[parent.index()].children;
        let to = end
            .and_then(|e| siblings.iter().position(|c| *c == e))
            .unwrap_or(siblings.len());
        if to <= from + 1 {
            return Vec::new();
        }
        siblings[from + 1..to].to_vec()
    }

    // ---- attributes & properties ----

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<String> {
        match &self.inner.nodes.borrow()[id.index()].kind {
            NodeKind::Element { attrs, .. } => {
                attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
            }
            _ => None,
        }
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Attributes in source order.
    pub fn attributes(&self, id: NodeId) -> Vec<(String, String)> {
        match &self.inner.nodes.borrow()[id.index()].kind {
            NodeKind::Element { attrs, .. } => attrs.clone(),
            _ => Vec::new(),
        }
    }

    pub fn set_attribute(&self, id: NodeId, name: &str, value: impl Into<String>) {
        let mut nodes = self.inner.nodes.borrow_mut();
        let NodeKind::Element { attrs, .. } = &mut nodes[id.index()].kind else {
            return;
        };
        let value = value.into();
        match attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => attrs.push((name.to_string(), value)),
        }
        drop(nodes);
        self.mutated();
    }

    /// Returns whether the attribute was present.
    pub fn remove_attribute(&self, id: NodeId, name: &str) -> bool {
        let mut nodes = self.inner.nodes.borrow_mut();
        let NodeKind::Element { attrs, .. } = &mut nodes[id.index()].kind else {
            return false;
        };
        let before = attrs.len();
        attrs.retain(|(k, _)| k != name);
        let removed = attrs.len() != before;
        drop(nodes);
        if removed {
            self.mutated();
        }
        removed
    }

    pub fn set_property(&self, id: NodeId, name: &str, value: Rc<dyn Any>) {
        self.inner.nodes.borrow_mut()[id.index()]
            .properties
            .insert(name.to_string(), value);
        self.mutated();
    }

    pub fn property(&self, id: NodeId, name: &str) -> Option<Rc<dyn Any>> {
        self.inner.nodes.borrow()[id.index()].properties.get(name).cloned()
    }

    // ---- text ----

    /// Concatenated text of all descendant text nodes; the data itself for
    /// text and comment nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        match self.node_type(id) {
            NodeType::Text | NodeType::Comment => self.data(id).unwrap_or_default(),
            NodeType::Element | NodeType::Fragment => self
                .walk(id, NodeFilter::TEXT)
                .into_iter()
                .filter_map(|t| self.data(t))
                .collect(),
        }
    }

    /// Replace the content of an element (or fragment) with a single text
    /// node, or the data of a text/comment node.
    pub fn set_text_content(&self, id: NodeId, text: impl Into<String>) {
        let text = text.into();
        match self.node_type(id) {
            NodeType::Text | NodeType::Comment => self.set_data(id, text),
            NodeType::Element | NodeType::Fragment => {
                for child in self.children(id) {
                    self.remove(child);
                }
                if !text.is_empty() {
                    let node = self.create_text(text);
                    self.append_child(id, node);
                }
            }
        }
    }

    // ---- cloning ----

    /// Copy `id` from `source` (which may be this document) into this
    /// document. The copy is detached. Properties and listeners are not
    /// copied.
    pub fn import_node(&self, source: &Document, id: NodeId, deep: bool) -> NodeId {
        let (kind, children) = {
            let nodes = source.inner.nodes.borrow();
            let data = &nodes[id.index()];
            (data.kind.clone(), if deep { data.children.clone() } else { Vec::new() })
        };
        let copy = self.alloc(kind);
        for child in children {
            let child_copy = self.import_node(source, child, true);
            let mut nodes = self.inner.nodes.borrow_mut();
            nodes[child_copy.index()].parent = Some(copy);
            nodes[copy.index()].children.push(child_copy);
        }
        copy
    }

    pub fn clone_node(&self, id: NodeId, deep: bool) -> NodeId {
        self.import_node(self, id, deep)
    }

    // ---- per-node slots ----

    /// Attach arbitrary data to a node, replacing any previous value.
    pub fn set_node_data(&self, id: NodeId, data: Rc<dyn Any>) {
        self.inner.node_data.borrow_mut().insert(id, data);
    }

    pub fn node_data(&self, id: NodeId) -> Option<Rc<dyn Any>> {
        self.inner.node_data.borrow().get(&id).cloned()
    }

    pub fn remove_node_data(&self, id: NodeId) -> Option<Rc<dyn Any>> {
        self.inner.node_data.borrow_mut().remove(&id)
    }

    // ---- snapshots ----

    /// Detached copy of the subtree at `id` for structural comparison.
    /// A fragment snapshots as an element with an empty tag.
    pub fn snapshot(&self, id: NodeId) -> VNode {
        let nodes = self.inner.nodes.borrow();
        fn build(nodes: &[NodeData], id: NodeId) -> VNode {
            let data = &nodes[id.index()];
            match &data.kind {
                NodeKind::Text(t) => VNode::Text(t.clone()),
                NodeKind::Comment(c) => VNode::Comment(c.clone()),
                NodeKind::Element { tag, attrs } => VNode::Element {
                    tag: tag.clone(),
                    props: Props { attrs: attrs.iter().cloned().collect() },
                    children: data.children.iter().map(|c| build(nodes, *c)).collect(),
                },
                NodeKind::Fragment => VNode::Element {
                    tag: String::new(),
                    props: Props::new(),
                    children: data.children.iter().map(|c| build(nodes, *c)).collect(),
                },
            }
        }
        build(&nodes, id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VNode {
    Element {
        tag: String,
        props: Props,
        children: Vec<VNode>,
    },
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Props {
    pub attrs: HashMap<String, String>,
}

impl Props {
    pub fn new() -> Self {
        Self {
            attrs: HashMap::new(),
        }
    }
    pub fn set(mut self, k: impl Into<String>, v: impl Into<String>) -> Self {
        self.attrs.insert(k.into(), v.into());
        self
    }
}

// Allow concise props creation
impl From<()> for Props {
    fn from(_: ()) -> Self {
        Props::default()
    }
}
impl From<Vec<(&str, &str)>> for Props {
    fn from(v: Vec<(&str, &str)>) -> Self {
        let mut p = Props::new();
        for (k, v) in v {
            p.attrs.insert(k.to_string(), v.to_string());
        }
        p
    }
}

pub fn h(tag: impl Into<String>, props: impl Into<Props>, children: Vec<VNode>) -> VNode {
    VNode::Element {
        tag: tag.into(),
        props: props.into(),
        children,
    }
}
pub fn text(t: impl Into<String>) -> VNode {
    VNode::Text(t.into())
}
pub fn comment(c: impl Into<String>) -> VNode {
    VNode::Comment(c.into())
}
