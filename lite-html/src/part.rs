//! Parts are the live bindings of a template instance.
//!
//! Updating is two-phase: `set_value` only records the value, `commit`
//! touches the tree. No part holds a `RefCell` borrow while it calls out
//! to a directive or commits a child part.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::mem;
use std::rc::Rc;

use lite_core::Promise;
use lite_dom::{Document, Listener, NodeId, NodeType, WeakDocument};
use tracing::{error, trace, warn};

use crate::error::TemplateError;
use crate::instance::TemplateInstance;
use crate::template::TemplateResult;
use crate::value::Value;

/// One value slot of a template instance.
#[derive(Clone, Debug)]
pub enum Part {
    Node(NodePart),
    Attribute(SlotPart),
    Comment(SlotPart),
    RawText(SlotPart),
}

impl Part {
    pub fn set_value(&self, value: Value) -> Result<(), TemplateError> {
        match self {
            Part::Node(part) => {
                part.set_value(value);
                Ok(())
            }
            Part::Attribute(part) | Part::Comment(part) | Part::RawText(part) => part.set_value(value),
        }
    }

    pub fn commit(&self) -> Result<(), TemplateError> {
        match self {
            Part::Node(part) => part.commit(),
            Part::Attribute(part) | Part::Comment(part) | Part::RawText(part) => part.commit(),
        }
    }

    /// Render the value `promise` resolves to, on a later turn, unless the
    /// part has been given another value by then. Current content is left
    /// in place until that happens.
    pub fn watch(&self, promise: Promise<Value>) {
        match self {
            Part::Node(part) => part.watch(promise),
            Part::Attribute(part) | Part::Comment(part) | Part::RawText(part) => part.watch(promise),
        }
    }
}

// ---- node parts ----

#[derive(Default)]
enum Content {
    #[default]
    Empty,
    Text(NodeId),
    Node(NodeId),
    /// Children of this fragment were inserted; they go back on clear.
    Fragment(NodeId),
    Instance(Rc<TemplateInstance>),
    Iterable(Vec<NodePart>),
}

struct NodeState {
    doc: WeakDocument,
    start: NodeId,
    end: NodeId,
    pending: Value,
    // last committed primitive, while `content` is its text node
    value: Value,
    content: Content,
    instances: HashMap<usize, Rc<TemplateInstance>>,
    // last promise assigned; kept after its value is committed
    promise: Option<Promise<Value>>,
    // bumped on every commit; a promise callback only renders if it still
    // matches the generation it was registered with
    generation: u64,
}

/// A child position delimited by two comment sentinels. Everything
/// strictly between them belongs to the part.
#[derive(Clone)]
pub struct NodePart(Rc<RefCell<NodeState>>);

impl fmt::Debug for NodePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0.borrow();
        f.debug_struct("NodePart")
            .field("start", &state.start)
            .field("end", &state.end)
            .finish()
    }
}

impl NodePart {
    pub fn new(doc: WeakDocument, start: NodeId, end: NodeId) -> Self {
        Self(Rc::new(RefCell::new(NodeState {
            doc,
            start,
            end,
            pending: Value::NoChange,
            value: Value::Nothing,
            content: Content::Empty,
            instances: HashMap::new(),
            promise: None,
            generation: 0,
        })))
    }

    pub fn start(&self) -> NodeId {
        self.0.borrow().start
    }

    pub fn end(&self) -> NodeId {
        self.0.borrow().end
    }

    pub fn set_value(&self, value: Value) {
        self.0.borrow_mut().pending = value;
    }

    pub fn commit(&self) -> Result<(), TemplateError> {
        self.flush(false)
    }

    /// `resolved` is set when the pending value came from the part's own
    /// promise, which then stays the assigned one.
    fn flush(&self, resolved: bool) -> Result<(), TemplateError> {
        loop {
            let value = mem::replace(&mut self.0.borrow_mut().pending, Value::NoChange);
            match value {
                Value::NoChange => return Ok(()),
                Value::Directive(directive) => directive.apply(&Part::Node(self.clone()))?,
                value => return self.dispatch(value, resolved),
            }
        }
    }

    fn document(&self) -> Result<Document, TemplateError> {
        self.0.borrow().doc.upgrade().ok_or(TemplateError::Detached)
    }

    fn parent(&self, doc: &Document) -> Result<NodeId, TemplateError> {
        doc.parent(self.end()).ok_or(TemplateError::Detached)
    }

    fn dispatch(&self, value: Value, resolved: bool) -> Result<(), TemplateError> {
        if let Value::Promise(promise) = value {
            return self.commit_promise(promise);
        }
        {
            let mut state = self.0.borrow_mut();
            if !resolved {
                state.promise = None;
            }
            state.generation += 1;
        }
        match value {
            Value::Nothing => self.clear(),
            Value::Template(result) => self.commit_template(result),
            Value::List(items) => self.commit_iterable(items),
            Value::Node(node) => self.commit_node(node),
            value => self.commit_text(value),
        }
    }

    fn commit_text(&self, value: Value) -> Result<(), TemplateError> {
        let (text_node, unchanged) = {
            let state = self.0.borrow();
            match state.content {
                Content::Text(node) => (Some(node), state.value.same(&value)),
                _ => (None, false),
            }
        };
        if unchanged {
            return Ok(());
        }
        let doc = self.document()?;
        let text = value.to_text();
        match text_node {
            Some(node) => doc.set_data(node, text),
            None => {
                self.clear()?;
                let node = doc.create_text(text);
                doc.insert_before(self.parent(&doc)?, node, Some(self.end()));
                self.0.borrow_mut().content = Content::Text(node);
            }
        }
        trace!(?value, "node part committed text");
        self.0.borrow_mut().value = value;
        Ok(())
    }

    fn commit_node(&self, node: NodeId) -> Result<(), TemplateError> {
        let current = matches!(
            self.0.borrow().content,
            Content::Node(n) | Content::Fragment(n) if n == node
        );
        if current {
            return Ok(());
        }
        self.clear()?;
        let doc = self.document()?;
        let content = match doc.node_type(node) {
            NodeType::Fragment => Content::Fragment(node),
            _ => Content::Node(node),
        };
        doc.insert_before(self.parent(&doc)?, node, Some(self.end()));
        self.0.borrow_mut().content = content;
        Ok(())
    }

    fn commit_template(&self, result: TemplateResult) -> Result<(), TemplateError> {
        let template = result.template()?;
        let doc = self.document()?;
        let key = Rc::as_ptr(&template) as usize;

        let cached = self.0.borrow().instances.get(&key).cloned();
        let instance = match cached {
            Some(instance) => instance,
            None => {
                let instance = Rc::new(TemplateInstance::new(template, &doc)?);
                self.0.borrow_mut().instances.insert(key, instance.clone());
                instance
            }
        };

        let current = matches!(
            &self.0.borrow().content,
            Content::Instance(shown) if Rc::ptr_eq(shown, &instance)
        );
        if !current {
            self.clear()?;
            doc.insert_before(self.parent(&doc)?, instance.fragment(), Some(self.end()));
            self.0.borrow_mut().content = Content::Instance(instance.clone());
            trace!("node part switched template instance");
        }
        instance.update(result.into_values())
    }

    fn commit_iterable(&self, items: Vec<Value>) -> Result<(), TemplateError> {
        let existing = match &self.0.borrow().content {
            Content::Iterable(parts) => Some(parts.clone()),
            _ => None,
        };
        let mut parts = match existing {
            Some(parts) => parts,
            None => {
                self.clear()?;
                Vec::new()
            }
        };
        let doc = self.document()?;
        let parent = self.parent(&doc)?;
        let end = self.end();
        let len = items.len();

        let mut outcome = Ok(());
        for (i, item) in items.into_iter().enumerate() {
            if i == parts.len() {
                let child_start = doc.create_comment("");
                let child_end = doc.create_comment("");
                doc.insert_before(parent, child_start, Some(end));
                doc.insert_before(parent, child_end, Some(end));
                parts.push(NodePart::new(doc.downgrade(), child_start, child_end));
            }
            parts[i].set_value(item);
            if let Err(err) = parts[i].commit() {
                outcome = Err(err);
                break;
            }
        }

        if outcome.is_ok() && len < parts.len() {
            let from = match len {
                0 => self.start(),
                n => parts[n - 1].end(),
            };
            for node in doc.nodes_between(from, Some(end)) {
                doc.remove(node);
            }
            parts.truncate(len);
        }
        trace!(items = len, "node part committed list");
        self.0.borrow_mut().content = Content::Iterable(parts);
        outcome
    }

    fn commit_promise(&self, promise: Promise<Value>) -> Result<(), TemplateError> {
        let assigned = self.0.borrow().promise.as_ref().is_some_and(|p| p.ptr_eq(&promise));
        if assigned {
            return Ok(());
        }
        self.clear()?;
        self.watch(promise);
        Ok(())
    }

    pub fn watch(&self, promise: Promise<Value>) {
        let generation = {
            let mut state = self.0.borrow_mut();
            state.generation += 1;
            state.promise = Some(promise.clone());
            state.generation
        };
        let part = Rc::downgrade(&self.0);
        promise.then(move |value| {
            let Some(state) = part.upgrade() else { return };
            if state.borrow().generation != generation {
                return;
            }
            let part = NodePart(state);
            part.set_value(value);
            if let Err(err) = part.flush(true) {
                error!(%err, "failed to commit resolved promise");
            }
        });
    }

    /// Start and end sentinels of this part and of every node part nested
    /// in its current content, outermost first.
    pub fn sentinels(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_sentinels(&mut out);
        out
    }

    fn collect_sentinels(&self, out: &mut Vec<NodeId>) {
        let nested: Vec<NodePart> = {
            let state = self.0.borrow();
            out.extend([state.start, state.end]);
            match &state.content {
                Content::Instance(instance) => instance
                    .parts()
                    .iter()
                    .filter_map(|part| match part {
                        Part::Node(node) => Some(node.clone()),
                        _ => None,
                    })
                    .collect(),
                Content::Iterable(parts) => parts.clone(),
                _ => Vec::new(),
            }
        };
        for part in nested {
            part.collect_sentinels(out);
        }
    }

    /// Remove everything between the sentinels. Nodes that came from a
    /// template instance or an inserted fragment go back to that fragment.
    pub fn clear(&self) -> Result<(), TemplateError> {
        let content = {
            let mut state = self.0.borrow_mut();
            state.value = Value::Nothing;
            mem::take(&mut state.content)
        };
        if matches!(content, Content::Empty) {
            return Ok(());
        }
        let doc = self.document()?;
        let nodes = doc.nodes_between(self.start(), Some(self.end()));
        let home = match &content {
            Content::Instance(instance) => Some(instance.fragment()),
            Content::Fragment(fragment) => Some(*fragment),
            _ => None,
        };
        for node in nodes {
            match home {
                Some(fragment) => doc.append_child(fragment, node),
                None => doc.remove(node),
            }
        }
        Ok(())
    }
}

// ---- attribute, comment and raw text parts ----

/// How a bound attribute is applied, chosen from its name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeBehavior {
    /// `.name`: assign a property.
    Property,
    /// `?name`: present when the value is truthy.
    BooleanToggle,
    /// `@name`: subscribe a listener.
    Subscription,
    /// Plain attribute value.
    Literal,
}

impl AttributeBehavior {
    /// Split a bound attribute name into its behavior and the name it
    /// applies to.
    pub fn parse(name: &str) -> (Self, &str) {
        if let Some(rest) = name.strip_prefix('.') {
            (AttributeBehavior::Property, rest)
        } else if let Some(rest) = name.strip_prefix('?') {
            (AttributeBehavior::BooleanToggle, rest)
        } else if let Some(rest) = name.strip_prefix('@') {
            (AttributeBehavior::Subscription, rest)
        } else {
            (AttributeBehavior::Literal, name)
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum CommitterKind {
    Attribute { name: String, behavior: AttributeBehavior },
    Comment,
    RawText,
}

/// Shared state of every slot bound into one attribute, comment or raw
/// text node. The joined result is recomputed at most once per commit.
pub(crate) struct Committer {
    doc: WeakDocument,
    node: NodeId,
    kind: CommitterKind,
    segments: Vec<String>,
    values: Vec<Value>,
    generations: Vec<u64>,
    dirty: bool,
    applied: Option<Value>,
    listener: Option<Listener>,
}

impl Committer {
    /// Build the committer for `node` and return one part per hole.
    pub(crate) fn parts(doc: WeakDocument, node: NodeId, kind: CommitterKind, segments: Vec<String>) -> Vec<Part> {
        let holes = segments.len().saturating_sub(1);
        let committer = Rc::new(RefCell::new(Committer {
            doc,
            node,
            kind,
            segments,
            values: vec![Value::Nothing; holes],
            generations: vec![0; holes],
            dirty: true,
            applied: None,
            listener: None,
        }));
        (0..holes)
            .map(|slot| SlotPart { committer: committer.clone(), slot }.into_part())
            .collect()
    }

    fn set(&mut self, slot: usize, value: Value) {
        if let Some(generation) = self.generations.get_mut(slot) {
            *generation += 1;
        }
        let Some(current) = self.values.get_mut(slot) else { return };
        if !current.same(&value) {
            *current = value;
            self.dirty = true;
        }
    }

    /// The value to apply: the raw value of a lone hole for the non-literal
    /// attribute behaviors, otherwise the joined string.
    fn current(&self) -> Value {
        let lone = self.values.len() == 1 && self.segments.iter().all(String::is_empty);
        if lone {
            let value = &self.values[0];
            match &self.kind {
                CommitterKind::Attribute { behavior: AttributeBehavior::BooleanToggle, .. } => {
                    return Value::Bool(value.is_truthy());
                }
                CommitterKind::Attribute { behavior: AttributeBehavior::Literal, .. } => {
                    if matches!(value, Value::Nothing) {
                        return Value::Nothing;
                    }
                }
                CommitterKind::Attribute { .. } => return value.clone(),
                _ => {}
            }
        }
        let mut joined = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            joined.push_str(segment);
            if let Some(value) = self.values.get(i) {
                joined.push_str(&value.to_text());
            }
        }
        match &self.kind {
            CommitterKind::Attribute { behavior: AttributeBehavior::BooleanToggle, .. } => {
                Value::Bool(!joined.is_empty())
            }
            _ => Value::Str(joined.into()),
        }
    }

    fn commit(&mut self) -> Result<(), TemplateError> {
        if !self.dirty {
            return Ok(());
        }
        self.dirty = false;
        let value = self.current();
        if self.applied.as_ref().is_some_and(|applied| applied.same(&value)) {
            return Ok(());
        }
        let doc = self.doc.upgrade().ok_or(TemplateError::Detached)?;
        let node = self.node;

        match &self.kind {
            CommitterKind::Attribute { name, behavior } => match behavior {
                AttributeBehavior::Literal => match &value {
                    Value::Nothing => {
                        doc.remove_attribute(node, name);
                    }
                    value => doc.set_attribute(node, name, value.to_text()),
                },
                AttributeBehavior::Property => doc.set_property(node, name, Rc::new(value.clone())),
                AttributeBehavior::BooleanToggle => {
                    if value.is_truthy() {
                        doc.set_attribute(node, name, "");
                    } else {
                        doc.remove_attribute(node, name);
                    }
                }
                AttributeBehavior::Subscription => {
                    let next = match &value {
                        Value::Listener(listener) => Some(listener.clone()),
                        Value::Nothing => None,
                        other => {
                            warn!(event = %name, value = ?other, "event binding needs a listener");
                            None
                        }
                    };
                    if let Some(previous) = self.listener.take() {
                        doc.remove_listener(node, name, &previous);
                    }
                    if let Some(listener) = &next {
                        doc.add_listener(node, name.clone(), listener.clone());
                    }
                    self.listener = next;
                }
            },
            CommitterKind::Comment => doc.set_data(node, value.to_text()),
            CommitterKind::RawText => doc.set_text_content(node, value.to_text()),
        }
        trace!(kind = ?self.kind, "committed");
        self.applied = Some(value);
        Ok(())
    }
}

/// One hole of an attribute, comment or raw text binding.
#[derive(Clone)]
pub struct SlotPart {
    committer: Rc<RefCell<Committer>>,
    slot: usize,
}

impl fmt::Debug for SlotPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotPart")
            .field("kind", &self.committer.borrow().kind)
            .field("slot", &self.slot)
            .finish()
    }
}

impl SlotPart {
    fn into_part(self) -> Part {
        let kind = self.committer.borrow().kind.clone();
        match kind {
            CommitterKind::Attribute { .. } => Part::Attribute(self),
            CommitterKind::Comment => Part::Comment(self),
            CommitterKind::RawText => Part::RawText(self),
        }
    }

    /// Directives run right away; anything else is stored for the next
    /// commit.
    pub fn set_value(&self, value: Value) -> Result<(), TemplateError> {
        match value {
            Value::Directive(directive) => directive.apply(&self.clone().into_part()),
            Value::NoChange => Ok(()),
            value => {
                self.committer.borrow_mut().set(self.slot, value);
                Ok(())
            }
        }
    }

    pub fn commit(&self) -> Result<(), TemplateError> {
        self.committer.borrow_mut().commit()
    }

    pub fn watch(&self, promise: Promise<Value>) {
        let slot = self.slot;
        let Some(generation) = self.committer.borrow().generations.get(slot).copied() else {
            return;
        };
        let committer = Rc::downgrade(&self.committer);
        promise.then(move |value| {
            let Some(committer) = committer.upgrade() else { return };
            if committer.borrow().generations.get(slot).copied() != Some(generation) {
                return;
            }
            let part = SlotPart { committer, slot };
            if let Err(err) = part.set_value(value).and_then(|_| part.commit()) {
                error!(%err, "failed to commit resolved promise");
            }
        });
    }
}
