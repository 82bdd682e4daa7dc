//! Prepared templates and the per-thread template cache.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use lite_dom::parse::is_raw_text_element;
use lite_dom::{Document, NodeFilter, NodeId, NodeType};
use smallvec::SmallVec;
use tracing::debug;

use crate::error::TemplateError;
use crate::literal::Literal;
use crate::markers::markers;
use crate::tokenizer::{tokenize, BindingKind, Tokenized};
use crate::value::Value;

pub type NodePath = SmallVec<[usize; 8]>;

/// A binding plus the child-index path from the template root to the node
/// it is anchored on. For node bindings that is the start sentinel; the end
/// sentinel is its next sibling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingDescriptor {
    pub path: NodePath,
    pub kind: BindingKind,
}

/// Parsed, marker-free form of one literal. Shared by every result built
/// from the same call site and never mutated after preparation.
pub struct Template {
    markup: String,
    bindings: Vec<BindingDescriptor>,
    doc: Document,
    fragment: NodeId,
    value_count: usize,
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("markup", &self.markup)
            .field("bindings", &self.bindings)
            .field("value_count", &self.value_count)
            .finish()
    }
}

impl Template {
    /// Tokenize and prepare the fragments of a literal.
    pub fn build<S: AsRef<str>>(strings: &[S]) -> Result<Template, TemplateError> {
        let tokenized = tokenize(strings)?;
        Template::prepare(tokenized)
    }

    /// A template for plain markup with no holes, shared per distinct
    /// markup string on this thread.
    pub fn from_markup(markup: &str) -> Result<Rc<Template>, TemplateError> {
        thread_local! {
            static BY_MARKUP: RefCell<HashMap<String, Rc<Template>>> = RefCell::new(HashMap::new());
        }
        if let Some(template) = BY_MARKUP.with(|m| m.borrow().get(markup).cloned()) {
            return Ok(template);
        }
        let template = Rc::new(Template::build(&[markup])?);
        BY_MARKUP.with(|m| m.borrow_mut().insert(markup.to_string(), template.clone()));
        Ok(template)
    }

    /// Parse the tokenized markup into a prototype tree and strip the
    /// markers, recording where each binding lives.
    pub fn prepare(tokenized: Tokenized) -> Result<Template, TemplateError> {
        let Tokenized { markup, bindings } = tokenized;
        let m = markers();
        let doc = Document::new();
        let fragment = doc.parse_fragment(&markup);

        let mut pending = bindings.into_iter().peekable();
        let mut anchors: Vec<(NodeId, BindingKind)> = Vec::new();
        let missing = |anchors: &Vec<(NodeId, BindingKind)>| TemplateError::MissingMarker { index: anchors.len() };

        for node in doc.walk(fragment, NodeFilter::ELEMENT | NodeFilter::COMMENT) {
            match doc.node_type(node) {
                NodeType::Comment => {
                    let data = doc.data(node).unwrap_or_default();
                    if data == m.node {
                        if pending.next_if_eq(&BindingKind::Node).is_none() {
                            return Err(missing(&anchors));
                        }
                        doc.set_data(node, "");
                        let end = doc.create_comment("");
                        if let Some(parent) = doc.parent(node) {
                            doc.insert_before(parent, end, doc.next_sibling(node));
                        }
                        anchors.push((node, BindingKind::Node));
                    } else if data == m.comment {
                        let Some(kind) = pending.next_if(|k| matches!(k, BindingKind::Comment { .. })) else {
                            return Err(missing(&anchors));
                        };
                        doc.set_data(node, "");
                        anchors.push((node, kind));
                    }
                }
                NodeType::Element => {
                    while let Some(kind) = pending.next_if(|k| match k {
                        BindingKind::Attribute { name, .. } => {
                            doc.attribute(node, name).is_some_and(|v| v == m.attribute)
                        }
                        _ => false,
                    }) {
                        if let BindingKind::Attribute { name, .. } = &kind {
                            doc.remove_attribute(node, name);
                        }
                        anchors.push((node, kind));
                    }
                    if doc.attributes(node).iter().any(|(_, v)| *v == m.attribute) {
                        return Err(missing(&anchors));
                    }

                    let raw = doc.tag_name(node).is_some_and(|t| is_raw_text_element(&t));
                    let text = doc.first_child(node).filter(|c| doc.data(*c).is_some_and(|d| d == m.raw_text));
                    if let (true, Some(text)) = (raw, text) {
                        let Some(kind) = pending.next_if(|k| matches!(k, BindingKind::RawText { .. })) else {
                            return Err(missing(&anchors));
                        };
                        doc.set_data(text, "");
                        anchors.push((node, kind));
                    }
                }
                _ => {}
            }
        }
        if pending.next().is_some() {
            return Err(missing(&anchors));
        }

        // Paths are taken once every end sentinel is in place.
        let mut descriptors = Vec::with_capacity(anchors.len());
        for (node, kind) in anchors {
            let path = doc
                .index_path(fragment, node)
                .ok_or(TemplateError::MissingMarker { index: descriptors.len() })?;
            descriptors.push(BindingDescriptor { path: path.into_iter().collect(), kind });
        }
        let value_count = descriptors.iter().map(|b| b.kind.value_slots()).sum();

        debug!(bindings = descriptors.len(), value_count, markup_len = markup.len(), "template prepared");
        Ok(Template { markup, bindings: descriptors, doc, fragment, value_count })
    }

    /// The marker-annotated markup the prototype was parsed from.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn bindings(&self) -> &[BindingDescriptor] {
        &self.bindings
    }

    /// Number of values a result for this template must carry.
    pub fn value_count(&self) -> usize {
        self.value_count
    }

    pub(crate) fn prototype(&self) -> (&Document, NodeId) {
        (&self.doc, self.fragment)
    }

    /// Markup of the prepared prototype, markers stripped.
    pub fn prototype_markup(&self) -> String {
        self.doc.inner_markup(self.fragment)
    }
}

thread_local! {
    static TEMPLATES: RefCell<HashMap<usize, Result<Rc<Template>, TemplateError>>> =
        RefCell::new(HashMap::new());
}

/// The template for a call site, built on first use. Failures are kept too,
/// so a broken literal fails the same way every time.
pub fn template_for(literal: &'static Literal) -> Result<Rc<Template>, TemplateError> {
    let key = literal.key();
    if let Some(cached) = TEMPLATES.with(|t| t.borrow().get(&key).cloned()) {
        return cached;
    }
    let built = Template::build(literal.strings()).map(Rc::new);
    if let Err(err) = &built {
        debug!(%err, source = literal.source(), "template failed to build");
    }
    TEMPLATES.with(|t| t.borrow_mut().insert(key, built.clone()));
    built
}

/// Number of call sites cached on this thread.
pub fn cached_templates() -> usize {
    TEMPLATES.with(|t| t.borrow().len())
}

#[derive(Clone)]
enum Source {
    Literal(&'static Literal),
    Prepared(Rc<Template>),
}

/// One evaluation of a literal: where it came from plus its values.
#[derive(Clone)]
pub struct TemplateResult {
    source: Source,
    values: Vec<Value>,
}

impl TemplateResult {
    pub fn new(literal: &'static Literal, values: Vec<Value>) -> Self {
        Self { source: Source::Literal(literal), values }
    }

    /// A result for an already prepared template.
    pub fn from_template(template: Rc<Template>, values: Vec<Value>) -> Self {
        Self { source: Source::Prepared(template), values }
    }

    /// Resolve the shared template, checking the values fit its slots.
    pub fn template(&self) -> Result<Rc<Template>, TemplateError> {
        let template = match &self.source {
            Source::Literal(literal) => template_for(literal)?,
            Source::Prepared(template) => template.clone(),
        };
        if template.value_count() != self.values.len() {
            return Err(TemplateError::ValueCount {
                expected: template.value_count(),
                actual: self.values.len(),
            });
        }
        Ok(template)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl fmt::Debug for TemplateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            Source::Literal(literal) => literal.source().to_string(),
            Source::Prepared(template) => template.markup().to_string(),
        };
        f.debug_struct("TemplateResult")
            .field("source", &source)
            .field("values", &self.values)
            .finish()
    }
}
