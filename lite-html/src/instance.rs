use std::fmt;
use std::rc::Rc;

use lite_dom::{Document, NodeId};

use crate::error::TemplateError;
use crate::part::{AttributeBehavior, Committer, CommitterKind, NodePart, Part};
use crate::template::Template;
use crate::tokenizer::BindingKind;
use crate::value::Value;

/// A clone of a template's prototype living in a target document, with a
/// part bound to every value slot.
///
/// While the instance is not shown its nodes are kept in [`fragment`](Self::fragment).
pub struct TemplateInstance {
    template: Rc<Template>,
    fragment: NodeId,
    parts: Vec<Part>,
}

impl fmt::Debug for TemplateInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateInstance")
            .field("fragment", &self.fragment)
            .field("parts", &self.parts.len())
            .finish()
    }
}

impl TemplateInstance {
    pub fn new(template: Rc<Template>, doc: &Document) -> Result<Self, TemplateError> {
        let (prototype, root) = template.prototype();
        let fragment = doc.import_node(prototype, root, true);

        // Resolve every anchor before any part exists.
        let anchors = template
            .bindings()
            .iter()
            .enumerate()
            .map(|(index, binding)| {
                doc.node_at_path(fragment, &binding.path)
                    .ok_or(TemplateError::MissingMarker { index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let weak = doc.downgrade();
        let mut parts = Vec::with_capacity(template.value_count());
        for (index, (binding, node)) in template.bindings().iter().zip(anchors).enumerate() {
            match &binding.kind {
                BindingKind::Node => {
                    let end = doc
                        .next_sibling(node)
                        .ok_or(TemplateError::MissingMarker { index })?;
                    parts.push(Part::Node(NodePart::new(weak.clone(), node, end)));
                }
                BindingKind::Attribute { name, segments } => {
                    let (behavior, name) = AttributeBehavior::parse(name);
                    let kind = CommitterKind::Attribute { name: name.to_string(), behavior };
                    parts.extend(Committer::parts(weak.clone(), node, kind, segments.clone()));
                }
                BindingKind::Comment { segments } => {
                    parts.extend(Committer::parts(weak.clone(), node, CommitterKind::Comment, segments.clone()));
                }
                BindingKind::RawText { segments } => {
                    parts.extend(Committer::parts(weak.clone(), node, CommitterKind::RawText, segments.clone()));
                }
            }
        }
        Ok(Self { template, fragment, parts })
    }

    pub fn template(&self) -> &Rc<Template> {
        &self.template
    }

    /// Where the instance's nodes live while it is not shown.
    pub fn fragment(&self) -> NodeId {
        self.fragment
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Set every value first, then commit every part in document order.
    pub fn update(&self, values: Vec<Value>) -> Result<(), TemplateError> {
        if values.len() != self.parts.len() {
            return Err(TemplateError::ValueCount { expected: self.parts.len(), actual: values.len() });
        }
        for (part, value) in self.parts.iter().zip(values) {
            part.set_value(value)?;
        }
        for part in &self.parts {
            part.commit()?;
        }
        Ok(())
    }
}
