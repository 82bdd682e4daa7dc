use std::rc::Rc;

use lite_dom::{Document, NodeId};
use tracing::debug;

use crate::error::TemplateError;
use crate::part::NodePart;
use crate::template::TemplateResult;
use crate::value::Value;

/// Render `result` into `container`.
///
/// The first render into a container replaces its children with a pair of
/// sentinels owned by a root part. Later renders reuse that part, so
/// rendering the same call site again only writes what changed, and a
/// different call site swaps the content wholesale.
pub fn render(result: TemplateResult, doc: &Document, container: NodeId) -> Result<(), TemplateError> {
    let part = root_part(doc, container);
    part.set_value(Value::Template(result));
    part.commit()
}

/// The root part of `container`, if something was rendered into it.
pub fn rendered_part(doc: &Document, container: NodeId) -> Option<Rc<NodePart>> {
    doc.node_data(container)?.downcast::<NodePart>().ok()
}

fn root_part(doc: &Document, container: NodeId) -> Rc<NodePart> {
    if let Some(part) = rendered_part(doc, container) {
        return part;
    }
    for child in doc.children(container) {
        doc.remove(child);
    }
    let start = doc.create_comment("");
    let end = doc.create_comment("");
    doc.append_child(container, start);
    doc.append_child(container, end);

    let part = Rc::new(NodePart::new(doc.downgrade(), start, end));
    doc.set_node_data(container, part.clone());
    debug!(?container, "created render root");
    part
}
