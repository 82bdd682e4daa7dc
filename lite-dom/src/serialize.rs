use crate::parse::{is_raw_text_element, is_void_element};
use crate::{Document, NodeId, NodeType};

impl Document {
    /// Markup for `id` and its subtree. A fragment serializes its children.
    pub fn to_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, false, &mut out);
        out
    }

    /// Markup for the children of `id`.
    pub fn inner_markup(&self, id: NodeId) -> String {
        let raw = self.tag_name(id).is_some_and(|t| is_raw_text_element(&t));
        let mut out = String::new();
        for child in self.children(id) {
            self.write_node(child, raw, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, raw: bool, out: &mut String) {
        match self.node_type(id) {
            NodeType::Text => {
                let data = self.data(id).unwrap_or_default();
                if raw {
                    out.push_str(&data);
                } else {
                    out.push_str(&escape_text(&data));
                }
            }
            NodeType::Comment => {
                out.push_str("<!--");
                out.push_str(&self.data(id).unwrap_or_default());
                out.push_str("-->");
            }
            NodeType::Fragment => out.push_str(&self.inner_markup(id)),
            NodeType::Element => {
                let tag = self.tag_name(id).unwrap_or_default();
                out.push('<');
                out.push_str(&tag);
                for (name, value) in self.attributes(id) {
                    out.push(' ');
                    out.push_str(&name);
                    if !value.is_empty() {
                        out.push_str("=\"");
                        out.push_str(&escape_attr(&value));
                        out.push('"');
                    }
                }
                out.push('>');
                if is_void_element(&tag) {
                    return;
                }
                out.push_str(&self.inner_markup(id));
                out.push_str("</");
                out.push_str(&tag);
                out.push('>');
            }
        }
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}
