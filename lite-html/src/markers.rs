//! Sentinel tokens that tag dynamic positions in generated markup.
//!
//! One random token is drawn per process; every marker embeds it, so a
//! marker can never collide with text a template author wrote.

use once_cell::sync::Lazy;
use ulid::Ulid;

#[derive(Debug)]
pub struct Markers {
    /// The shared random token.
    pub token: String,
    /// Comment data marking a node position.
    pub node: String,
    /// Comment data marking a bound comment.
    pub comment: String,
    /// Attribute value marking a bound attribute.
    pub attribute: String,
    /// Text content marking bound raw text.
    pub raw_text: String,
}

static MARKERS: Lazy<Markers> = Lazy::new(|| {
    let token = Ulid::new().to_string().to_lowercase();
    Markers {
        node: format!("node-{token}"),
        comment: format!("comment-{token}"),
        attribute: format!("attribute-{token}"),
        raw_text: format!("rawtext-{token}"),
        token,
    }
});

pub fn markers() -> &'static Markers {
    &MARKERS
}

impl Markers {
    /// The node marker as it appears in markup.
    pub fn node_tag(&self) -> String {
        format!("<!--{}-->", self.node)
    }

    pub fn comment_tag(&self) -> String {
        format!("<!--{}-->", self.comment)
    }
}
