//! Template rendering with incremental updates.
//!
//! [`html!`] turns a literal with `{}` holes into a [`TemplateResult`];
//! [`render`] puts it into a container of a [`lite_dom::Document`]. The
//! literal is tokenized and parsed once per call site. Rendering the same
//! call site again only writes the values that changed.
//!
//! ```ignore
//! let doc = Document::new();
//! let root = doc.create_element("main");
//! for n in 1..=3 {
//!     render(html!("<p>{}</p>", n), &doc, root)?;
//! }
//! ```

pub mod directives;
pub mod error;
pub mod instance;
pub mod literal;
pub mod markers;
pub mod part;
pub mod render;
pub mod template;
pub mod tokenizer;
pub mod value;

pub use directives::{unsafe_html, until};
pub use error::TemplateError;
pub use instance::TemplateInstance;
pub use literal::Literal;
pub use part::{AttributeBehavior, NodePart, Part, SlotPart};
pub use render::{render, rendered_part};
pub use template::{template_for, BindingDescriptor, Template, TemplateResult};
pub use tokenizer::{tokenize, BindingKind, Tokenized};
pub use value::{directive, Directive, Value};

/// Build a [`TemplateResult`] from a literal and its values.
///
/// Every expansion owns one `static` [`Literal`], which is what makes two
/// evaluations of the same call site share a template.
#[macro_export]
macro_rules! html {
    ($source:literal $(, $value:expr)* $(,)?) => {{
        static LITERAL: $crate::Literal = $crate::Literal::new($source);
        $crate::TemplateResult::new(&LITERAL, ::std::vec![$($crate::Value::from($value)),*])
    }};
}
