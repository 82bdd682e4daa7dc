//! Built-in directives.

use lite_core::Promise;

use crate::part::Part;
use crate::template::{Template, TemplateResult};
use crate::value::{directive, Value};

/// Show `default` until `promise` resolves, then its value.
///
/// An already resolved promise renders its value straight away. Rendering
/// something else into the part before resolution drops the promise.
pub fn until(promise: Promise<Value>, default: impl Into<Value>) -> Value {
    let default = default.into();
    directive(move |part: &Part| {
        if let Some(value) = promise.value() {
            return part.set_value(value);
        }
        part.set_value(default.clone())?;
        // A node part commits the default before it starts watching; slot
        // parts are committed together with the rest of their instance.
        if let Part::Node(_) = part {
            part.commit()?;
        }
        part.watch(promise.clone());
        Ok(())
    })
}

/// Render `markup` as markup instead of text. Nothing is escaped, so the
/// markup must come from a trusted source.
///
/// Parsed templates are shared per distinct markup string.
pub fn unsafe_html(markup: impl Into<String>) -> Value {
    let markup = markup.into();
    directive(move |part: &Part| {
        let template = Template::from_markup(&markup)?;
        part.set_value(Value::Template(TemplateResult::from_template(template, Vec::new())))
    })
}

