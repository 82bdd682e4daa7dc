use anyhow::{Context, Result};
use lite_dom::Document;
use lite_html::{BindingKind, Literal, Template, TemplateResult, Value, render, rendered_part};
use std::fs;
use std::path::Path;

/// Tokenize and prepare a template file, listing its bindings.
pub fn tokenize_cmd(input: &Path) -> Result<String> {
    let literal = read_literal(input)?;
    let template = Template::build(literal.strings())
        .with_context(|| format!("failed to prepare {}", input.display()))?;

    let mut out = String::new();
    out.push_str(template.markup());
    out.push('\n');
    for (i, binding) in template.bindings().iter().enumerate() {
        out.push_str(&format!("{i}: {} at {:?}\n", describe(&binding.kind), binding.path.as_slice()));
    }
    out.push_str(&format!("{} value slot(s)\n", template.value_count()));
    Ok(out)
}

/// Render a template file with string values into a fresh document and
/// return the resulting markup. The sentinel comments that delimit node
/// parts are dropped unless `markers` is set; comments written in the
/// template are kept.
pub fn render_cmd(input: &Path, values: &[String], markers: bool) -> Result<String> {
    let literal = read_literal(input)?;
    let result = TemplateResult::new(literal, values.iter().cloned().map(Value::from).collect());

    let doc = Document::new();
    let root = doc.create_fragment();
    render(result, &doc, root).with_context(|| format!("failed to render {}", input.display()))?;
    log::debug!("rendered {} with {} value(s)", input.display(), values.len());

    if !markers {
        let part = rendered_part(&doc, root).context("nothing was rendered")?;
        for sentinel in part.sentinels() {
            doc.remove(sentinel);
        }
    }
    Ok(doc.inner_markup(root))
}

// The process renders a single file, so the literal lives for the rest of it.
fn read_literal(input: &Path) -> Result<&'static Literal> {
    let src = fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))?;
    let src: &'static str = Box::leak(src.into_boxed_str());
    Ok(Box::leak(Box::new(Literal::new(src))))
}

fn describe(kind: &BindingKind) -> String {
    match kind {
        BindingKind::Node => "node".to_string(),
        BindingKind::Attribute { name, segments } => format!("attribute {name} {segments:?}"),
        BindingKind::Comment { segments } => format!("comment {segments:?}"),
        BindingKind::RawText { segments } => format!("raw text {segments:?}"),
    }
}
