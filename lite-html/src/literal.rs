use once_cell::sync::OnceCell;

/// The static text of one template call site.
///
/// `html!` creates exactly one `static Literal` per call site. The address of
/// that static is the identity the template cache is keyed on, so two call
/// sites with the same text still get separate templates.
///
/// Holes are written `{}`. `{{` and `}}` stand for literal braces; any other
/// brace is kept as written.
#[derive(Debug)]
pub struct Literal {
    source: &'static str,
    strings: OnceCell<Vec<String>>,
}

impl Literal {
    pub const fn new(source: &'static str) -> Self {
        Self { source, strings: OnceCell::new() }
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    /// Static fragments around the holes. Always one more than
    /// [`hole_count`](Self::hole_count).
    pub fn strings(&self) -> &[String] {
        self.strings.get_or_init(|| split_holes(self.source))
    }

    pub fn hole_count(&self) -> usize {
        self.strings().len() - 1
    }

    pub(crate) fn key(&'static self) -> usize {
        self as *const Literal as usize
    }
}

fn split_holes(source: &str) -> Vec<String> {
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('{', Some('{')) | ('}', Some('}')) => {
                chars.next();
                current.push(c);
            }
            ('{', Some('}')) => {
                chars.next();
                strings.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    strings.push(current);
    strings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_holes() {
        assert_eq!(split_holes("<p>{}</p>"), vec!["<p>", "</p>"]);
        assert_eq!(split_holes("{}{}"), vec!["", "", ""]);
        assert_eq!(split_holes("none"), vec!["none"]);
    }

    #[test]
    fn doubled_braces_escape() {
        assert_eq!(split_holes("a {{b}} {}"), vec!["a {b} ", ""]);
        assert_eq!(split_holes("p { color: red }"), vec!["p { color: red }"]);
    }

    #[test]
    fn strings_are_split_once() {
        static LITERAL: Literal = Literal::new("a{}b");
        assert_eq!(LITERAL.hole_count(), 1);
        assert!(std::ptr::eq(LITERAL.strings(), LITERAL.strings()));
    }
}
