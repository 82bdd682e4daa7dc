//! Context-tracking tokenizer.
//!
//! Walks the static fragments of a literal and decides, at every hole, what
//! kind of position the hole sits in. The result is markup with markers in
//! place of the holes plus the ordered list of bindings.
//!
//! Contexts follow what [`Document::parse_fragment`](lite_dom::Document::parse_fragment)
//! will later do with the markup, so every marker emitted here lands where
//! template preparation expects it.

use std::mem;

use lite_dom::parse::is_raw_text_element;

use crate::error::TemplateError;
use crate::markers::markers;

/// What a hole (or group of holes) binds to, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingKind {
    /// A child position.
    Node,
    /// An attribute value. `segments` is the static text around the holes.
    Attribute { name: String, segments: Vec<String> },
    Comment { segments: Vec<String> },
    /// The content of a `script` or `style` element.
    RawText { segments: Vec<String> },
}

impl BindingKind {
    /// Number of values this binding consumes.
    pub fn value_slots(&self) -> usize {
        match self {
            BindingKind::Node => 1,
            BindingKind::Attribute { segments, .. }
            | BindingKind::Comment { segments }
            | BindingKind::RawText { segments } => segments.len().saturating_sub(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokenized {
    pub markup: String,
    pub bindings: Vec<BindingKind>,
}

/// Tokenize the static fragments of a literal. A hole sits between every
/// pair of consecutive fragments.
pub fn tokenize<S: AsRef<str>>(strings: &[S]) -> Result<Tokenized, TemplateError> {
    let mut tokenizer = Tokenizer::default();
    let last = strings.len().saturating_sub(1);
    for (i, s) in strings.iter().enumerate() {
        tokenizer.feed(s.as_ref())?;
        if i < last {
            tokenizer.hole()?;
        }
    }
    tokenizer.finish()
}

#[derive(Default)]
struct Tokenizer {
    out: String,
    bindings: Vec<BindingKind>,
    context: Context,
}

#[derive(Default)]
enum Context {
    #[default]
    Text,
    Tag(Tag),
    Comment(Buffered),
    RawText { tag: String, body: Buffered },
}

#[derive(Default)]
struct Buffered {
    raw: String,
    text: String,
    segments: Vec<String>,
}

impl Buffered {
    fn is_bound(&self) -> bool {
        !self.segments.is_empty()
    }

    fn push(&mut self, c: char) {
        self.raw.push(c);
        self.text.push(c);
    }

    fn split(&mut self) {
        let segment = mem::take(&mut self.text);
        self.segments.push(segment);
    }

    fn into_segments(mut self) -> Vec<String> {
        self.split();
        self.segments
    }
}

struct Tag {
    name: String,
    closing: bool,
    state: TagState,
    attr: Option<Attr>,
    // every attribute closed so far, and whether it was bound
    seen: Vec<(String, bool)>,
    bound: bool,
    quoted_gt: bool,
    self_closing: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum TagState {
    Name,
    BeforeAttrName,
    AttrName,
    AfterAttrName,
    BeforeAttrValue,
    Quoted(char),
    Unquoted,
}

struct Attr {
    name: String,
    raw: String,
    value: Buffered,
}

impl Tag {
    fn new(closing: bool) -> Self {
        Self {
            name: String::new(),
            closing,
            state: TagState::Name,
            attr: None,
            seen: Vec::new(),
            bound: false,
            quoted_gt: false,
            self_closing: false,
        }
    }

    fn push_raw(&mut self, c: char) {
        if let Some(attr) = self.attr.as_mut() {
            attr.raw.push(c);
        }
    }

    fn push_value(&mut self, c: char) {
        if let Some(attr) = self.attr.as_mut() {
            attr.raw.push(c);
            attr.value.text.push(c);
        }
    }

    fn check_tag_end(&self) -> Result<(), TemplateError> {
        if self.bound && self.quoted_gt {
            return Err(TemplateError::AmbiguousTagEnd { tag: self.name.clone() });
        }
        Ok(())
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':')
}

fn starts_with_ignore_case(haystack: &str, needle: &str) -> bool {
    let (h, n) = (haystack.as_bytes(), needle.as_bytes());
    h.len() >= n.len() && h[..n.len()].eq_ignore_ascii_case(n)
}

impl Tokenizer {
    fn feed(&mut self, s: &str) -> Result<(), TemplateError> {
        let mut i = 0;
        while i < s.len() {
            i += self.step(&s[i..])?;
        }
        Ok(())
    }

    /// Consume a prefix of `rest` in the current context. Returns the bytes
    /// consumed; zero means the context changed and the same input must be
    /// looked at again.
    fn step(&mut self, rest: &str) -> Result<usize, TemplateError> {
        match mem::take(&mut self.context) {
            Context::Text => Ok(self.text(rest)),
            Context::Tag(tag) => self.tag(tag, rest),
            Context::Comment(body) => Ok(self.comment(body, rest)),
            Context::RawText { tag, body } => Ok(self.raw_text(tag, body, rest)),
        }
    }

    fn text(&mut self, rest: &str) -> usize {
        if rest.starts_with("<!-->") {
            self.out.push_str("<!-->");
            return 5;
        }
        if rest.starts_with("<!--") {
            self.context = Context::Comment(Buffered { raw: "<!--".into(), ..Default::default() });
            return 4;
        }
        let alpha_at = |i: usize| rest[i..].starts_with(|c: char| c.is_ascii_alphabetic());
        if rest.starts_with("</") && alpha_at(2) {
            self.out.push_str("</");
            self.context = Context::Tag(Tag::new(true));
            return 2;
        }
        if rest.starts_with('<') && alpha_at(1) {
            self.out.push('<');
            self.context = Context::Tag(Tag::new(false));
            return 1;
        }
        let Some(c) = rest.chars().next() else { return 0 };
        self.out.push(c);
        c.len_utf8()
    }

    fn tag(&mut self, mut tag: Tag, rest: &str) -> Result<usize, TemplateError> {
        let Some(c) = rest.chars().next() else {
            self.context = Context::Tag(tag);
            return Ok(0);
        };
        let len = c.len_utf8();

        let mut consumed = len;
        match tag.state {
            TagState::Name if is_name_char(c) => {
                tag.name.push(c);
                self.out.push(c);
            }
            TagState::Name => {
                tag.state = TagState::BeforeAttrName;
                consumed = 0;
            }
            // end tags carry nothing after the name
            _ if tag.closing => {
                if c == '>' {
                    self.close_tag(tag);
                    return Ok(len);
                }
                self.out.push(c);
            }
            TagState::BeforeAttrName => match c {
                '>' => {
                    self.close_tag(tag);
                    return Ok(len);
                }
                '/' => {
                    tag.self_closing = rest[1..].starts_with('>');
                    self.out.push(c);
                }
                '=' | '"' | '\'' => self.out.push(c),
                c if c.is_ascii_whitespace() => self.out.push(c),
                c => {
                    tag.attr = Some(Attr {
                        name: c.to_string(),
                        raw: c.to_string(),
                        value: Buffered::default(),
                    });
                    tag.state = TagState::AttrName;
                }
            },
            TagState::AttrName => match c {
                '=' => {
                    tag.push_raw(c);
                    tag.state = TagState::BeforeAttrValue;
                }
                '>' => {
                    self.finish_attr(&mut tag)?;
                    self.close_tag(tag);
                    return Ok(len);
                }
                c if c.is_ascii_whitespace() => {
                    tag.push_raw(c);
                    tag.state = TagState::AfterAttrName;
                }
                '/' | '"' | '\'' => {
                    self.finish_attr(&mut tag)?;
                    tag.state = TagState::BeforeAttrName;
                    consumed = 0;
                }
                c => {
                    if let Some(attr) = tag.attr.as_mut() {
                        attr.name.push(c);
                        attr.raw.push(c);
                    }
                }
            },
            TagState::AfterAttrName => match c {
                '=' => {
                    tag.push_raw(c);
                    tag.state = TagState::BeforeAttrValue;
                }
                c if c.is_ascii_whitespace() => tag.push_raw(c),
                _ => {
                    self.finish_attr(&mut tag)?;
                    tag.state = TagState::BeforeAttrName;
                    consumed = 0;
                }
            },
            TagState::BeforeAttrValue => match c {
                '"' | '\'' => {
                    tag.push_raw(c);
                    tag.state = TagState::Quoted(c);
                }
                '>' => {
                    self.finish_attr(&mut tag)?;
                    self.close_tag(tag);
                    return Ok(len);
                }
                c if c.is_ascii_whitespace() => tag.push_raw(c),
                c => {
                    tag.push_value(c);
                    tag.state = TagState::Unquoted;
                }
            },
            TagState::Quoted(q) => {
                if c == q {
                    tag.push_raw(c);
                    self.finish_attr(&mut tag)?;
                    tag.state = TagState::BeforeAttrName;
                } else {
                    if c == '>' {
                        tag.quoted_gt = true;
                        tag.check_tag_end()?;
                    }
                    tag.push_value(c);
                }
            }
            TagState::Unquoted => match c {
                '>' => {
                    self.finish_attr(&mut tag)?;
                    self.close_tag(tag);
                    return Ok(len);
                }
                c if c.is_ascii_whitespace() => {
                    self.finish_attr(&mut tag)?;
                    tag.state = TagState::BeforeAttrName;
                    consumed = 0;
                }
                c => tag.push_value(c),
            },
        }
        self.context = Context::Tag(tag);
        Ok(consumed)
    }

    /// Write out the attribute being read: as written when static, as
    /// `name="marker"` when it holds a hole.
    fn finish_attr(&mut self, tag: &mut Tag) -> Result<(), TemplateError> {
        let Some(attr) = tag.attr.take() else { return Ok(()) };
        let bound = attr.value.is_bound();
        if tag.seen.iter().any(|(name, other)| *name == attr.name && (bound || *other)) {
            return Err(TemplateError::DuplicateAttribute { tag: tag.name.clone(), name: attr.name });
        }
        tag.seen.push((attr.name.clone(), bound));

        if bound {
            self.out.push_str(&format!("{}=\"{}\"", attr.name, markers().attribute));
            self.bindings.push(BindingKind::Attribute {
                name: attr.name,
                segments: attr.value.into_segments(),
            });
        } else {
            self.out.push_str(&attr.raw);
        }
        Ok(())
    }

    fn close_tag(&mut self, tag: Tag) {
        self.out.push('>');
        self.context = if !tag.closing && !tag.self_closing && is_raw_text_element(&tag.name) {
            Context::RawText { tag: tag.name, body: Buffered::default() }
        } else {
            Context::Text
        };
    }

    fn comment(&mut self, mut body: Buffered, rest: &str) -> usize {
        if rest.starts_with("-->") {
            if body.is_bound() {
                self.out.push_str(&markers().comment_tag());
                self.bindings.push(BindingKind::Comment { segments: body.into_segments() });
            } else {
                self.out.push_str(&body.raw);
                self.out.push_str("-->");
            }
            return 3;
        }
        let Some(c) = rest.chars().next() else {
            self.context = Context::Comment(body);
            return 0;
        };
        body.push(c);
        self.context = Context::Comment(body);
        c.len_utf8()
    }

    fn raw_text(&mut self, tag: String, mut body: Buffered, rest: &str) -> usize {
        if starts_with_ignore_case(rest, &format!("</{tag}")) {
            self.flush_raw_text(body);
            // the end tag itself is read as text context
            return 0;
        }
        let Some(c) = rest.chars().next() else {
            self.context = Context::RawText { tag, body };
            return 0;
        };
        body.push(c);
        self.context = Context::RawText { tag, body };
        c.len_utf8()
    }

    fn flush_raw_text(&mut self, body: Buffered) {
        if body.is_bound() {
            self.out.push_str(&markers().raw_text);
            self.bindings.push(BindingKind::RawText { segments: body.into_segments() });
        } else {
            self.out.push_str(&body.raw);
        }
    }

    fn hole(&mut self) -> Result<(), TemplateError> {
        match &mut self.context {
            Context::Text => {
                self.out.push_str(&markers().node_tag());
                self.bindings.push(BindingKind::Node);
            }
            Context::Comment(body) | Context::RawText { body, .. } => body.split(),
            Context::Tag(tag) => {
                if tag.closing || tag.state == TagState::Name {
                    return Err(TemplateError::TagNameBinding { tag: tag.name.clone() });
                }
                match tag.state {
                    TagState::BeforeAttrValue | TagState::Quoted(_) | TagState::Unquoted => {
                        if tag.state == TagState::BeforeAttrValue {
                            tag.state = TagState::Unquoted;
                        }
                        if let Some(attr) = tag.attr.as_mut() {
                            attr.value.split();
                        }
                        tag.bound = true;
                        tag.check_tag_end()?;
                    }
                    _ => return Err(TemplateError::AttributeNameBinding { tag: tag.name.clone() }),
                }
            }
        }
        Ok(())
    }

    /// Close whatever the last fragment left open and return the result.
    fn finish(mut self) -> Result<Tokenized, TemplateError> {
        match mem::take(&mut self.context) {
            Context::Text => {}
            Context::Tag(mut tag) => {
                self.finish_attr(&mut tag)?;
                self.close_tag(tag);
            }
            Context::Comment(body) => {
                self.comment(body, "-->");
            }
            Context::RawText { body, .. } => self.flush_raw_text(body),
        }
        Ok(Tokenized { markup: self.out, bindings: self.bindings })
    }
}
