use crate::{Document, NodeId, NodeType};

/// Elements whose content is raw text: no tags or comments inside, closed
/// only by the literal end tag.
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag.to_ascii_lowercase().as_str(),
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

impl Document {
    /// Parse `markup` into a new detached fragment and return it.
    ///
    /// Minimal hand-rolled HTML-ish parser with support for:
    /// - nested elements, void elements and self-closing tags (`<input/>`)
    /// - quoted, unquoted and boolean attributes; names may carry prefixes
    ///   such as `.`, `?` or `@`
    /// - comments, and raw text inside `<script>` and `<style>`
    /// - `&lt;` `&gt;` `&amp;` `&quot;` `&#39;` and decimal references
    ///
    /// Whitespace is kept as written. Unclosed tags are closed at the end of
    /// input; stray end tags are ignored.
    pub fn parse_fragment(&self, markup: &str) -> NodeId {
        let fragment = self.create_fragment();
        let mut parser = Parser { doc: self, input: markup, i: 0, stack: vec![fragment] };
        parser.run();
        fragment
    }
}

struct Parser<'a> {
    doc: &'a Document,
    input: &'a str,
    i: usize,
    stack: Vec<NodeId>,
}

impl Parser<'_> {
    fn bytes(&self) -> &[u8] {
        self.input.as_bytes()
    }

    fn rest(&self) -> &str {
        &self.input[self.i..]
    }

    fn current(&self) -> NodeId {
        // The fragment is never popped.
        self.stack[self.stack.len() - 1]
    }

    fn run(&mut self) {
        while self.i < self.input.len() {
            if self.rest().starts_with("<!--") {
                self.comment();
            } else if self.rest().starts_with("</") && self.peek_is_name_start(2) {
                self.end_tag();
            } else if self.rest().starts_with('<') && self.peek_is_name_start(1) {
                self.start_tag();
            } else {
                self.text();
            }
        }
    }

    fn peek_is_name_start(&self, offset: usize) -> bool {
        self.bytes()
            .get(self.i + offset)
            .is_some_and(|b| b.is_ascii_alphabetic())
    }

    fn comment(&mut self) {
        let body = self.i + 4;
        // `<!-->` is an empty comment
        if self.input[body..].starts_with('>') {
            self.append(self.doc.create_comment(""));
            self.i = body + 1;
            return;
        }
        let (data, next) = match self.input[body..].find("-->") {
            Some(end) => (&self.input[body..body + end], body + end + 3),
            None => (&self.input[body..], self.input.len()),
        };
        self.append(self.doc.create_comment(data));
        self.i = next;
    }

    fn end_tag(&mut self) {
        self.i += 2;
        let tag = self.read_name();
        self.skip_past('>');
        let open = self.stack.iter().rposition(|id| {
            self.doc
                .tag_name(*id)
                .is_some_and(|t| t.eq_ignore_ascii_case(&tag))
        });
        if let Some(pos) = open {
            // pop until matching tag
            if pos > 0 {
                self.stack.truncate(pos);
            }
        }
    }

    fn start_tag(&mut self) {
        self.i += 1;
        let tag = self.read_name();
        let element = self.doc.create_element(tag.clone());
        let mut self_closing = false;

        loop {
            self.skip_ws();
            let Some(&b) = self.bytes().get(self.i) else { break };
            match b {
                b'>' => {
                    self.i += 1;
                    break;
                }
                b'/' if self.bytes().get(self.i + 1) == Some(&b'>') => {
                    self_closing = true;
                    self.i += 2;
                    break;
                }
                b'/' => self.i += 1,
                _ => self.attribute(element),
            }
        }

        self.append(element);
        if self_closing || is_void_element(&tag) {
            return;
        }
        if is_raw_text_element(&tag) {
            self.raw_text(element, &tag);
        } else {
            self.stack.push(element);
        }
    }

    fn raw_text(&mut self, element: NodeId, tag: &str) {
        let close = format!("</{}", tag.to_ascii_lowercase());
        let lower = self.rest().to_ascii_lowercase();
        let end = lower.find(&close).map(|p| self.i + p).unwrap_or(self.input.len());
        let content = &self.input[self.i..end];
        if !content.is_empty() {
            let node = self.doc.create_text(content);
            self.doc.append_child(element, node);
        }
        self.i = end;
        if self.i < self.input.len() {
            self.skip_past('>');
        }
    }

    fn attribute(&mut self, element: NodeId) {
        let start = self.i;
        while let Some(&b) = self.bytes().get(self.i) {
            if b.is_ascii_whitespace() || matches!(b, b'=' | b'>' | b'/' | b'"' | b'\'') {
                break;
            }
            self.i += 1;
        }
        if self.i == start {
            // skip unknown token
            self.i += 1;
            return;
        }
        let name = self.input[start..self.i].to_string();

        self.skip_ws();
        let mut value = String::new();
        if self.bytes().get(self.i) == Some(&b'=') {
            self.i += 1;
            self.skip_ws();
            value = decode_entities(&self.read_value());
        }
        // First occurrence wins, as in HTML
        if !self.doc.has_attribute(element, &name) {
            self.doc.set_attribute(element, &name, value);
        }
    }

    fn read_value(&mut self) -> String {
        match self.bytes().get(self.i) {
            Some(&q) if q == b'"' || q == b'\'' => {
                self.i += 1;
                let start = self.i;
                while self.i < self.input.len() && self.bytes()[self.i] != q {
                    self.i += 1;
                }
                let value = self.input[start..self.i].to_string();
                if self.i < self.input.len() {
                    self.i += 1;
                } // consume closing quote
                value
            }
            _ => {
                let start = self.i;
                while let Some(&b) = self.bytes().get(self.i) {
                    if b.is_ascii_whitespace() || b == b'>' {
                        break;
                    }
                    self.i += 1;
                }
                self.input[start..self.i].to_string()
            }
        }
    }

    fn text(&mut self) {
        // A '<' that does not open a tag or comment is ordinary text.
        let start = self.i;
        let first = self.rest().chars().next().map_or(1, char::len_utf8);
        self.i += first;
        let len = self.rest().find('<').unwrap_or(self.rest().len());
        self.i += len;
        let text = decode_entities(&self.input[start..self.i]);

        // Merge with a preceding text node so text is never split.
        let parent = self.current();
        if let Some(last) = self.doc.last_child(parent) {
            if self.doc.node_type(last) == NodeType::Text {
                let merged = self.doc.data(last).unwrap_or_default() + &text;
                self.doc.set_data(last, merged);
                return;
            }
        }
        self.append(self.doc.create_text(text));
    }

    fn append(&mut self, node: NodeId) {
        self.doc.append_child(self.current(), node);
    }

    fn read_name(&mut self) -> String {
        let start = self.i;
        while let Some(&b) = self.bytes().get(self.i) {
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b':' {
                self.i += 1;
            } else {
                break;
            }
        }
        self.input[start..self.i].to_string()
    }

    fn skip_ws(&mut self) {
        while self.bytes().get(self.i).is_some_and(|b| b.is_ascii_whitespace()) {
            self.i += 1;
        }
    }

    fn skip_past(&mut self, b: char) {
        match self.rest().find(b) {
            Some(p) => self.i += p + 1,
            None => self.i = self.input.len(),
        }
    }
}

/// Decode the basic character references. Unknown references are kept.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').and_then(|semi| {
            let name = &rest[1..semi];
            let ch = match name {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => name
                    .strip_prefix('#')
                    .and_then(|n| n.parse::<u32>().ok())
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, semi + 1))
        });
        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
