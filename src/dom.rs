//! HTML reader – converts an HTML string into a simple DOM tree.
//!
//! The reader is lenient: it accepts the constrained subset used by report
//! templates, never fails, and keeps unknown elements so that their content
//! still renders.
//!
//! - Structural: html, head, body, div, p, h1-h4, ul, ol, li, hr
//! - Tables: table, thead, tbody, tfoot, tr, th, td
//! - Inline: span, b, strong, i, em, u, s, strike, br, img
//! - Raw text: style, script, title

use std::collections::HashMap;

// ---------------------------------------------------------------------------
// DOM types
// ---------------------------------------------------------------------------

/// The tag name of a supported element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    Html,
    Head,
    Body,
    Style,
    Script,
    Title,
    Div,
    P,
    H1,
    H2,
    H3,
    H4,
    Ul,
    Ol,
    Li,
    Hr,
    Table,
    THead,
    TBody,
    TFoot,
    Tr,
    Th,
    Td,
    Span,
    B,
    Strong,
    I,
    Em,
    U,
    S,
    Strike,
    Br,
    Img,
    Meta,
    Link,
    /// Unknown tags are kept and rendered as plain blocks.
    Unknown(String),
}

impl Tag {
    pub fn from_name(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "html" => Tag::Html,
            "head" => Tag::Head,
            "body" => Tag::Body,
            "style" => Tag::Style,
            "script" => Tag::Script,
            "title" => Tag::Title,
            "div" => Tag::Div,
            "p" => Tag::P,
            "h1" => Tag::H1,
            "h2" => Tag::H2,
            "h3" => Tag::H3,
            "h4" | "h5" | "h6" => Tag::H4,
            "ul" => Tag::Ul,
            "ol" => Tag::Ol,
            "li" => Tag::Li,
            "hr" => Tag::Hr,
            "table" => Tag::Table,
            "thead" => Tag::THead,
            "tbody" => Tag::TBody,
            "tfoot" => Tag::TFoot,
            "tr" => Tag::Tr,
            "th" => Tag::Th,
            "td" => Tag::Td,
            "span" => Tag::Span,
            "b" => Tag::B,
            "strong" => Tag::Strong,
            "i" => Tag::I,
            "em" => Tag::Em,
            "u" => Tag::U,
            "s" => Tag::S,
            "strike" | "del" => Tag::Strike,
            "br" => Tag::Br,
            "img" => Tag::Img,
            "meta" => Tag::Meta,
            "link" => Tag::Link,
            other => Tag::Unknown(other.to_string()),
        }
    }

    /// Lowercase name used by stylesheet selectors.
    pub fn name(&self) -> &str {
        match self {
            Tag::Html => "html",
            Tag::Head => "head",
            Tag::Body => "body",
            Tag::Style => "style",
            Tag::Script => "script",
            Tag::Title => "title",
            Tag::Div => "div",
            Tag::P => "p",
            Tag::H1 => "h1",
            Tag::H2 => "h2",
            Tag::H3 => "h3",
            Tag::H4 => "h4",
            Tag::Ul => "ul",
            Tag::Ol => "ol",
            Tag::Li => "li",
            Tag::Hr => "hr",
            Tag::Table => "table",
            Tag::THead => "thead",
            Tag::TBody => "tbody",
            Tag::TFoot => "tfoot",
            Tag::Tr => "tr",
            Tag::Th => "th",
            Tag::Td => "td",
            Tag::Span => "span",
            Tag::B => "b",
            Tag::Strong => "strong",
            Tag::I => "i",
            Tag::Em => "em",
            Tag::U => "u",
            Tag::S => "s",
            Tag::Strike => "strike",
            Tag::Br => "br",
            Tag::Img => "img",
            Tag::Meta => "meta",
            Tag::Link => "link",
            Tag::Unknown(name) => name,
        }
    }

    /// Elements that never have children or a closing tag.
    pub fn is_void(&self) -> bool {
        matches!(self, Tag::Br | Tag::Img | Tag::Hr | Tag::Meta | Tag::Link)
    }

    /// Elements whose content is raw text up to the matching close tag.
    pub fn is_raw_text(&self) -> bool {
        matches!(self, Tag::Style | Tag::Script | Tag::Title)
    }

    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            Tag::Span
                | Tag::B
                | Tag::Strong
                | Tag::I
                | Tag::Em
                | Tag::U
                | Tag::S
                | Tag::Strike
                | Tag::Br
        )
    }

    /// Row groups are transparent: their rows belong to the table.
    pub fn is_row_group(&self) -> bool {
        matches!(self, Tag::THead | Tag::TBody | Tag::TFoot)
    }
}

/// A node in our DOM tree.
#[derive(Debug, Clone)]
pub enum DomNode {
    Element(ElementNode),
    Text(String),
}

/// An element node carrying tag, attributes, and children.
#[derive(Debug, Clone)]
pub struct ElementNode {
    pub tag: Tag,
    pub attributes: HashMap<String, String>,
    pub children: Vec<DomNode>,
}

impl ElementNode {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attributes: HashMap::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    pub fn classes(&self) -> Vec<&str> {
        self.attr("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn inline_style(&self) -> Option<&str> {
        self.attr("style")
    }

    pub fn src(&self) -> Option<&str> {
        self.attr("src")
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                DomNode::Text(t) => out.push_str(t),
                DomNode::Element(e) => out.push_str(&e.text_content()),
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse an HTML string into a list of top-level DOM nodes.
///
/// Unmatched closing tags are dropped; a closing tag that names an open
/// ancestor implicitly closes the elements nested inside it.
pub fn parse_html(html: &str) -> Vec<DomNode> {
    let mut parser = Parser::new(html);
    let mut nodes = Vec::new();
    loop {
        nodes.extend(parser.parse_nodes());
        if parser.eof() {
            break;
        }
        parser.skip_past(">");
    }
    nodes
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    /// Tags of the elements currently open, outermost first.
    open: Vec<Tag>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            open: Vec::new(),
        }
    }

    /// Parse sibling nodes up to the next closing tag or the end of input.
    fn parse_nodes(&mut self) -> Vec<DomNode> {
        let mut nodes = Vec::new();
        while !self.eof() && !self.starts_with("</") {
            if let Some(node) = self.parse_node() {
                nodes.push(node);
            }
        }
        nodes
    }

    fn parse_node(&mut self) -> Option<DomNode> {
        if self.starts_with("<!--") {
            self.skip_past("-->");
            return None;
        }
        if self.starts_with("<!") || self.starts_with("<?") {
            // Doctype / processing instruction
            self.skip_past(">");
            return None;
        }
        let opens_tag = self.starts_with("<")
            && self.rest()[1..]
                .chars()
                .next()
                .map(|c| c.is_ascii_alphabetic())
                .unwrap_or(false);
        if opens_tag {
            Some(self.parse_element())
        } else {
            Some(self.parse_text())
        }
    }

    fn parse_text(&mut self) -> DomNode {
        let start = self.pos;
        // A lone '<' that does not open a tag is text.
        if self.starts_with("<") {
            self.pos += 1;
        }
        while !self.eof() && !self.starts_with("<") {
            self.advance_char();
        }
        DomNode::Text(decode_entities(&self.input[start..self.pos]))
    }

    fn parse_element(&mut self) -> DomNode {
        self.pos += 1; // '<'
        let tag = Tag::from_name(&self.parse_name());
        let mut elem = ElementNode::new(tag);

        loop {
            self.skip_whitespace();
            if self.eof() || self.starts_with(">") || self.starts_with("/>") {
                break;
            }
            let (key, value) = self.parse_attribute();
            if key.is_empty() {
                // Stray character inside the tag.
                self.advance_char();
                continue;
            }
            elem.attributes.insert(key.to_ascii_lowercase(), value);
        }

        if self.starts_with("/>") {
            self.pos += 2;
            return DomNode::Element(elem);
        }
        if self.starts_with(">") {
            self.pos += 1;
        }
        if elem.tag.is_void() {
            return DomNode::Element(elem);
        }

        if elem.tag.is_raw_text() {
            let close = format!("</{}", elem.tag.name());
            let end = find_ascii_case_insensitive(self.rest(), &close)
                .map(|i| self.pos + i)
                .unwrap_or(self.input.len());
            let raw = &self.input[self.pos..end];
            if !raw.is_empty() {
                elem.children.push(DomNode::Text(raw.to_string()));
            }
            self.pos = end;
            if self.starts_with("</") {
                self.skip_past(">");
            }
        } else {
            self.parse_children(&mut elem);
        }

        DomNode::Element(elem)
    }

    fn parse_children(&mut self, elem: &mut ElementNode) {
        self.open.push(elem.tag.clone());
        loop {
            elem.children.extend(self.parse_nodes());
            if self.eof() {
                break;
            }
            let closing_at = self.pos;
            self.pos += 2; // '</'
            let closing = Tag::from_name(&self.parse_name());
            self.skip_past(">");
            if closing == elem.tag {
                break;
            }
            if self.open.contains(&closing) {
                // Closes an ancestor: leave it for that element.
                self.pos = closing_at;
                break;
            }
            log::debug!("dropping unmatched </{}>", closing.name());
        }
        self.open.pop();
    }

    fn parse_name(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ':' {
                self.advance_char();
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    fn parse_attribute(&mut self) -> (String, String) {
        let key = self.parse_name();
        self.skip_whitespace();
        if !self.starts_with("=") {
            return (key, String::new());
        }
        self.pos += 1;
        self.skip_whitespace();
        (key, self.parse_attr_value())
    }

    fn parse_attr_value(&mut self) -> String {
        if let Some(quote) = self.peek().filter(|&c| c == '"' || c == '\'') {
            self.pos += 1;
            let start = self.pos;
            while let Some(c) = self.peek() {
                if c == quote {
                    break;
                }
                self.advance_char();
            }
            let val = decode_entities(&self.input[start..self.pos]);
            if !self.eof() {
                self.pos += 1;
            }
            val
        } else {
            let start = self.pos;
            while let Some(c) = self.peek() {
                if c.is_whitespace() || c == '>' {
                    break;
                }
                self.advance_char();
            }
            decode_entities(&self.input[start..self.pos])
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map(char::is_whitespace).unwrap_or(false) {
            self.advance_char();
        }
    }

    fn skip_past(&mut self, needle: &str) {
        match self.rest().find(needle) {
            Some(i) => self.pos += i + needle.len(),
            None => self.pos = self.input.len(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn advance_char(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

/// Decode named and numeric character references.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest[1..].find(';').filter(|&i| i <= 10).and_then(|semi| {
            let entity = &rest[1..semi + 1];
            decode_entity(entity).map(|c| (c, semi + 2))
        });
        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &rest[consumed..];
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

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(num) = entity.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        "copy" => Some('\u{00A9}'),
        "euro" => Some('\u{20AC}'),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Convenience helpers
// ---------------------------------------------------------------------------

/// Find the `<body>` element and return it as the single root, or return all
/// nodes (minus `<head>` and raw-text elements) if no `<body>` is present.
pub fn body_children(nodes: &[DomNode]) -> Vec<DomNode> {
    for node in nodes {
        if let DomNode::Element(e) = node {
            if e.tag == Tag::Body {
                return vec![node.clone()];
            }
            if e.tag == Tag::Html {
                let inner = body_children(&e.children);
                if !inner.is_empty() {
                    return inner;
                }
            }
        }
    }
    nodes
        .iter()
        .filter(|n| {
            !matches!(n, DomNode::Element(e) if e.tag == Tag::Head || e.tag.is_raw_text())
        })
        .cloned()
        .collect()
}

/// Collect the text of every `<style>` element, in document order.
pub fn style_sheets(nodes: &[DomNode]) -> Vec<String> {
    let mut sheets = Vec::new();
    for node in nodes {
        if let DomNode::Element(e) = node {
            if e.tag == Tag::Style {
                sheets.push(e.text_content());
            } else {
                sheets.extend(style_sheets(&e.children));
            }
        }
    }
    sheets
}
