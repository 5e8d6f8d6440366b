//! Style resolver – maps tag defaults, `<style>` rules, presentational
//! attributes and inline `style` declarations to a flat [`ComputedStyle`]
//! consumed by the layout engine.
//!
//! Cascade order, later wins: inherited text properties, tag defaults, HTML
//! attributes (`align`, `width`, `bgcolor`, `border`), stylesheet rules in
//! source order, inline declarations. Lengths are in points; `px` is read as
//! one point.

use std::collections::HashMap;

use crate::dom::{DomNode, ElementNode, Tag};
use crate::fonts::{FontFamily, FontKey, RunStyle};

/// Fully resolved style for a single element.
#[derive(Debug, Clone)]
pub struct ComputedStyle {
    pub display: Display,

    // Sizing
    pub width: Dimension,
    pub height: Dimension,

    // Spacing
    pub margin_top: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub padding_top: f32,
    pub padding_right: f32,
    pub padding_bottom: f32,
    pub padding_left: f32,

    // Border
    pub border: Sides,
    pub border_color: Color,

    // Typography (inherited)
    pub font_size: f32,
    pub font_family: FontFamily,
    pub bold: bool,
    pub italic: bool,
    pub color: Color,
    pub text_align: TextAlign,
    pub text_indent: f32,
    pub line_height: f32,

    // Decoration (propagates to descendants)
    pub underline: bool,
    pub strikethrough: bool,

    pub background_color: Color,

    // Pagination
    pub page_break_before: bool,
    pub page_break_after: bool,
    /// Tables only: repeat the header row on continuation pages.
    pub repeat_header: bool,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::Block,
            width: Dimension::Auto,
            height: Dimension::Auto,
            margin_top: 0.0,
            margin_right: 0.0,
            margin_bottom: 0.0,
            margin_left: 0.0,
            padding_top: 0.0,
            padding_right: 0.0,
            padding_bottom: 0.0,
            padding_left: 0.0,
            border: Sides::default(),
            border_color: Color::BLACK,
            font_size: 12.0,
            font_family: FontFamily::Helvetica,
            bold: false,
            italic: false,
            color: Color::BLACK,
            text_align: TextAlign::Left,
            text_indent: 0.0,
            line_height: 1.3,
            underline: false,
            strikethrough: false,
            background_color: Color::TRANSPARENT,
            page_break_before: false,
            page_break_after: false,
            repeat_header: false,
        }
    }
}

impl ComputedStyle {
    /// Style of a child before its own rules apply: text properties carry
    /// over, box properties reset.
    pub fn inherit(&self) -> Self {
        Self {
            font_size: self.font_size,
            font_family: self.font_family,
            bold: self.bold,
            italic: self.italic,
            color: self.color,
            text_align: self.text_align,
            text_indent: self.text_indent,
            line_height: self.line_height,
            underline: self.underline,
            strikethrough: self.strikethrough,
            ..Self::default()
        }
    }

    pub fn font_key(&self) -> FontKey {
        FontKey::new(self.font_family, self.bold, self.italic)
    }

    pub fn run_style(&self) -> RunStyle {
        RunStyle {
            font: self.font_key(),
            size: self.font_size,
            color: self.color.to_array(),
            underline: self.underline,
            strikethrough: self.strikethrough,
        }
    }
}

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    Inline,
    ListItem,
    Table,
    TableRow,
    TableCell,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    Auto,
    Px(f32),
    Percent(f32),
}

impl Dimension {
    /// Resolve against the containing width.
    pub fn resolve(self, containing: f32) -> Option<f32> {
        match self {
            Dimension::Auto => None,
            Dimension::Px(v) => Some(v),
            Dimension::Percent(p) => Some(containing * p / 100.0),
        }
    }
}

/// Per-side widths.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sides {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Sides {
    pub fn all(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.top <= 0.0 && self.right <= 0.0 && self.bottom <= 0.0 && self.left <= 0.0
    }
}

/// RGBA colour (0.0 – 1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn is_transparent(&self) -> bool {
        self.a < 0.001
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);
        match hex.len() {
            6 => Some(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => Some(Self::rgb(
                channel(&hex[0..1].repeat(2))?,
                channel(&hex[1..2].repeat(2))?,
                channel(&hex[2..3].repeat(2))?,
            )),
            _ => None,
        }
    }

    /// Hex, `rgb(r, g, b)` or a basic colour keyword.
    pub fn from_css(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        if value.starts_with('#') {
            return Self::from_hex(&value);
        }
        if let Some(args) = value
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let parts: Vec<f32> = args
                .split(',')
                .filter_map(|p| p.trim().parse::<f32>().ok())
                .collect();
            if parts.len() == 3 {
                return Some(Self::rgb(parts[0] / 255.0, parts[1] / 255.0, parts[2] / 255.0));
            }
            return None;
        }
        let hex = match value.as_str() {
            "black" => "000000",
            "white" => "ffffff",
            "red" => "ff0000",
            "green" => "008000",
            "blue" => "0000ff",
            "navy" => "000080",
            "gray" | "grey" => "808080",
            "silver" => "c0c0c0",
            "maroon" => "800000",
            "yellow" => "ffff00",
            "orange" => "ffa500",
            "purple" => "800080",
            "teal" => "008080",
            "transparent" => return Some(Self::TRANSPARENT),
            _ => return None,
        };
        Self::from_hex(hex)
    }
}

// ---------------------------------------------------------------------------
// Stylesheets (`<style>` blocks)
// ---------------------------------------------------------------------------

/// A simple selector: an optional tag name plus required classes.
#[derive(Debug, Clone, PartialEq)]
struct Selector {
    tag: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty()
            || s.contains(|c: char| c.is_whitespace() || matches!(c, '>' | '+' | '~' | ':' | '#' | '['))
        {
            return None;
        }
        let mut parts = s.split('.');
        let tag = parts.next().filter(|t| !t.is_empty() && *t != "*");
        let classes: Vec<String> = parts.map(str::to_string).collect();
        if classes.iter().any(|c| c.is_empty()) {
            return None;
        }
        Some(Self {
            tag: tag.map(str::to_ascii_lowercase),
            classes,
        })
    }

    fn matches(&self, element: &ElementNode) -> bool {
        if let Some(tag) = &self.tag {
            if tag != element.tag.name() {
                return false;
            }
        }
        let classes = element.classes();
        self.classes.iter().all(|c| classes.contains(&c.as_str()))
    }
}

#[derive(Debug, Clone)]
struct Rule {
    selector: Selector,
    declarations: String,
}

/// Rules collected from `<style>` elements, applied in source order.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    rules: Vec<Rule>,
}

impl Stylesheet {
    pub fn parse(css: &str) -> Self {
        let mut sheet = Self::default();
        sheet.add(css);
        sheet
    }

    /// Append the rules of another `<style>` block. Unsupported selectors
    /// and unterminated blocks are skipped.
    pub fn add(&mut self, css: &str) {
        let css = strip_comments(css);
        let mut rest = css.as_str();
        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}').map(|i| open + i) else {
                break;
            };
            let selectors = &rest[..open];
            let declarations = rest[open + 1..close].trim();
            for raw in selectors.split(',') {
                match Selector::parse(raw) {
                    Some(selector) => self.rules.push(Rule {
                        selector,
                        declarations: declarations.to_string(),
                    }),
                    None => log::debug!("ignoring unsupported selector {:?}", raw.trim()),
                }
            }
            rest = &rest[close + 1..];
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn apply(&self, s: &mut ComputedStyle, element: &ElementNode) {
        for rule in &self.rules {
            if rule.selector.matches(element) {
                apply_inline_style(s, &rule.declarations);
            }
        }
    }
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

// ---------------------------------------------------------------------------
// Style resolution
// ---------------------------------------------------------------------------

/// Resolve the style for an element, inheriting text properties from its parent.
pub fn resolve_style(
    element: &ElementNode,
    parent: Option<&ComputedStyle>,
    sheet: &Stylesheet,
) -> ComputedStyle {
    let mut style = parent.map(ComputedStyle::inherit).unwrap_or_default();
    apply_tag_defaults(&mut style, &element.tag);
    apply_attributes(&mut style, element);
    sheet.apply(&mut style, element);
    if let Some(inline) = element.inline_style() {
        apply_inline_style(&mut style, inline);
    }

    // An inline element that forces a page break behaves as a block.
    if style.display == Display::Inline && (style.page_break_before || style.page_break_after) {
        style.display = Display::Block;
    }
    style
}

/// Default styles based on tag semantics.
fn apply_tag_defaults(s: &mut ComputedStyle, tag: &Tag) {
    let heading = |s: &mut ComputedStyle, size: f32| {
        s.font_size = size;
        s.bold = true;
        s.margin_top = size * 0.5;
        s.margin_bottom = size * 0.4;
    };
    match tag {
        Tag::H1 => heading(s, 24.0),
        Tag::H2 => heading(s, 18.0),
        Tag::H3 => heading(s, 14.0),
        Tag::H4 => heading(s, 12.0),
        Tag::P => s.margin_bottom = 8.0,
        Tag::Ul | Tag::Ol => {
            s.margin_bottom = 8.0;
            s.padding_left = 24.0;
        }
        Tag::Li => {
            s.display = Display::ListItem;
            s.margin_bottom = 2.0;
        }
        Tag::Hr => {
            s.border.top = 1.0;
            s.margin_top = 6.0;
            s.margin_bottom = 6.0;
        }
        Tag::Table => {
            s.display = Display::Table;
            s.margin_bottom = 8.0;
        }
        Tag::Tr => s.display = Display::TableRow,
        Tag::Td | Tag::Th => {
            s.display = Display::TableCell;
            s.padding_top = 2.0;
            s.padding_right = 4.0;
            s.padding_bottom = 2.0;
            s.padding_left = 4.0;
            if *tag == Tag::Th {
                s.bold = true;
                s.text_align = TextAlign::Center;
            }
        }
        Tag::B | Tag::Strong => {
            s.display = Display::Inline;
            s.bold = true;
        }
        Tag::I | Tag::Em => {
            s.display = Display::Inline;
            s.italic = true;
        }
        Tag::U => {
            s.display = Display::Inline;
            s.underline = true;
        }
        Tag::S | Tag::Strike => {
            s.display = Display::Inline;
            s.strikethrough = true;
        }
        Tag::Span | Tag::Br => s.display = Display::Inline,
        Tag::Head | Tag::Style | Tag::Script | Tag::Title | Tag::Meta | Tag::Link => {
            s.display = Display::None
        }
        Tag::Html
        | Tag::Body
        | Tag::Div
        | Tag::Img
        | Tag::THead
        | Tag::TBody
        | Tag::TFoot
        | Tag::Unknown(_) => {}
    }
}

/// Presentational HTML attributes.
fn apply_attributes(s: &mut ComputedStyle, element: &ElementNode) {
    if let Some(align) = element.attr("align") {
        if let Some(a) = parse_text_align(align) {
            s.text_align = a;
        }
    }
    if let Some(width) = element.attr("width") {
        s.width = parse_dimension(width, s.font_size);
    }
    if let Some(height) = element.attr("height") {
        s.height = parse_dimension(height, s.font_size);
    }
    if let Some(c) = element.attr("bgcolor").and_then(Color::from_css) {
        s.background_color = c;
    }
    if element.tag == Tag::Table {
        if let Some(w) = element.attr("border").and_then(|b| parse_length(b, s.font_size)) {
            s.border = Sides::all(w);
        }
    }
}

// ---------------------------------------------------------------------------
// Declaration parsing (limited subset)
// ---------------------------------------------------------------------------

pub fn apply_inline_style(s: &mut ComputedStyle, style_str: &str) {
    for decl in style_str.split(';') {
        let Some((prop, val)) = decl.split_once(':') else {
            continue;
        };
        let prop = prop.trim().to_ascii_lowercase();
        let val = val.trim().trim_end_matches("!important").trim();
        if !prop.is_empty() && !val.is_empty() {
            apply_css_property(s, &prop, val);
        }
    }
}

fn apply_css_property(s: &mut ComputedStyle, prop: &str, val: &str) {
    let em = s.font_size;
    let len = |v: &str| parse_length(v, em);
    match prop {
        "display" => {
            s.display = match val {
                "block" => Display::Block,
                "inline" | "inline-block" => Display::Inline,
                "list-item" => Display::ListItem,
                "none" => Display::None,
                _ => s.display,
            }
        }
        "color" => {
            if let Some(c) = Color::from_css(val) {
                s.color = c;
            }
        }
        "background-color" | "background" => {
            if let Some(c) = Color::from_css(val) {
                s.background_color = c;
            }
        }
        "font-family" => {
            if let Some(f) = FontFamily::from_css(val) {
                s.font_family = f;
            }
        }
        "font-size" => {
            if let Some(size) = len(val).filter(|v| *v > 0.0) {
                s.font_size = size;
            }
        }
        "font-weight" => {
            s.bold = match val {
                "bold" | "bolder" => true,
                "normal" | "lighter" => false,
                n => n.parse::<u32>().map(|w| w >= 600).unwrap_or(s.bold),
            }
        }
        "font-style" => s.italic = matches!(val, "italic" | "oblique"),
        "text-decoration" | "text-decoration-line" => {
            s.underline = val.contains("underline");
            s.strikethrough = val.contains("line-through");
        }
        "text-align" => {
            if let Some(a) = parse_text_align(val) {
                s.text_align = a;
            }
        }
        "text-indent" | "indent" => {
            if let Some(v) = len(val) {
                s.text_indent = v;
            }
        }
        "line-height" => {
            if let Ok(v) = val.parse::<f32>() {
                s.line_height = v;
            } else if let Some(p) = val.strip_suffix('%').and_then(|p| p.trim().parse::<f32>().ok())
            {
                s.line_height = p / 100.0;
            } else if let Some(v) = len(val) {
                s.line_height = v / s.font_size;
            }
        }
        "width" => s.width = parse_dimension(val, em),
        "height" => s.height = parse_dimension(val, em),
        "margin" => {
            if let Some([t, r, b, l]) = parse_box_shorthand(val, em) {
                s.margin_top = t;
                s.margin_right = r;
                s.margin_bottom = b;
                s.margin_left = l;
            }
        }
        "margin-top" => set_len(&mut s.margin_top, len(val)),
        "margin-right" => set_len(&mut s.margin_right, len(val)),
        "margin-bottom" => set_len(&mut s.margin_bottom, len(val)),
        "margin-left" => set_len(&mut s.margin_left, len(val)),
        "padding" => {
            if let Some([t, r, b, l]) = parse_box_shorthand(val, em) {
                s.padding_top = t;
                s.padding_right = r;
                s.padding_bottom = b;
                s.padding_left = l;
            }
        }
        "padding-top" => set_len(&mut s.padding_top, len(val)),
        "padding-right" => set_len(&mut s.padding_right, len(val)),
        "padding-bottom" => set_len(&mut s.padding_bottom, len(val)),
        "padding-left" => set_len(&mut s.padding_left, len(val)),
        "border" => {
            let (width, color) = parse_border_shorthand(val, em);
            if let Some(w) = width {
                s.border = Sides::all(w);
            }
            if let Some(c) = color {
                s.border_color = c;
            }
        }
        "border-width" => {
            if let Some([t, r, b, l]) = parse_box_shorthand(val, em) {
                s.border = Sides {
                    top: t,
                    right: r,
                    bottom: b,
                    left: l,
                };
            }
        }
        "border-color" => {
            if let Some(c) = Color::from_css(val) {
                s.border_color = c;
            }
        }
        "border-top" | "border-right" | "border-bottom" | "border-left" | "border-top-width"
        | "border-right-width" | "border-bottom-width" | "border-left-width" => {
            let (width, color) = parse_border_shorthand(val, em);
            if let Some(w) = width {
                match prop.trim_start_matches("border-").trim_end_matches("-width") {
                    "top" => s.border.top = w,
                    "right" => s.border.right = w,
                    "bottom" => s.border.bottom = w,
                    _ => s.border.left = w,
                }
            }
            if let Some(c) = color {
                s.border_color = c;
            }
        }
        "page-break-before" | "break-before" => {
            s.page_break_before = matches!(val, "always" | "page")
        }
        "page-break-after" | "break-after" => s.page_break_after = matches!(val, "always" | "page"),
        "repeat-header" => s.repeat_header = matches!(val, "yes" | "true"),
        _ => log::trace!("unsupported CSS property {prop}"),
    }
}

fn set_len(target: &mut f32, value: Option<f32>) {
    if let Some(v) = value {
        *target = v;
    }
}

fn parse_text_align(val: &str) -> Option<TextAlign> {
    match val.trim().to_ascii_lowercase().as_str() {
        "left" | "justify" | "start" => Some(TextAlign::Left),
        "center" | "middle" => Some(TextAlign::Center),
        "right" | "end" => Some(TextAlign::Right),
        _ => None,
    }
}

/// Length in points: `px`, `pt`, `em` or a bare number.
fn parse_length(s: &str, em: f32) -> Option<f32> {
    let s = s.trim();
    if let Some(v) = s.strip_suffix("em") {
        return v.trim().parse::<f32>().ok().map(|v| v * em);
    }
    let s = s
        .strip_suffix("px")
        .or_else(|| s.strip_suffix("pt"))
        .unwrap_or(s);
    s.trim().parse().ok()
}

fn parse_dimension(s: &str, em: f32) -> Dimension {
    let s = s.trim();
    if s == "auto" {
        Dimension::Auto
    } else if let Some(p) = s.strip_suffix('%') {
        p.trim()
            .parse::<f32>()
            .map(Dimension::Percent)
            .unwrap_or(Dimension::Auto)
    } else {
        parse_length(s, em).map(Dimension::Px).unwrap_or(Dimension::Auto)
    }
}

/// CSS one-to-four value box shorthand → `[top, right, bottom, left]`.
fn parse_box_shorthand(val: &str, em: f32) -> Option<[f32; 4]> {
    let parts: Vec<f32> = val
        .split_whitespace()
        .filter_map(|p| if p == "auto" { Some(0.0) } else { parse_length(p, em) })
        .collect();
    match parts.as_slice() {
        [a] => Some([*a, *a, *a, *a]),
        [v, h] => Some([*v, *h, *v, *h]),
        [t, h, b] => Some([*t, *h, *b, *h]),
        [t, r, b, l] => Some([*t, *r, *b, *l]),
        _ => None,
    }
}

/// `border: 1px solid #000` → width and colour, either optional.
fn parse_border_shorthand(val: &str, em: f32) -> (Option<f32>, Option<Color>) {
    let mut width = None;
    let mut color = None;
    for part in val.split_whitespace() {
        match part {
            "none" | "hidden" => width = Some(0.0),
            "thin" => width = Some(1.0),
            "medium" => width = Some(2.0),
            "thick" => width = Some(4.0),
            "solid" | "dashed" | "dotted" | "double" => {
                width.get_or_insert(1.0);
            }
            p => {
                if let Some(w) = parse_length(p, em) {
                    width = Some(w);
                } else if let Some(c) = Color::from_css(p) {
                    color = Some(c);
                }
            }
        }
    }
    (width, color)
}

// ---------------------------------------------------------------------------
// Styled DOM tree
// ---------------------------------------------------------------------------

/// A DOM node annotated with its computed style.
#[derive(Debug, Clone)]
pub enum StyledNode {
    Element {
        tag: Tag,
        style: ComputedStyle,
        children: Vec<StyledNode>,
        /// Original attributes (for images src, etc.)
        attrs: HashMap<String, String>,
    },
    Text {
        text: String,
        style: ComputedStyle,
    },
}

impl StyledNode {
    pub fn style(&self) -> &ComputedStyle {
        match self {
            StyledNode::Element { style, .. } | StyledNode::Text { style, .. } => style,
        }
    }
}

/// Build a styled tree from a DOM tree, resolving styles top-down.
/// Elements with `display: none` are dropped together with their subtree.
pub fn build_styled_tree(
    nodes: &[DomNode],
    parent_style: Option<&ComputedStyle>,
    sheet: &Stylesheet,
) -> Vec<StyledNode> {
    let mut result = Vec::new();
    for node in nodes {
        match node {
            DomNode::Element(e) => {
                let style = resolve_style(e, parent_style, sheet);
                if style.display == Display::None {
                    continue;
                }
                let children = build_styled_tree(&e.children, Some(&style), sheet);
                result.push(StyledNode::Element {
                    tag: e.tag.clone(),
                    style,
                    children,
                    attrs: e.attributes.clone(),
                });
            }
            DomNode::Text(text) => {
                if text.is_empty() {
                    continue;
                }
                // Text renders inline: only inherited properties apply.
                let style = parent_style
                    .map(ComputedStyle::inherit)
                    .unwrap_or_default();
                result.push(StyledNode::Text {
                    text: text.clone(),
                    style: ComputedStyle {
                        display: Display::Inline,
                        ..style
                    },
                });
            }
        }
    }
    result
}
