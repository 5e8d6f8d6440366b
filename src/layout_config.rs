//! Layout config – the intermediate representation between layout computation
//! and PDF rendering. This is the "frozen" structure that encodes exactly what
//! goes on each page, including the decorations painted by the page hook.

use serde::{Deserialize, Serialize};

use crate::fonts::{FontKey, RunStyle};
use crate::header_footer::Align;
use crate::options::Margins;

/// A complete document layout ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Document title embedded in the PDF metadata.
    pub title: String,
    /// Width of each page in PDF points (1 pt = 1/72 inch).
    pub page_width_pt: f32,
    /// Height of each page in PDF points.
    pub page_height_pt: f32,
    pub margins: Margins,
    /// Ordered list of pages.
    pub pages: Vec<PageLayout>,
}

/// One page of content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_index: usize,
    /// Content boxes; coordinates are page-absolute with a top-left origin.
    pub boxes: Vec<LayoutBox>,
    /// Painted over the content by the page hook; PDF user space
    /// (bottom-left origin).
    #[serde(default)]
    pub decorations: Vec<Decoration>,
}

impl PageLayout {
    pub fn new(page_index: usize) -> Self {
        Self {
            page_index,
            boxes: Vec::new(),
            decorations: Vec::new(),
        }
    }
}

/// A positioned rectangle with optional content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutBox {
    /// Position relative to page top-left, in points.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,

    pub background_color: Option<[f32; 4]>,
    pub border: Option<BorderStyle>,

    pub text: Option<TextContent>,
    pub image: Option<ImageContent>,
    /// List bullet or number set in the left gutter; run offsets are
    /// relative to the box's left edge.
    pub marker: Option<TextLine>,

    pub children: Vec<LayoutBox>,
}

/// Per-side border widths sharing one colour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorderStyle {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextContent {
    /// Pre-wrapped lines of text.
    pub lines: Vec<TextLine>,
}

impl TextContent {
    /// Concatenated text of every line, lines separated by `\n`.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.runs.iter().map(|r| r.text.as_str()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextLine {
    pub runs: Vec<TextRun>,
    /// Alignment shift applied to every run of the line.
    pub x_offset: f32,
    /// Baseline offset from the top of the box.
    pub baseline: f32,
    /// Vertical space the line takes; lines stack without gaps.
    #[serde(default)]
    pub height: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    /// X offset from the start of the line.
    pub x: f32,
    pub width: f32,
    pub style: RunStyle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageContent {
    pub src: String,
    pub width: f32,
    pub height: f32,
}

/// Content painted by a page hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decoration {
    /// Single-line text aligned on the anchor `(x, y)`; `y` is the baseline.
    Text {
        text: String,
        x: f32,
        y: f32,
        align: Align,
        font: FontKey,
        size: f32,
        underline: bool,
        strikethrough: bool,
    },
    /// Horizontal rule from `x1` to `x2` at height `y`.
    Rule { x1: f32, x2: f32, y: f32, width: f32 },
}

impl LayoutConfig {
    pub fn new(title: &str, page_width_pt: f32, page_height_pt: f32, margins: Margins) -> Self {
        Self {
            title: title.to_string(),
            page_width_pt,
            page_height_pt,
            margins,
            pages: Vec::new(),
        }
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialise from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl LayoutBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            background_color: None,
            border: None,
            text: None,
            image: None,
            marker: None,
            children: Vec::new(),
        }
    }
}
