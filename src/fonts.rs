//! Font families and text measurement for the standard PDF fonts.
//!
//! Only the builtin Type 1 fonts are used, so no font files are loaded.
//! Glyph advances come from the standard font metrics for printable ASCII;
//! other glyphs fall back to an average advance.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OptionsError;

/// One of the five builtin font families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Times,
    Helvetica,
    Courier,
    ZapfDingbats,
    Symbol,
}

impl FontFamily {
    pub fn name(self) -> &'static str {
        match self {
            FontFamily::Times => "times",
            FontFamily::Helvetica => "helvetica",
            FontFamily::Courier => "courier",
            FontFamily::ZapfDingbats => "zapfdingbats",
            FontFamily::Symbol => "symbol",
        }
    }

    /// Resolve a CSS `font-family` list, taking the first recognised entry.
    pub fn from_css(value: &str) -> Option<Self> {
        value.split(',').find_map(|entry| {
            let name = entry.trim().trim_matches(|c| c == '"' || c == '\'');
            match name.to_ascii_lowercase().as_str() {
                "times" | "times-roman" | "times new roman" | "serif" => Some(FontFamily::Times),
                "helvetica" | "arial" | "sans-serif" => Some(FontFamily::Helvetica),
                "courier" | "courier new" | "monospace" => Some(FontFamily::Courier),
                "zapfdingbats" | "dingbats" => Some(FontFamily::ZapfDingbats),
                "symbol" => Some(FontFamily::Symbol),
                _ => None,
            }
        })
    }
}

impl FromStr for FontFamily {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "times" => Ok(FontFamily::Times),
            "helvetica" => Ok(FontFamily::Helvetica),
            "courier" => Ok(FontFamily::Courier),
            "zapfdingbats" => Ok(FontFamily::ZapfDingbats),
            "symbol" => Ok(FontFamily::Symbol),
            other => Err(OptionsError::UnknownFontFamily(other.to_string())),
        }
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A family plus the two attributes that select a builtin face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FontKey {
    pub family: FontFamily,
    pub bold: bool,
    pub italic: bool,
}

impl FontKey {
    pub fn new(family: FontFamily, bold: bool, italic: bool) -> Self {
        Self {
            family,
            bold,
            italic,
        }
    }
}

// Advance widths (1/1000 em) for U+0020..=U+007E.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const TIMES_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

const COURIER_ADVANCE: f32 = 600.0;
/// Bold faces run wider than the regular metrics.
const BOLD_WIDENING: f32 = 1.06;

/// Text measurement over the builtin fonts.
#[derive(Debug, Clone)]
pub struct FontManager {
    /// Advance (in em) used for glyphs without a metrics entry.
    fallback_advance: f32,
    /// Ascender as a fraction of the font size.
    ascent_ratio: f32,
}

impl Default for FontManager {
    fn default() -> Self {
        Self {
            fallback_advance: 0.5,
            ascent_ratio: 0.75,
        }
    }
}

impl FontManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance of one glyph in 1/1000 em.
    fn advance(&self, ch: char, key: &FontKey) -> f32 {
        let fallback = self.fallback_advance * 1000.0;
        let base = match key.family {
            FontFamily::Courier => return COURIER_ADVANCE,
            FontFamily::Helvetica => ascii_width(&HELVETICA_WIDTHS, ch),
            FontFamily::Times => ascii_width(&TIMES_WIDTHS, ch),
            FontFamily::ZapfDingbats | FontFamily::Symbol => None,
        };
        let width = base.map(f32::from).unwrap_or(fallback);
        if key.bold {
            width * BOLD_WIDENING
        } else {
            width
        }
    }

    /// Width of `text` set at `font_size` points.
    pub fn measure_text_width(&self, text: &str, font_size: f32, key: &FontKey) -> f32 {
        let units: f32 = text.chars().map(|ch| self.advance(ch, key)).sum();
        units * font_size / 1000.0
    }

    pub fn line_height(&self, font_size: f32, factor: f32) -> f32 {
        font_size * factor
    }

    /// Distance from the top of a line box to its baseline.
    pub fn ascent(&self, font_size: f32) -> f32 {
        font_size * self.ascent_ratio
    }
}

fn ascii_width(table: &[u16; 95], ch: char) -> Option<u16> {
    let code = ch as u32;
    if (0x20..=0x7e).contains(&code) {
        Some(table[(code - 0x20) as usize])
    } else if ch == '\u{00A0}' {
        Some(table[0])
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Inline text wrapping
// ---------------------------------------------------------------------------

/// Visual attributes of a run of inline text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStyle {
    pub font: FontKey,
    pub size: f32,
    pub color: [f32; 4],
    pub underline: bool,
    pub strikethrough: bool,
}

/// Inline content of one paragraph, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineItem {
    Text { text: String, style: RunStyle },
    LineBreak,
}

/// A run placed on a wrapped line; `x` is relative to the line start.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedRun {
    pub text: String,
    pub style: RunStyle,
    pub x: f32,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WrappedLine {
    pub runs: Vec<WrappedRun>,
    pub width: f32,
    /// Largest font size on the line; 0 for an empty line.
    pub max_size: f32,
}

#[derive(Debug, Clone)]
struct Piece {
    text: String,
    style: RunStyle,
}

#[derive(Debug, Clone)]
enum Token {
    Word(Vec<Piece>),
    Space(RunStyle),
    Break,
}

fn tokenize(items: &[InlineItem]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word: Vec<Piece> = Vec::new();

    fn flush(word: &mut Vec<Piece>, tokens: &mut Vec<Token>) {
        if !word.is_empty() {
            tokens.push(Token::Word(std::mem::take(word)));
        }
    }

    for item in items {
        match item {
            InlineItem::Text { text, style } => {
                for ch in text.chars() {
                    if ch.is_whitespace() && ch != '\u{00A0}' {
                        flush(&mut word, &mut tokens);
                        if matches!(tokens.last(), Some(Token::Word(_))) {
                            tokens.push(Token::Space(style.clone()));
                        }
                        continue;
                    }
                    match word.last_mut() {
                        Some(piece) if piece.style == *style => piece.text.push(ch),
                        _ => word.push(Piece {
                            text: ch.to_string(),
                            style: style.clone(),
                        }),
                    }
                }
            }
            InlineItem::LineBreak => {
                flush(&mut word, &mut tokens);
                if matches!(tokens.last(), Some(Token::Space(_))) {
                    tokens.pop();
                }
                tokens.push(Token::Break);
            }
        }
    }
    flush(&mut word, &mut tokens);
    if matches!(tokens.last(), Some(Token::Space(_))) {
        tokens.pop();
    }
    tokens
}

struct LineBuilder<'a> {
    fonts: &'a FontManager,
    line: WrappedLine,
    cursor: f32,
}

impl<'a> LineBuilder<'a> {
    fn new(fonts: &'a FontManager, start: f32) -> Self {
        Self {
            fonts,
            line: WrappedLine::default(),
            cursor: start,
        }
    }

    fn is_empty(&self) -> bool {
        self.line.runs.is_empty()
    }

    fn push(&mut self, text: &str, style: &RunStyle) {
        let width = self.fonts.measure_text_width(text, style.size, &style.font);
        match self.line.runs.last_mut() {
            Some(run) if run.style == *style => {
                run.text.push_str(text);
                run.width += width;
            }
            _ => self.line.runs.push(WrappedRun {
                text: text.to_string(),
                style: style.clone(),
                x: self.cursor,
                width,
            }),
        }
        self.cursor += width;
        self.line.width = self.cursor;
        self.line.max_size = self.line.max_size.max(style.size);
    }

    fn finish(self) -> WrappedLine {
        self.line
    }
}

/// Word-wrap inline content to `max_width` points.
///
/// The first line starts at `indent`. Words never split; a word wider than
/// the line is placed alone and overflows.
pub fn wrap_inline(
    items: &[InlineItem],
    max_width: f32,
    indent: f32,
    fonts: &FontManager,
) -> Vec<WrappedLine> {
    let mut lines = Vec::new();
    let mut builder = LineBuilder::new(fonts, indent);
    let mut pending_space: Option<RunStyle> = None;

    for token in tokenize(items) {
        match token {
            Token::Word(pieces) => {
                let word_width: f32 = pieces
                    .iter()
                    .map(|p| fonts.measure_text_width(&p.text, p.style.size, &p.style.font))
                    .sum();
                let space_width = pending_space
                    .as_ref()
                    .map(|s| fonts.measure_text_width(" ", s.size, &s.font))
                    .unwrap_or(0.0);

                if !builder.is_empty()
                    && max_width > 0.0
                    && builder.cursor + space_width + word_width > max_width
                {
                    lines.push(builder.finish());
                    builder = LineBuilder::new(fonts, 0.0);
                } else if let Some(space) = &pending_space {
                    if !builder.is_empty() {
                        builder.push(" ", space);
                    }
                }
                pending_space = None;
                for piece in &pieces {
                    builder.push(&piece.text, &piece.style);
                }
            }
            Token::Space(style) => pending_space = Some(style),
            Token::Break => {
                pending_space = None;
                lines.push(builder.finish());
                builder = LineBuilder::new(fonts, 0.0);
            }
        }
    }

    if !builder.is_empty() || lines.is_empty() {
        lines.push(builder.finish());
    }
    lines
}
