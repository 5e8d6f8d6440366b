//! Header and footer descriptors and the page hook that paints them.
//!
//! Coordinates are PDF user space (origin bottom-left, points). Text is
//! anchored relative to the content area edges:
//!
//! * header baseline: `page height − top margin + 19`
//! * footer baseline: `bottom margin − 29`
//!
//! both shifted by `y_correct`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OptionsError;
use crate::fonts::{FontFamily, FontKey};
use crate::layout_config::Decoration;
use crate::options::Html2PdfOptions;
use crate::page_events::{PageCanvas, PageEvents, PageFrame};

/// Replaced by the current page number in header/footer text.
pub const PAGE_NUMBER_PLACEHOLDER: &str = "{pN}";

const HEADER_RISE: f32 = 19.0;
const FOOTER_DROP: f32 = 29.0;
const HEADER_RULE_GAP: f32 = 4.0;
const FOOTER_RULE_GAP: f32 = 10.0;
const RULE_WIDTH: f32 = 1.0;

/// Combinable font style flags, written as a string over `n b i u s`
/// (normal, bold, italic, underline, strikethrough), e.g. `"bi"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
}

impl FontStyle {
    pub const NORMAL: FontStyle = FontStyle {
        bold: false,
        italic: false,
        underline: false,
        strikethrough: false,
    };

    /// The flag string; `"n"` when no flag is set.
    pub fn flags(&self) -> String {
        let mut s = String::new();
        for (set, flag) in [
            (self.bold, 'b'),
            (self.italic, 'i'),
            (self.underline, 'u'),
            (self.strikethrough, 's'),
        ] {
            if set {
                s.push(flag);
            }
        }
        if s.is_empty() {
            s.push('n');
        }
        s
    }
}

impl FromStr for FontStyle {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut style = FontStyle::NORMAL;
        for ch in s.chars() {
            match ch.to_ascii_lowercase() {
                'n' => {}
                'b' => style.bold = true,
                'i' => style.italic = true,
                'u' => style.underline = true,
                's' => style.strikethrough = true,
                other => return Err(OptionsError::InvalidFontStyle(other)),
            }
        }
        Ok(style)
    }
}

impl TryFrom<String> for FontStyle {
    type Error = OptionsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FontStyle> for String {
    fn from(style: FontStyle) -> Self {
        style.flags()
    }
}

/// Horizontal alignment of header/footer text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Align {
    Left,
    Center,
    #[default]
    Right,
}

impl Align {
    /// Accepts `l`, `c` or `r`.
    pub fn from_char(c: char) -> Result<Self, OptionsError> {
        match c {
            'l' => Ok(Align::Left),
            'c' => Ok(Align::Center),
            'r' => Ok(Align::Right),
            other => Err(OptionsError::InvalidAlign(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }
}

impl FromStr for Align {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "left" => Ok(Align::Left),
            "c" | "center" => Ok(Align::Center),
            "r" | "right" => Ok(Align::Right),
            other => Err(OptionsError::InvalidAlign(other.to_string())),
        }
    }
}

impl TryFrom<String> for Align {
    type Error = OptionsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Align> for String {
    fn from(align: Align) -> Self {
        align.name().to_string()
    }
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a descriptor is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Header,
    Footer,
}

/// Repeating page text with an optional separator line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderFooter {
    pub show: bool,
    /// May contain `{pN}` for the page number.
    pub text: String,
    pub font_family: FontFamily,
    pub font_style: FontStyle,
    pub font_size: f32,
    pub align: Align,
    /// Moves the text up (positive) or down (negative), in points.
    pub y_correct: f32,
    /// Draw a separator line.
    pub line: bool,
    /// Shortens (positive) or lengthens (negative) the separator line.
    pub line_x_correct: f32,
    /// Moves the separator line up or down.
    pub line_y_correct: f32,
}

impl Default for HeaderFooter {
    fn default() -> Self {
        Self {
            show: false,
            text: String::new(),
            font_family: FontFamily::Times,
            font_style: FontStyle::NORMAL,
            font_size: 10.0,
            align: Align::Right,
            y_correct: 0.0,
            line: false,
            line_x_correct: 0.0,
            line_y_correct: 0.0,
        }
    }
}

impl HeaderFooter {
    /// A shown descriptor with default styling.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            show: true,
            text: text.into(),
            ..Self::default()
        }
    }

    /// Text with every `{pN}` replaced by `page_number`.
    pub fn resolve_text(&self, page_number: i32) -> String {
        self.text
            .replace(PAGE_NUMBER_PLACEHOLDER, &page_number.to_string())
    }
}

/// Paint one descriptor on a page.
pub fn paint(
    hf: &HeaderFooter,
    placement: Placement,
    page_number: i32,
    frame: &PageFrame,
    canvas: &mut PageCanvas,
) {
    let xl = frame.content_left();
    let xr = frame.content_right();

    let x = match hf.align {
        Align::Left => xl,
        Align::Center => (xl + xr) / 2.0,
        Align::Right => xr,
    };
    let y = match placement {
        Placement::Header => frame.content_top() + HEADER_RISE,
        Placement::Footer => frame.content_bottom() - FOOTER_DROP,
    } + hf.y_correct;

    canvas.push(Decoration::Text {
        text: hf.resolve_text(page_number),
        x,
        y,
        align: hf.align,
        font: FontKey::new(hf.font_family, hf.font_style.bold, hf.font_style.italic),
        size: hf.font_size,
        underline: hf.font_style.underline,
        strikethrough: hf.font_style.strikethrough,
    });

    if hf.line {
        let rule_y = match placement {
            Placement::Header => y - HEADER_RULE_GAP,
            Placement::Footer => y + FOOTER_RULE_GAP,
        } + hf.line_y_correct;
        let c = hf.line_x_correct;
        let (trim_left, trim_right) = match hf.align {
            Align::Left => (0.0, c),
            Align::Center => (c / 2.0, c / 2.0),
            Align::Right => (c, 0.0),
        };
        canvas.draw_rule(xl + trim_left, xr - trim_right, rule_y, RULE_WIDTH);
    }
}

/// Page hook painting the configured header and footer.
///
/// The counter is reset to the start page number when the document opens
/// and incremented (wrapping) at each page start; nothing is painted while
/// it is not positive.
#[derive(Debug, Clone)]
pub struct HeaderFooterPainter<'a> {
    header: &'a HeaderFooter,
    footer: &'a HeaderFooter,
    start_page_number: i32,
    page_number: i32,
}

impl<'a> HeaderFooterPainter<'a> {
    pub fn new(options: &'a Html2PdfOptions) -> Self {
        Self {
            header: &options.header,
            footer: &options.footer,
            start_page_number: options.start_page_number,
            page_number: options.start_page_number,
        }
    }

    /// Current value of the page counter.
    pub fn page_number(&self) -> i32 {
        self.page_number
    }
}

impl PageEvents for HeaderFooterPainter<'_> {
    fn on_open_document(&mut self) {
        self.page_number = self.start_page_number;
    }

    fn on_start_page(&mut self, _frame: &PageFrame) {
        self.page_number = self.page_number.wrapping_add(1);
    }

    fn on_end_page(&mut self, frame: &PageFrame, canvas: &mut PageCanvas) {
        if self.page_number <= 0 {
            log::debug!(
                "page {}: header/footer suppressed (counter {})",
                frame.index + 1,
                self.page_number
            );
            return;
        }
        if self.header.show {
            paint(self.header, Placement::Header, self.page_number, frame, canvas);
        }
        if self.footer.show {
            paint(self.footer, Placement::Footer, self.page_number, frame, canvas);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Margins;

    fn frame() -> PageFrame {
        PageFrame {
            index: 0,
            width: 595.0,
            height: 842.0,
            margins: Margins::default(),
        }
    }

    fn text_anchor(d: &Decoration) -> (f32, f32, String) {
        match d {
            Decoration::Text { x, y, text, .. } => (*x, *y, text.clone()),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn font_style_flags_parse() {
        let s: FontStyle = "bius".parse().unwrap();
        assert!(s.bold && s.italic && s.underline && s.strikethrough);
        assert_eq!("n".parse::<FontStyle>().unwrap(), FontStyle::NORMAL);
        assert_eq!(FontStyle::NORMAL.flags(), "n");
        assert_eq!("ib".parse::<FontStyle>().unwrap().flags(), "bi");
        assert!(matches!(
            "bx".parse::<FontStyle>(),
            Err(OptionsError::InvalidFontStyle('x'))
        ));
    }

    #[test]
    fn align_parse() {
        assert_eq!(Align::from_char('l').unwrap(), Align::Left);
        assert_eq!("center".parse::<Align>().unwrap(), Align::Center);
        assert!(Align::from_char('x').is_err());
    }

    #[test]
    fn placeholder_replaced_everywhere() {
        let hf = HeaderFooter::with_text("{pN} of page {pN}");
        assert_eq!(hf.resolve_text(7), "7 of page 7");
    }

    #[test]
    fn header_right_aligned_position() {
        let mut canvas = PageCanvas::new();
        let hf = HeaderFooter::with_text("Page {pN}");
        paint(&hf, Placement::Header, 3, &frame(), &mut canvas);
        let (x, y, text) = text_anchor(&canvas.decorations()[0]);
        assert_eq!(x, 545.0);
        assert_eq!(y, 842.0 - 60.0 + 19.0);
        assert_eq!(text, "Page 3");
        assert_eq!(canvas.decorations().len(), 1);
    }

    #[test]
    fn footer_centered_with_line() {
        let mut canvas = PageCanvas::new();
        let hf = HeaderFooter {
            align: Align::Center,
            y_correct: 50.0,
            line: true,
            line_x_correct: 100.0,
            ..HeaderFooter::with_text("Page {pN}.")
        };
        paint(&hf, Placement::Footer, 1, &frame(), &mut canvas);
        let (x, y, _) = text_anchor(&canvas.decorations()[0]);
        assert_eq!(x, (60.0 + 545.0) / 2.0);
        assert_eq!(y, 50.0 - 29.0 + 50.0);
        assert_eq!(
            canvas.decorations()[1],
            Decoration::Rule {
                x1: 110.0,
                x2: 495.0,
                y: y + 10.0,
                width: 1.0
            }
        );
    }

    #[test]
    fn header_left_line_trimmed_on_right() {
        let mut canvas = PageCanvas::new();
        let hf = HeaderFooter {
            align: Align::Left,
            line: true,
            line_x_correct: 20.0,
            line_y_correct: -2.0,
            ..HeaderFooter::with_text("x")
        };
        paint(&hf, Placement::Header, 1, &frame(), &mut canvas);
        let (x, y, _) = text_anchor(&canvas.decorations()[0]);
        assert_eq!(x, 60.0);
        assert_eq!(
            canvas.decorations()[1],
            Decoration::Rule {
                x1: 60.0,
                x2: 525.0,
                y: y - 4.0 - 2.0,
                width: 1.0
            }
        );
    }

    #[test]
    fn negative_start_suppresses_first_pages() {
        let options = Html2PdfOptions::default()
            .with_start_page_number(-2)
            .with_footer(HeaderFooter::with_text("{pN}"));
        let mut painter = HeaderFooterPainter::new(&options);
        painter.on_open_document();

        let mut painted = Vec::new();
        for index in 0..4 {
            let f = PageFrame { index, ..frame() };
            let mut canvas = PageCanvas::new();
            painter.on_start_page(&f);
            painter.on_end_page(&f, &mut canvas);
            painted.push(canvas.decorations().len());
        }
        assert_eq!(painted, vec![0, 0, 1, 1]);
        assert_eq!(painter.page_number(), 2);
    }

    #[test]
    fn hidden_descriptors_paint_nothing() {
        let options = Html2PdfOptions::default();
        let mut painter = HeaderFooterPainter::new(&options);
        let mut canvas = PageCanvas::new();
        painter.on_open_document();
        painter.on_start_page(&frame());
        painter.on_end_page(&frame(), &mut canvas);
        assert!(canvas.decorations().is_empty());
    }

    #[test]
    fn counter_wraps_at_i32_max() {
        let options = Html2PdfOptions::default()
            .with_start_page_number(i32::MAX)
            .with_footer(HeaderFooter::with_text("{pN}"));
        let mut painter = HeaderFooterPainter::new(&options);
        let mut canvas = PageCanvas::new();
        painter.on_open_document();
        painter.on_start_page(&frame());
        painter.on_end_page(&frame(), &mut canvas);
        assert_eq!(painter.page_number(), i32::MIN);
        assert!(canvas.decorations().is_empty());
    }
}
