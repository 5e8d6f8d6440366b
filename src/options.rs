//! Render options – page geometry, start page number and the header/footer
//! descriptors.
//!
//! Options are plain values: build one with `Default` plus the consuming
//! `with_*` methods (or load it from JSON) and hand it to
//! [`Html2Pdf`](crate::pipeline::Html2Pdf).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::OptionsError;
use crate::header_footer::HeaderFooter;

/// Default page width in points.
pub const DEFAULT_PAGE_WIDTH: f32 = 595.0;
/// Default page height in points.
pub const DEFAULT_PAGE_HEIGHT: f32 = 842.0;

/// Page orientation for the generated PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageOrientation {
    /// The page rectangle is used as given (default).
    #[default]
    Portrait,
    /// The page rectangle is rotated: width and height swap.
    Landscape,
}

/// Page margins in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 60.0,
            right: 50.0,
            top: 60.0,
            bottom: 50.0,
        }
    }
}

impl Margins {
    pub fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }
}

/// Configuration of a render call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Html2PdfOptions {
    /// Document title embedded in the PDF metadata.
    pub title: String,
    /// Page width in points (default 595).
    pub page_width: f32,
    /// Page height in points (default 842).
    pub page_height: f32,
    pub orientation: PageOrientation,
    /// Default: left 60, right 50, top 60, bottom 50.
    pub margins: Margins,
    /// Value the page counter starts from; the first page shows
    /// `start_page_number + 1`. A negative value `-n` hides header and
    /// footer on the first `n` pages.
    pub start_page_number: i32,
    pub header: HeaderFooter,
    pub footer: HeaderFooter,
}

impl Default for Html2PdfOptions {
    fn default() -> Self {
        Self {
            title: "html2pdf output".to_string(),
            page_width: DEFAULT_PAGE_WIDTH,
            page_height: DEFAULT_PAGE_HEIGHT,
            orientation: PageOrientation::Portrait,
            margins: Margins::default(),
            start_page_number: 0,
            header: HeaderFooter::default(),
            footer: HeaderFooter::default(),
        }
    }
}

impl Html2PdfOptions {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_page_size(mut self, width: f32, height: f32) -> Self {
        self.page_width = width;
        self.page_height = height;
        self
    }

    pub fn with_landscape(mut self, landscape: bool) -> Self {
        self.orientation = if landscape {
            PageOrientation::Landscape
        } else {
            PageOrientation::Portrait
        };
        self
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn with_start_page_number(mut self, start_page_number: i32) -> Self {
        self.start_page_number = start_page_number;
        self
    }

    pub fn with_header(mut self, header: HeaderFooter) -> Self {
        self.header = header;
        self
    }

    pub fn with_footer(mut self, footer: HeaderFooter) -> Self {
        self.footer = footer;
        self
    }

    pub fn is_landscape(&self) -> bool {
        self.orientation == PageOrientation::Landscape
    }

    /// Effective page width after applying orientation.
    pub fn effective_width(&self) -> f32 {
        match self.orientation {
            PageOrientation::Portrait => self.page_width,
            PageOrientation::Landscape => self.page_height,
        }
    }

    /// Effective page height after applying orientation.
    pub fn effective_height(&self) -> f32 {
        match self.orientation {
            PageOrientation::Portrait => self.page_height,
            PageOrientation::Landscape => self.page_width,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.effective_width() - self.margins.left - self.margins.right
    }

    pub fn content_height(&self) -> f32 {
        self.effective_height() - self.margins.top - self.margins.bottom
    }

    /// Check that the page has a positive size and a positive content area.
    pub fn validate(&self) -> Result<(), OptionsError> {
        let (width, height) = (self.effective_width(), self.effective_height());
        if !(width > 0.0 && height > 0.0) {
            return Err(OptionsError::InvalidPageSize { width, height });
        }
        if !(self.content_width() > 0.0 && self.content_height() > 0.0) {
            return Err(OptionsError::MarginsExceedPage { width, height });
        }
        Ok(())
    }

    /// Parse options from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, OptionsError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, OptionsError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialise to pretty JSON.
    pub fn to_json(&self) -> Result<String, OptionsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontFamily;
    use crate::header_footer::{Align, FontStyle};

    #[test]
    fn defaults_match_documentation() {
        let o = Html2PdfOptions::default();
        assert_eq!(o.page_width, 595.0);
        assert_eq!(o.page_height, 842.0);
        assert!(!o.is_landscape());
        assert_eq!(o.margins, Margins::new(60.0, 50.0, 60.0, 50.0));
        assert_eq!(o.start_page_number, 0);
        for hf in [&o.header, &o.footer] {
            assert!(!hf.show);
            assert_eq!(hf.text, "");
            assert_eq!(hf.font_family, FontFamily::Times);
            assert_eq!(hf.font_style, FontStyle::NORMAL);
            assert_eq!(hf.font_size, 10.0);
            assert_eq!(hf.align, Align::Right);
            assert_eq!(hf.y_correct, 0.0);
            assert!(!hf.line);
            assert_eq!(hf.line_x_correct, 0.0);
            assert_eq!(hf.line_y_correct, 0.0);
        }
    }

    #[test]
    fn landscape_swaps_dimensions() {
        let o = Html2PdfOptions::default().with_landscape(true);
        assert_eq!(o.effective_width(), 842.0);
        assert_eq!(o.effective_height(), 595.0);
        assert_eq!(o.content_width(), 842.0 - 110.0);
    }

    #[test]
    fn validate_rejects_oversized_margins() {
        let o = Html2PdfOptions::default().with_margins(Margins::new(300.0, 300.0, 10.0, 10.0));
        assert!(matches!(
            o.validate(),
            Err(OptionsError::MarginsExceedPage { .. })
        ));
        let o = Html2PdfOptions::default().with_page_size(0.0, 100.0);
        assert!(matches!(o.validate(), Err(OptionsError::InvalidPageSize { .. })));
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let json = r#"{
            "orientation": "landscape",
            "start_page_number": -1,
            "footer": { "show": true, "text": "Page {pN}", "font_style": "bi", "align": "c" }
        }"#;
        let o = Html2PdfOptions::from_json_str(json).unwrap();
        assert!(o.is_landscape());
        assert_eq!(o.start_page_number, -1);
        assert_eq!(o.margins, Margins::default());
        assert!(o.footer.show);
        assert!(o.footer.font_style.bold && o.footer.font_style.italic);
        assert_eq!(o.footer.align, Align::Center);
        assert_eq!(o.footer.font_size, 10.0);
        assert!(!o.header.show);
    }

    #[test]
    fn json_rejects_illegal_flags() {
        let json = r#"{ "header": { "font_style": "bx" } }"#;
        assert!(Html2PdfOptions::from_json_str(json).is_err());
        let json = r#"{ "header": { "align": "q" } }"#;
        assert!(Html2PdfOptions::from_json_str(json).is_err());
    }

    #[test]
    fn json_round_trip_keeps_header() {
        let mut header = HeaderFooter::with_text("Page {pN}");
        header.font_style = "us".parse().unwrap();
        let o = Html2PdfOptions::default().with_header(header);
        let back = Html2PdfOptions::from_json_str(&o.to_json().unwrap()).unwrap();
        assert_eq!(back, o);
    }
}
