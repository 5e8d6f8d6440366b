//! Pipeline – ties together parsing, styling, layout, pagination, the page
//! hook and rendering behind [`Html2Pdf`].

use std::io::{BufRead, Read, Write};

use crate::dom::{body_children, parse_html, style_sheets};
use crate::error::RenderError;
use crate::fonts::FontManager;
use crate::header_footer::HeaderFooterPainter;
use crate::layout::compute_layout;
use crate::layout_config::LayoutConfig;
use crate::options::Html2PdfOptions;
use crate::page_events::{dispatch_page_events, PageEvents};
use crate::pagination::paginate;
use crate::render::render_pdf;
use crate::style::{build_styled_tree, Stylesheet};

/// Output of a render call.
#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    /// The paginated layout the bytes were encoded from.
    pub layout: LayoutConfig,
}

impl RenderedPdf {
    pub fn page_count(&self) -> usize {
        self.layout.pages.len()
    }
}

/// HTML → PDF converter bound to one set of options.
///
/// Holds no per-render state; one instance can serve any number of renders.
#[derive(Debug, Clone)]
pub struct Html2Pdf {
    options: Html2PdfOptions,
    fonts: FontManager,
}

impl Default for Html2Pdf {
    fn default() -> Self {
        Self::new(Html2PdfOptions::default())
    }
}

impl Html2Pdf {
    pub fn new(options: Html2PdfOptions) -> Self {
        Self {
            options,
            fonts: FontManager::new(),
        }
    }

    pub fn options(&self) -> &Html2PdfOptions {
        &self.options
    }

    /// Render `html` and write the PDF to `out`.
    pub fn run<W: Write>(&self, html: &str, mut out: W) -> Result<(), RenderError> {
        let rendered = self.render(html)?;
        out.write_all(&rendered.bytes)?;
        out.flush()?;
        Ok(())
    }

    /// Read all of `rdr` as HTML, render it and write the PDF to `out`.
    pub fn run_reader<R: BufRead, W: Write>(&self, mut rdr: R, out: W) -> Result<(), RenderError> {
        let mut html = String::new();
        rdr.read_to_string(&mut html)?;
        self.run(&html, out)
    }

    /// Render with the configured header and footer.
    pub fn render(&self, html: &str) -> Result<RenderedPdf, RenderError> {
        let mut painter = HeaderFooterPainter::new(&self.options);
        self.render_with_events(html, &mut painter)
    }

    /// Render with a caller-supplied page hook in place of the header/footer
    /// painter.
    pub fn render_with_events(
        &self,
        html: &str,
        events: &mut dyn PageEvents,
    ) -> Result<RenderedPdf, RenderError> {
        let layout = self.layout_with_events(html, events)?;
        let bytes = render_pdf(&layout, &self.fonts)?;
        log::info!(
            "rendered {} page(s), {} bytes",
            layout.pages.len(),
            bytes.len()
        );
        Ok(RenderedPdf { bytes, layout })
    }

    /// The paginated layout, header/footer decorations included, without
    /// encoding a PDF.
    pub fn layout(&self, html: &str) -> Result<LayoutConfig, RenderError> {
        let mut painter = HeaderFooterPainter::new(&self.options);
        self.layout_with_events(html, &mut painter)
    }

    fn layout_with_events(
        &self,
        html: &str,
        events: &mut dyn PageEvents,
    ) -> Result<LayoutConfig, RenderError> {
        self.options.validate()?;

        let dom = parse_html(html);
        let mut sheet = Stylesheet::default();
        for css in style_sheets(&dom) {
            sheet.add(&css);
        }
        let nodes = body_children(&dom);
        let styled = build_styled_tree(&nodes, None, &sheet);
        log::debug!(
            "parsed {} top-level node(s), stylesheet empty: {}",
            styled.len(),
            sheet.is_empty()
        );

        let boxes = compute_layout(
            &styled,
            self.options.content_width(),
            self.options.margins.left,
            &self.fonts,
        )?;
        let mut layout = paginate(&boxes, &self.options);
        dispatch_page_events(&mut layout, events);
        Ok(layout)
    }
}

/// Convenience: render `html` with `options` straight to PDF bytes.
pub fn generate_pdf(html: &str, options: &Html2PdfOptions) -> Result<Vec<u8>, RenderError> {
    Ok(Html2Pdf::new(options.clone()).render(html)?.bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header_footer::HeaderFooter;
    use crate::layout_config::Decoration;
    use crate::options::Margins;
    use crate::page_events::{PageCanvas, PageFrame};

    #[test]
    fn pipeline_basic() {
        let rendered = Html2Pdf::default()
            .render("<h1>Hello</h1><p>World</p>")
            .unwrap();
        assert_eq!(&rendered.bytes[0..5], b"%PDF-");
        assert_eq!(rendered.page_count(), 1);
    }

    #[test]
    fn run_writes_to_sink() {
        let mut out = Vec::new();
        Html2Pdf::default().run("<p>x</p>", &mut out).unwrap();
        assert!(out.starts_with(b"%PDF-"));
    }

    #[test]
    fn run_reader_reads_everything() {
        let html = "<p>one</p>\n<p>two</p>\n";
        let mut out = Vec::new();
        Html2Pdf::default()
            .run_reader(html.as_bytes(), &mut out)
            .unwrap();
        assert!(out.starts_with(b"%PDF-"));
    }

    #[test]
    fn invalid_options_fail_render() {
        let options = Html2PdfOptions::default().with_margins(Margins::new(400.0, 400.0, 0.0, 0.0));
        let err = Html2Pdf::new(options).render("<p>x</p>").unwrap_err();
        assert!(err.to_string().starts_with("rendering failed"));
    }

    #[test]
    fn header_is_painted_with_page_number() {
        let options = Html2PdfOptions::default().with_header(HeaderFooter::with_text("Page {pN}"));
        let layout = Html2Pdf::new(options).layout("<p>x</p>").unwrap();
        let texts: Vec<_> = layout.pages[0]
            .decorations
            .iter()
            .filter_map(|d| match d {
                Decoration::Text { text, .. } => Some(text.as_str()),
                Decoration::Rule { .. } => None,
            })
            .collect();
        assert_eq!(texts, ["Page 1"]);
    }

    #[test]
    fn style_blocks_apply() {
        let html = "<html><head><style>p { text-align: right }</style></head>\
                    <body><p>x</p></body></html>";
        let layout = Html2Pdf::default().layout(html).unwrap();
        let body = &layout.pages[0].boxes[0];
        let line = &body.children[0].children[0].text.as_ref().unwrap().lines[0];
        assert!(line.x_offset > 0.0);
    }

    struct Stamp;

    impl PageEvents for Stamp {
        fn on_end_page(&mut self, frame: &PageFrame, canvas: &mut PageCanvas) {
            canvas.draw_rule(0.0, frame.width, 10.0, 2.0);
        }
    }

    #[test]
    fn custom_events_replace_painter() {
        let options = Html2PdfOptions::default().with_header(HeaderFooter::with_text("H"));
        let rendered = Html2Pdf::new(options)
            .render_with_events("<p>x</p>", &mut Stamp)
            .unwrap();
        assert_eq!(
            rendered.layout.pages[0].decorations,
            vec![Decoration::Rule {
                x1: 0.0,
                x2: 595.0,
                y: 10.0,
                width: 2.0
            }]
        );
    }
}
