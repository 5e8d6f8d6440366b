//! Integration tests for the html2pdf façade.
//!
//! These tests validate:
//! - PDF output exists, has a valid format and the expected page count
//! - Header/footer numbering, including suppressed leading pages
//! - Page size, orientation and margins of the layout
//! - Page breaks and repeated table headers
//! - Pasting PDF files together

use html2pdf::dom::{parse_html, DomNode, Tag};
use html2pdf::layout_config::{Decoration, LayoutBox, LayoutConfig};
use html2pdf::{
    generate_pdf, paste, templates, Align, HeaderFooter, Html2Pdf, Html2PdfOptions, Margins,
};

// =====================================================================
// Helpers
// =====================================================================

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 100, "PDF too small: {} bytes", bytes.len());
    assert_eq!(&bytes[0..5], b"%PDF-", "Missing PDF header");
}

fn pdf_page_count(bytes: &[u8]) -> usize {
    lopdf::Document::load_mem(bytes)
        .expect("output should parse as PDF")
        .get_pages()
        .len()
}

fn numbered_options() -> Html2PdfOptions {
    Html2PdfOptions::default()
        .with_header(HeaderFooter::with_text("Header {pN}"))
        .with_footer(HeaderFooter {
            align: Align::Center,
            line: true,
            ..HeaderFooter::with_text("Page {pN}")
        })
}

fn decoration_texts(config: &LayoutConfig, page: usize) -> Vec<String> {
    config.pages[page]
        .decorations
        .iter()
        .filter_map(|d| match d {
            Decoration::Text { text, .. } => Some(text.clone()),
            Decoration::Rule { .. } => None,
        })
        .collect()
}

fn visit_box(lbox: &LayoutBox, f: &mut dyn FnMut(&LayoutBox)) {
    f(lbox);
    for child in &lbox.children {
        visit_box(child, f);
    }
}

fn page_text(config: &LayoutConfig, page: usize) -> String {
    let mut text = String::new();
    for lbox in &config.pages[page].boxes {
        visit_box(lbox, &mut |b| {
            if let Some(content) = &b.text {
                text.push_str(&content.plain_text());
                text.push('\n');
            }
        });
    }
    text
}

// =====================================================================
// DOM parsing
// =====================================================================

#[test]
fn parse_document_with_head_and_body() {
    let html = "<html><head><style>p { color: red }</style></head>\
                <body><p>Hi</p></body></html>";
    let dom = parse_html(html);
    assert_eq!(dom.len(), 1);
    let DomNode::Element(root) = &dom[0] else {
        panic!("Expected <html> element");
    };
    assert_eq!(root.tag, Tag::Html);
    assert!(root
        .children
        .iter()
        .any(|n| matches!(n, DomNode::Element(e) if e.tag == Tag::Body)));
}

// =====================================================================
// Rendering
// =====================================================================

#[test]
fn default_options_render_single_page() {
    let bytes = generate_pdf(templates::minimal_template(), &Html2PdfOptions::default()).unwrap();
    assert_valid_pdf(&bytes);
    assert_eq!(pdf_page_count(&bytes), 1);
}

#[test]
fn report_template_renders() {
    let rendered = Html2Pdf::default()
        .render(templates::report_template())
        .unwrap();
    assert_valid_pdf(&rendered.bytes);
    assert_eq!(pdf_page_count(&rendered.bytes), rendered.page_count());
}

#[test]
fn run_reader_writes_pdf() {
    let html = templates::multi_page_template(5);
    let mut out = Vec::new();
    Html2Pdf::default()
        .run_reader(std::io::BufReader::new(html.as_bytes()), &mut out)
        .unwrap();
    assert_valid_pdf(&out);
}

#[test]
fn demo_renders_two_pages() {
    let rendered = Html2Pdf::new(templates::demo_options())
        .render(&templates::demo_template(None))
        .unwrap();
    assert_valid_pdf(&rendered.bytes);
    assert_eq!(rendered.page_count(), 2);
    assert_eq!(pdf_page_count(&rendered.bytes), 2);
}

#[test]
fn invalid_margins_are_rejected() {
    let options = Html2PdfOptions::default().with_margins(Margins::new(300.0, 300.0, 10.0, 10.0));
    let err = generate_pdf("<p>x</p>", &options).unwrap_err();
    assert!(err.to_string().starts_with("rendering failed"));
}

// =====================================================================
// Header / footer numbering
// =====================================================================

#[test]
fn page_number_placeholder_is_replaced() {
    let config = Html2Pdf::new(numbered_options().with_start_page_number(4))
        .layout("<p>x</p>")
        .unwrap();
    assert_eq!(decoration_texts(&config, 0), ["Header 5", "Page 5"]);
}

#[test]
fn every_page_is_numbered_in_order() {
    let config = Html2Pdf::new(numbered_options())
        .layout(&templates::multi_page_template(80))
        .unwrap();
    assert!(config.pages.len() > 1, "expected several pages");
    for (i, _) in config.pages.iter().enumerate() {
        let texts = decoration_texts(&config, i);
        assert_eq!(texts[1], format!("Page {}", i + 1));
    }
}

#[test]
fn negative_start_suppresses_leading_pages() {
    let html = "<p>one</p>\
                <p style=\"page-break-before: always\">two</p>\
                <p style=\"page-break-before: always\">three</p>";
    let config = Html2Pdf::new(numbered_options().with_start_page_number(-2))
        .layout(html)
        .unwrap();
    assert_eq!(config.pages.len(), 3);
    assert!(config.pages[0].decorations.is_empty());
    assert!(config.pages[1].decorations.is_empty());
    assert_eq!(decoration_texts(&config, 2), ["Header 1", "Page 1"]);
}

#[test]
fn hidden_descriptors_paint_nothing() {
    let config = Html2Pdf::default().layout("<p>x</p>").unwrap();
    assert!(config.pages[0].decorations.is_empty());
}

#[test]
fn footer_sits_below_content_area() {
    let options = numbered_options();
    let config = Html2Pdf::new(options.clone()).layout("<p>x</p>").unwrap();
    let footer_y = config.pages[0]
        .decorations
        .iter()
        .find_map(|d| match d {
            Decoration::Text { text, y, .. } if text.starts_with("Page") => Some(*y),
            _ => None,
        })
        .unwrap();
    assert!(footer_y < options.margins.bottom);
}

// =====================================================================
// Page geometry and breaks
// =====================================================================

#[test]
fn overlong_paragraph_flows_onto_following_pages() {
    let words: Vec<String> = (0..4000).map(|i| format!("word{i}")).collect();
    let html = format!("<p>{}</p>", words.join(" "));
    let options = Html2PdfOptions::default();
    let rendered = Html2Pdf::new(options.clone()).render(&html).unwrap();

    assert!(rendered.page_count() > 5, "got {} pages", rendered.page_count());
    assert_eq!(pdf_page_count(&rendered.bytes), rendered.page_count());
    let limit = rendered.layout.page_height_pt - options.margins.bottom + 0.01;
    for page in &rendered.layout.pages {
        for lbox in &page.boxes {
            visit_box(lbox, &mut |b| {
                assert!(b.y + b.height <= limit, "box bottom {} past {limit}", b.y + b.height);
            });
        }
    }
    let last = rendered.layout.pages.len() - 1;
    assert!(page_text(&rendered.layout, last).contains("word3999"));
}

#[test]
fn landscape_swaps_page_dimensions() {
    let options = Html2PdfOptions::default().with_landscape(true);
    let rendered = Html2Pdf::new(options).render("<p>wide</p>").unwrap();
    assert!(rendered.layout.page_width_pt > rendered.layout.page_height_pt);
    assert_valid_pdf(&rendered.bytes);
}

#[test]
fn boxes_stay_inside_margins() {
    let options = Html2PdfOptions::default();
    let config = Html2Pdf::new(options.clone())
        .layout(&templates::multi_page_template(60))
        .unwrap();
    for page in &config.pages {
        for lbox in &page.boxes {
            assert!(lbox.x >= options.margins.left - 0.01);
            assert!(lbox.y >= options.margins.top - 0.01);
            assert!(lbox.y + lbox.height <= config.page_height_pt - options.margins.bottom + 0.01);
        }
    }
}

#[test]
fn forced_page_breaks_start_new_pages() {
    let html = "<p>first</p><div style=\"page-break-before: always\"><p>second</p></div>";
    let rendered = Html2Pdf::default().render(html).unwrap();
    assert_eq!(rendered.page_count(), 2);
    assert!(page_text(&rendered.layout, 1).contains("second"));
    assert_eq!(pdf_page_count(&rendered.bytes), 2);
}

#[test]
fn table_header_repeats_on_each_page() {
    let config = Html2Pdf::default()
        .layout(&templates::long_table_template(120))
        .unwrap();
    assert!(config.pages.len() > 1, "table should span pages");
    for i in 0..config.pages.len() {
        assert!(
            page_text(&config, i).contains("Quantity"),
            "page {} lacks the header row",
            i + 1
        );
    }
}

#[test]
fn layout_json_round_trip_renders() {
    let config = Html2Pdf::default()
        .layout(templates::report_template())
        .unwrap();
    let parsed = LayoutConfig::from_json(&config.to_json().unwrap()).unwrap();
    assert_eq!(parsed.pages.len(), config.pages.len());
    let fonts = html2pdf::fonts::FontManager::new();
    assert_valid_pdf(&html2pdf::render::render_pdf(&parsed, &fonts).unwrap());
}

// =====================================================================
// Text encoding
// =====================================================================

#[test]
fn footer_text_is_encoded_as_winansi() {
    let rendered = Html2Pdf::new(templates::demo_options())
        .render(&templates::demo_template(None))
        .unwrap();
    let doc = lopdf::Document::load_mem(&rendered.bytes).unwrap();
    let first_page = *doc.get_pages().get(&1).unwrap();
    let content = lopdf::content::Content::decode(&doc.get_page_content(first_page).unwrap()).unwrap();

    let shown: Vec<(Vec<u8>, lopdf::StringFormat)> = content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(lopdf::Object::String(bytes, format)) => Some((bytes.clone(), *format)),
            _ => None,
        })
        .collect();
    // "Cañón and Page 1." with ñ = 0xF1 and ó = 0xF3.
    let footer = b"Ca\xF1\xF3n and Page 1.";
    let (_, format) = shown
        .iter()
        .find(|(bytes, _)| bytes.as_slice() == footer)
        .expect("footer text should be shown as WinAnsi bytes");
    assert_eq!(*format, lopdf::StringFormat::Hexadecimal);
}

// =====================================================================
// Paste
// =====================================================================

#[test]
fn paste_without_sources_creates_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("empty.pdf");
    let pages = paste(&target, &[] as &[std::path::PathBuf]).unwrap();
    assert_eq!(pages, 0);
    assert_eq!(std::fs::metadata(&target).unwrap().len(), 0);
}

#[test]
fn paste_concatenates_rendered_documents() {
    let dir = tempfile::tempdir().unwrap();
    let options = numbered_options();
    let mut sources = Vec::new();
    let mut expected = 0;
    for (i, paragraphs) in [1usize, 60, 3].into_iter().enumerate() {
        let rendered = Html2Pdf::new(options.clone())
            .render(&templates::multi_page_template(paragraphs))
            .unwrap();
        expected += rendered.page_count();
        let path = dir.path().join(format!("part{i}.pdf"));
        std::fs::write(&path, &rendered.bytes).unwrap();
        sources.push(path);
    }

    let target = dir.path().join("all.pdf");
    let pages = paste(&target, &sources).unwrap();
    assert_eq!(pages, expected);
    assert_eq!(pdf_page_count(&std::fs::read(&target).unwrap()), expected);
}

#[test]
fn paste_reports_unreadable_source() {
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("bogus.pdf");
    std::fs::write(&bogus, b"not a pdf").unwrap();
    assert!(paste(dir.path().join("out.pdf"), &[bogus]).is_err());
}
