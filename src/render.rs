//! PDF renderer – takes a [`LayoutConfig`] and produces PDF bytes using
//! `printpdf` (v0.8 ops-based API).
//!
//! Boxes are painted in tree order: background, border, text, marker,
//! image, then children. Page decorations are painted last, over the
//! content.

use std::collections::{HashMap, HashSet};

use printpdf::*;

use crate::error::RenderError;
use crate::fonts::{FontFamily, FontKey, FontManager};
use crate::header_footer::Align;
use crate::images;
use crate::layout_config::{Decoration, LayoutBox, LayoutConfig, TextLine};

/// Points to millimetres.
const PT_TO_MM: f32 = 0.352778;

/// A printpdf XObject together with the pixel dimensions of the source image.
struct ImageResource {
    xobj_id: XObjectId,
    px_width: u32,
    px_height: u32,
}

/// Render a LayoutConfig into PDF bytes.
///
/// Images that cannot be loaded or decoded are skipped with a warning.
pub fn render_pdf(config: &LayoutConfig, fonts: &FontManager) -> Result<Vec<u8>, RenderError> {
    let page_w = Mm(config.page_width_pt * PT_TO_MM);
    let page_h = Mm(config.page_height_pt * PT_TO_MM);

    let mut doc = PdfDocument::new(&config.title);

    // ── Pre-register all images ────────────────────────────────────────────
    let mut all_srcs: HashSet<&str> = HashSet::new();
    for page_layout in &config.pages {
        for lbox in &page_layout.boxes {
            collect_image_srcs(lbox, &mut all_srcs);
        }
    }

    let mut image_resources: HashMap<String, ImageResource> = HashMap::new();
    let mut img_warnings: Vec<PdfWarnMsg> = Vec::new();
    for src in all_srcs {
        match register_image(&mut doc, src, &mut img_warnings) {
            Ok(res) => {
                image_resources.insert(src.to_string(), res);
            }
            Err(e) => {
                let shown: String = src.chars().take(48).collect();
                log::warn!("skipping image {shown:?}: {e}");
            }
        }
    }

    // ── Render pages ──────────────────────────────────────────────────────
    let mut pages = Vec::with_capacity(config.pages.len().max(1));
    for page_layout in &config.pages {
        let mut ops = Vec::new();
        for lbox in &page_layout.boxes {
            render_box(&mut ops, lbox, config.page_height_pt, &image_resources);
        }
        for decoration in &page_layout.decorations {
            render_decoration(&mut ops, decoration, fonts);
        }
        pages.push(PdfPage::new(page_w, page_h, ops));
    }
    if pages.is_empty() {
        pages.push(PdfPage::new(page_w, page_h, Vec::new()));
    }

    log::debug!(
        "encoding {} page(s) with {} image(s)",
        pages.len(),
        image_resources.len()
    );
    doc.with_pages(pages);
    let bytes = doc.save(&save_options(), &mut Vec::new());
    if bytes.is_empty() {
        return Err(RenderError::Pdf("encoder produced no output".into()));
    }
    Ok(bytes)
}

fn register_image(
    doc: &mut PdfDocument,
    src: &str,
    warnings: &mut Vec<PdfWarnMsg>,
) -> Result<ImageResource, String> {
    let bytes = images::load_image_bytes(src)?;
    let (px_width, px_height) =
        images::intrinsic_size(&bytes).ok_or_else(|| "unsupported image data".to_string())?;
    let raw = RawImage::decode_from_bytes(&bytes, warnings)
        .map_err(|e| format!("PDF encode error: {e}"))?;
    Ok(ImageResource {
        xobj_id: doc.add_image(&raw),
        px_width,
        px_height,
    })
}

/// Encode a string as WinAnsi (Windows-1252) bytes, the encoding builtin
/// fonts are declared with. Characters outside it become `?`.
fn to_winlatin(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{00A0}' => 0x20,
            c if (c as u32) < 256 => c as u8,
            _ => b'?',
        })
        .collect()
}

/// Text-showing ops for a builtin font. printpdf only takes UTF-8 text for
/// builtin fonts, so the WinAnsi bytes go out as a raw `Tj` hex string. The
/// empty `WriteTextBuiltinFont` registers the font in the page resources.
fn show_text_ops(text: &str, font: BuiltinFont) -> [Op; 2] {
    [
        Op::WriteTextBuiltinFont {
            items: Vec::new(),
            font,
        },
        Op::Unknown {
            key: "Tj".to_string(),
            value: vec![DictItem::String {
                data: to_winlatin(text),
                literal: false,
            }],
        },
    ]
}

/// Raw text operators must survive serialisation.
fn save_options() -> PdfSaveOptions {
    PdfSaveOptions {
        secure: false,
        ..PdfSaveOptions::default()
    }
}

fn builtin_font(key: &FontKey) -> BuiltinFont {
    match (key.family, key.bold, key.italic) {
        (FontFamily::Times, false, false) => BuiltinFont::TimesRoman,
        (FontFamily::Times, true, false) => BuiltinFont::TimesBold,
        (FontFamily::Times, false, true) => BuiltinFont::TimesItalic,
        (FontFamily::Times, true, true) => BuiltinFont::TimesBoldItalic,
        (FontFamily::Helvetica, false, false) => BuiltinFont::Helvetica,
        (FontFamily::Helvetica, true, false) => BuiltinFont::HelveticaBold,
        (FontFamily::Helvetica, false, true) => BuiltinFont::HelveticaOblique,
        (FontFamily::Helvetica, true, true) => BuiltinFont::HelveticaBoldOblique,
        (FontFamily::Courier, false, false) => BuiltinFont::Courier,
        (FontFamily::Courier, true, false) => BuiltinFont::CourierBold,
        (FontFamily::Courier, false, true) => BuiltinFont::CourierOblique,
        (FontFamily::Courier, true, true) => BuiltinFont::CourierBoldOblique,
        (FontFamily::Symbol, ..) => BuiltinFont::Symbol,
        (FontFamily::ZapfDingbats, ..) => BuiltinFont::ZapfDingbats,
    }
}

fn rgb(c: [f32; 4]) -> Color {
    Color::Rgb(Rgb {
        r: c[0],
        g: c[1],
        b: c[2],
        icc_profile: None,
    })
}

fn point(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    }
}

fn fill_rect(ops: &mut Vec<Op>, x: f32, bottom: f32, width: f32, height: f32, color: [f32; 4]) {
    ops.push(Op::SetFillColor { col: rgb(color) });
    ops.push(Op::DrawPolygon {
        polygon: Polygon {
            rings: vec![PolygonRing {
                points: vec![
                    point(x, bottom),
                    point(x + width, bottom),
                    point(x + width, bottom + height),
                    point(x, bottom + height),
                ],
            }],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        },
    });
}

fn stroke_line(ops: &mut Vec<Op>, from: (f32, f32), to: (f32, f32), thickness: f32, color: [f32; 4]) {
    ops.push(Op::SetOutlineColor { col: rgb(color) });
    ops.push(Op::SetOutlineThickness { pt: Pt(thickness) });
    ops.push(Op::DrawLine {
        line: Line {
            points: vec![point(from.0, from.1), point(to.0, to.1)],
            is_closed: false,
        },
    });
}

/// Write one run of text with its baseline at `(x, y)` in PDF space.
#[allow(clippy::too_many_arguments)]
fn write_text(
    ops: &mut Vec<Op>,
    text: &str,
    x: f32,
    y: f32,
    width: f32,
    key: &FontKey,
    size: f32,
    color: [f32; 4],
    underline: bool,
    strikethrough: bool,
) {
    let font = builtin_font(key);
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point { x: Pt(x), y: Pt(y) },
    });
    ops.push(Op::SetFontSizeBuiltinFont {
        size: Pt(size),
        font,
    });
    ops.push(Op::SetFillColor { col: rgb(color) });
    ops.extend(show_text_ops(text, font));
    ops.push(Op::EndTextSection);

    let thickness = (size * 0.05).max(0.5);
    if underline {
        let uy = y - size * 0.12;
        stroke_line(ops, (x, uy), (x + width, uy), thickness, color);
    }
    if strikethrough {
        let sy = y + size * 0.3;
        stroke_line(ops, (x, sy), (x + width, sy), thickness, color);
    }
}

/// Draw a wrapped line whose runs are offset from `left`; `top` is the PDF
/// y of the owning box's top edge.
fn render_line(ops: &mut Vec<Op>, line: &TextLine, left: f32, top: f32) {
    let y = top - line.baseline;
    for run in &line.runs {
        let decorated = run.style.underline || run.style.strikethrough;
        if run.text.trim().is_empty() && !decorated {
            continue;
        }
        write_text(
            ops,
            &run.text,
            left + line.x_offset + run.x,
            y,
            run.width,
            &run.style.font,
            run.style.size,
            run.style.color,
            run.style.underline,
            run.style.strikethrough,
        );
    }
}

/// Recursively collect all unique `image.src` strings from a [`LayoutBox`] tree.
fn collect_image_srcs<'a>(lbox: &'a LayoutBox, srcs: &mut HashSet<&'a str>) {
    if let Some(img) = &lbox.image {
        srcs.insert(img.src.as_str());
    }
    for child in &lbox.children {
        collect_image_srcs(child, srcs);
    }
}

/// Recursively render a LayoutBox and its children into PDF ops.
fn render_box(
    ops: &mut Vec<Op>,
    lbox: &LayoutBox,
    page_height: f32,
    images: &HashMap<String, ImageResource>,
) {
    // Layout origin is top-left, PDF origin bottom-left.
    let top = page_height - lbox.y;
    let bottom = top - lbox.height;
    let (left, right) = (lbox.x, lbox.x + lbox.width);

    if let Some(bg) = lbox.background_color {
        fill_rect(ops, left, bottom, lbox.width, lbox.height, bg);
    }

    if let Some(border) = &lbox.border {
        let c = border.color;
        if border.top > 0.0 {
            let y = top - border.top / 2.0;
            stroke_line(ops, (left, y), (right, y), border.top, c);
        }
        if border.bottom > 0.0 {
            let y = bottom + border.bottom / 2.0;
            stroke_line(ops, (left, y), (right, y), border.bottom, c);
        }
        if border.left > 0.0 {
            let x = left + border.left / 2.0;
            stroke_line(ops, (x, bottom), (x, top), border.left, c);
        }
        if border.right > 0.0 {
            let x = right - border.right / 2.0;
            stroke_line(ops, (x, bottom), (x, top), border.right, c);
        }
    }

    if let Some(text) = &lbox.text {
        for line in &text.lines {
            render_line(ops, line, left, top);
        }
    }

    if let Some(marker) = &lbox.marker {
        render_line(ops, marker, left, top);
    }

    if let Some(img) = &lbox.image {
        if let Some(res) = images.get(&img.src) {
            // At dpi=72 printpdf renders 1 px = 1 pt.
            let scale_x = img.width / res.px_width.max(1) as f32;
            let scale_y = img.height / res.px_height.max(1) as f32;
            ops.push(Op::UseXobject {
                id: res.xobj_id.clone(),
                transform: XObjectTransform {
                    translate_x: Some(Pt(left)),
                    translate_y: Some(Pt(top - img.height)),
                    dpi: Some(72.0),
                    scale_x: Some(scale_x),
                    scale_y: Some(scale_y),
                    rotate: None,
                },
            });
        }
    }

    for child in &lbox.children {
        render_box(ops, child, page_height, images);
    }
}

fn render_decoration(ops: &mut Vec<Op>, decoration: &Decoration, fonts: &FontManager) {
    const INK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
    match decoration {
        Decoration::Text {
            text,
            x,
            y,
            align,
            font,
            size,
            underline,
            strikethrough,
        } => {
            let width = fonts.measure_text_width(text, *size, font);
            let start = match align {
                Align::Left => *x,
                Align::Center => x - width / 2.0,
                Align::Right => x - width,
            };
            write_text(
                ops,
                text,
                start,
                *y,
                width,
                font,
                *size,
                INK,
                *underline,
                *strikethrough,
            );
        }
        Decoration::Rule { x1, x2, y, width } => {
            stroke_line(ops, (*x1, *y), (*x2, *y), *width, INK);
        }
    }
}
