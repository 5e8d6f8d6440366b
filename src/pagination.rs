//! Pagination – splits positioned boxes into pages.
//!
//! Handles:
//! - page boundaries of the configured content area
//! - `page-break-before` / `page-break-after` hints, also on nested boxes
//! - table row splitting across pages, repeating header rows when the
//!   table asks for it
//! - text splitting between wrapped lines

use crate::layout::{BoxContent, PositionedBox};
use crate::layout_config::*;
use crate::options::Html2PdfOptions;
use crate::style;

/// A box scheduled for placement, with break hints inherited from any
/// container that was expanded around it.
struct FlowItem<'a> {
    pbox: &'a PositionedBox,
    break_before: bool,
    break_after: bool,
}

/// Recursively expand pure containers that either exceed one page or hold a
/// forced break, so their children can be placed individually.
fn flatten_for_pagination<'a>(
    boxes: &'a [PositionedBox],
    content_height: f32,
    out: &mut Vec<FlowItem<'a>>,
) {
    for pbox in boxes {
        let expandable = matches!(pbox.content, BoxContent::None)
            && pbox.style.display != style::Display::Table
            && !pbox.children.is_empty()
            && (pbox.height > content_height
                || pbox.children.iter().any(PositionedBox::has_page_break));
        if !expandable {
            out.push(FlowItem {
                pbox,
                break_before: pbox.page_break_before,
                break_after: pbox.page_break_after,
            });
            continue;
        }

        let first = out.len();
        flatten_for_pagination(&pbox.children, content_height, out);
        if let Some(item) = out.get_mut(first) {
            item.break_before |= pbox.page_break_before;
        }
        if let Some(item) = out.last_mut() {
            item.break_after |= pbox.page_break_after;
        }
    }
}

struct Paginator {
    config: LayoutConfig,
    current: PageLayout,
    /// Document-space y at which the current page begins.
    page_start: f32,
    content_height: f32,
    top: f32,
}

impl Paginator {
    fn start_new_page(&mut self, doc_y: f32) {
        let next = PageLayout::new(self.config.pages.len() + 1);
        self.config
            .pages
            .push(std::mem::replace(&mut self.current, next));
        self.page_start = doc_y;
    }

    fn y_on_page(&self, pbox: &PositionedBox) -> f32 {
        (pbox.y - self.page_start).max(0.0)
    }

    fn overflows(&self, pbox: &PositionedBox) -> bool {
        self.y_on_page(pbox) + pbox.height > self.content_height
    }

    fn place(&mut self, pbox: &PositionedBox, y_on_page: f32) {
        let lb = build_layout_box(pbox, pbox.x, self.top + y_on_page);
        self.current.boxes.push(lb);
    }

    fn place_flow(&mut self, item: &FlowItem<'_>) {
        let pbox = item.pbox;
        if item.break_before && !self.current.boxes.is_empty() {
            self.start_new_page(pbox.y);
        }

        if pbox.style.display == style::Display::Table
            && !pbox.children.is_empty()
            && self.overflows(pbox)
        {
            self.split_table(pbox);
        } else if matches!(pbox.content, BoxContent::Text { .. }) && self.overflows(pbox) {
            self.split_text(pbox);
        } else {
            if self.overflows(pbox) && !self.current.boxes.is_empty() {
                self.start_new_page(pbox.y);
            }
            self.place(pbox, self.y_on_page(pbox));
        }

        if item.break_after {
            self.start_new_page(pbox.bottom());
        }
    }

    /// Place a table row by row. Table background and outline are not
    /// drawn once the table spans pages.
    fn split_table(&mut self, table: &PositionedBox) {
        let header: Vec<&PositionedBox> = if table.repeat_header {
            table.children.iter().take_while(|r| r.header_row).collect()
        } else {
            Vec::new()
        };
        let header_top = header.first().map(|r| r.y).unwrap_or(0.0);
        let header_height = header.last().map(|r| r.bottom() - header_top).unwrap_or(0.0);

        for row in &table.children {
            if self.overflows(row) && !self.current.boxes.is_empty() {
                self.start_new_page(row.y);
                if !row.header_row && !header.is_empty() {
                    for h in &header {
                        self.place(h, h.y - header_top);
                    }
                    self.page_start -= header_height;
                }
            }
            self.place(row, self.y_on_page(row));
        }
    }

    /// Place a text box line by line, continuing on the next page at the
    /// first line that does not fit. A line taller than the content area is
    /// placed alone and overflows.
    fn split_text(&mut self, pbox: &PositionedBox) {
        let BoxContent::Text { lines } = &pbox.content else {
            return;
        };
        let mut chunk: Vec<TextLine> = Vec::new();
        let mut chunk_top = 0.0;
        let mut top = 0.0;
        for line in lines {
            let line_y = pbox.y + top;
            if line_y + line.height - self.page_start > self.content_height {
                if !chunk.is_empty() {
                    let piece = std::mem::take(&mut chunk);
                    self.place_text_piece(pbox, chunk_top, piece);
                    self.start_new_page(line_y);
                } else if !self.current.boxes.is_empty() {
                    self.start_new_page(line_y);
                }
                chunk_top = top;
            }
            chunk.push(TextLine {
                baseline: line.baseline - chunk_top,
                ..line.clone()
            });
            top += line.height;
        }
        if !chunk.is_empty() {
            self.place_text_piece(pbox, chunk_top, chunk);
        }
    }

    fn place_text_piece(&mut self, pbox: &PositionedBox, offset: f32, lines: Vec<TextLine>) {
        let piece = PositionedBox {
            y: pbox.y + offset,
            height: lines.iter().map(|l| l.height).sum(),
            content: BoxContent::Text { lines },
            marker: if offset == 0.0 { pbox.marker.clone() } else { None },
            children: Vec::new(),
            ..pbox.clone()
        };
        log::debug!(
            "text piece at offset {offset} placed on page {}",
            self.config.pages.len() + 1
        );
        self.place(&piece, self.y_on_page(&piece));
    }

    fn finish(mut self) -> LayoutConfig {
        if !self.current.boxes.is_empty() || self.config.pages.is_empty() {
            self.config.pages.push(self.current);
        }
        self.config
    }
}

/// Convert positioned boxes into a paginated [`LayoutConfig`] for the page
/// geometry of `options`. There is always at least one page.
pub fn paginate(boxes: &[PositionedBox], options: &Html2PdfOptions) -> LayoutConfig {
    let content_height = options.content_height();
    let mut flow = Vec::new();
    flatten_for_pagination(boxes, content_height, &mut flow);

    let mut paginator = Paginator {
        config: LayoutConfig::new(
            &options.title,
            options.effective_width(),
            options.effective_height(),
            options.margins,
        ),
        current: PageLayout::new(0),
        page_start: 0.0,
        content_height,
        top: options.margins.top,
    };
    for item in &flow {
        paginator.place_flow(item);
    }
    let config = paginator.finish();
    log::debug!("paginated {} boxes onto {} page(s)", flow.len(), config.pages.len());
    config
}

/// Recursively build a LayoutBox tree where every box carries page-absolute
/// x/y coordinates (origin = top-left of the physical page).
///
/// Child positions are document-space absolutes, so `child.y - pbox.y` is
/// the child's offset within its parent.
fn build_layout_box(pbox: &PositionedBox, abs_x: f32, abs_y: f32) -> LayoutBox {
    let mut lb = LayoutBox::new(abs_x, abs_y, pbox.width, pbox.height);

    if !pbox.style.background_color.is_transparent() {
        lb.background_color = Some(pbox.style.background_color.to_array());
    }

    let border = pbox.style.border;
    if !border.is_zero() {
        lb.border = Some(BorderStyle {
            top: border.top,
            right: border.right,
            bottom: border.bottom,
            left: border.left,
            color: pbox.style.border_color.to_array(),
        });
    }

    match &pbox.content {
        BoxContent::Text { lines } => {
            lb.text = Some(TextContent {
                lines: lines.clone(),
            });
        }
        BoxContent::Image { src } => {
            lb.image = Some(ImageContent {
                src: src.clone(),
                width: pbox.width,
                height: pbox.height,
            });
        }
        BoxContent::None => {}
    }
    lb.marker = pbox.marker.clone();

    for child in &pbox.children {
        let child_box = build_layout_box(child, child.x, abs_y + (child.y - pbox.y));
        lb.children.push(child_box);
    }
    lb
}
