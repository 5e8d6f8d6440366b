//! Layout engine – uses Taffy to compute a flexbox layout from a styled DOM
//! tree, then converts the result into a tree of positioned boxes.
//!
//! Every block-level element becomes a flex column. Consecutive inline
//! children of a block are merged into one anonymous text leaf, word-wrapped
//! at build time so its height is known before Taffy runs. Tables are flex
//! columns of rows; rows are flex rows of fixed-width cells.

use std::collections::{HashMap, HashSet};
use std::fmt::Display as FmtDisplay;

use taffy::prelude::*;

use crate::dom::Tag;
use crate::error::RenderError;
use crate::fonts::{wrap_inline, FontManager, InlineItem};
use crate::images;
use crate::layout_config::{TextLine, TextRun};
use crate::style::{self, ComputedStyle, StyledNode};

/// Gap between a list marker and the item's content.
const MARKER_GAP: f32 = 4.0;

// ---------------------------------------------------------------------------
// Intermediate layout tree (pre-pagination)
// ---------------------------------------------------------------------------

/// A positioned box in document coordinates (before page splitting).
#[derive(Debug, Clone)]
pub struct PositionedBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub style: ComputedStyle,
    pub content: BoxContent,
    /// Bullet or number of a list item.
    pub marker: Option<TextLine>,
    pub children: Vec<PositionedBox>,
    pub page_break_before: bool,
    pub page_break_after: bool,
    /// Table box whose header row repeats on continuation pages.
    pub repeat_header: bool,
    /// Table row made only of `<th>` cells.
    pub header_row: bool,
}

impl PositionedBox {
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// True when this box or a descendant forces a page break.
    pub fn has_page_break(&self) -> bool {
        self.page_break_before
            || self.page_break_after
            || self.children.iter().any(PositionedBox::has_page_break)
    }
}

#[derive(Debug, Clone)]
pub enum BoxContent {
    None,
    /// Wrapped lines of an anonymous inline run.
    Text { lines: Vec<TextLine> },
    Image { src: String },
}

fn layout_err(e: impl FmtDisplay) -> RenderError {
    RenderError::Layout(e.to_string())
}

// ---------------------------------------------------------------------------
// Build Taffy tree from styled nodes
// ---------------------------------------------------------------------------

struct LayoutBuilder<'a> {
    taffy: TaffyTree<()>,
    fonts: &'a FontManager,
    node_styles: HashMap<NodeId, ComputedStyle>,
    node_content: HashMap<NodeId, BoxContent>,
    markers: HashMap<NodeId, TextLine>,
    header_rows: HashSet<NodeId>,
}

impl<'a> LayoutBuilder<'a> {
    fn new(fonts: &'a FontManager) -> Self {
        Self {
            taffy: TaffyTree::new(),
            fonts,
            node_styles: HashMap::new(),
            node_content: HashMap::new(),
            markers: HashMap::new(),
            header_rows: HashSet::new(),
        }
    }

    /// Build the children of a block. Runs of inline content become text
    /// leaves; block-level children become their own nodes.
    fn build_children(
        &mut self,
        children: &[StyledNode],
        parent: &ComputedStyle,
        parent_tag: &Tag,
        inner_width: f32,
    ) -> Result<Vec<NodeId>, RenderError> {
        let mut ids = Vec::new();
        let mut inline_run: Vec<&StyledNode> = Vec::new();
        let mut list_counter = 0u32;

        for child in children {
            let StyledNode::Element {
                tag,
                style: child_style,
                children: grandchildren,
                attrs,
            } = child
            else {
                inline_run.push(child);
                continue;
            };
            if child_style.display == style::Display::Inline {
                inline_run.push(child);
                continue;
            }

            if let Some(id) = self.build_inline_run(&inline_run, parent, inner_width)? {
                ids.push(id);
            }
            inline_run.clear();

            let id = self.build_element(tag, child_style, grandchildren, attrs, inner_width)?;
            if *tag == Tag::Li && matches!(parent_tag, Tag::Ul | Tag::Ol) {
                list_counter += 1;
                let marker = if *parent_tag == Tag::Ol {
                    format!("{list_counter}.")
                } else {
                    "\u{2022}".to_string()
                };
                let line = self.marker_line(&marker, child_style);
                self.markers.insert(id, line);
            }
            ids.push(id);
        }

        if let Some(id) = self.build_inline_run(&inline_run, parent, inner_width)? {
            ids.push(id);
        }
        Ok(ids)
    }

    fn build_element(
        &mut self,
        tag: &Tag,
        style: &ComputedStyle,
        children: &[StyledNode],
        attrs: &HashMap<String, String>,
        avail: f32,
    ) -> Result<NodeId, RenderError> {
        if *tag == Tag::Img {
            let src = attrs.get("src").cloned().unwrap_or_default();
            return self.build_image(src, style, avail);
        }
        if style.display == style::Display::Table {
            return self.build_table(style, children, avail);
        }

        let outer = outer_width(style, avail);
        let inner = (outer - horizontal_extras(style)).max(0.0);
        let child_ids = self.build_children(children, style, tag, inner)?;
        let node = self
            .taffy
            .new_with_children(block_style(style), &child_ids)
            .map_err(layout_err)?;
        self.node_styles.insert(node, style.clone());
        Ok(node)
    }

    /// Wrap a run of inline nodes into a single text leaf. Whitespace-only
    /// runs produce nothing.
    fn build_inline_run(
        &mut self,
        run: &[&StyledNode],
        block: &ComputedStyle,
        width: f32,
    ) -> Result<Option<NodeId>, RenderError> {
        let mut items = Vec::new();
        for node in run {
            collect_inline(node, &mut items);
        }
        let has_content = items.iter().any(|item| match item {
            InlineItem::Text { text, .. } => !text.trim().is_empty(),
            InlineItem::LineBreak => true,
        });
        if !has_content {
            return Ok(None);
        }

        let wrapped = wrap_inline(&items, width, block.text_indent, self.fonts);
        let mut lines = Vec::with_capacity(wrapped.len());
        let mut y = 0.0;
        for line in wrapped {
            let size = if line.max_size > 0.0 {
                line.max_size
            } else {
                block.font_size
            };
            let line_height = self.fonts.line_height(size, block.line_height);
            let slack = (width - line.width).max(0.0);
            let x_offset = match block.text_align {
                style::TextAlign::Left => 0.0,
                style::TextAlign::Center => slack / 2.0,
                style::TextAlign::Right => slack,
            };
            lines.push(TextLine {
                runs: line
                    .runs
                    .into_iter()
                    .map(|r| TextRun {
                        text: r.text,
                        x: r.x,
                        width: r.width,
                        style: r.style,
                    })
                    .collect(),
                x_offset,
                baseline: y + (line_height - size) / 2.0 + self.fonts.ascent(size),
                height: line_height,
            });
            y += line_height;
        }

        let node = self
            .taffy
            .new_leaf(Style {
                size: Size {
                    width: Dimension::Length(width.max(0.0)),
                    height: Dimension::Length(y),
                },
                flex_shrink: 0.0,
                ..Default::default()
            })
            .map_err(layout_err)?;
        // Only text properties apply to the anonymous box.
        self.node_styles.insert(node, block.inherit());
        self.node_content.insert(node, BoxContent::Text { lines });
        Ok(Some(node))
    }

    fn build_image(
        &mut self,
        src: String,
        style: &ComputedStyle,
        avail: f32,
    ) -> Result<NodeId, RenderError> {
        let (width, height) = image_box_size(&src, style, avail);
        let node = self
            .taffy
            .new_leaf(Style {
                size: Size {
                    width: Dimension::Length(width),
                    height: Dimension::Length(height),
                },
                margin: margin_rect(style),
                flex_shrink: 0.0,
                ..Default::default()
            })
            .map_err(layout_err)?;
        self.node_styles.insert(node, style.clone());
        self.node_content.insert(node, BoxContent::Image { src });
        Ok(node)
    }

    fn build_table(
        &mut self,
        style: &ComputedStyle,
        children: &[StyledNode],
        avail: f32,
    ) -> Result<NodeId, RenderError> {
        let outer = outer_width(style, avail);
        let inner = (outer - horizontal_extras(style)).max(0.0);

        let mut rows = Vec::new();
        collect_rows(children, &mut rows);
        let widths = column_widths(&rows, inner);

        let mut row_ids = Vec::with_capacity(rows.len());
        for row in rows {
            row_ids.push(self.build_row(row, style, &widths)?);
        }

        let mut ts = block_style(style);
        ts.size.width = Dimension::Length(outer);
        let node = self
            .taffy
            .new_with_children(ts, &row_ids)
            .map_err(layout_err)?;
        self.node_styles.insert(node, style.clone());
        Ok(node)
    }

    fn build_row(
        &mut self,
        row: &StyledNode,
        table: &ComputedStyle,
        widths: &[f32],
    ) -> Result<NodeId, RenderError> {
        let cells = row_cells(row);
        let mut cell_ids = Vec::with_capacity(cells.len());
        for (i, cell) in cells.iter().enumerate() {
            let StyledNode::Element {
                tag,
                style,
                children,
                ..
            } = cell
            else {
                continue;
            };
            let mut cell_style = style.clone();
            cell_style.margin_top = 0.0;
            cell_style.margin_right = 0.0;
            cell_style.margin_bottom = 0.0;
            cell_style.margin_left = 0.0;
            if !table.border.is_zero() && cell_style.border.is_zero() {
                cell_style.border = style::Sides::all(1.0);
                cell_style.border_color = table.border_color;
            }
            let width = widths.get(i).copied().unwrap_or(0.0);
            let inner = (width - horizontal_extras(&cell_style)).max(0.0);
            let child_ids = self.build_children(children, &cell_style, tag, inner)?;

            let mut ts = block_style(&cell_style);
            ts.size.width = Dimension::Length(width);
            let id = self
                .taffy
                .new_with_children(ts, &child_ids)
                .map_err(layout_err)?;
            self.node_styles.insert(id, cell_style);
            cell_ids.push(id);
        }

        let row_style = row.style().clone();
        let ts = Style {
            display: taffy::Display::Flex,
            flex_direction: taffy::FlexDirection::Row,
            align_items: Some(taffy::AlignItems::Stretch),
            flex_shrink: 0.0,
            ..Default::default()
        };
        let node = self
            .taffy
            .new_with_children(ts, &cell_ids)
            .map_err(layout_err)?;
        let all_th = !cells.is_empty()
            && cells
                .iter()
                .all(|c| matches!(c, StyledNode::Element { tag: Tag::Th, .. }));
        if all_th {
            self.header_rows.insert(node);
        }
        self.node_styles.insert(node, row_style);
        Ok(node)
    }

    /// Marker line placed left of the item, on the first line's baseline.
    fn marker_line(&self, marker: &str, item: &ComputedStyle) -> TextLine {
        let run_style = item.run_style();
        let width = self
            .fonts
            .measure_text_width(marker, run_style.size, &run_style.font);
        let line_height = self.fonts.line_height(item.font_size, item.line_height);
        TextLine {
            runs: vec![TextRun {
                text: marker.to_string(),
                x: -(width + MARKER_GAP),
                width,
                style: run_style,
            }],
            x_offset: 0.0,
            baseline: item.padding_top
                + item.border.top
                + (line_height - item.font_size) / 2.0
                + self.fonts.ascent(item.font_size),
            height: line_height,
        }
    }

    /// Extract positioned boxes after layout computation.
    fn extract(&self, node: NodeId, offset_x: f32, offset_y: f32) -> Result<PositionedBox, RenderError> {
        let layout = self.taffy.layout(node).map_err(layout_err)?;
        let style = self.node_styles.get(&node).cloned().unwrap_or_default();
        let content = self
            .node_content
            .get(&node)
            .cloned()
            .unwrap_or(BoxContent::None);

        let x = offset_x + layout.location.x;
        let y = offset_y + layout.location.y;

        let children = self
            .taffy
            .children(node)
            .map_err(layout_err)?
            .into_iter()
            .map(|child| self.extract(child, x, y))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PositionedBox {
            x,
            y,
            width: layout.size.width,
            height: layout.size.height,
            page_break_before: style.page_break_before,
            page_break_after: style.page_break_after,
            repeat_header: style.repeat_header && style.display == style::Display::Table,
            header_row: self.header_rows.contains(&node),
            marker: self.markers.get(&node).cloned(),
            style,
            content,
            children,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn collect_inline(node: &StyledNode, items: &mut Vec<InlineItem>) {
    match node {
        StyledNode::Text { text, style } => items.push(InlineItem::Text {
            text: text.clone(),
            style: style.run_style(),
        }),
        StyledNode::Element { tag: Tag::Br, .. } => items.push(InlineItem::LineBreak),
        StyledNode::Element { tag, children, .. } => {
            if *tag == Tag::Img {
                log::debug!("image inside inline content is not rendered");
            }
            for child in children {
                collect_inline(child, items);
            }
        }
    }
}

fn collect_rows<'s>(children: &'s [StyledNode], rows: &mut Vec<&'s StyledNode>) {
    for child in children {
        let StyledNode::Element {
            tag,
            style,
            children: grandchildren,
            ..
        } = child
        else {
            continue;
        };
        if *tag == Tag::Tr || style.display == style::Display::TableRow {
            rows.push(child);
        } else if tag.is_row_group() {
            collect_rows(grandchildren, rows);
        } else {
            log::debug!("ignoring <{}> directly inside a table", tag.name());
        }
    }
}

fn row_cells(row: &StyledNode) -> Vec<&StyledNode> {
    let StyledNode::Element { children, .. } = row else {
        return Vec::new();
    };
    children
        .iter()
        .filter(|c| match c {
            StyledNode::Element { tag, style, .. } => {
                matches!(tag, Tag::Td | Tag::Th) || style.display == style::Display::TableCell
            }
            StyledNode::Text { .. } => false,
        })
        .collect()
}

/// Column widths: the first explicit cell width per column wins, the rest
/// of the table width is shared equally between the other columns.
fn column_widths(rows: &[&StyledNode], inner: f32) -> Vec<f32> {
    let columns = rows.iter().map(|r| row_cells(r).len()).max().unwrap_or(0);
    let mut explicit: Vec<Option<f32>> = vec![None; columns];
    for row in rows {
        for (i, cell) in row_cells(row).iter().enumerate() {
            if explicit[i].is_none() {
                explicit[i] = cell.style().width.resolve(inner);
            }
        }
    }
    let fixed: f32 = explicit.iter().flatten().sum();
    let auto = explicit.iter().filter(|w| w.is_none()).count();
    let share = if auto > 0 {
        ((inner - fixed) / auto as f32).max(0.0)
    } else {
        0.0
    };
    explicit.into_iter().map(|w| w.unwrap_or(share)).collect()
}

fn image_box_size(src: &str, style: &ComputedStyle, avail: f32) -> (f32, f32) {
    let known_w = style.width.resolve(avail);
    let known_h = match style.height {
        style::Dimension::Px(v) => Some(v),
        _ => None,
    };
    if let (Some(w), Some(h)) = (known_w, known_h) {
        return (w, h);
    }

    let intrinsic = images::load_image_bytes(src)
        .ok()
        .and_then(|bytes| images::intrinsic_size(&bytes));
    let Some((px_w, px_h)) = intrinsic else {
        let shown: String = src.chars().take(48).collect();
        log::warn!("cannot determine the size of image {shown:?}");
        return (known_w.unwrap_or(0.0), known_h.unwrap_or(0.0));
    };
    let (px_w, px_h) = (px_w as f32, px_h as f32);
    let aspect = px_w / px_h;
    match (known_w, known_h) {
        (Some(w), _) => (w, w / aspect),
        (None, Some(h)) => (h * aspect, h),
        (None, None) if px_w > avail && avail > 0.0 => (avail, avail / aspect),
        (None, None) => (px_w, px_h),
    }
}

/// Border-box width of a block inside `avail`.
fn outer_width(s: &ComputedStyle, avail: f32) -> f32 {
    s.width
        .resolve(avail)
        .unwrap_or(avail - s.margin_left - s.margin_right)
        .max(0.0)
}

fn horizontal_extras(s: &ComputedStyle) -> f32 {
    s.padding_left + s.padding_right + s.border.left + s.border.right
}

fn block_style(s: &ComputedStyle) -> Style {
    Style {
        display: taffy::Display::Flex,
        flex_direction: taffy::FlexDirection::Column,
        size: Size {
            width: dim_to_taffy(s.width),
            height: dim_to_taffy(s.height),
        },
        min_size: Size {
            width: Dimension::Length(0.0),
            height: Dimension::Auto,
        },
        flex_shrink: 0.0,
        margin: margin_rect(s),
        padding: Rect {
            top: LengthPercentage::Length(s.padding_top),
            right: LengthPercentage::Length(s.padding_right),
            bottom: LengthPercentage::Length(s.padding_bottom),
            left: LengthPercentage::Length(s.padding_left),
        },
        border: Rect {
            top: LengthPercentage::Length(s.border.top),
            right: LengthPercentage::Length(s.border.right),
            bottom: LengthPercentage::Length(s.border.bottom),
            left: LengthPercentage::Length(s.border.left),
        },
        ..Default::default()
    }
}

fn margin_rect(s: &ComputedStyle) -> Rect<LengthPercentageAuto> {
    Rect {
        top: LengthPercentageAuto::Length(s.margin_top),
        right: LengthPercentageAuto::Length(s.margin_right),
        bottom: LengthPercentageAuto::Length(s.margin_bottom),
        left: LengthPercentageAuto::Length(s.margin_left),
    }
}

fn dim_to_taffy(d: style::Dimension) -> Dimension {
    match d {
        style::Dimension::Auto => Dimension::Auto,
        style::Dimension::Px(v) => Dimension::Length(v),
        style::Dimension::Percent(v) => Dimension::Percent(v / 100.0),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Lay out a styled tree inside a column `content_width` points wide whose
/// left edge sits at `left`. Returns the top-level boxes in document
/// coordinates (y measured from the top of the flow).
pub fn compute_layout(
    styled_nodes: &[StyledNode],
    content_width: f32,
    left: f32,
    fonts: &FontManager,
) -> Result<Vec<PositionedBox>, RenderError> {
    let mut builder = LayoutBuilder::new(fonts);
    let root_style = ComputedStyle::default();
    let child_ids = builder.build_children(styled_nodes, &root_style, &Tag::Body, content_width)?;

    let root = builder
        .taffy
        .new_with_children(
            Style {
                display: taffy::Display::Flex,
                flex_direction: taffy::FlexDirection::Column,
                size: Size {
                    width: Dimension::Length(content_width),
                    height: Dimension::Auto,
                },
                ..Default::default()
            },
            &child_ids,
        )
        .map_err(layout_err)?;

    builder
        .taffy
        .compute_layout(
            root,
            Size {
                width: AvailableSpace::Definite(content_width),
                height: AvailableSpace::MaxContent,
            },
        )
        .map_err(layout_err)?;

    let root_box = builder.extract(root, left, 0.0)?;
    Ok(root_box.children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;
    use crate::style::{build_styled_tree, Stylesheet};

    const PIXEL_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

    fn layout(html: &str) -> Vec<PositionedBox> {
        let dom = parse_html(html);
        let styled = build_styled_tree(&dom, None, &Stylesheet::default());
        compute_layout(&styled, 400.0, 50.0, &FontManager::default()).unwrap()
    }

    fn text_boxes(b: &PositionedBox, out: &mut Vec<Vec<TextLine>>) {
        if let BoxContent::Text { lines } = &b.content {
            out.push(lines.clone());
        }
        for c in &b.children {
            text_boxes(c, out);
        }
    }

    fn all_text(boxes: &[PositionedBox]) -> Vec<Vec<TextLine>> {
        let mut out = Vec::new();
        for b in boxes {
            text_boxes(b, &mut out);
        }
        out
    }

    #[test]
    fn layout_simple_paragraph() {
        let boxes = layout("<p>Hello world</p>");
        assert_eq!(boxes.len(), 1);
        let p = &boxes[0];
        assert_eq!(p.x, 50.0);
        assert_eq!(p.width, 400.0);
        assert!(p.height > 0.0);
        let texts = all_text(&boxes);
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0][0].runs[0].text, "Hello world");
    }

    #[test]
    fn inline_elements_share_one_text_box() {
        let boxes = layout("<p>plain <b>bold</b> <i>it</i></p>");
        let texts = all_text(&boxes);
        assert_eq!(texts.len(), 1);
        let runs = &texts[0][0].runs;
        assert_eq!(runs.len(), 4);
        assert!(runs[1].style.font.bold);
        assert!(runs[3].style.font.italic);
        assert!(runs[1].x > runs[0].x);
    }

    #[test]
    fn br_splits_lines() {
        let texts = all_text(&layout("<p>one<br>two</p>"));
        assert_eq!(texts[0].len(), 2);
        assert!(texts[0][1].baseline > texts[0][0].baseline);
    }

    #[test]
    fn whitespace_between_blocks_is_ignored() {
        let boxes = layout("<div>\n  <p>a</p>\n  <p>b</p>\n</div>");
        assert_eq!(boxes[0].children.len(), 2);
    }

    #[test]
    fn centered_text_is_offset() {
        let texts = all_text(&layout("<p style='text-align:center'>hi</p>"));
        let line = &texts[0][0];
        let expected = (400.0 - line.runs[0].width) / 2.0;
        assert!((line.x_offset - expected).abs() < 0.01);
    }

    #[test]
    fn blocks_stack_vertically() {
        let boxes = layout("<div>a</div><div>b</div>");
        assert_eq!(boxes.len(), 2);
        assert!((boxes[1].y - boxes[0].bottom()).abs() < 0.01);
    }

    #[test]
    fn table_columns_share_width() {
        let boxes = layout("<table><tr><td>a</td><td>b</td></tr></table>");
        let table = &boxes[0];
        let row = &table.children[0];
        assert_eq!(row.children.len(), 2);
        assert!((row.children[0].width - 200.0).abs() < 0.01);
        assert!((row.children[1].x - (50.0 + 200.0)).abs() < 0.01);
    }

    #[test]
    fn explicit_cell_width_is_kept() {
        let boxes = layout("<table><tr><td width='100'>a</td><td>b</td></tr></table>");
        let row = &boxes[0].children[0];
        assert!((row.children[0].width - 100.0).abs() < 0.01);
        assert!((row.children[1].width - 300.0).abs() < 0.01);
    }

    #[test]
    fn header_rows_and_repeat_flag() {
        let boxes = layout(
            "<table style='repeat-header:yes'><thead><tr><th>H</th></tr></thead>\
             <tbody><tr><td>x</td></tr></tbody></table>",
        );
        let table = &boxes[0];
        assert!(table.repeat_header);
        assert_eq!(table.children.len(), 2);
        assert!(table.children[0].header_row);
        assert!(!table.children[1].header_row);
    }

    #[test]
    fn list_items_get_markers() {
        let boxes = layout("<ol><li>a</li><li>b</li></ol><ul><li>c</li></ul>");
        let marker = |b: &PositionedBox| b.marker.as_ref().unwrap().runs[0].text.clone();
        assert_eq!(marker(&boxes[0].children[0]), "1.");
        assert_eq!(marker(&boxes[0].children[1]), "2.");
        assert_eq!(marker(&boxes[1].children[0]), "\u{2022}");
        assert!(boxes[0].children[0].marker.as_ref().unwrap().runs[0].x < 0.0);
    }

    #[test]
    fn image_size_from_intrinsic_aspect() {
        let boxes = layout(&format!("<img src='{PIXEL_PNG}' style='width: 64px'>"));
        assert_eq!(boxes[0].width, 64.0);
        assert_eq!(boxes[0].height, 64.0);
        assert!(matches!(boxes[0].content, BoxContent::Image { .. }));
    }

    #[test]
    fn unreadable_image_uses_explicit_size() {
        let boxes = layout("<img src='missing.png' width='40' height='20'>");
        assert_eq!((boxes[0].width, boxes[0].height), (40.0, 20.0));
    }

    #[test]
    fn page_break_flags_propagate() {
        let boxes = layout("<div><p>a</p><span style='page-break-before:always'></span></div>");
        assert!(boxes[0].has_page_break());
        assert!(boxes[0].children[1].page_break_before);
    }
}
