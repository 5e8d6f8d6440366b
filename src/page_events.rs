//! Per-page hook driven over a paginated document.
//!
//! The render stage calls [`PageEvents::on_open_document`] once, then for each
//! page `on_start_page` followed by `on_end_page`. Whatever the hook draws on
//! the [`PageCanvas`] is stored with the page and painted over its content.

use crate::layout_config::{Decoration, LayoutConfig};
use crate::options::Margins;

/// Geometry of the page an event refers to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    /// Zero-based page index.
    pub index: usize,
    pub width: f32,
    pub height: f32,
    pub margins: Margins,
}

impl PageFrame {
    /// Left edge of the content area (PDF user space).
    pub fn content_left(&self) -> f32 {
        self.margins.left
    }

    pub fn content_right(&self) -> f32 {
        self.width - self.margins.right
    }

    /// Top edge of the content area; y grows upwards.
    pub fn content_top(&self) -> f32 {
        self.height - self.margins.top
    }

    pub fn content_bottom(&self) -> f32 {
        self.margins.bottom
    }
}

/// Page lifecycle callbacks. All methods default to no-ops.
pub trait PageEvents {
    fn on_open_document(&mut self) {}

    fn on_start_page(&mut self, _frame: &PageFrame) {}

    fn on_end_page(&mut self, _frame: &PageFrame, _canvas: &mut PageCanvas) {}
}

/// A hook that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPageEvents;

impl PageEvents for NoPageEvents {}

/// Drawing surface handed to [`PageEvents::on_end_page`].
#[derive(Debug, Default, Clone)]
pub struct PageCanvas {
    decorations: Vec<Decoration>,
}

impl PageCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, decoration: Decoration) {
        self.decorations.push(decoration);
    }

    pub fn draw_rule(&mut self, x1: f32, x2: f32, y: f32, width: f32) {
        self.push(Decoration::Rule { x1, x2, y, width });
    }

    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    pub fn into_decorations(self) -> Vec<Decoration> {
        self.decorations
    }
}

/// Run `events` over every page of `layout`, storing what it draws.
pub fn dispatch_page_events(layout: &mut LayoutConfig, events: &mut dyn PageEvents) {
    events.on_open_document();
    let (width, height, margins) = (layout.page_width_pt, layout.page_height_pt, layout.margins);
    for page in &mut layout.pages {
        let frame = PageFrame {
            index: page.page_index,
            width,
            height,
            margins,
        };
        events.on_start_page(&frame);
        let mut canvas = PageCanvas::new();
        events.on_end_page(&frame, &mut canvas);
        page.decorations.extend(canvas.into_decorations());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout_config::PageLayout;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl PageEvents for Recorder {
        fn on_open_document(&mut self) {
            self.calls.push("open".into());
        }

        fn on_start_page(&mut self, frame: &PageFrame) {
            self.calls.push(format!("start {}", frame.index));
        }

        fn on_end_page(&mut self, frame: &PageFrame, canvas: &mut PageCanvas) {
            self.calls.push(format!("end {}", frame.index));
            canvas.draw_rule(0.0, 10.0, frame.index as f32, 1.0);
        }
    }

    #[test]
    fn events_fire_in_page_order() {
        let mut layout = LayoutConfig::new("t", 100.0, 200.0, Margins::default());
        layout.pages = vec![PageLayout::new(0), PageLayout::new(1)];
        let mut rec = Recorder::default();
        dispatch_page_events(&mut layout, &mut rec);
        assert_eq!(rec.calls, ["open", "start 0", "end 0", "start 1", "end 1"]);
        assert_eq!(layout.pages[1].decorations.len(), 1);
    }

    #[test]
    fn frame_edges() {
        let f = PageFrame {
            index: 0,
            width: 595.0,
            height: 842.0,
            margins: Margins::new(60.0, 50.0, 60.0, 50.0),
        };
        assert_eq!(f.content_left(), 60.0);
        assert_eq!(f.content_right(), 545.0);
        assert_eq!(f.content_top(), 782.0);
        assert_eq!(f.content_bottom(), 50.0);
    }
}
