//! # html2pdf – HTML → PDF with page headers and footers
//!
//! A façade over a small rendering pipeline. [`Html2Pdf`] takes an
//! immutable [`Html2PdfOptions`] (page size and orientation, margins, start
//! page number, header and footer descriptors) and renders HTML text to a
//! PDF stream; [`paste`] concatenates existing PDF files.
//!
//! The pipeline stages are:
//!
//! 1. **Parse** – HTML string → DOM tree ([`dom`])
//! 2. **Style** – `<style>` rules and inline declarations ([`style`])
//! 3. **Layout** – flexbox layout with Taffy ([`layout`])
//! 4. **Paginate** – split into pages inside the margins ([`pagination`])
//! 5. **Decorate** – run the page hook over every page ([`page_events`],
//!    [`header_footer`])
//! 6. **Render** – emit PDF bytes via printpdf ([`render`])
//!
//! ```no_run
//! use html2pdf::{HeaderFooter, Html2Pdf, Html2PdfOptions};
//!
//! let options = Html2PdfOptions::default()
//!     .with_start_page_number(-1)
//!     .with_footer(HeaderFooter::with_text("Page {pN}"));
//! let out = std::fs::File::create("out.pdf")?;
//! Html2Pdf::new(options).run("<h1>Title</h1><p>Body</p>", out)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod dom;
pub mod error;
pub mod fonts;
pub mod header_footer;
pub mod images;
pub mod layout;
pub mod layout_config;
pub mod merge;
pub mod options;
pub mod page_events;
pub mod pagination;
pub mod pipeline;
pub mod render;
pub mod style;
pub mod templates;

// Re-exports for convenience
pub use error::{MergeError, OptionsError, RenderError};
pub use fonts::FontFamily;
pub use header_footer::{Align, FontStyle, HeaderFooter, HeaderFooterPainter};
pub use merge::paste;
pub use options::{Html2PdfOptions, Margins, PageOrientation};
pub use page_events::{NoPageEvents, PageCanvas, PageEvents, PageFrame};
pub use pipeline::{generate_pdf, Html2Pdf, RenderedPdf};
