//! Error types.
//!
//! Every failure of a render call surfaces as a [`RenderError`]; its message
//! always starts with "rendering failed". Paste failures keep the underlying
//! I/O or PDF error in [`MergeError`].

use std::io;

use thiserror::Error;

/// Failure of an HTML → PDF render call.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("rendering failed: {0}")]
    Io(#[from] io::Error),

    #[error("rendering failed: invalid options: {0}")]
    Options(#[from] OptionsError),

    #[error("rendering failed: layout error: {0}")]
    Layout(String),

    #[error("rendering failed: PDF encoding error: {0}")]
    Pdf(String),
}

/// Invalid configuration values.
#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("invalid font style flag '{0}' (expected any of n, b, i, u, s)")]
    InvalidFontStyle(char),

    #[error("invalid alignment '{0}' (expected l, c or r)")]
    InvalidAlign(String),

    #[error("unknown font family '{0}'")]
    UnknownFontFamily(String),

    #[error("page size must be positive, got {width} x {height}")]
    InvalidPageSize { width: f32, height: f32 },

    #[error("margins leave no content area on a {width} x {height} page")]
    MarginsExceedPage { width: f32, height: f32 },

    #[error("cannot read options file: {0}")]
    Read(#[from] io::Error),

    #[error("cannot parse options: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure while pasting PDF files together.
#[derive(Error, Debug)]
pub enum MergeError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Pdf(#[from] lopdf::Error),

    #[error("malformed PDF document: {0}")]
    Malformed(String),
}
