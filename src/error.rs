//! Error types for the svg2jpeg library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Svg2JpegError`] — **Fatal**: the conversion cannot proceed at all
//!   (missing input, unparsable SVG, encode or write failure). Returned as
//!   `Err(Svg2JpegError)` from the top-level `convert*` functions.
//!
//! * [`FetchError`] — **Non-fatal**: a single remote image reference could not
//!   be fetched during inlining. Collected into
//!   [`crate::convert::ConversionOutput::failures`] while the reference is
//!   left untouched, so the rasterizer still gets a complete document and the
//!   conversion continues.
//!
//! The separation lets callers decide their own tolerance: treat any missed
//! image as an error, log and continue, or ignore the failures entirely.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the svg2jpeg library.
///
/// Per-reference fetch failures use [`FetchError`] and are stored in
/// [`crate::convert::ConversionOutput`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Svg2JpegError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("SVG file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input path does not carry an `.svg` extension.
    #[error("Input file must be an SVG: '{path}'\nOnly .svg inputs are accepted.")]
    NotSvg { path: PathBuf },

    /// The file exists but could not be read.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Rasterisation errors ──────────────────────────────────────────────
    /// usvg rejected the document.
    #[error("SVG parsing failed: {detail}")]
    InvalidSvg { detail: String },

    /// The requested output size cannot back a pixel buffer.
    #[error("Invalid output dimensions {width}x{height}: both sides must be at least 1 pixel")]
    InvalidDimensions { width: u32, height: u32 },

    // ── Encoding errors ───────────────────────────────────────────────────
    /// The JPEG codec returned an error.
    #[error("JPEG encoding failed: {detail}")]
    EncodeFailed { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal failure fetching one remote image reference.
///
/// The affected reference keeps its original URL; the rasterizer will later
/// fail to resolve it, which is not fatal either (the image area renders
/// empty).
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum FetchError {
    /// Connection, DNS, or TLS failure.
    #[error("'{url}': request failed: {reason}")]
    Network { url: String, reason: String },

    /// The request exceeded the configured fetch timeout.
    #[error("'{url}': timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    /// The server answered with a non-success status.
    #[error("'{url}': HTTP {status}")]
    Status { url: String, status: u16 },

    /// The response body exceeds the inline size cap.
    #[error("'{url}': {len} bytes exceeds the {max}-byte inline limit")]
    TooLarge { url: String, len: usize, max: usize },
}

impl FetchError {
    /// The URL this failure refers to.
    pub fn url(&self) -> &str {
        match self {
            FetchError::Network { url, .. }
            | FetchError::Timeout { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::TooLarge { url, .. } => url,
        }
    }
}
