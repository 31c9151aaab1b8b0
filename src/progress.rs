//! Progress-callback trait for per-image inlining events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! real-time events while the inliner fetches remote images.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a channel, a log line, or a terminal progress bar —
//! without the library knowing anything about how the host application
//! communicates. The trait is `Send + Sync` so a callback can also be shared
//! with other tasks in the host application.

use std::sync::Arc;

/// Called by the inlining stage as it fetches each remote image.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Fetches are sequential, so implementations are never
/// invoked concurrently, but the trait still requires `Send + Sync` because
/// the conversion may run on any tokio worker thread.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before any fetch, with the number of external references.
    ///
    /// Not called when the document contains no external references.
    fn on_inline_start(&self, total_refs: usize) {
        let _ = total_refs;
    }

    /// Called just before an image is requested.
    ///
    /// # Arguments
    /// * `n`     — 1-indexed reference number, in document order
    /// * `total` — total external references
    /// * `url`   — the URL about to be fetched
    fn on_image_start(&self, n: usize, total: usize, url: &str) {
        let _ = (n, total, url);
    }

    /// Called when an image was fetched and embedded.
    ///
    /// `encoded_len` is the byte length of the produced data URI.
    fn on_image_inlined(&self, n: usize, total: usize, encoded_len: usize) {
        let _ = (n, total, encoded_len);
    }

    /// Called when a fetch failed; the reference keeps its original URL.
    fn on_image_error(&self, n: usize, total: usize, error: &str) {
        let _ = (n, total, error);
    }

    /// Called once after all references have been attempted.
    fn on_inline_complete(&self, total_refs: usize, inlined: usize) {
        let _ = (total_refs, inlined);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
