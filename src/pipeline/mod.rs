//! Pipeline stages for SVG-to-JPEG conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch the rasterisation backend) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! inline ──▶ render ──▶ encode
//! (data URIs) (resvg)   (white-flattened JPEG)
//! ```
//!
//! 1. [`inline`] — rewrite external `<image>` references as base64 data URIs;
//!    the only stage with network I/O
//! 2. [`render`] — rasterise the document to an exact-size pixmap; runs in
//!    `spawn_blocking` because rendering is CPU-bound
//! 3. [`encode`] — flatten transparency onto white and JPEG-encode

pub mod encode;
pub mod inline;
pub mod render;
