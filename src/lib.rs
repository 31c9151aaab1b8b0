//! # svg2jpeg
//!
//! Convert SVG files to JPEG images, inlining remote raster references first.
//!
//! ## Why this crate?
//!
//! SVG rasterizers resolve `<image href="…">` elements from the local
//! filesystem only — a document referencing a remotely-hosted photo (common
//! in generated social-preview templates) renders with an empty box where the
//! photo should be. This crate fetches each external reference, embeds it as
//! a base64 data URI, rasterises the now self-contained document at an exact
//! pixel size, and writes an opaque JPEG with transparency flattened onto
//! white.
//!
//! ## Pipeline Overview
//!
//! ```text
//! SVG
//!  │
//!  ├─ 1. Inline  fetch http(s) <image> references → data URIs (sequential)
//!  ├─ 2. Render  rasterise via resvg at exactly width × height
//!  └─ 3. Encode  flatten alpha onto white, JPEG at the requested quality
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use svg2jpeg::{convert_to_file, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default(); // 1200×630, quality 95
//!     let output = convert_to_file("cover.svg", "cover.jpg", &config).await?;
//!     eprintln!(
//!         "{} bytes, {} of {} images inlined",
//!         output.stats.output_bytes,
//!         output.stats.images_inlined,
//!         output.stats.references_found
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `svg2jpeg` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! svg2jpeg = { version = "0.3", default-features = false }
//! ```
//!
//! ## Failure model
//!
//! A remote image that cannot be fetched is logged, recorded in
//! [`ConversionOutput::failures`], and left as-is — the conversion continues.
//! Everything else (bad input path, unparsable SVG, encode/write errors) is
//! fatal and returned as [`Svg2JpegError`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{
    convert, convert_str, convert_sync, convert_to_file, default_output_path, ConversionOutput,
    ConversionStats,
};
pub use error::{FetchError, Svg2JpegError};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
