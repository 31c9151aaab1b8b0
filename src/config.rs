//! Configuration types for SVG-to-JPEG conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across calls and to diff two runs to understand
//! why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A ten-field constructor is unreadable and breaks on every new field. The
//! builder lets callers set only what they care about and rely on documented
//! defaults for the rest.

use crate::error::Svg2JpegError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Configuration for an SVG-to-JPEG conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use svg2jpeg::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .width(1200)
///     .height(630)
///     .quality(95)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Output width in pixels. Default: 1200.
    ///
    /// Applied directly — no aspect-ratio correction is performed, so a
    /// width/height pair that does not match the SVG's intrinsic ratio
    /// distorts the result. 1200×630 is the Open Graph preview size, the
    /// most common use of this tool.
    pub width: u32,

    /// Output height in pixels. Default: 630.
    pub height: u32,

    /// JPEG quality, 0–100. Default: 95.
    ///
    /// 95 keeps gradients and anti-aliased edges visually lossless while
    /// staying well under the file sizes social-media crawlers reject.
    pub quality: u8,

    /// Rendering DPI used when resolving physical units in the SVG.
    /// Range: 72–400. Default: 300.
    ///
    /// Only affects documents that use `pt`/`mm`/`in` lengths; pixel-unit
    /// documents render identically at any DPI. 300 keeps such documents
    /// sharp at the fixed output size.
    pub dpi: u32,

    /// Whether to inline remote `<image>` references before rasterising.
    /// Default: true.
    ///
    /// The rasterizer never touches the network, so without inlining any
    /// remotely-referenced image renders as an empty box.
    pub inline_images: bool,

    /// Timeout for each remote image fetch in seconds. Default: 10.
    ///
    /// Applied per reference; a slow host delays the conversion by at most
    /// this long. There is no retry.
    pub fetch_timeout_secs: u64,

    /// Maximum accepted body size for a fetched image in bytes.
    /// Default: 10 MiB.
    ///
    /// A data URI multiplies its payload by 4/3, and the whole document is
    /// held in memory; this cap bounds both.
    pub max_fetch_bytes: usize,

    /// Optional progress callback fired around each image fetch.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 630,
            quality: 95,
            dpi: 300,
            inline_images: true,
            fetch_timeout_secs: 10,
            max_fetch_bytes: 10 * 1024 * 1024,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("quality", &self.quality)
            .field("dpi", &self.dpi)
            .field("inline_images", &self.inline_images)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("max_fetch_bytes", &self.max_fetch_bytes)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn width(mut self, px: u32) -> Self {
        self.config.width = px.max(1);
        self
    }

    pub fn height(mut self, px: u32) -> Self {
        self.config.height = px.max(1);
        self
    }

    pub fn quality(mut self, q: u8) -> Self {
        self.config.quality = q.min(100);
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn inline_images(mut self, v: bool) -> Self {
        self.config.inline_images = v;
        self
    }

    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.config.fetch_timeout_secs = secs.max(1);
        self
    }

    pub fn max_fetch_bytes(mut self, bytes: usize) -> Self {
        self.config.max_fetch_bytes = bytes;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Svg2JpegError> {
        let c = &self.config;
        if c.width == 0 || c.height == 0 {
            return Err(Svg2JpegError::InvalidConfig(format!(
                "Output dimensions must be at least 1x1, got {}x{}",
                c.width, c.height
            )));
        }
        if c.quality > 100 {
            return Err(Svg2JpegError::InvalidConfig(format!(
                "JPEG quality must be 0–100, got {}",
                c.quality
            )));
        }
        if c.dpi < 72 || c.dpi > 400 {
            return Err(Svg2JpegError::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                c.dpi
            )));
        }
        Ok(self.config)
    }
}
