//! Top-level conversion entry points.
//!
//! The pipeline runs eagerly and strictly forward: inline → render → encode.
//! [`convert`] reads a file, [`convert_str`] takes SVG text directly, and
//! [`convert_to_file`] additionally writes the JPEG to disk. Nothing is
//! retried or invoked out of order.

use crate::config::ConversionConfig;
use crate::error::{FetchError, Svg2JpegError};
use crate::pipeline::{encode, inline, render};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// The finished conversion: encoded bytes plus run metadata.
#[derive(Debug)]
pub struct ConversionOutput {
    /// The encoded JPEG.
    pub jpeg: Vec<u8>,
    /// Timings and counters for the run.
    pub stats: ConversionStats,
    /// Non-fatal fetch failures from the inlining stage.
    pub failures: Vec<FetchError>,
}

/// Counters and per-stage timings for a conversion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionStats {
    /// External image references found in the document.
    pub references_found: usize,
    /// References successfully embedded as data URIs.
    pub images_inlined: usize,
    /// References left unresolved after a fetch failure.
    pub failed_fetches: usize,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// JPEG quality used.
    pub quality: u8,
    /// Size of the encoded JPEG in bytes.
    pub output_bytes: usize,
    pub inline_duration_ms: u64,
    pub render_duration_ms: u64,
    pub encode_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Convert an SVG file to JPEG bytes.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Returns `Err(Svg2JpegError)` for fatal errors only:
/// - input missing, unreadable, or not an `.svg` file
/// - unparsable SVG
/// - encoding failure
///
/// Per-image fetch failures are non-fatal — check
/// [`ConversionOutput::failures`].
pub async fn convert(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Svg2JpegError> {
    let path = input.as_ref();
    validate_input(path)?;

    let svg = tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Svg2JpegError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => Svg2JpegError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => Svg2JpegError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    info!("Converting {} ({} bytes of SVG)", path.display(), svg.len());
    convert_str(&svg, config).await
}

/// Convert SVG text already held in memory.
///
/// Used by [`convert`] after reading the input file; also the right entry
/// point when the document comes from a template engine or a network stream
/// rather than disk.
pub async fn convert_str(
    svg: &str,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Svg2JpegError> {
    let total_start = Instant::now();

    // ── Step 1: Inline remote images ─────────────────────────────────────
    let inline_start = Instant::now();
    let outcome = if config.inline_images {
        inline::inline_remote_images(svg.to_string(), config).await?
    } else {
        debug!("Inlining disabled, rasterising the document as-is");
        inline::InlineOutcome {
            svg: svg.to_string(),
            references_found: 0,
            inlined: 0,
            failures: Vec::new(),
        }
    };
    let inline_duration_ms = inline_start.elapsed().as_millis() as u64;

    // ── Step 2: Rasterise ────────────────────────────────────────────────
    let render_start = Instant::now();
    let pixmap = render::rasterize(outcome.svg, config).await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    // ── Step 3: Flatten + encode ─────────────────────────────────────────
    let encode_start = Instant::now();
    let quality = config.quality;
    let jpeg = tokio::task::spawn_blocking(move || {
        let img = encode::pixmap_to_image(&pixmap)?;
        let rgb = encode::flatten_to_rgb(&img);
        encode::encode_jpeg(&rgb, quality)
    })
    .await
    .map_err(|e| Svg2JpegError::Internal(format!("Encode task panicked: {e}")))??;
    let encode_duration_ms = encode_start.elapsed().as_millis() as u64;

    let stats = ConversionStats {
        references_found: outcome.references_found,
        images_inlined: outcome.inlined,
        failed_fetches: outcome.failures.len(),
        width: config.width,
        height: config.height,
        quality,
        output_bytes: jpeg.len(),
        inline_duration_ms,
        render_duration_ms,
        encode_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {}x{}, {} bytes, {}ms total",
        stats.width, stats.height, stats.output_bytes, stats.total_duration_ms
    );

    Ok(ConversionOutput {
        jpeg,
        stats,
        failures: outcome.failures,
    })
}

/// Convert an SVG file and write the JPEG to `output_path`.
///
/// Uses atomic write (temp file + rename) so a failed run never leaves a
/// truncated JPEG behind.
pub async fn convert_to_file(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Svg2JpegError> {
    let output = convert(input, config).await?;
    let path = output_path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Svg2JpegError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                }
            })?;
        }
    }

    let tmp_path = path.with_extension("jpg.tmp");
    tokio::fs::write(&tmp_path, &output.jpeg).await.map_err(|e| {
        Svg2JpegError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    tokio::fs::rename(&tmp_path, path).await.map_err(|e| {
        Svg2JpegError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    Ok(output)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Svg2JpegError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Svg2JpegError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(convert(input, config))
}

/// Default output path: the input path with its extension replaced by `.jpg`.
pub fn default_output_path(input: impl AsRef<Path>) -> PathBuf {
    input.as_ref().with_extension("jpg")
}

/// Validate that the input exists and carries an `.svg` extension.
///
/// Existence is checked first so a missing file reports as such even when it
/// also has the wrong extension.
fn validate_input(path: &Path) -> Result<(), Svg2JpegError> {
    if !path.exists() {
        return Err(Svg2JpegError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let is_svg = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);
    if !is_svg {
        return Err(Svg2JpegError::NotSvg {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_path_swaps_extension() {
        assert_eq!(
            default_output_path("covers/post.svg"),
            PathBuf::from("covers/post.jpg")
        );
        assert_eq!(default_output_path("POST.SVG"), PathBuf::from("POST.jpg"));
    }

    #[test]
    fn validate_rejects_missing_file_first() {
        // Missing file with a wrong extension still reports FileNotFound.
        let err = validate_input(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, Svg2JpegError::FileNotFound { .. }));
    }

    #[test]
    fn validate_accepts_uppercase_extension() {
        let dir = std::env::temp_dir();
        let path = dir.join("svg2jpeg-validate-test.SVG");
        std::fs::write(&path, "<svg/>").unwrap();
        assert!(validate_input(&path).is_ok());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn stats_serialise_to_json() {
        let stats = ConversionStats {
            references_found: 2,
            images_inlined: 1,
            failed_fetches: 1,
            width: 1200,
            height: 630,
            quality: 95,
            output_bytes: 4096,
            inline_duration_ms: 12,
            render_duration_ms: 34,
            encode_duration_ms: 5,
            total_duration_ms: 51,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"images_inlined\":1"));
        assert!(json.contains("\"width\":1200"));
    }
}
