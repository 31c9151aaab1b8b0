//! SVG rasterisation: render the document to an exact-size pixmap via resvg.
//!
//! ## Why spawn_blocking?
//!
//! Parsing and rendering are CPU-bound; `tokio::task::spawn_blocking` moves
//! the work onto the blocking thread pool so the async worker threads never
//! stall on a large document.
//!
//! ## Why per-axis scaling?
//!
//! The caller's width/height are applied directly: each axis is scaled from
//! the document's intrinsic size independently, so a mismatched aspect ratio
//! distorts rather than letterboxes. Callers that want proportional output
//! pass dimensions matching the SVG's ratio.

use crate::config::ConversionConfig;
use crate::error::Svg2JpegError;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;
use tracing::debug;

/// Rasterise SVG text into a `width` × `height` pixmap.
///
/// Runs inside `spawn_blocking` since rendering is CPU-bound.
pub async fn rasterize(
    svg: String,
    config: &ConversionConfig,
) -> Result<Pixmap, Svg2JpegError> {
    let width = config.width;
    let height = config.height;
    let dpi = config.dpi;

    tokio::task::spawn_blocking(move || rasterize_blocking(&svg, width, height, dpi))
        .await
        .map_err(|e| Svg2JpegError::Internal(format!("Render task panicked: {e}")))?
}

/// Blocking implementation of rasterisation.
fn rasterize_blocking(
    svg: &str,
    width: u32,
    height: u32,
    dpi: u32,
) -> Result<Pixmap, Svg2JpegError> {
    let mut opt = usvg::Options::default();
    opt.dpi = dpi as f32;
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| Svg2JpegError::InvalidSvg {
        detail: e.to_string(),
    })?;

    let mut pixmap =
        Pixmap::new(width, height).ok_or(Svg2JpegError::InvalidDimensions { width, height })?;

    let size = tree.size();
    let sx = width as f32 / size.width();
    let sy = height as f32 / size.height();
    resvg::render(&tree, Transform::from_scale(sx, sy), &mut pixmap.as_mut());

    debug!(
        "Rendered SVG {:.0}x{:.0} → {}x{} px",
        size.width(),
        size.height(),
        width,
        height
    );

    Ok(pixmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECT_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="300" height="200"><rect width="300" height="200" fill="#004080"/></svg>"##;

    #[test]
    fn output_matches_requested_dimensions_exactly() {
        let pixmap = rasterize_blocking(RECT_SVG, 1200, 630, 300).unwrap();
        assert_eq!(pixmap.width(), 1200);
        assert_eq!(pixmap.height(), 630);
    }

    #[test]
    fn aspect_ratio_is_not_preserved() {
        // A square source stretched to a wide target still fills every pixel.
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100"><rect width="100" height="100" fill="#f00"/></svg>"##;
        let pixmap = rasterize_blocking(svg, 200, 50, 96).unwrap();
        let last = pixmap.pixels()[(200 * 50 - 1) as usize].demultiply();
        assert_eq!((last.red(), last.green(), last.blue()), (255, 0, 0));
    }

    #[test]
    fn malformed_svg_is_fatal() {
        let err = rasterize_blocking("not svg at all", 100, 100, 96).unwrap_err();
        assert!(matches!(err, Svg2JpegError::InvalidSvg { .. }));
    }

    #[test]
    fn unresolved_remote_reference_still_renders() {
        // The inliner leaves failed references untouched; rendering must not
        // abort on them, the image area just stays empty.
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><image href="http://127.0.0.1:9/x.png" width="10" height="10"/></svg>"#;
        let pixmap = rasterize_blocking(svg, 10, 10, 96).unwrap();
        assert_eq!(pixmap.width(), 10);
    }
}
