//! End-to-end integration tests for svg2jpeg.
//!
//! No external network access: the resolve-success path is exercised against
//! an in-process TCP listener serving a canned HTTP response, and the failure
//! path against a loopback port nothing listens on.

use svg2jpeg::pipeline::inline::inline_remote_images;
use svg2jpeg::{convert, convert_str, convert_to_file, ConversionConfig, Svg2JpegError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

// ── Test helpers ─────────────────────────────────────────────────────────────

const RECT_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="300" height="200"><rect width="300" height="200" fill="#004080"/></svg>"##;

/// Serve exactly one canned HTTP response on an ephemeral loopback port and
/// return the URL to request.
async fn serve_once(content_type: &str, body: Vec<u8>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().unwrap();
    let ct = content_type.to_string();

    tokio::spawn(async move {
        if let Ok((mut sock, _)) = listener.accept().await {
            // Drain (part of) the request; the content never matters here.
            let mut buf = [0u8; 2048];
            let _ = sock.read(&mut buf).await;

            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                ct,
                body.len()
            );
            let _ = sock.write_all(head.as_bytes()).await;
            let _ = sock.write_all(&body).await;
            let _ = sock.shutdown().await;
        }
    });

    format!("http://{addr}/image.png")
}

/// A URL on a loopback port with no listener — connection refused instantly.
fn dead_url() -> &'static str {
    "http://127.0.0.1:9/missing.png"
}

fn decode_jpeg(bytes: &[u8]) -> image::DynamicImage {
    image::load_from_memory_with_format(bytes, image::ImageFormat::Jpeg)
        .expect("output should be a decodable JPEG")
}

// ── Inliner ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn no_remote_references_returns_input_unchanged() {
    let config = ConversionConfig::default();
    let outcome = inline_remote_images(RECT_SVG.to_string(), &config)
        .await
        .unwrap();

    assert_eq!(outcome.svg, RECT_SVG);
    assert_eq!(outcome.references_found, 0);
    assert_eq!(outcome.inlined, 0);
    assert!(outcome.failures.is_empty());
}

#[tokio::test]
async fn resolvable_reference_becomes_data_uri() {
    let payload = vec![0x89, 0x50, 0x4E, 0x47, 1, 2, 3, 4];
    let url = serve_once("image/png", payload.clone()).await;
    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><image href="{url}" width="10" height="10"/></svg>"#
    );

    let config = ConversionConfig::default();
    let outcome = inline_remote_images(svg, &config).await.unwrap();

    assert_eq!(outcome.references_found, 1);
    assert_eq!(outcome.inlined, 1);
    assert!(outcome.failures.is_empty());
    assert!(
        !outcome.svg.contains(&url),
        "the remote URL may not remain in the document: {}",
        outcome.svg
    );
    assert!(outcome.svg.contains(r#"href="data:image/png;base64,"#));

    let start = outcome
        .svg
        .find("data:image/png;base64,")
        .expect("data URI present");
    let b64: String = outcome.svg[start + "data:image/png;base64,".len()..]
        .chars()
        .take_while(|c| *c != '"')
        .collect();
    let decoded = {
        use base64::Engine as _;
        base64::engine::general_purpose::STANDARD
            .decode(b64)
            .expect("payload is valid base64")
    };
    assert_eq!(decoded, payload, "data URI must carry the fetched bytes");
}

#[tokio::test]
async fn xlink_namespaced_reference_is_inlined() {
    let url = serve_once("image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0]).await;
    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="10" height="10"><image xlink:href="{url}" width="10" height="10"/></svg>"#
    );

    let outcome = inline_remote_images(svg, &ConversionConfig::default())
        .await
        .unwrap();

    assert_eq!(outcome.inlined, 1);
    assert!(outcome.svg.contains(r#"xlink:href="data:image/jpeg;base64,"#));
}

#[tokio::test]
async fn non_image_content_type_falls_back_to_jpeg_mime() {
    let url = serve_once("text/html; charset=utf-8", b"<html/>".to_vec()).await;
    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg"><image href="{url}"/></svg>"#
    );

    let outcome = inline_remote_images(svg, &ConversionConfig::default())
        .await
        .unwrap();

    assert_eq!(outcome.inlined, 1);
    assert!(outcome.svg.contains("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn unresolvable_reference_is_left_unchanged() {
    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><image href="{}" width="10" height="10"/></svg>"#,
        dead_url()
    );

    let config = ConversionConfig::builder()
        .fetch_timeout_secs(2)
        .build()
        .unwrap();
    let outcome = inline_remote_images(svg.clone(), &config).await.unwrap();

    assert_eq!(outcome.svg, svg, "failed reference must stay untouched");
    assert_eq!(outcome.references_found, 1);
    assert_eq!(outcome.inlined, 0);
    assert_eq!(outcome.failures.len(), 1);
}

#[tokio::test]
async fn fetch_failure_does_not_abort_the_conversion() {
    let svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="20"><rect width="20" height="20" fill="#fff"/><image href="{}" width="10" height="10"/></svg>"##,
        dead_url()
    );

    let config = ConversionConfig::builder()
        .width(40)
        .height(40)
        .fetch_timeout_secs(2)
        .build()
        .unwrap();
    let output = convert_str(&svg, &config)
        .await
        .expect("conversion must survive a fetch failure");

    assert_eq!(output.stats.failed_fetches, 1);
    assert!(output.jpeg.starts_with(&[0xFF, 0xD8, 0xFF]));
}

// ── Rasterizer + encoder ─────────────────────────────────────────────────────

#[tokio::test]
async fn output_is_exactly_the_requested_size() {
    let config = ConversionConfig::builder()
        .width(1200)
        .height(630)
        .build()
        .unwrap();
    let output = convert_str(RECT_SVG, &config).await.unwrap();

    let img = decode_jpeg(&output.jpeg);
    assert_eq!((img.width(), img.height()), (1200, 630));
    assert_eq!(output.stats.output_bytes, output.jpeg.len());
}

#[tokio::test]
async fn transparent_region_renders_as_white() {
    // Left half painted, right half untouched (fully transparent).
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100"><rect width="50" height="100" fill="#c00"/></svg>"##;

    let config = ConversionConfig::builder()
        .width(100)
        .height(100)
        .quality(95)
        .build()
        .unwrap();
    let output = convert_str(svg, &config).await.unwrap();

    let img = decode_jpeg(&output.jpeg).to_rgb8();
    let px = img.get_pixel(90, 50);
    // JPEG is lossy; allow a small deviation from pure white.
    for ch in 0..3 {
        assert!(
            px[ch] >= 250,
            "transparent region should be white, got {:?}",
            px
        );
    }
}

#[tokio::test]
async fn malformed_svg_is_a_fatal_error() {
    let err = convert_str("<svg", &ConversionConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Svg2JpegError::InvalidSvg { .. }));
}

// ── Driver validation ────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_input_names_the_path() {
    let result = convert("/definitely/not/a/real/file.svg", &ConversionConfig::default()).await;
    let err = result.unwrap_err();
    assert!(matches!(err, Svg2JpegError::FileNotFound { .. }));
    assert!(err.to_string().contains("/definitely/not/a/real/file.svg"));
}

#[tokio::test]
async fn non_svg_input_is_rejected_before_conversion() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.png");
    std::fs::write(&path, b"\x89PNG not an svg").unwrap();

    let err = convert(&path, &ConversionConfig::default())
        .await
        .unwrap_err();
    // NotSvg (not InvalidSvg) proves the rasterizer never saw the file.
    assert!(matches!(err, Svg2JpegError::NotSvg { .. }));
}

#[tokio::test]
async fn convert_to_file_writes_a_jpeg() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("cover.svg");
    let output = dir.path().join("out/cover.jpg");
    std::fs::write(&input, RECT_SVG).unwrap();

    let config = ConversionConfig::builder()
        .width(150)
        .height(100)
        .build()
        .unwrap();
    let result = convert_to_file(&input, &output, &config).await.unwrap();

    let written = std::fs::read(&output).unwrap();
    assert!(written.starts_with(&[0xFF, 0xD8, 0xFF]));
    assert_eq!(written.len(), result.stats.output_bytes);
    // No stray temp file left behind.
    assert!(!dir.path().join("out/cover.jpg.tmp").exists());
}
