//! Remote-image inlining: rewrite external `<image>` references as data URIs.
//!
//! ## Why inline at all?
//!
//! The rasterizer resolves `href`/`xlink:href` attributes itself but never
//! touches the network, so a remotely-hosted image would render as an empty
//! box. Fetching each `http(s)://` reference up front and embedding it as a
//! `data:<mime>;base64,…` URI gives the rasterizer a self-contained document.
//!
//! ## Why scan back-to-front?
//!
//! Replacements are anchored to the byte range of the matched attribute
//! value. Processing matches from the last to the first keeps every earlier
//! range valid while the document is rewritten in place.

use crate::config::ConversionConfig;
use crate::error::{FetchError, Svg2JpegError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use tracing::{debug, info, warn};

/// `<image>` elements carrying an `href` or namespaced `xlink:href` attribute.
/// Group 1 is the attribute name, group 2 the attribute value.
static IMAGE_HREF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<image[^>]*?\s((?:xlink:)?href)\s*=\s*["']([^"']+)["']"#)
        .expect("image href regex is valid")
});

/// A matched image-reference attribute: the URL text and the byte range it
/// occupies in the document. Only exists during the inlining pass.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ImageRef {
    url: String,
    start: usize,
    end: usize,
}

/// Result of the inlining pass.
#[derive(Debug)]
pub struct InlineOutcome {
    /// The document with every successfully fetched reference embedded.
    pub svg: String,
    /// External (`http://`/`https://`) references found in the document.
    pub references_found: usize,
    /// References successfully replaced by data URIs.
    pub inlined: usize,
    /// Per-reference fetch failures; the affected references are unchanged.
    pub failures: Vec<FetchError>,
}

impl InlineOutcome {
    fn unchanged(svg: String) -> Self {
        Self {
            svg,
            references_found: 0,
            inlined: 0,
            failures: Vec::new(),
        }
    }
}

/// Replace every externally-addressed `<image>` reference in `svg` with a
/// base64 data URI of the fetched resource.
///
/// Local paths, fragment references, and existing `data:` URIs are left
/// untouched. Fetches run sequentially, each bounded by
/// `config.fetch_timeout_secs`, with no retry. A failed fetch is recorded in
/// [`InlineOutcome::failures`] and the reference keeps its original URL.
///
/// # Errors
/// Only HTTP client construction can fail here; per-reference fetch failures
/// are recorded in the outcome instead of being propagated.
pub async fn inline_remote_images(
    svg: String,
    config: &ConversionConfig,
) -> Result<InlineOutcome, Svg2JpegError> {
    let refs = collect_remote_references(&svg);
    let total = refs.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_inline_start(total);
    }
    if refs.is_empty() {
        debug!("No external image references found");
        if let Some(ref cb) = config.progress_callback {
            cb.on_inline_complete(0, 0);
        }
        return Ok(InlineOutcome::unchanged(svg));
    }

    info!("Inlining {} external image reference(s)", total);

    let client = reqwest::Client::builder()
        .build()
        .map_err(|e| Svg2JpegError::Internal(format!("HTTP client: {e}")))?;

    let mut svg = svg;
    let mut inlined = 0usize;
    let mut failures = Vec::new();

    // Back-to-front so earlier byte ranges stay valid after each splice.
    for (idx, r) in refs.iter().enumerate().rev() {
        let n = idx + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_image_start(n, total, &r.url);
        }
        match fetch_data_uri(&client, &r.url, config).await {
            Ok(data_uri) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_image_inlined(n, total, data_uri.len());
                }
                debug!("Replaced {} with {}-byte data URI", r.url, data_uri.len());
                svg.replace_range(r.start..r.end, &data_uri);
                inlined += 1;
            }
            Err(e) => {
                warn!("Failed to inline {}: {}", r.url, e);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_image_error(n, total, &e.to_string());
                }
                failures.push(e);
            }
        }
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_inline_complete(total, inlined);
    }

    Ok(InlineOutcome {
        svg,
        references_found: total,
        inlined,
        failures,
    })
}

/// Collect all externally-addressed image references, in document order.
fn collect_remote_references(svg: &str) -> Vec<ImageRef> {
    IMAGE_HREF_RE
        .captures_iter(svg)
        .filter_map(|caps| {
            let value = caps.get(2)?;
            if !is_remote(value.as_str()) {
                return None;
            }
            Some(ImageRef {
                url: value.as_str().to_string(),
                start: value.start(),
                end: value.end(),
            })
        })
        .collect()
}

/// Whether an attribute value points at an external HTTP(S) resource.
fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Fetch `url` and encode the response as a `data:<mime>;base64,…` URI.
async fn fetch_data_uri(
    client: &reqwest::Client,
    url: &str,
    config: &ConversionConfig,
) -> Result<String, FetchError> {
    debug!("Downloading external image: {}", url);

    let timeout = Duration::from_secs(config.fetch_timeout_secs);
    let response = client
        .get(url)
        .timeout(timeout)
        .header(
            reqwest::header::ACCEPT,
            "image/avif,image/webp,image/apng,image/*,*/*;q=0.8",
        )
        .send()
        .await
        .map_err(|e| classify_reqwest_error(url, config.fetch_timeout_secs, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let mime = response_mime(&response);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| classify_reqwest_error(url, config.fetch_timeout_secs, e))?;

    if bytes.len() > config.max_fetch_bytes {
        return Err(FetchError::TooLarge {
            url: url.to_string(),
            len: bytes.len(),
            max: config.max_fetch_bytes,
        });
    }

    let encoded_capacity = base64::encoded_len(bytes.len(), false).unwrap_or(0);
    let mut data_uri = String::with_capacity(encoded_capacity + mime.len() + 16);
    data_uri.push_str("data:");
    data_uri.push_str(&mime);
    data_uri.push_str(";base64,");
    STANDARD.encode_string(&bytes, &mut data_uri);

    Ok(data_uri)
}

/// MIME type from the response's `Content-Type`, defaulting to `image/jpeg`
/// when the header is absent or not an image type.
fn response_mime(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|ct| ct.starts_with("image/"))
        .unwrap_or("image/jpeg")
        .to_string()
}

fn classify_reqwest_error(url: &str, timeout_secs: u64, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
            secs: timeout_secs,
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}
