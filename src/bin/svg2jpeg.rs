//! CLI binary for svg2jpeg.
//!
//! A thin shim over the library crate that maps CLI arguments
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use svg2jpeg::{
    convert_to_file, default_output_path, ConversionConfig, ConversionProgressCallback,
    ProgressCallback,
};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live progress bar over image fetches
/// and a per-image log line using [indicatif].
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Count of references that failed to fetch.
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set dynamically by
    /// `on_inline_start` (called once the document has been scanned).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_inline_start

        // Initial style: spinner only (no counter until we know the total).
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Converting");
        bar.set_message("Scanning for remote images…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>2}/{len} images  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Inlining");
    }

    /// Clear the bar; safe to call more than once.
    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_inline_start(&self, total_refs: usize) {
        if total_refs > 0 {
            self.activate_bar(total_refs);
        }
    }

    fn on_image_start(&self, _n: usize, _total: usize, url: &str) {
        self.bar.set_message(url.to_string());
    }

    fn on_image_inlined(&self, n: usize, total: usize, encoded_len: usize) {
        self.bar.println(format!(
            "  {} Image {:>2}/{:<2}  {}",
            green("✓"),
            n,
            total,
            dim(&format!("{encoded_len} bytes inline")),
        ));
        self.bar.inc(1);
    }

    fn on_image_error(&self, n: usize, total: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = if error.len() > 80 {
            format!("{}\u{2026}", &error[..79])
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Image {:>2}/{:<2}  {}",
            red("✗"),
            n,
            total,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_inline_complete(&self, total_refs: usize, inlined: usize) {
        self.bar.finish_and_clear();
        if total_refs > 0 {
            let failed = total_refs.saturating_sub(inlined);
            if failed == 0 {
                eprintln!(
                    "{} {} remote image(s) inlined",
                    green("✔"),
                    bold(&inlined.to_string())
                );
            } else {
                eprintln!(
                    "{} {}/{} remote images inlined  ({} left as URLs)",
                    cyan("⚠"),
                    bold(&inlined.to_string()),
                    total_refs,
                    red(&failed.to_string()),
                );
            }
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion (writes og-image.jpg next to the input)
  svg2jpeg og-image.svg

  # Explicit output path
  svg2jpeg og-image.svg covers/post.jpg

  # Custom size and quality
  svg2jpeg og-image.svg out.jpg 1600 900 85

  # Skip remote-image inlining (offline use)
  svg2jpeg --no-inline og-image.svg

  # Machine-readable stats
  svg2jpeg --json og-image.svg > stats.json

DEFAULTS:
  output    input path with the extension replaced by .jpg
  width     1200 px        height    630 px        quality   95

EXIT CODES:
  0  success
  1  missing/invalid arguments, input not found, input not .svg,
     or any conversion-stage error

ENVIRONMENT VARIABLES:
  SVG2JPEG_TIMEOUT   Per-image fetch timeout in seconds
  SVG2JPEG_DPI       Rendering DPI for physical-unit documents
"#;

/// Convert an SVG file to a JPEG image, inlining remote raster references.
#[derive(Parser, Debug)]
#[command(
    name = "svg2jpeg",
    version,
    about = "Convert an SVG file to a JPEG image, inlining remote raster references",
    long_about = "Convert a single SVG file into a JPEG of an exact pixel size. External \
<image> references (http/https) are fetched and embedded as base64 data URIs before \
rasterisation; transparency is flattened onto a white background.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input SVG file path.
    input: PathBuf,

    /// Output JPEG path. Default: input path with the extension replaced by .jpg.
    output: Option<PathBuf>,

    /// Output width in pixels.
    #[arg(default_value_t = 1200, value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    /// Output height in pixels.
    #[arg(default_value_t = 630, value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,

    /// JPEG quality (0–100).
    #[arg(default_value_t = 95, value_parser = clap::value_parser!(u8).range(0..=100))]
    quality: u8,

    /// Per-image fetch timeout in seconds.
    #[arg(long, env = "SVG2JPEG_TIMEOUT", default_value_t = 10)]
    timeout: u64,

    /// Rendering DPI (72–400); only affects documents using physical units.
    #[arg(long, env = "SVG2JPEG_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// Skip remote-image inlining entirely.
    #[arg(long)]
    no_inline: bool,

    /// Print conversion stats as JSON to stdout.
    #[arg(long)]
    json: bool,

    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(serde::Serialize)]
struct JsonReport<'a> {
    output: String,
    stats: &'a svg2jpeg::ConversionStats,
    failures: &'a [svg2jpeg::FetchError],
}

#[tokio::main]
async fn main() -> Result<()> {
    // The process contract is exit 1 for any argument problem (clap's
    // default usage-error code is 2); --help/--version still exit 0.
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        let code = match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => 0,
            _ => 1,
        };
        let _ = e.print();
        std::process::exit(code);
    });

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb = if show_progress {
        Some(CliProgressCallback::new_dynamic())
    } else {
        None
    };

    let mut builder = ConversionConfig::builder()
        .width(cli.width)
        .height(cli.height)
        .quality(cli.quality)
        .dpi(cli.dpi)
        .inline_images(!cli.no_inline)
        .fetch_timeout_secs(cli.timeout);

    if let Some(ref cb) = progress_cb {
        builder = builder.progress_callback(Arc::clone(cb) as ProgressCallback);
    }

    let config = builder.build().context("Invalid configuration")?;
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));

    // ── Run conversion ───────────────────────────────────────────────────
    let result = convert_to_file(&cli.input, &output_path, &config).await;

    // The bar only clears itself when the inliner ran; make sure it is gone
    // before any summary or error output.
    if let Some(ref cb) = progress_cb {
        cb.finish();
    }

    let output = result.context("Conversion failed")?;

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        let report = JsonReport {
            output: output_path.display().to_string(),
            stats: &output.stats,
            failures: &output.failures,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise stats")?
        );
    } else if !cli.quiet {
        let s = &output.stats;
        eprintln!(
            "{}  {} → {}  {}x{}  {}  {}",
            if s.failed_fetches == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            cli.input.display(),
            bold(&output_path.display().to_string()),
            s.width,
            s.height,
            dim(&format!("{} bytes", s.output_bytes)),
            dim(&format!("{}ms", s.total_duration_ms)),
        );
        for failure in &output.failures {
            eprintln!("   {} {}", red("✗"), failure);
        }
    }

    Ok(())
}
