//! CLI binary for deck2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `DownloadConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use deck2pdf::{
    download, inspect, DownloadConfig, DownloadProgressCallback, PresentationSource,
    ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner while the landing page is read and
/// the slide count resolved, then a bar with one log line per slide.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_download_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading presentation page…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} slides  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Downloading");
        self.bar.reset_eta();
    }
}

impl DownloadProgressCallback for CliProgressCallback {
    fn on_download_start(&self, total_slides: usize) {
        self.activate_bar(total_slides);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Downloading {total_slides} slides…"))
        ));
    }

    fn on_slide_start(&self, slide_num: usize, _total: usize) {
        self.bar.set_message(format!("slide {slide_num}"));
    }

    fn on_slide_complete(&self, slide_num: usize, total: usize, width: u32, height: u32) {
        self.bar.println(format!(
            "  {} Slide {:>3}/{:<3}  {}",
            green("✓"),
            slide_num,
            total,
            dim(&format!("{width}x{height}")),
        ));
        self.bar.inc(1);
    }

    fn on_slide_error(&self, slide_num: usize, total: usize, error: &str) {
        let msg = match error.char_indices().nth(79) {
            Some((cut, _)) => format!("{}\u{2026}", &error[..cut]),
            None => error.to_string(),
        };

        self.bar.println(format!(
            "  {} Slide {:>3}/{:<3}  {}",
            red("✗"),
            slide_num,
            total,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_download_complete(&self, total_slides: usize, success_count: usize) {
        let failed = total_slides.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} slides downloaded",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} slides downloaded  ({} skipped)",
                if failed == total_slides {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_slides,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Save into the current directory as <title>.pdf
  deck2pdf https://speakerdeck.com/owner/talk

  # Save into ./slides
  deck2pdf https://speakerdeck.com/owner/talk -o slides

  # Four downloads in flight, two retries per slide
  deck2pdf --concurrency 4 --retries 2 https://speakerdeck.com/owner/talk

  # Show identifier, title and slide count only
  deck2pdf --inspect-only https://speakerdeck.com/owner/talk

  # Machine-readable result
  deck2pdf --json https://speakerdeck.com/owner/talk > result.json

ENVIRONMENT VARIABLES:
  DECK2PDF_OUTPUT         Output directory
  DECK2PDF_MAX_PROBE      Upper bound for slide-count probing
  DECK2PDF_CONCURRENCY    Slide downloads in flight
  DECK2PDF_RETRIES        Extra attempts per slide
  DECK2PDF_TIMEOUT        Timeout for page and slide downloads (seconds)
  DECK2PDF_PROBE_TIMEOUT  Timeout for existence probes (seconds)
  DECK2PDF_USER_AGENT     User-Agent header
  RUST_LOG                Log filter (overrides -v / -q)
"#;

/// Download a slide deck as a PDF.
#[derive(Parser, Debug)]
#[command(
    name = "deck2pdf",
    version,
    about = "Download a Speaker Deck presentation as a PDF",
    long_about = "Download every slide of a Speaker Deck presentation and save them as a single \
PDF, one full-bleed page per slide. Slides that fail to download are skipped.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Presentation URL, e.g. https://speakerdeck.com/owner/talk.
    url: String,

    /// Directory for the PDF (created if missing).
    #[arg(short, long, env = "DECK2PDF_OUTPUT", default_value = ".")]
    output: PathBuf,

    /// Highest slide index to probe when the page does not state the count.
    #[arg(long, env = "DECK2PDF_MAX_PROBE", default_value_t = 300,
          value_parser = clap::value_parser!(u64).range(1..))]
    max_probe: u64,

    /// Number of slide downloads in flight.
    #[arg(short, long, env = "DECK2PDF_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// Extra attempts per slide on download failure.
    #[arg(long, env = "DECK2PDF_RETRIES", default_value_t = 0)]
    retries: u32,

    /// Timeout for the landing page and each slide, in seconds.
    #[arg(long, env = "DECK2PDF_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Timeout for each existence probe, in seconds.
    #[arg(long, env = "DECK2PDF_PROBE_TIMEOUT", default_value_t = 10)]
    probe_timeout: u64,

    /// User-Agent header sent on every request.
    #[arg(long, env = "DECK2PDF_USER_AGENT")]
    user_agent: Option<String>,

    /// Resolve the presentation and print its details; download nothing.
    #[arg(long)]
    inspect_only: bool,

    /// Print the result as JSON on stdout.
    #[arg(long, env = "DECK2PDF_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "DECK2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DECK2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the final path.
    #[arg(short, long, env = "DECK2PDF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level logs unless -v is given.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
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

    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn DownloadProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let source = inspect(&cli.url, &config)
            .await
            .context("Failed to inspect presentation")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&source).context("Failed to serialize metadata")?
            );
        } else {
            print_source(&cli.url, &source);
        }
        return Ok(());
    }

    // ── Run download ─────────────────────────────────────────────────────
    let output = download(&cli.url, &config)
        .await
        .context("Download failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }

    if !cli.quiet && !show_progress {
        eprintln!(
            "Downloaded {}/{} slides in {}ms",
            output.stats.fetched_slides, output.stats.total_slides, output.stats.total_duration_ms
        );
        for failure in &output.failures {
            eprintln!("  skipped: {failure}");
        }
    } else if show_progress {
        eprintln!(
            "   {} pages at {}x{}  —  {}ms total",
            dim(&output.pages.len().to_string()),
            output.geometry.width,
            output.geometry.height,
            output.stats.total_duration_ms,
        );
    }

    println!("{}", output.path.display());
    Ok(())
}

fn print_source(url: &str, source: &PresentationSource) {
    println!("URL:          {}", url);
    println!("Title:        {}", source.title);
    println!("File name:    {}.pdf", source.title_slug);
    println!(
        "Identifier:   {}  {}",
        source.identifier,
        dim(&format!("(via {})", source.identifier_source))
    );
    match (source.known_slide_count, source.count_source) {
        (Some(n), Some(how)) => println!("Slides:       {}  {}", n, dim(&format!("(via {how})"))),
        (Some(n), None) => println!("Slides:       {}", n),
        _ => println!("Slides:       unknown"),
    }
}

/// Map CLI args to `DownloadConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<DownloadConfig> {
    let mut builder = DownloadConfig::builder()
        .output_dir(&cli.output)
        .max_probe_slides(usize::try_from(cli.max_probe).context("--max-probe is too large")?)
        .concurrency(cli.concurrency)
        .max_retries(cli.retries)
        .fetch_timeout_secs(cli.timeout)
        .probe_timeout_secs(cli.probe_timeout);

    if let Some(ref ua) = cli.user_agent {
        builder = builder.user_agent(ua);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
