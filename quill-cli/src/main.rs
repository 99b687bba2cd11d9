//! Quill AMP sanitizer CLI
//!
//! Converts post content or whole pages to AMP markup from the terminal.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use owo_colors::OwoColorize;
use quill_amp::{Report, Sanitizer, SanitizerConfig};
use quill_html::{parse, parse_with_issues, print_tree};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Quill: rewrite HTML into valid AMP markup
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Sanitize a post fragment
    quill post.html

    # Sanitize inline HTML
    quill --html '<img src="http://quill.example/tart.png">'

    # Finish a whole page with a canonical link
    quill --page --canonical https://quill.example/lemon-tart/ page.html

    # Measure local uploads and print what changed
    quill --asset-root /var/www/html --site-url https://quill.example --report post.html

    # Read from stdin, print the sanitized tree
    cat post.html | quill --format tree -

ENVIRONMENT:
    QUILL_LOG    tracing filter, overrides -v (e.g. QUILL_LOG=quill_amp=debug)
"#)]
struct Cli {
    /// Path to HTML file, or `-` for stdin
    #[arg(value_name = "FILE")]
    path: Option<String>,

    /// Sanitize this HTML string instead of a file
    #[arg(long, value_name = "HTML", conflicts_with = "path")]
    html: Option<String>,

    /// Treat the input as a full page (head scripts, boilerplate, `<html amp>`)
    #[arg(long)]
    page: bool,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory that site-relative image URLs resolve against
    #[arg(long, value_name = "DIR")]
    asset_root: Option<PathBuf>,

    /// Public origin of the site, e.g. https://quill.example
    #[arg(long, value_name = "URL")]
    site_url: Option<String>,

    /// Canonical URL to link from a finished page
    #[arg(long, value_name = "URL")]
    canonical: Option<String>,

    /// Write the result to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    format: OutputFormat,

    /// Print a summary of what changed to stderr
    #[arg(short, long)]
    report: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Sanitized markup
    Html,
    /// Indented tree of the sanitized markup
    Tree,
    /// Markup and report as one JSON object
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    let input = read_input(&cli)?;
    let sanitizer = Sanitizer::new(config);

    let (html, report) = if cli.page {
        sanitizer.sanitize_page_with_report(&input)
    } else {
        sanitizer.sanitize_fragment_with_report(&input)
    };
    tracing::info!(bytes_in = input.len(), bytes_out = html.len(), "sanitized");

    match cli.format {
        OutputFormat::Html => write_output(cli.output.as_ref(), &html)?,
        OutputFormat::Tree => {
            if cli.output.is_some() {
                bail!("--format tree prints to the terminal and cannot be combined with --output");
            }
            let tree = parse(&html);
            print_tree(&tree, tree.root(), 0);
        }
        OutputFormat::Json => {
            let json = serde_json::json!({ "html": html, "report": report });
            let text = serde_json::to_string_pretty(&json).context("Failed to encode JSON output")?;
            write_output(cli.output.as_ref(), &text)?;
        }
    }

    if cli.report {
        let (_, issues) = parse_with_issues(&input);
        let distinct: HashSet<&str> = issues.iter().map(|issue| issue.message.as_str()).collect();
        print_report(&report, distinct.len());
    }

    Ok(())
}

/// Route `tracing` to stderr, filtered by `QUILL_LOG` or the `-v` count
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("QUILL_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

/// Build the configuration: file first, then command-line overrides
fn load_config(cli: &Cli) -> Result<SanitizerConfig> {
    let mut config = match cli.config {
        Some(ref path) => SanitizerConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SanitizerConfig::default(),
    };

    if let Some(ref root) = cli.asset_root {
        config.asset_root = Some(root.clone());
    }
    if let Some(ref url) = cli.site_url {
        config.site_url = Some(url.clone());
    }
    if let Some(ref url) = cli.canonical {
        config.canonical_url = Some(url.clone());
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Load input from CLI arguments
fn read_input(cli: &Cli) -> Result<String> {
    if let Some(ref html) = cli.html {
        return Ok(html.clone());
    }
    match cli.path.as_deref() {
        Some("-") => {
            let mut buffer = String::new();
            let _ = io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
        Some(path) => fs::read_to_string(path).with_context(|| format!("Failed to read {path}")),
        None => bail!("No input provided. Pass a FILE, `-` for stdin, or --html"),
    }
}

fn write_output(path: Option<&PathBuf>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

/// Summarize a [`Report`] and the input's parse warnings on stderr
fn print_report(report: &Report, warnings: usize) {
    eprintln!("{}", "=== Sanitizer Report ===".bold());
    let rows = [
        ("tags converted", report.tags_converted),
        ("attributes stripped", report.attributes_stripped),
        ("urls upgraded", report.urls_upgraded),
        ("fallback sizes applied", report.fallback_sizes_applied),
        ("elements removed", report.elements_removed),
        ("embeds rewritten", report.embeds_rewritten),
    ];
    for (label, count) in rows {
        if count == 0 {
            eprintln!("  {label:<24}{}", count.dimmed());
        } else {
            eprintln!("  {label:<24}{}", count.yellow());
        }
    }

    if report.is_clean() {
        eprintln!("{}", "Already valid: nothing changed".green());
    }
    if warnings > 0 {
        eprintln!("{}", format!("{warnings} distinct parse warning(s)").red());
    }
}
