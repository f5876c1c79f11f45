//! CLI command definitions, routing, and tracing setup.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use nsrecords_crawler::{CrawlReport, Crawler, ProgressReporter};
use nsrecords_discovery::{LinkFilter, LinkReport, discover_record_links, inspect_links};
use nsrecords_extractor::extract_record_from_html;
use nsrecords_shared::{
    AppConfig, CrawlConfig, DebugConfig, LinkFilterConfig, NsRecordsError, PageSourceKind,
    RecordEntry, init_config, load_config, load_config_from,
};
use scraper::Html;
use tracing::{info, warn};
use url::Url;

use crate::source::CliSource;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// nsrecords: scrape the NetSuite Records Browser into JSON.
#[derive(Parser)]
#[command(
    name = "nsrecords",
    version,
    about = "Extract record and field definitions from the NetSuite Records Browser.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.nsrecords/nsrecords.toml.
    #[arg(long, global = true, env = "NSRECORDS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Where pages come from, shared by the commands that load pages.
#[derive(clap::Args, Debug, Default)]
pub(crate) struct SourceArgs {
    /// Page source: http or browser (defaults to the config file's value).
    #[arg(long)]
    pub source: Option<PageSourceKind>,

    /// Serve pages from a directory of HTML files instead of the network.
    #[arg(long, value_name = "DIR")]
    pub fixtures: Option<PathBuf>,

    /// Navigation timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Discover every record page and extract its fields.
    Crawl {
        /// Records Browser start page (defaults to the configured URL).
        url: Option<String>,

        /// Output JSON file (defaults to the configured path).
        #[arg(short, long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        source: SourceArgs,

        /// Save HTML snapshots and the link list.
        #[arg(long)]
        debug: bool,

        /// Directory for debug artifacts.
        #[arg(long, value_name = "DIR")]
        debug_dir: Option<PathBuf>,

        /// Wait after each record page loads, in milliseconds.
        #[arg(long)]
        settle_ms: Option<u64>,

        /// Wait between record pages, in milliseconds.
        #[arg(long)]
        pacing_ms: Option<u64>,
    },

    /// Show the links and navigation structure of a start page.
    Links {
        /// Page to inspect (defaults to the configured URL).
        url: Option<String>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Extract a single record page.
    Extract {
        /// Record page URL.
        url: String,

        /// Read the page from this file instead of loading the URL.
        #[arg(long, value_name = "FILE")]
        html: Option<PathBuf>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "nsrecords=info",
        1 => "nsrecords=debug",
        _ => "nsrecords=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match cli.command {
        Command::Crawl {
            url,
            out,
            source,
            debug,
            debug_dir,
            settle_ms,
            pacing_ms,
        } => {
            let overrides = Overrides {
                debug,
                debug_dir,
                settle_ms,
                pacing_ms,
                timeout_secs: source.timeout_secs,
            };
            cmd_crawl(overrides.apply(config), url.as_deref(), out, &source).await
        }
        Command::Links { url, source } => {
            let config = Overrides::timeout(source.timeout_secs).apply(config);
            cmd_links(&config, url.as_deref(), &source).await
        }
        Command::Extract { url, html, source } => {
            let config = Overrides::timeout(source.timeout_secs).apply(config);
            cmd_extract(&config, &url, html.as_deref(), &source).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(&config).await,
        },
    }
}

// ---------------------------------------------------------------------------
// Config overrides
// ---------------------------------------------------------------------------

/// Command-line values that win over the config file.
#[derive(Debug, Default)]
struct Overrides {
    debug: bool,
    debug_dir: Option<PathBuf>,
    settle_ms: Option<u64>,
    pacing_ms: Option<u64>,
    timeout_secs: Option<u64>,
}

impl Overrides {
    fn timeout(timeout_secs: Option<u64>) -> Self {
        Self {
            timeout_secs,
            ..Self::default()
        }
    }

    fn apply(self, mut config: AppConfig) -> AppConfig {
        if let Some(ms) = self.settle_ms {
            config.timing.settle_ms = ms;
        }
        if let Some(ms) = self.pacing_ms {
            config.timing.pacing_ms = ms;
        }
        if let Some(secs) = self.timeout_secs {
            config.timing.navigation_timeout_secs = secs;
        }
        if let Some(dir) = self.debug_dir {
            config.debug.dir = dir.to_string_lossy().into_owned();
            config.debug.enabled = true;
        }
        if self.debug {
            config.debug.enabled = true;
        }
        config
    }
}

fn parse_url(raw: &str) -> nsrecords_shared::Result<Url> {
    Url::parse(raw).map_err(|e| NsRecordsError::parse(format!("invalid URL '{raw}': {e}")))
}

fn start_url(config: &AppConfig, url: Option<&str>) -> Result<Url> {
    Ok(parse_url(url.unwrap_or(&config.defaults.start_url))?)
}

/// Open the selected page source and wrap it in a configured crawler.
fn build_crawler(
    config: &AppConfig,
    start_url: &Url,
    args: &SourceArgs,
) -> Result<Crawler<CliSource>> {
    let crawl = CrawlConfig::from(config);
    let kind = args.source.unwrap_or(config.defaults.page_source);
    let source = CliSource::open(kind, args.fixtures.as_deref(), start_url, crawl.navigation_timeout)?;

    Ok(Crawler::new(source, crawl)
        .with_link_filter(LinkFilterConfig::from(config))
        .with_debug(DebugConfig::from(config)))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_crawl(
    config: AppConfig,
    url: Option<&str>,
    out: Option<PathBuf>,
    args: &SourceArgs,
) -> Result<()> {
    let start_url = start_url(&config, url)?;
    let out = out.unwrap_or_else(|| PathBuf::from(&config.defaults.output));
    let mut crawler = build_crawler(&config, &start_url, args)?;

    info!(url = %start_url, out = %out.display(), "crawling records browser");

    let reporter = CliProgress::new();
    let report = crawler.crawl(&start_url, &reporter).await?;

    let json = serde_json::to_string_pretty(&report.records)?;
    std::fs::write(&out, &json).map_err(|e| NsRecordsError::io(&out, e))?;

    print_summary(&report, &out);
    println!("{json}");

    Ok(())
}

fn print_summary(report: &CrawlReport, out: &Path) {
    let fields: usize = report.records.iter().map(|r| r.fields.len()).sum();

    eprintln!();
    eprintln!("  Records browser crawled");
    eprintln!("  Links:    {}", report.links.len());
    eprintln!("  Records:  {}", report.records.len());
    eprintln!("  Fields:   {fields}");
    eprintln!("  Skipped:  {}", report.failures.len());
    eprintln!("  Output:   {}", out.display());
    eprintln!("  Time:     {:.1}s", report.duration.as_secs_f64());
    for (url, reason) in &report.failures {
        eprintln!("    - {url}: {reason}");
    }
    eprintln!();
}

/// What `nsrecords links` found on one page.
struct LinkDiagnosis {
    page_url: Url,
    report: LinkReport,
    /// Empty when discovery found nothing.
    links: BTreeSet<Url>,
}

async fn diagnose_links(
    config: &AppConfig,
    url: Option<&str>,
    args: &SourceArgs,
) -> Result<LinkDiagnosis> {
    let page_url = start_url(config, url)?;
    let filter = LinkFilter::new(&LinkFilterConfig::from(config), &page_url)?;
    let mut crawler = build_crawler(config, &page_url, args)?;

    let start_settle = CrawlConfig::from(config).start_settle;
    let html = crawler.load_page(&page_url, start_settle).await?;
    let (report, discovered) = inspect_page(&html, &page_url, &filter);

    let links = discovered.unwrap_or_else(|e| {
        warn!(error = %e, "discovery found nothing");
        BTreeSet::new()
    });

    Ok(LinkDiagnosis {
        page_url,
        report,
        links,
    })
}

fn inspect_page(
    html: &str,
    page_url: &Url,
    filter: &LinkFilter,
) -> (LinkReport, nsrecords_shared::Result<BTreeSet<Url>>) {
    let doc = Html::parse_document(html);
    (inspect_links(&doc, page_url), discover_record_links(&doc, page_url, filter))
}

async fn cmd_links(config: &AppConfig, url: Option<&str>, args: &SourceArgs) -> Result<()> {
    let LinkDiagnosis {
        page_url,
        report,
        links,
    } = diagnose_links(config, url, args).await?;

    println!("Page: {page_url}");
    println!();
    println!("Anchors:          {}", report.anchors.len());
    println!("Record anchors:   {}", report.record_anchors().count());
    println!("<nav> elements:   {}", report.nav_elements);
    println!("<aside> elements: {}", report.aside_elements);
    println!("iframes:          {}", report.iframes.len());

    if !report.token_containers.is_empty() {
        println!();
        println!("Navigation containers:");
        for container in &report.token_containers {
            println!("  {container}");
        }
    }

    for frame in &report.iframes {
        println!(
            "  iframe src={} id={} name={}",
            frame.src.as_deref().unwrap_or("-"),
            frame.id.as_deref().unwrap_or("-"),
            frame.name.as_deref().unwrap_or("-"),
        );
    }

    println!();
    println!("First anchors:");
    for anchor in report.anchors.iter().take(20) {
        let marker = if anchor.is_record { "*" } else { " " };
        println!("  {marker} {:<40} {}", anchor.text, anchor.href);
    }

    println!();
    println!("Discovered record links: {}", links.len());
    for link in &links {
        println!("  {link}");
    }

    Ok(())
}

/// Extract one record page, from `html` when given, else through the page source.
async fn load_record(
    config: &AppConfig,
    url: &str,
    html: Option<&Path>,
    args: &SourceArgs,
) -> Result<RecordEntry> {
    let page_url = parse_url(url)?;

    let entry = match html {
        Some(path) => {
            let content =
                std::fs::read_to_string(path).map_err(|e| NsRecordsError::io(path, e))?;
            extract_record_from_html(&content, &page_url)?
        }
        None => build_crawler(config, &page_url, args)?.extract(&page_url).await?,
    };
    Ok(entry)
}

async fn cmd_extract(
    config: &AppConfig,
    url: &str,
    html: Option<&Path>,
    args: &SourceArgs,
) -> Result<()> {
    let entry = load_record(config, url, html, args).await?;

    info!(
        record = %entry.record_name,
        fields = entry.fields.len(),
        "record extracted"
    );
    println!("{}", serde_json::to_string_pretty(&entry)?);
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid spinner template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn page_started(&self, url: &Url, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Extracting [{current}/{total}] {url}"));
    }

    fn page_finished(
        &self,
        url: &Url,
        outcome: std::result::Result<&RecordEntry, &NsRecordsError>,
    ) {
        if let Err(e) = outcome {
            self.spinner.println(format!("  skipped {url}: {e}"));
        }
    }

    fn done(&self, _report: &CrawlReport) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        // A failed crawl never reaches `done`.
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}
