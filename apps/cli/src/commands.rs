//! CLI surface: argument definitions, tracing setup, and command
//! dispatch.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use waybackjobs_core::{ScrapeConfig, ScrapeProgress, run_scrape, sample_snapshot};
use waybackjobs_export::{
    ExportMeta, print_summary, write_csv, write_full_export, write_json, write_summary,
};
use waybackjobs_shared::{config_file_path, default_date_range, init_config, load_config};

/// HTTP timeout for index queries and snapshot fetches.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Parser)]
#[command(
    name = "waybackjobs",
    version,
    about = "Extract historical WNBA job listings from archived web snapshots"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a full historical scrape and write all exports
    Scrape {
        /// Start date, YYYYMMDD (default: years_back before today)
        #[arg(long)]
        from: Option<String>,

        /// End date, YYYYMMDD (default: today)
        #[arg(long)]
        to: Option<String>,

        /// Output directory for exports
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Cap on main-target snapshots to fetch, spread evenly
        #[arg(long)]
        max_snapshots: Option<usize>,

        /// Seconds between consecutive archive requests
        #[arg(long)]
        delay: Option<f64>,

        /// Skip per-team subpage discovery
        #[arg(long)]
        skip_subpages: bool,

        /// Keep every sighting instead of collapsing duplicates
        #[arg(long)]
        no_dedup: bool,

        /// Override the target listing URL (host + path, no scheme)
        #[arg(long)]
        target: Option<String>,
    },

    /// Fetch one representative snapshot and trial-run extraction on it
    Sample {
        /// Start date, YYYYMMDD (default: years_back before today)
        #[arg(long)]
        from: Option<String>,

        /// End date, YYYYMMDD (default: today)
        #[arg(long)]
        to: Option<String>,

        /// Directory to save the sample HTML into
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write a default config file to ~/.waybackjobs/
    Init,
    /// Print the effective configuration
    Show,
}

/// Install the tracing subscriber. `RUST_LOG` overrides the verbosity
/// flags when set.
pub fn init_tracing(cli: &Cli) {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "waybackjobs={level},waybackjobs_core={level},waybackjobs_archive={level},\
             waybackjobs_extract={level},waybackjobs_export={level},waybackjobs_shared={level}"
        ))
    });

    match cli.log_format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Scrape {
            from,
            to,
            output_dir,
            max_snapshots,
            delay,
            skip_subpages,
            no_dedup,
            target,
        } => {
            cmd_scrape(ScrapeArgs {
                from,
                to,
                output_dir,
                max_snapshots,
                delay,
                skip_subpages,
                no_dedup,
                target,
            })
            .await
        }
        Command::Sample {
            from,
            to,
            output_dir,
        } => cmd_sample(from, to, output_dir).await,
        Command::Config { action } => cmd_config(action),
    }
}

struct ScrapeArgs {
    from: Option<String>,
    to: Option<String>,
    output_dir: Option<PathBuf>,
    max_snapshots: Option<usize>,
    delay: Option<f64>,
    skip_subpages: bool,
    no_dedup: bool,
    target: Option<String>,
}

/// Spinner-backed progress sink for interactive runs.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("static template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"]),
        );
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl ScrapeProgress for CliProgress {
    fn stage(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn snapshot(&self, current: usize, total: usize, timestamp: &str) {
        self.bar
            .set_message(format!("fetching snapshot {current}/{total} ({timestamp})"));
    }
}

async fn cmd_scrape(args: ScrapeArgs) -> Result<()> {
    let config = load_config()?;
    let (default_from, default_to) = default_date_range(config.defaults.years_back);

    let scrape = ScrapeConfig {
        target_url: args.target.unwrap_or(config.archive.target_url),
        cdx_api_url: config.archive.cdx_api_url,
        wayback_base: config.archive.wayback_base,
        from: args.from.unwrap_or(default_from),
        to: args.to.unwrap_or(default_to),
        max_snapshots: args.max_snapshots,
        request_delay_secs: args.delay.unwrap_or(config.defaults.request_delay_secs),
        request_timeout_secs: REQUEST_TIMEOUT_SECS,
        skip_subpages: args.skip_subpages,
        no_dedup: args.no_dedup,
    };
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| PathBuf::from(&config.defaults.output_dir));

    let progress = CliProgress::new();
    let report = run_scrape(&scrape, &progress).await?;
    progress.finish("scrape complete");

    std::fs::create_dir_all(&output_dir)
        .wrap_err_with(|| format!("creating output directory {}", output_dir.display()))?;

    let meta = ExportMeta {
        source: report.target_url.clone(),
        from: report.from.clone(),
        to: report.to.clone(),
        snapshots_processed: report.snapshots_processed,
        total_jobs_found: report.total_jobs_found,
    };
    write_json(&output_dir, &report.jobs_by_team)?;
    write_csv(&output_dir, &report.jobs_by_team)?;
    write_summary(&output_dir, &report.jobs_by_team, &meta)?;
    write_full_export(&output_dir, &report.jobs_by_team, &meta)?;

    print_summary(&report.jobs_by_team, &meta);
    if report.fetch_failures > 0 {
        println!(
            "Note: {} snapshot fetch(es) failed and were skipped.",
            report.fetch_failures
        );
    }
    println!("Outputs written to {}", output_dir.display());
    Ok(())
}

async fn cmd_sample(
    from: Option<String>,
    to: Option<String>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let config = load_config()?;
    let (default_from, default_to) = default_date_range(config.defaults.years_back);

    let scrape = ScrapeConfig {
        target_url: config.archive.target_url,
        cdx_api_url: config.archive.cdx_api_url,
        wayback_base: config.archive.wayback_base,
        from: from.unwrap_or(default_from),
        to: to.unwrap_or(default_to),
        max_snapshots: None,
        request_delay_secs: config.defaults.request_delay_secs,
        request_timeout_secs: REQUEST_TIMEOUT_SECS,
        skip_subpages: true,
        no_dedup: false,
    };
    let output_dir = output_dir.unwrap_or_else(|| PathBuf::from(&config.defaults.output_dir));

    let progress = CliProgress::new();
    let report = sample_snapshot(&scrape, &output_dir, &progress).await?;
    progress.finish("sample saved");

    println!(
        "Saved snapshot {} to {} ({} bytes)",
        report
            .snapshot_date
            .as_deref()
            .unwrap_or(&report.timestamp),
        report.saved_to.display(),
        report.bytes
    );
    println!(
        "Trial extraction: {} record(s) via the {} tier",
        report.jobs_found, report.tier
    );
    Ok(())
}

fn cmd_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = init_config()?;
            println!("Wrote default config to {}", path.display());
        }
        ConfigAction::Show => {
            let path = config_file_path()?;
            let config = load_config()?;
            let rendered = toml::to_string_pretty(&config).wrap_err("rendering config")?;
            if path.exists() {
                println!("# {}", path.display());
            } else {
                println!("# {} (not present, showing defaults)", path.display());
            }
            print!("{rendered}");
        }
    }
    Ok(())
}
