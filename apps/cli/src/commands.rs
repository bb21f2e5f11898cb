//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use mdhtml_core::{BatchReport, JobOutcome, ProgressReporter, convert_batch};
use mdhtml_discovery::{DiscoveryOptions, discover};
use mdhtml_shared::{AppConfig, init_config, load_config, load_config_from};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// mdhtml: turn Markdown notes into plain HTML pages.
#[derive(Parser)]
#[command(
    name = "mdhtml",
    version,
    about = "Convert Markdown files or directories into standalone HTML pages.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Read configuration from this file instead of ~/.mdhtml/mdhtml.toml.
    #[arg(long, global = true, env = "MDHTML_CONFIG")]
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

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Convert a Markdown file, or every Markdown file in a directory.
    Convert {
        /// Markdown file or directory.
        input: PathBuf,

        /// Output directory for directory input (overrides config).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Seed for email obfuscation, for reproducible output.
        #[arg(long)]
        seed: Option<u64>,

        /// Print the batch report as JSON instead of a progress bar.
        #[arg(long)]
        json: bool,
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

/// Crates whose events are shown by default.
const LOG_TARGETS: &[&str] = &[
    "mdhtml",
    "mdhtml_core",
    "mdhtml_discovery",
    "mdhtml_markdown",
    "mdhtml_shared",
];

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
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
pub(crate) fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Convert {
            input,
            out,
            seed,
            json,
        } => cmd_convert(config_path, &input, out, seed, json),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    Ok(match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    })
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_convert(
    config_path: Option<&Path>,
    input: &Path,
    out: Option<PathBuf>,
    seed: Option<u64>,
    json: bool,
) -> Result<ExitCode> {
    let config = resolve_config(config_path)?;

    let mut discovery = DiscoveryOptions::from(config.defaults.clone());
    if let Some(out) = out {
        discovery.output_dir = out;
    }

    let mut render = config.render.clone();
    if seed.is_some() {
        render.email_seed = seed;
    }

    let jobs = discover(input, &discovery)
        .map_err(|e| eyre!("cannot convert '{}': {e}", input.display()))?;

    if jobs.is_empty() {
        warn!(input = %input.display(), "no Markdown files found");
    }
    info!(input = %input.display(), jobs = jobs.len(), "converting");

    let report = if json {
        convert_batch(&jobs, &render, &CliProgress::hidden())
    } else {
        convert_batch(&jobs, &render, &CliProgress::new(jobs.len() as u64)?)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_failures(&report);
        println!("{}", report.summary());
    }

    Ok(if report.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_failures(report: &BatchReport) {
    for outcome in report.outcomes.iter().filter(|o| !o.success) {
        eprintln!(
            "  failed: {} ({})",
            outcome.job.source.display(),
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }
}

fn cmd_config_init() -> Result<ExitCode> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<ExitCode> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif bar.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new(total: u64) -> Result<Self> {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{pos}/{len}] {wide_msg}")?
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Ok(Self { bar })
    }

    fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn file_converted(&self, outcome: &JobOutcome, current: usize, _total: usize) {
        self.bar.set_position(current as u64);
        self.bar
            .set_message(outcome.job.destination.display().to_string());
    }

    fn done(&self, _report: &BatchReport) {
        self.bar.finish_and_clear();
    }
}
