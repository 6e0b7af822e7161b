//! Logpage - replay clicks against a rendered log page.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use logpage::config::Settings;
use logpage::runner::{init_logging, run_page, AppConfig, RunOptions};

/// Expand/collapse controller for rendered log pages
#[derive(Parser, Debug)]
#[command(name = "logpage")]
#[command(version, about, long_about = None)]
struct Args {
    /// Page description (JSON node tree)
    page: PathBuf,

    /// Click the header of the element with this debug id (repeatable)
    #[arg(short = 'c', long = "click", value_name = "DEBUG_ID")]
    clicks: Vec<String>,

    /// Print hierarchy diagnostics
    #[arg(long)]
    trace: bool,

    /// Print the final page as JSON
    #[arg(long)]
    dump: bool,

    /// Print the page audit as JSON
    #[arg(long)]
    audit: bool,

    /// Enable debug logging
    #[arg(short = 'd', long)]
    debug: bool,

    /// Enable verbose (trace-level) logging
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Settings file (defaults to the XDG config location)
    #[arg(long, env = "LOGPAGE_SETTINGS")]
    settings: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .context("Failed to load settings")?;

    init_logging(&AppConfig {
        debug: args.debug,
        verbose: args.verbose,
        log_filter: settings.log_filter.clone(),
    });

    let options = RunOptions {
        page: args.page,
        clicks: args.clicks,
        trace: args.trace,
        dump: args.dump,
        audit: args.audit,
    };
    let stdout = std::io::stdout();
    run_page(&options, &settings, &mut stdout.lock())
}
