//! pdack - PagerDuty incident CLI
//!
//! Lists the incidents assigned to you, acknowledges them in bulk, or runs a
//! daemon that auto-acknowledges triggered incidents once they are older than
//! the polling interval.
//!
//! ## Usage
//!
//! ```bash
//! # List triggered and acknowledged incidents
//! pdack
//!
//! # Acknowledge every triggered incident
//! pdack --ack-all
//!
//! # Auto-acknowledge incidents older than 5 minutes, checking every 5 minutes
//! pdack --background-ack --interval 5
//!
//! # Check that notifications reach the terminal and desktop
//! pdack --test-alert
//! ```

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use pdack_api::{ApiError, IncidentApi, PagerDutyClient};
use pdack_config::Config;
use pdack_core::{LogGuard, PdackError, init_logging};
use pdack_daemon::{DEFAULT_INTERVAL_MINUTES, DesktopNotifier, MAX_INTERVAL_MINUTES};
use tracing::{error, info};

/// PagerDuty CLI - list and manage incidents
#[derive(Parser, Debug)]
#[command(name = "pdack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Acknowledge all triggered incidents
    #[arg(short, long, conflicts_with = "background_ack")]
    ack_all: bool,

    /// Daemon mode: auto-ack incidents older than the interval
    #[arg(short, long)]
    background_ack: bool,

    /// Interval in minutes for background-ack (cadence and age threshold, at most one week)
    #[arg(
        short,
        long,
        value_name = "MIN",
        default_value_t = DEFAULT_INTERVAL_MINUTES,
        value_parser = clap::value_parser!(u64).range(1..=MAX_INTERVAL_MINUTES)
    )]
    interval: u64,

    /// Send a test notification to the terminal and desktop
    #[arg(long)]
    test_alert: bool,

    /// Config file (defaults to ~/.config/pagerduty_tui.yaml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory for log files (defaults to ~/.pdack/logs/)
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

/// What the invocation asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    List,
    AckAll,
    BackgroundAck { interval_minutes: u64 },
    TestAlert,
}

impl Cli {
    fn mode(&self) -> Mode {
        if self.test_alert {
            Mode::TestAlert
        } else if self.ack_all {
            Mode::AckAll
        } else if self.background_ack {
            Mode::BackgroundAck {
                interval_minutes: self.interval,
            }
        } else {
            Mode::List
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let _guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            if let Some(hint) = e.guidance() {
                eprintln!("  {}", hint);
            }
            return ExitCode::from(1);
        }
    };

    // The daemon and the HTTP client both need a tokio runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            return ExitCode::from(1);
        }
    };

    let mode = cli.mode();
    info!(?mode, "starting pdack");

    match runtime.block_on(run(&cli, mode)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "pdack failed");
            report_error(&e);
            ExitCode::from(1)
        }
    }
}

/// Set up logging based on CLI arguments.
fn setup_logging(cli: &Cli) -> pdack_core::Result<LogGuard> {
    init_logging(cli.log_dir.clone(), cli.verbose > 0)
}

async fn run(cli: &Cli, mode: Mode) -> anyhow::Result<()> {
    let notifier = Arc::new(DesktopNotifier::new());

    // Notifications work without any PagerDuty configuration
    if mode == Mode::TestAlert {
        commands::test_alert(notifier.as_ref()).await;
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;
    info!(base_url = %config.api_base_url, "configuration loaded");

    // One client for the whole process; the API key never changes
    let client = Arc::new(PagerDutyClient::new(config.api_key(), config.client_config())?);

    match mode {
        Mode::List => commands::list(client.as_ref(), &config).await,
        Mode::AckAll => commands::ack_all(client.as_ref()).await,
        Mode::BackgroundAck { interval_minutes } => {
            let api: Arc<dyn IncidentApi> = client;
            commands::background_ack(api, notifier, interval_minutes).await
        }
        Mode::TestAlert => Ok(()),
    }
}

/// Print an error with whatever guidance its type carries.
fn report_error(err: &anyhow::Error) {
    eprintln!("Error: {:#}", err);

    if let Some(e) = err.downcast_ref::<PdackError>() {
        if let Some(hint) = e.guidance() {
            eprintln!("  {}", hint);
        }
    } else if let Some(e) = err.downcast_ref::<ApiError>() {
        eprintln!("  {}", e.suggested_action());
    }
}
