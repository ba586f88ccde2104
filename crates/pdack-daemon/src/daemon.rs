//! Background auto-acknowledge daemon.
//!
//! The daemon is a three-state machine:
//!
//! ```text
//!   start ──resolve user──▶ CycleRunning ──▶ IdleWait ──interval──▶ CycleRunning
//!                                │               │
//!                                └──shutdown─────┴──────────────▶ Stopped
//! ```
//!
//! Each cycle fetches the user's triggered incidents, acknowledges every one
//! that has lived at least one interval, and notifies for each success. A
//! failing cycle is logged and retried after the normal interval; only the
//! initial user resolution is fatal.
//!
//! Shutdown is observed while idle-waiting and before a cycle starts, never
//! in the middle of one.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pdack_api::{ClientConfig, PagerDutyClient};
//! use pdack_daemon::{AutoAckDaemon, DaemonConfig, DesktopNotifier};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let api = Arc::new(PagerDutyClient::new("u+abcdef", ClientConfig::default())?);
//!     let daemon = AutoAckDaemon::new(api, Arc::new(DesktopNotifier::new()), DaemonConfig::new(3)?);
//!
//!     let (tx, rx) = tokio::sync::watch::channel(false);
//!     tokio::spawn(async move {
//!         let _ = tokio::signal::ctrl_c().await;
//!         let _ = tx.send(true);
//!     });
//!
//!     daemon.run(rx).await?;
//!     Ok(())
//! }
//! ```

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{DateTime, Local, TimeDelta, Utc};
use futures_util::FutureExt;
use pdack_api::{IncidentApi, Session};
use pdack_core::age::{age_minutes, is_older_than};
use pdack_core::format::{format_incident_oneline, notification_body};
use pdack_core::{Incident, IncidentId, IncidentStatus, PdackError};
use tokio::sync::watch;
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

use crate::notify::Notifier;

/// Default polling interval and age threshold, in minutes.
pub const DEFAULT_INTERVAL_MINUTES: u64 = 3;

/// Largest accepted interval: one week.
pub const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// Notification title for auto-acknowledged incidents.
pub const AUTO_ACK_TITLE: &str = "PagerDuty Auto-Ack";

/// Source of the reference instant for age checks.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Daemon settings, fixed for the daemon's lifetime.
///
/// The interval is both the polling cadence and the age threshold: an
/// incident becomes eligible once it has survived one full interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaemonConfig {
    interval_minutes: u64,
}

impl DaemonConfig {
    /// Create a config. The interval must be between 1 and
    /// [`MAX_INTERVAL_MINUTES`] minutes.
    pub fn new(interval_minutes: u64) -> pdack_core::Result<Self> {
        if !(1..=MAX_INTERVAL_MINUTES).contains(&interval_minutes) {
            return Err(PdackError::ConfigValidation {
                message: format!(
                    "interval must be between 1 and {} minutes, got {}",
                    MAX_INTERVAL_MINUTES, interval_minutes
                ),
            });
        }
        Ok(Self { interval_minutes })
    }

    pub fn interval_minutes(&self) -> u64 {
        self.interval_minutes
    }

    /// Sleep between cycles.
    pub fn interval(&self) -> Duration {
        // Bounded by MAX_INTERVAL_MINUTES in `new`
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }

    /// Minimum age for auto-acknowledgment.
    pub fn threshold(&self) -> TimeDelta {
        i64::try_from(self.interval_minutes)
            .ok()
            .and_then(TimeDelta::try_minutes)
            .unwrap_or(TimeDelta::MAX)
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
        }
    }
}

/// States of the daemon loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    /// Fetch, filter, acknowledge, notify
    CycleRunning,
    /// Sleeping until the next cycle
    IdleWait,
    /// Terminal state after shutdown
    Stopped,
}

/// What one successful cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Incidents returned by the fetch
    pub fetched: usize,
    /// Triggered incidents old enough to acknowledge
    pub eligible: usize,
    /// Incidents the API acknowledged
    pub acknowledged: Vec<IncidentId>,
    /// Incidents the API refused to acknowledge
    pub rejected: Vec<IncidentId>,
}

/// Result of one cycle, as seen at the cycle boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// The cycle failed; the next one runs after the normal interval
    TransientFailure { message: String },
}

impl CycleOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::TransientFailure { .. })
    }
}

/// Totals over the daemon's lifetime, returned when it stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DaemonSummary {
    pub cycles: u64,
    pub transient_failures: u64,
    pub acknowledged: u64,
}

impl DaemonSummary {
    fn record(&mut self, outcome: &CycleOutcome) {
        self.cycles += 1;
        match outcome {
            CycleOutcome::Completed(report) => self.acknowledged += report.acknowledged.len() as u64,
            CycleOutcome::TransientFailure { .. } => self.transient_failures += 1,
        }
    }
}

/// The auto-acknowledge daemon.
pub struct AutoAckDaemon {
    api: Arc<dyn IncidentApi>,
    notifier: Arc<dyn Notifier>,
    config: DaemonConfig,
    clock: Clock,
}

impl AutoAckDaemon {
    pub fn new(api: Arc<dyn IncidentApi>, notifier: Arc<dyn Notifier>, config: DaemonConfig) -> Self {
        Self {
            api,
            notifier,
            config,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the wall clock used for age checks.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn config(&self) -> &DaemonConfig {
        &self.config
    }

    /// Run until `shutdown` turns true (or its sender is dropped).
    ///
    /// Fails only if the current user cannot be resolved at startup.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> pdack_api::Result<DaemonSummary> {
        let session = Session::resolve(self.api.as_ref()).await?;

        info!(
            interval_minutes = self.config.interval_minutes,
            user_id = session.user_id(),
            "auto-ack daemon started"
        );

        let mut summary = DaemonSummary::default();
        let mut state = DaemonState::CycleRunning;

        loop {
            debug!(?state, "daemon state");
            state = match state {
                DaemonState::CycleRunning => {
                    let stop_requested = *shutdown.borrow();
                    if stop_requested {
                        DaemonState::Stopped
                    } else {
                        let outcome = self.run_cycle(&session).await;
                        if outcome.is_failure() {
                            warn!(
                                retry_in_minutes = self.config.interval_minutes,
                                "cycle failed, retrying after the interval"
                            );
                        }
                        summary.record(&outcome);
                        DaemonState::IdleWait
                    }
                }
                DaemonState::IdleWait => {
                    tokio::select! {
                        _ = tokio::time::sleep(self.config.interval()) => DaemonState::CycleRunning,
                        _ = wait_for_shutdown(&mut shutdown) => DaemonState::Stopped,
                    }
                }
                DaemonState::Stopped => break,
            };
        }

        info!(
            cycles = summary.cycles,
            failures = summary.transient_failures,
            acknowledged = summary.acknowledged,
            "auto-ack daemon stopped"
        );
        Ok(summary)
    }

    /// Run one cycle and convert every failure into a transient outcome.
    pub async fn run_cycle(&self, session: &Session) -> CycleOutcome {
        match AssertUnwindSafe(self.try_cycle(session)).catch_unwind().await {
            Ok(Ok(report)) => {
                debug!(
                    fetched = report.fetched,
                    eligible = report.eligible,
                    acknowledged = report.acknowledged.len(),
                    rejected = report.rejected.len(),
                    "cycle completed"
                );
                CycleOutcome::Completed(report)
            }
            Ok(Err(e)) => {
                error!(
                    error = %e,
                    transient = e.is_transient(),
                    "cycle failed: {}",
                    e.suggested_action()
                );
                CycleOutcome::TransientFailure {
                    message: e.to_string(),
                }
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(%message, "cycle panicked");
                CycleOutcome::TransientFailure { message }
            }
        }
    }

    async fn try_cycle(&self, session: &Session) -> pdack_api::Result<CycleReport> {
        let incidents = self
            .api
            .fetch_incidents(session.user_id(), &[IncidentStatus::Triggered])
            .await?;

        // One reference instant for the whole fetch
        let now = (self.clock)();
        let threshold = self.config.threshold();

        let mut report = CycleReport {
            fetched: incidents.len(),
            ..CycleReport::default()
        };

        for incident in incidents.iter().filter(|i| i.is_triggered()) {
            if !is_older_than(incident, now, threshold) {
                continue;
            }
            report.eligible += 1;

            if self.api.acknowledge_incident(&incident.id).await? {
                self.announce(incident, age_minutes(incident, now)).await;
                report.acknowledged.push(incident.id.clone());
            } else {
                report.rejected.push(incident.id.clone());
            }
        }

        Ok(report)
    }

    /// Print, log and notify one successful acknowledgment.
    async fn announce(&self, incident: &Incident, age: f64) {
        let timestamp = Local::now().format("%H:%M:%S").to_string();
        println!("[{timestamp}] Auto-acked ({age:.1} min old):");
        println!("    {}", format_incident_oneline(incident));
        println!();

        info!(
            incident_id = %incident.id,
            service = %incident.service,
            age_minutes = age,
            "auto-acknowledged incident"
        );

        self.notifier
            .notify(AUTO_ACK_TITLE, &notification_body(incident))
            .await;
    }
}

/// Resolves once shutdown is requested or the sender is gone.
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
