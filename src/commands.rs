//! Command handlers for the `pdack` binary.
//!
//! Each handler takes an already-built API client so it can be driven by an
//! in-memory fake in tests. Output goes to stdout; diagnostics go to tracing.

use std::sync::Arc;

use anyhow::{Context, Result};
use pdack_api::{IncidentApi, Session};
use pdack_config::Config;
use pdack_core::format::{SHORT_SUMMARY_WIDTH, format_incident, truncate};
use pdack_core::{Incident, IncidentStatus};
use pdack_daemon::{AutoAckDaemon, DaemonConfig, Notifier};
use tokio::sync::watch;
use tracing::{info, warn};

/// Title and body of the `--test-alert` notification.
pub const TEST_ALERT_TITLE: &str = "PagerDuty Test";
pub const TEST_ALERT_BODY: &str = "This is a test notification from pdack";

const RULE_WIDTH: usize = 60;

/// List triggered and acknowledged incidents assigned to the current user.
pub async fn list(api: &dyn IncidentApi, config: &Config) -> Result<()> {
    let session = Session::resolve(api).await?;
    let incidents = api
        .fetch_incidents(
            session.user_id(),
            &[IncidentStatus::Triggered, IncidentStatus::Acknowledged],
        )
        .await
        .context("Failed to fetch incidents")?;

    info!(count = incidents.len(), "listing incidents");
    print!("{}", render_incident_list(&incidents, config));
    Ok(())
}

/// Acknowledge every triggered incident, regardless of age.
pub async fn ack_all(api: &dyn IncidentApi) -> Result<()> {
    let session = Session::resolve(api).await?;
    let incidents = api
        .fetch_incidents(session.user_id(), &[IncidentStatus::Triggered])
        .await
        .context("Failed to fetch triggered incidents")?;
    // Age does not matter here, unlike the daemon
    let triggered: Vec<&Incident> = incidents.iter().filter(|i| i.is_triggered()).collect();

    if triggered.is_empty() {
        println!("No triggered incidents to acknowledge.");
        return Ok(());
    }

    println!("Acknowledging {} incident(s)...", triggered.len());
    for incident in triggered {
        let acknowledged = api
            .acknowledge_incident(&incident.id)
            .await
            .with_context(|| format!("Failed to acknowledge {}", incident.id))?;
        if !acknowledged {
            warn!(incident_id = %incident.id, "acknowledgment refused");
        }
        println!("{}", render_ack_line(incident, acknowledged));
    }
    println!("Done.");
    Ok(())
}

/// Run the auto-ack daemon until Ctrl-C.
pub async fn background_ack(
    api: Arc<dyn IncidentApi>,
    notifier: Arc<dyn Notifier>,
    interval_minutes: u64,
) -> Result<()> {
    let daemon = AutoAckDaemon::new(api, notifier, DaemonConfig::new(interval_minutes)?);
    let minutes = daemon.config().interval_minutes();

    println!("Background ack daemon started. Auto-ack threshold: {minutes} min");
    println!("Checking every {minutes} minutes. Press Ctrl+C to stop.");
    println!();

    // Ctrl-C flips the shutdown flag; the daemon stops at its next safe point
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            // The daemon stops once the sender is gone, so hold it forever
            let _tx = tx;
            std::future::pending::<()>().await;
            return;
        }
        let _ = tx.send(true);
    });

    let summary = daemon
        .run(rx)
        .await
        .context("Could not resolve the current PagerDuty user")?;

    println!();
    println!("Stopping background ack daemon.");
    info!(
        cycles = summary.cycles,
        acknowledged = summary.acknowledged,
        "daemon finished"
    );
    Ok(())
}

/// Send a sample notification through every channel.
pub async fn test_alert(notifier: &dyn Notifier) {
    println!("Sending test notifications...");
    notifier.notify(TEST_ALERT_TITLE, TEST_ALERT_BODY).await;
    println!("Done. Check your terminal and desktop notification center.");
}

fn render_section(
    out: &mut String,
    heading: &str,
    empty: &str,
    incidents: &[&Incident],
    config: &Config,
) {
    let rule = "=".repeat(RULE_WIDTH);
    out.push_str(&format!("\n{rule}\n{heading} ({})\n{rule}\n", incidents.len()));

    if incidents.is_empty() {
        out.push_str(&format!("  {empty}\n"));
        return;
    }

    for incident in incidents {
        // Block, optional dashboard link, blank separator
        out.push_str(&format_incident(incident));
        out.push('\n');
        if let Some(url) = config.incident_url(&incident.id) {
            out.push_str(&format!("    Link: {url}\n"));
        }
        out.push('\n');
    }
}

/// Render the two-section incident listing.
pub fn render_incident_list(incidents: &[Incident], config: &Config) -> String {
    let by_status = |status: IncidentStatus| -> Vec<&Incident> {
        incidents.iter().filter(|i| i.status == status).collect()
    };

    let mut out = String::new();
    render_section(
        &mut out,
        "TRIGGERED",
        "No triggered incidents",
        &by_status(IncidentStatus::Triggered),
        config,
    );
    render_section(
        &mut out,
        "ACKNOWLEDGED",
        "No acknowledged incidents",
        &by_status(IncidentStatus::Acknowledged),
        config,
    );
    out.push('\n');
    out
}

/// One line of `--ack-all` output.
pub fn render_ack_line(incident: &Incident, acknowledged: bool) -> String {
    if acknowledged {
        format!(
            "  Acknowledged: {} - {}",
            incident.id,
            truncate(&incident.summary, SHORT_SUMMARY_WIDTH)
        )
    } else {
        format!("  FAILED: {}", incident.id)
    }
}
