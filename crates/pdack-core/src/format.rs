//! Text rendering of incidents for terminal output and notifications.

use crate::types::Incident;

/// Width of summaries in the incident listing.
pub const LIST_SUMMARY_WIDTH: usize = 80;

/// Width of summaries in auto-ack log lines.
pub const LOG_SUMMARY_WIDTH: usize = 60;

/// Width of summaries in notification bodies and ack-all output.
pub const SHORT_SUMMARY_WIDTH: usize = 50;

/// Truncate to at most `max` characters without splitting a code point.
pub fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn created_display(incident: &Incident) -> String {
    incident.created_at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Multi-line block used by the incident listing.
pub fn format_incident(incident: &Incident) -> String {
    let priority = if incident.priority { " [P1]" } else { "" };
    format!(
        "  {}{}\n    {}\n    {}\n    Created: {} | Assignee: {}",
        incident.id,
        priority,
        incident.service,
        truncate(&incident.summary, LIST_SUMMARY_WIDTH),
        created_display(incident),
        incident.assignee_or_default(),
    )
}

/// Two-line description used in auto-ack log output.
pub fn format_incident_oneline(incident: &Incident) -> String {
    format!(
        "[#{}] {}: {}\n    Created: {} | Assignee: {}",
        incident.display_number(),
        incident.service,
        truncate(&incident.summary, LOG_SUMMARY_WIDTH),
        created_display(incident),
        incident.assignee_or_default(),
    )
}

/// Notification body: `<service>: <short summary>`.
pub fn notification_body(incident: &Incident) -> String {
    format!(
        "{}: {}",
        incident.service,
        truncate(&incident.summary, SHORT_SUMMARY_WIDTH)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IncidentStatus;
    use crate::types::fixtures::incident;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("abc", 10), "abc");
        assert_eq!(truncate("héllo wörld", 7), "héllo w");
    }

    #[test]
    fn test_format_incident_block() {
        let mut inc = incident("PABC123", IncidentStatus::Triggered, "2024-03-05T07:08:09.123Z");
        inc.priority = true;
        inc.assignee = Some("Fox Mulder".into());

        let text = format_incident(&inc);
        assert_eq!(
            text,
            "  PABC123 [P1]\n    checkout-api\n    High error rate on /pay\n    Created: 2024-03-05 07:08:09 | Assignee: Fox Mulder"
        );
    }

    #[test]
    fn test_format_oneline_uses_number() {
        let inc = incident("PABC123", IncidentStatus::Triggered, "2024-03-05T07:08:09Z");
        let text = format_incident_oneline(&inc);
        assert!(text.starts_with("[#42] checkout-api: High error rate on /pay\n"));
        assert!(text.ends_with("Assignee: Unassigned"));
    }

    #[test]
    fn test_notification_body_truncates_summary() {
        let mut inc = incident("PABC123", IncidentStatus::Triggered, "2024-03-05T07:08:09Z");
        inc.summary = "x".repeat(120);
        let body = notification_body(&inc);
        assert_eq!(body, format!("checkout-api: {}", "x".repeat(50)));
    }
}
