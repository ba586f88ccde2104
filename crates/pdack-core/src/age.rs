//! Incident age evaluation.
//!
//! Ages are measured against a single reference instant per evaluation so
//! every incident of one fetch is compared against the same `now`.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

use crate::error::{PdackError, Result};
use crate::types::Incident;

/// Parse an API timestamp into a UTC instant.
///
/// Accepts RFC 3339 with or without fractional seconds and with either `Z`
/// or a numeric offset. A timestamp without any offset is taken as UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(rfc_err) => NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|_| PdackError::TimestampParse {
                value: value.to_string(),
                message: rfc_err.to_string(),
            }),
    }
}

/// Elapsed time between creation and `now`. Negative for future timestamps.
pub fn age(incident: &Incident, now: DateTime<Utc>) -> TimeDelta {
    now.signed_duration_since(incident.created_at)
}

/// Age in fractional minutes.
pub fn age_minutes(incident: &Incident, now: DateTime<Utc>) -> f64 {
    let delta = age(incident, now);
    // Microsecond resolution is plenty for minute-scale thresholds.
    match delta.num_microseconds() {
        Some(us) => us as f64 / 60_000_000.0,
        None => delta.num_seconds() as f64 / 60.0,
    }
}

/// Whether an incident has lived at least `threshold` at `now`.
///
/// Compared on exact durations, so an incident created exactly `threshold`
/// before `now` is eligible.
pub fn is_older_than(incident: &Incident, now: DateTime<Utc>, threshold: TimeDelta) -> bool {
    age(incident, now) >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IncidentStatus;
    use crate::types::fixtures::incident;

    fn now() -> DateTime<Utc> {
        parse_timestamp("2024-01-01T12:00:00Z").unwrap()
    }

    #[test]
    fn test_parse_whole_and_fractional_seconds_agree() {
        let a = parse_timestamp("2024-01-01T00:00:00Z").unwrap();
        let b = parse_timestamp("2024-01-01T00:00:00.000000+00:00").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_offset_normalised_to_utc() {
        let a = parse_timestamp("2024-01-01T02:00:00+02:00").unwrap();
        let b = parse_timestamp("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_naive_is_utc() {
        let a = parse_timestamp("2024-01-01T00:00:00.5").unwrap();
        let b = parse_timestamp("2024-01-01T00:00:00.500Z").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_timestamp("last tuesday").unwrap_err();
        assert!(matches!(err, PdackError::TimestampParse { .. }));
    }

    #[test]
    fn test_age_minutes_fractional() {
        let inc = incident("P1", IncidentStatus::Triggered, "2024-01-01T11:58:30Z");
        assert!((age_minutes(&inc, now()) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_future_incident_has_negative_age() {
        let inc = incident("P1", IncidentStatus::Triggered, "2024-01-01T12:01:00Z");
        assert!(age_minutes(&inc, now()) < 0.0);
        assert!(!is_older_than(&inc, now(), TimeDelta::zero()));
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let threshold = TimeDelta::minutes(3);

        let exactly = incident("P1", IncidentStatus::Triggered, "2024-01-01T11:57:00Z");
        assert!(is_older_than(&exactly, now(), threshold));
        assert!(age_minutes(&exactly, now()) >= 3.0);

        let just_after = incident(
            "P2",
            IncidentStatus::Triggered,
            "2024-01-01T11:57:00.000001Z",
        );
        assert!(!is_older_than(&just_after, now(), threshold));
        assert!(age_minutes(&just_after, now()) < 3.0);
    }
}
