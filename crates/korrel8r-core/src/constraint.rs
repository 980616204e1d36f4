//! Constraint module - time window and result limits for a search

use crate::api;
use crate::error::{Error, Result};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

/// Time window plus result-shaping limits
///
/// Absent fields stay absent through [`Constraint::to_api`] and
/// [`Constraint::from_api`]; nothing is defaulted. Instants travel as
/// millisecond-precision ISO-8601 strings, so the builder methods truncate
/// to milliseconds to keep the wire mapping lossless.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constraint {
    /// Start of the time window
    pub start: Option<DateTime<Utc>>,

    /// End of the time window
    pub end: Option<DateTime<Utc>>,

    /// Maximum number of results per query
    pub limit: Option<u64>,

    /// Query timeout in nanoseconds
    pub timeout_ns: Option<u64>,
}

impl Constraint {
    /// Set the start instant, truncated to milliseconds
    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start.trunc_subsecs(3));
        self
    }

    /// Set the end instant, truncated to milliseconds
    pub fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end.trunc_subsecs(3));
        self
    }

    /// Set the result limit
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the timeout in nanoseconds
    pub fn with_timeout_ns(mut self, timeout_ns: u64) -> Self {
        self.timeout_ns = Some(timeout_ns);
        self
    }

    /// True if no field is set
    pub fn is_empty(&self) -> bool {
        self.start.is_none()
            && self.end.is_none()
            && self.limit.is_none()
            && self.timeout_ns.is_none()
    }

    /// Convert from the wire representation
    ///
    /// Dates are truncated to milliseconds like the builders, and
    /// [`Constraint::to_api`] writes them back in canonical form:
    /// `2024-01-01T00:00:00Z` comes back as `2024-01-01T00:00:00.000Z`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConstraint`] if a date is not RFC 3339 or the
    /// timeout is not a decimal integer.
    pub fn from_api(wire: &api::Constraint) -> Result<Self> {
        Ok(Self {
            start: wire.start.as_deref().map(|s| parse_instant("start", s)).transpose()?,
            end: wire.end.as_deref().map(|s| parse_instant("end", s)).transpose()?,
            limit: wire.limit,
            timeout_ns: wire
                .timeout
                .as_deref()
                .map(|s| {
                    s.parse::<u64>().map_err(|_| Error::InvalidConstraint {
                        field: "timeout",
                        value: s.to_string(),
                    })
                })
                .transpose()?,
        })
    }

    /// Convert to the wire representation
    pub fn to_api(&self) -> api::Constraint {
        api::Constraint {
            start: self.start.as_ref().map(format_instant),
            end: self.end.as_ref().map(format_instant),
            limit: self.limit,
            timeout: self.timeout_ns.map(|ns| ns.to_string()),
        }
    }
}

/// Format an instant the way JavaScript's `Date.toISOString` does
pub fn format_instant(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_instant(field: &'static str, s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc).trunc_subsecs(3))
        .map_err(|_| Error::InvalidConstraint {
            field,
            value: s.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(1969, 3, 21, 5, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_roundtrip() {
        let c = Constraint::default();
        assert_eq!(c.to_api(), api::Constraint::default());
        assert_eq!(Constraint::from_api(&api::Constraint::default()).unwrap(), c);
        assert!(c.is_empty());
    }

    #[test]
    fn test_time_window_roundtrip() {
        let end = Utc::now();
        let c = Constraint::default().with_start(start()).with_end(end);
        let wire = c.to_api();
        assert_eq!(wire.start.as_deref(), Some("1969-03-21T05:00:00.000Z"));
        assert_eq!(Constraint::from_api(&wire).unwrap(), c);
        assert_eq!(Constraint::from_api(&wire).unwrap().to_api(), wire);
    }

    #[test]
    fn test_wire_dates_are_canonical() {
        let wire = api::Constraint {
            start: Some("2024-01-01T00:00:00Z".to_string()),
            end: Some("2024-01-01T01:00:00.123456789+00:00".to_string()),
            ..Default::default()
        };
        let c = Constraint::from_api(&wire).unwrap();
        assert_eq!(c.end.unwrap().timestamp_subsec_nanos(), 123_000_000);
        let canonical = c.to_api();
        assert_eq!(canonical.start.as_deref(), Some("2024-01-01T00:00:00.000Z"));
        assert_eq!(canonical.end.as_deref(), Some("2024-01-01T01:00:00.123Z"));
        assert_eq!(Constraint::from_api(&canonical).unwrap(), c);
    }

    #[test]
    fn test_limits_roundtrip() {
        let wire = api::Constraint {
            limit: Some(50),
            timeout: Some("1111111111".to_string()),
            ..Default::default()
        };
        let c = Constraint::from_api(&wire).unwrap();
        assert_eq!(c, Constraint::default().with_limit(50).with_timeout_ns(1111111111));
        assert_eq!(c.to_api(), wire);
    }

    #[test]
    fn test_invalid_wire_fields() {
        let wire = api::Constraint {
            timeout: Some("10s".to_string()),
            ..Default::default()
        };
        assert_eq!(
            Constraint::from_api(&wire).unwrap_err(),
            Error::InvalidConstraint {
                field: "timeout",
                value: "10s".to_string()
            }
        );

        let wire = api::Constraint {
            start: Some("yesterday".to_string()),
            ..Default::default()
        };
        assert!(Constraint::from_api(&wire).is_err());
    }
}
