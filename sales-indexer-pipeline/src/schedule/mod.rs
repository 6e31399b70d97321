//! Weekly trigger schedule.
//!
//! A run fires whenever a cron expression matches in a named time zone (the
//! default is minutes 10, 20 and 30 past 09:00 on Saturdays, Asia/Jakarta).
//! Missed triggers are never replayed: the next trigger is always strictly
//! after the moment asked about.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Seconds, minutes, hours, day of month, month, day of week.
pub const DEFAULT_CRON: &str = "0 10,20,30 9 * * Sat";
pub const DEFAULT_TIMEZONE: &str = "Asia/Jakarta";

/// Errors raised when parsing a schedule.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("invalid cron expression {expression:?}: {reason}")]
    InvalidCron { expression: String, reason: String },

    #[error("unknown time zone {0:?}")]
    InvalidTimezone(String),
}

/// When scheduled runs fire.
#[derive(Debug, Clone)]
pub struct Schedule {
    expression: String,
    cron: cron::Schedule,
    timezone: Tz,
}

impl PartialEq for Schedule {
    fn eq(&self, other: &Self) -> bool {
        self.expression == other.expression && self.timezone == other.timezone
    }
}

impl Eq for Schedule {}

impl Schedule {
    /// Minutes 10, 20 and 30 past 09:00 every Saturday, Asia/Jakarta.
    pub fn weekly_default() -> Result<Self, ScheduleError> {
        Self::parse(DEFAULT_CRON, DEFAULT_TIMEZONE)
    }

    /// Parse a schedule from a six or seven field cron expression and an IANA
    /// time zone name, e.g. `("0 10,20,30 9 * * Sat", "Asia/Jakarta")`.
    ///
    /// Day-of-week numbers follow the `cron` crate (1 = Sunday); prefer names.
    pub fn parse(expression: &str, timezone: &str) -> Result<Self, ScheduleError> {
        let expression = expression.split_whitespace().collect::<Vec<_>>().join(" ");
        let cron = cron::Schedule::from_str(&expression).map_err(|e| ScheduleError::InvalidCron {
            expression: expression.clone(),
            reason: e.to_string(),
        })?;

        let timezone = timezone
            .trim()
            .parse::<Tz>()
            .map_err(|_| ScheduleError::InvalidTimezone(timezone.to_string()))?;

        Ok(Self {
            expression,
            cron,
            timezone,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// The first trigger strictly after `now`, matched in local time.
    pub fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.upcoming(now, 1).into_iter().next()
    }

    /// The next `count` triggers after `from`, in order.
    pub fn upcoming(&self, from: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
        self.cron
            .after(&from.with_timezone(&self.timezone))
            .map(|local| local.with_timezone(&Utc))
            .filter(|trigger| *trigger > from)
            .take(count)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(text: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(text).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_weekly_default_matches_parsed_configuration() {
        let parsed = Schedule::parse("0 10,20,30 9 * * Sat", "Asia/Jakarta").unwrap();
        assert_eq!(parsed, Schedule::weekly_default().unwrap());
        assert_eq!(parsed.timezone(), chrono_tz::Asia::Jakarta);
        assert_eq!(
            Schedule::parse("  0 10,20,30   9 * * Sat ", " Asia/Jakarta").unwrap(),
            parsed
        );
        assert_eq!(parsed.expression(), DEFAULT_CRON);
    }

    #[test]
    fn test_parse_rejects_invalid_values() {
        assert!(matches!(
            Schedule::parse("", "UTC"),
            Err(ScheduleError::InvalidCron { .. })
        ));
        assert!(matches!(
            Schedule::parse("0 10,75 9 * * Sat", "UTC"),
            Err(ScheduleError::InvalidCron { .. })
        ));
        assert!(matches!(
            Schedule::parse("0 10 24 * * Sat", "UTC"),
            Err(ScheduleError::InvalidCron { .. })
        ));
        assert!(matches!(
            Schedule::parse("0 10 9 * * Someday", "UTC"),
            Err(ScheduleError::InvalidCron { .. })
        ));
        assert!(matches!(
            Schedule::parse(DEFAULT_CRON, "Mars/Olympus"),
            Err(ScheduleError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn test_next_after_uses_local_time() {
        let schedule = Schedule::weekly_default().unwrap();

        // Friday 2024-11-01 12:00 in Jakarta (UTC+7).
        let now = utc("2024-11-01T05:00:00Z");
        // Saturday 2024-11-02 09:10 Jakarta is 02:10 UTC.
        assert_eq!(schedule.next_after(now), Some(utc("2024-11-02T02:10:00Z")));
    }

    #[test]
    fn test_next_after_is_strictly_later() {
        let schedule = Schedule::weekly_default().unwrap();

        let at_trigger = utc("2024-11-02T02:10:00Z");
        assert_eq!(schedule.next_after(at_trigger), Some(utc("2024-11-02T02:20:00Z")));

        // After the last trigger of the day the next one is a week later.
        let after_last = utc("2024-11-02T02:30:00Z");
        assert_eq!(schedule.next_after(after_last), Some(utc("2024-11-09T02:10:00Z")));
    }

    #[test]
    fn test_upcoming_lists_triggers_in_order() {
        let schedule = Schedule::weekly_default().unwrap();
        let triggers = schedule.upcoming(utc("2024-11-01T00:00:00Z"), 4);

        assert_eq!(
            triggers,
            vec![
                utc("2024-11-02T02:10:00Z"),
                utc("2024-11-02T02:20:00Z"),
                utc("2024-11-02T02:30:00Z"),
                utc("2024-11-09T02:10:00Z"),
            ]
        );
    }

    #[test]
    fn test_upcoming_respects_other_time_zones() {
        let schedule = Schedule::parse("0 0 12 * * Mon", "UTC").unwrap();
        // Monday 2024-11-04 12:00 UTC.
        assert_eq!(
            schedule.upcoming(utc("2024-11-01T00:00:00Z"), 2),
            vec![utc("2024-11-04T12:00:00Z"), utc("2024-11-11T12:00:00Z")]
        );
    }
}
