//! Duration arithmetic and display helpers for switch deadlines.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Minutes before the deadline in which a switch counts as due soon.
pub const DUE_SOON_MINUTES: i64 = 60;

/// Add a whole number of hours to a timestamp.
pub fn add_hours(at: DateTime<Utc>, hours: u32) -> DateTime<Utc> {
    at + Duration::hours(i64::from(hours))
}

/// Compute the expiry deadline for a check-in made at `last_check_in`.
///
/// The deadline is `last_check_in + check_in_interval + grace_period`, all in hours.
pub fn expiry_for(last_check_in: DateTime<Utc>, check_in_interval: u32, grace_period: u32) -> DateTime<Utc> {
    add_hours(add_hours(last_check_in, check_in_interval), grace_period)
}

/// Format the time left until `expires_at`.
///
/// Returns `"Expired"` once the deadline is reached, `"{h}h {m}m"` when at least
/// an hour remains, and `"{m}m"` otherwise.
pub fn format_time_remaining(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = expires_at - now;
    if diff <= Duration::zero() {
        return "Expired".to_string();
    }

    let hours = diff.num_hours();
    let minutes = diff.num_minutes() % 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Format a timestamp for display.
pub fn format_date_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Urgency of a switch relative to its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchStatus {
    /// Expired or explicitly deactivated.
    Inactive,
    /// Active but without a deadline (never checked in).
    Untracked,
    /// Active and past its deadline; the next sweep will expire it.
    Overdue,
    /// Less than [`DUE_SOON_MINUTES`] remain.
    DueSoon,
    /// Plenty of time left.
    Healthy,
}

impl SwitchStatus {
    /// Classify a switch from its activity flag and deadline.
    pub fn at(is_active: bool, expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        if !is_active {
            return SwitchStatus::Inactive;
        }

        let Some(expires_at) = expires_at else {
            return SwitchStatus::Untracked;
        };

        let overdue_by = now - expires_at;
        if overdue_by > Duration::zero() {
            SwitchStatus::Overdue
        } else if overdue_by > -Duration::minutes(DUE_SOON_MINUTES) {
            SwitchStatus::DueSoon
        } else {
            SwitchStatus::Healthy
        }
    }
}

/// Preset check-in frequencies offered when configuring a vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Monthly,
    Biannual,
}

impl Frequency {
    /// All presets, shortest first.
    pub const ALL: [Frequency; 3] = [Frequency::Weekly, Frequency::Monthly, Frequency::Biannual];

    /// Stable key used in stored configuration.
    pub fn key(&self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Biannual => "biannual",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly (30d)",
            Frequency::Biannual => "Bi-annual (182d)",
        }
    }

    /// Length of the period in days.
    pub fn days(&self) -> u32 {
        match self {
            Frequency::Weekly => 7,
            Frequency::Monthly => 30,
            Frequency::Biannual => 182,
        }
    }

    /// Length of the period in hours, usable as a check-in interval.
    pub fn hours(&self) -> u32 {
        self.days() * 24
    }

    /// Length of the period in seconds.
    pub fn seconds(&self) -> u64 {
        u64::from(self.hours()) * 3600
    }

    /// Parse a frequency from its key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_expiry_adds_interval_and_grace() {
        let expires = expiry_for(t0(), 24, 12);
        assert_eq!(expires - t0(), Duration::hours(36));
        assert_eq!(expiry_for(t0(), 6, 0), add_hours(t0(), 6));
    }

    #[test]
    fn test_format_time_remaining() {
        let now = t0();
        assert_eq!(format_time_remaining(now, now), "Expired");
        assert_eq!(format_time_remaining(now - Duration::minutes(5), now), "Expired");
        assert_eq!(format_time_remaining(now + Duration::minutes(42), now), "42m");
        assert_eq!(
            format_time_remaining(now + Duration::hours(5) + Duration::minutes(3), now),
            "5h 3m"
        );
        assert_eq!(format_time_remaining(now + Duration::hours(49), now), "49h 0m");
    }

    #[test]
    fn test_status_classification() {
        let now = t0();
        assert_eq!(SwitchStatus::at(false, Some(now), now), SwitchStatus::Inactive);
        assert_eq!(SwitchStatus::at(true, None, now), SwitchStatus::Untracked);
        assert_eq!(
            SwitchStatus::at(true, Some(now - Duration::seconds(1)), now),
            SwitchStatus::Overdue
        );
        assert_eq!(
            SwitchStatus::at(true, Some(now + Duration::minutes(30)), now),
            SwitchStatus::DueSoon
        );
        assert_eq!(
            SwitchStatus::at(true, Some(now + Duration::hours(3)), now),
            SwitchStatus::Healthy
        );
    }

    #[test]
    fn test_frequencies() {
        assert_eq!(Frequency::Weekly.seconds(), 7 * 24 * 3600);
        assert_eq!(Frequency::Monthly.hours(), 720);
        assert_eq!(Frequency::from_key("biannual"), Some(Frequency::Biannual));
        assert_eq!(Frequency::from_key("daily"), None);
    }

    #[test]
    fn test_format_date_time() {
        assert_eq!(format_date_time(t0()), "2024-03-01 12:00:00 UTC");
    }
}
