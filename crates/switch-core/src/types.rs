//! Switch records and their descriptive configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::{self, SwitchStatus};

/// A user-configured check-in timer with its payload.
///
/// Serialized in camelCase so stored collections stay compatible with records
/// written by earlier versions. Fields added after the first release carry
/// serde defaults and are backfilled on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Switch {
    /// Opaque identifier derived from the creation timestamp.
    pub id: String,
    /// Payload delivered when the switch expires.
    pub message: String,
    /// Hours allowed between check-ins.
    pub check_in_interval: u32,
    /// Most recent check-in.
    #[serde(default)]
    pub last_check_in: Option<DateTime<Utc>>,
    /// Whether the switch is still armed.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Deadline: `last_check_in + check_in_interval + grace_period`.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub plan_name: String,
    /// Extra hours tolerated after the interval.
    #[serde(default)]
    pub grace_period: u32,
    #[serde(default)]
    pub reminders: ReminderSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub auto_renewal: bool,
    #[serde(default)]
    pub emergency_contacts: Vec<String>,
    #[serde(default)]
    pub custom_actions: Vec<CustomAction>,
}

fn default_true() -> bool {
    true
}

impl Switch {
    /// Whether the deadline has passed at `now`.
    ///
    /// Switches without a deadline are never overdue.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now > expires_at)
    }

    /// Urgency classification at `now`.
    pub fn status(&self, now: DateTime<Utc>) -> SwitchStatus {
        SwitchStatus::at(self.is_active, self.expires_at, now)
    }

    /// Human-readable time left, or `None` without a deadline.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<String> {
        self.expires_at
            .map(|expires_at| time::format_time_remaining(expires_at, now))
    }
}

/// Payload for creating a switch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSwitch {
    pub message: String,
    pub check_in_interval: u32,
    #[serde(default)]
    pub plan_name: String,
    #[serde(default)]
    pub grace_period: u32,
    #[serde(default)]
    pub reminders: ReminderSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub auto_renewal: bool,
    #[serde(default)]
    pub emergency_contacts: Vec<String>,
    #[serde(default)]
    pub custom_actions: Vec<CustomAction>,
}

impl NewSwitch {
    /// Create a payload with default configuration.
    pub fn new(message: impl Into<String>, check_in_interval: u32) -> Self {
        Self {
            message: message.into(),
            check_in_interval,
            ..Self::default()
        }
    }

    /// Set the grace period in hours.
    pub fn with_grace_period(mut self, hours: u32) -> Self {
        self.grace_period = hours;
        self
    }

    /// Set the plan name.
    pub fn with_plan_name(mut self, name: impl Into<String>) -> Self {
        self.plan_name = name.into();
        self
    }

    /// Add an emergency contact.
    pub fn with_emergency_contact(mut self, contact: impl Into<String>) -> Self {
        self.emergency_contacts.push(contact.into());
        self
    }
}

/// How often reminders are sent ahead of a deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderFrequency {
    Hourly,
    #[default]
    Daily,
    Weekly,
}

/// Reminder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSettings {
    pub enabled: bool,
    pub frequency: ReminderFrequency,
    /// Hours before the deadline to start reminding.
    pub advance_warning: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_message: Option<String>,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            frequency: ReminderFrequency::Daily,
            advance_warning: 24,
            custom_message: None,
        }
    }
}

/// Notification channels enabled for a switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub email: bool,
    pub sms: bool,
    pub push: bool,
    pub slack: bool,
    pub discord: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_webhook: Option<String>,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email: true,
            sms: false,
            push: true,
            slack: false,
            discord: false,
            custom_webhook: None,
        }
    }
}

/// Kind of action attached to a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Email,
    Sms,
    Webhook,
    FileTransfer,
    CryptoTransfer,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// A user-defined action to run on expiry.
///
/// Stored verbatim; nothing in this crate executes actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomAction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub name: String,
    #[serde(default)]
    pub config: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub priority: ActionPriority,
}
