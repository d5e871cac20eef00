//! Preset switch plans.

use serde::{Deserialize, Serialize};

use crate::types::{NewSwitch, NotificationSettings, ReminderFrequency, ReminderSettings};

/// Id of the plan preselected for new switches.
pub const DEFAULT_PLAN_ID: &str = "standard";

/// A preset bundle of timing and notification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Hours between check-ins.
    pub check_in_interval: u32,
    /// Hours of grace after a missed check-in.
    pub grace_period: u32,
    pub reminders: ReminderSettings,
    pub notifications: NotificationSettings,
    pub auto_renewal: bool,
    pub features: Vec<String>,
}

impl PlanTemplate {
    /// Build a create payload for `message` using this plan's settings.
    pub fn to_new_switch(&self, message: impl Into<String>) -> NewSwitch {
        NewSwitch {
            message: message.into(),
            check_in_interval: self.check_in_interval,
            plan_name: self.name.clone(),
            grace_period: self.grace_period,
            reminders: self.reminders.clone(),
            notifications: self.notifications.clone(),
            auto_renewal: self.auto_renewal,
            emergency_contacts: Vec::new(),
            custom_actions: Vec::new(),
        }
    }
}

impl NewSwitch {
    /// Build a create payload from a plan template.
    pub fn from_plan(plan: &PlanTemplate, message: impl Into<String>) -> Self {
        plan.to_new_switch(message)
    }
}

fn features(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// All built-in plans, least to most demanding.
pub fn templates() -> Vec<PlanTemplate> {
    let reminders = ReminderSettings::default();
    let notifications = NotificationSettings::default();

    vec![
        PlanTemplate {
            id: "basic".to_string(),
            name: "Basic Safety".to_string(),
            description: "Simple check-ins with email notifications".to_string(),
            check_in_interval: 24,
            grace_period: 48,
            reminders: ReminderSettings {
                frequency: ReminderFrequency::Daily,
                ..reminders.clone()
            },
            notifications: NotificationSettings {
                email: true,
                sms: false,
                push: false,
                ..notifications.clone()
            },
            auto_renewal: false,
            features: features(&["Daily check-ins", "Email notifications", "2-day grace period"]),
        },
        PlanTemplate {
            id: "standard".to_string(),
            name: "Standard Protection".to_string(),
            description: "Enhanced monitoring with multiple notification channels".to_string(),
            check_in_interval: 12,
            grace_period: 24,
            reminders: ReminderSettings {
                frequency: ReminderFrequency::Daily,
                advance_warning: 12,
                ..reminders.clone()
            },
            notifications: NotificationSettings {
                email: true,
                sms: true,
                push: true,
                ..notifications.clone()
            },
            auto_renewal: true,
            features: features(&[
                "12-hour check-ins",
                "Multi-channel notifications",
                "Auto-renewal",
                "1-day grace period",
            ]),
        },
        PlanTemplate {
            id: "premium".to_string(),
            name: "Premium Security".to_string(),
            description: "Maximum protection with advanced features and custom actions".to_string(),
            check_in_interval: 6,
            grace_period: 12,
            reminders: ReminderSettings {
                frequency: ReminderFrequency::Hourly,
                advance_warning: 6,
                ..reminders
            },
            notifications: NotificationSettings {
                email: true,
                sms: true,
                push: true,
                slack: true,
                discord: true,
                custom_webhook: None,
            },
            auto_renewal: true,
            features: features(&[
                "6-hour check-ins",
                "All notification channels",
                "Custom actions",
                "12-hour grace period",
                "Priority support",
            ]),
        },
    ]
}

/// Look up a built-in plan by id.
pub fn find(id: &str) -> Option<PlanTemplate> {
    templates().into_iter().find(|plan| plan.id == id)
}
