//! Push notification payloads shown by the client service worker.

use super::{FireEvent, FireKind, ReminderDomainError};
use crate::task::domain::{ScheduledSlot, Task, TaskId};
use minijinja::{Environment, context};
use serde::{Deserialize, Serialize};

const ICON: &str = "/icons/icon-192.svg";
const BADGE: &str = "/icons/badge-72.svg";
const DASHBOARD_URL: &str = "/dashboard";
const TEST_TITLE: &str = "Smart Reminder";
const TEST_BODY: &str = "This is a test notification!";

const PRE_TITLE: &str = "Upcoming: {{ title }}";
const EXACT_TITLE: &str = "Reminder: {{ title }}";
const PRE_BODY: &str = "Your task is due in {{ minutes }} minutes!";
const EXACT_BODY: &str = "{{ description if description else \"It's time for your \" ~ category }}";

/// Button offered alongside a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    /// Action identifier reported back by the client.
    pub action: String,
    /// Button label.
    pub title: String,
}

/// Data the client uses when the notification is clicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// Page to open.
    pub url: String,
    /// Task the reminder is about.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    /// Task category.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Scheduled time the reminder refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<ScheduledSlot>,
    /// Whether this is a pre-reminder.
    pub is_pre_reminder: bool,
}

/// JSON payload delivered to a push endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// Icon path.
    pub icon: String,
    /// Badge path.
    pub badge: String,
    /// Tag collapsing repeated notifications for one task.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Click-through data.
    pub data: NotificationData,
    /// Action buttons.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<NotificationAction>,
}

impl NotificationPayload {
    /// Builds the reminder payload for `task` and a fire event.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderDomainError::TemplateRender`] if the text fails to
    /// render.
    pub fn for_reminder(task: &Task, event: &FireEvent) -> Result<Self, ReminderDomainError> {
        let environment = Environment::new();
        let ctx = context! {
            title => task.title(),
            description => task.description().trim(),
            category => task.category().as_str(),
            minutes => event.lead.minutes(),
        };
        let (title_template, body_template) = match event.kind {
            FireKind::Pre => (PRE_TITLE, PRE_BODY),
            FireKind::Exact => (EXACT_TITLE, EXACT_BODY),
        };
        let render = |template: &str| {
            environment
                .render_str(template, &ctx)
                .map_err(|err| ReminderDomainError::TemplateRender(err.to_string()))
        };

        Ok(Self {
            title: render(title_template)?,
            body: render(body_template)?,
            icon: ICON.to_owned(),
            badge: BADGE.to_owned(),
            tag: Some(format!("task-{}", task.id())),
            data: NotificationData {
                url: DASHBOARD_URL.to_owned(),
                task_id: Some(task.id()),
                category: Some(task.category().as_str().to_owned()),
                scheduled_time: Some(ScheduledSlot::At(event.scheduled_time)),
                is_pre_reminder: event.kind.is_pre(),
            },
            actions: vec![
                NotificationAction {
                    action: "complete".to_owned(),
                    title: "Mark Done".to_owned(),
                },
                NotificationAction {
                    action: "snooze".to_owned(),
                    title: "Snooze 10min".to_owned(),
                },
            ],
        })
    }

    /// Builds the payload sent by the test notification endpoint.
    #[must_use]
    pub fn test() -> Self {
        Self {
            title: TEST_TITLE.to_owned(),
            body: TEST_BODY.to_owned(),
            icon: ICON.to_owned(),
            badge: BADGE.to_owned(),
            tag: None,
            data: NotificationData {
                url: DASHBOARD_URL.to_owned(),
                task_id: None,
                category: None,
                scheduled_time: None,
                is_pre_reminder: false,
            },
            actions: Vec::new(),
        }
    }
}
