//! Shared test helpers for in-memory integration tests.

use chrono::{NaiveDate, NaiveDateTime};
use nudge::calendar::FixedClock;
use nudge::reminder::{
    adapters::memory::{InMemoryUserRepository, RecordingNotificationSender},
    domain::{PushSubscription, ScheduleGating, SubscriptionKeys, VapidPublicKey},
    services::{NotificationService, ReminderDispatcher},
};
use nudge::stats::services::StatisticsService;
use nudge::task::{
    adapters::memory::{InMemoryHistoryRepository, InMemoryTaskRepository},
    domain::{ReminderLead, UserId},
    services::{CompletionService, CreateTaskRequest, TaskService},
};
use std::sync::Arc;

/// Public key accepted by [`VapidPublicKey::parse`].
pub const VAPID_KEY: &str =
    "BAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8gISIjJCUmJygpKissLS4vMDEyMzQ1Njc4OTo7PD0-P0A";

pub type Tasks = TaskService<InMemoryTaskRepository, FixedClock>;
pub type Completions = CompletionService<InMemoryTaskRepository, InMemoryHistoryRepository, FixedClock>;
pub type Statistics = StatisticsService<InMemoryTaskRepository, InMemoryHistoryRepository, FixedClock>;
pub type Notifications = NotificationService<InMemoryUserRepository, RecordingNotificationSender>;
pub type Dispatcher = ReminderDispatcher<
    InMemoryTaskRepository,
    InMemoryUserRepository,
    RecordingNotificationSender,
    FixedClock,
>;

/// Local wall-clock time in June 2025. The 11th is a Wednesday.
///
/// # Panics
///
/// Panics when the components do not form a valid date and time.
#[must_use]
pub fn june(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .expect("valid June 2025 wall-clock time")
}

/// Builds a push subscription for `endpoint`.
#[must_use]
pub fn subscription(endpoint: &str) -> PushSubscription {
    PushSubscription {
        endpoint: endpoint.to_owned(),
        expiration_time: None,
        keys: SubscriptionKeys {
            p256dh: "client-key".to_owned(),
            auth: "client-auth".to_owned(),
        },
    }
}

/// Request for an active habit scheduled at `times`.
#[must_use]
pub fn habit(title: &str, times: &[&str]) -> CreateTaskRequest {
    CreateTaskRequest::new(title, "Habit").with_times(times.iter().copied())
}

/// In-memory backend whose repositories outlive clock changes.
#[derive(Clone)]
pub struct Backend {
    pub tasks: Arc<InMemoryTaskRepository>,
    pub history: Arc<InMemoryHistoryRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub sender: Arc<RecordingNotificationSender>,
    pub clock: Arc<FixedClock>,
}

impl Backend {
    /// Creates empty repositories with the clock frozen at `now`.
    #[must_use]
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            tasks: Arc::new(InMemoryTaskRepository::new()),
            history: Arc::new(InMemoryHistoryRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
            sender: Arc::new(RecordingNotificationSender::new()),
            clock: Arc::new(FixedClock::at(now)),
        }
    }

    /// Shares the repositories under a clock frozen at `now`.
    #[must_use]
    pub fn moved_to(&self, now: NaiveDateTime) -> Self {
        Self {
            clock: Arc::new(FixedClock::at(now)),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn task_service(&self) -> Tasks {
        TaskService::new(Arc::clone(&self.tasks), Arc::clone(&self.clock))
    }

    #[must_use]
    pub fn task_service_with_lead(&self, minutes: u32) -> Tasks {
        let lead = ReminderLead::new(minutes).expect("valid lead");
        self.task_service().with_default_lead(lead)
    }

    #[must_use]
    pub fn completion_service(&self) -> Completions {
        CompletionService::new(
            Arc::clone(&self.tasks),
            Arc::clone(&self.history),
            Arc::clone(&self.clock),
        )
    }

    #[must_use]
    pub fn statistics_service(&self) -> Statistics {
        StatisticsService::new(
            Arc::clone(&self.tasks),
            Arc::clone(&self.history),
            Arc::clone(&self.clock),
        )
    }

    #[must_use]
    pub fn notification_service(&self) -> Notifications {
        NotificationService::new(Arc::clone(&self.users)).with_push(
            VapidPublicKey::parse(VAPID_KEY).expect("valid VAPID key"),
            Arc::clone(&self.sender),
        )
    }

    #[must_use]
    pub fn dispatcher(&self, gating: ScheduleGating) -> Dispatcher {
        ReminderDispatcher::new(
            Arc::clone(&self.tasks),
            self.notification_service(),
            Arc::clone(&self.clock),
        )
        .with_gating(gating)
    }

    /// Registers push endpoints for `user`.
    ///
    /// # Errors
    ///
    /// Returns an error when a subscription is rejected.
    pub async fn subscribe(&self, user: UserId, endpoints: &[&str]) -> eyre::Result<()> {
        let service = self.notification_service();
        for endpoint in endpoints {
            service.subscribe(user, subscription(endpoint)).await?;
        }
        Ok(())
    }

    /// Titles of every delivered payload, in delivery order.
    #[must_use]
    pub fn delivered_titles(&self) -> Vec<String> {
        self.sender
            .deliveries()
            .into_iter()
            .map(|delivery| delivery.payload.title)
            .collect()
    }
}
