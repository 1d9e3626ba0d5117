//! Minute-tick reminder dispatch loop.
//!
//! Each tick re-reads the active task set, evaluates every task against the
//! tick's local minute, and hands the resulting payloads to the notification
//! service grouped by owner, so each user record is pruned at most once per
//! tick.

use super::notification::{DeliveryReport, NotificationService};
use crate::calendar;
use crate::reminder::{
    domain::{NotificationPayload, ScheduleGating, User, evaluate},
    ports::{NotificationSender, UserRepository},
};
use crate::task::{
    domain::{ClockTime, UserId},
    ports::{TaskRepository, TaskRepositoryError},
};
use chrono::{NaiveDateTime, Timelike};
use mockable::Clock;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

const TICK_PERIOD: Duration = Duration::from_secs(60);
const BOUNDARY_SLACK: Duration = Duration::from_millis(500);

/// Errors that abort a single tick.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The active task set could not be loaded.
    #[error("failed to load active tasks: {0}")]
    LoadTasks(#[source] TaskRepositoryError),
}

/// Summary of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Active tasks examined.
    pub tasks_evaluated: usize,
    /// Fire events produced by the evaluator.
    pub events_fired: usize,
    /// Users that received at least one delivery attempt.
    pub users_notified: usize,
    /// Payloads withheld because of quiet hours.
    pub suppressed_by_quiet_hours: usize,
    /// Individual sends attempted.
    pub deliveries_attempted: usize,
    /// Individual sends that failed.
    pub deliveries_failed: usize,
    /// Subscriptions pruned after failures.
    pub subscriptions_pruned: usize,
}

impl TickReport {
    fn absorb(&mut self, delivery: &DeliveryReport) {
        self.users_notified += 1;
        self.deliveries_attempted += delivery.attempted;
        self.deliveries_failed += delivery.failed();
        self.subscriptions_pruned += delivery.pruned;
    }
}

/// Recurring reminder dispatcher.
pub struct ReminderDispatcher<T, U, S, C>
where
    T: TaskRepository + ?Sized,
    U: UserRepository + ?Sized,
    S: NotificationSender + ?Sized,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    notifications: NotificationService<U, S>,
    clock: Arc<C>,
    gating: ScheduleGating,
    honor_quiet_hours: bool,
}

impl<T, U, S, C> ReminderDispatcher<T, U, S, C>
where
    T: TaskRepository + ?Sized + 'static,
    U: UserRepository + ?Sized + 'static,
    S: NotificationSender + ?Sized + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a dispatcher that honours schedules and quiet hours.
    #[must_use]
    pub const fn new(
        tasks: Arc<T>,
        notifications: NotificationService<U, S>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            tasks,
            notifications,
            clock,
            gating: ScheduleGating::HonorSchedule,
            honor_quiet_hours: true,
        }
    }

    /// Sets the schedule gating policy.
    #[must_use]
    pub const fn with_gating(mut self, gating: ScheduleGating) -> Self {
        self.gating = gating;
        self
    }

    /// Enables or disables quiet-hours suppression.
    #[must_use]
    pub const fn with_quiet_hours(mut self, honor: bool) -> Self {
        self.honor_quiet_hours = honor;
        self
    }

    /// Runs one tick at the clock's current local minute.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::LoadTasks`] when the task set cannot be read.
    pub async fn tick(&self) -> Result<TickReport, DispatchError> {
        self.tick_at(calendar::local_now(&*self.clock)).await
    }

    /// Runs one tick for the given local wall-clock time.
    ///
    /// Per-task and per-user failures are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::LoadTasks`] when the task set cannot be read.
    pub async fn tick_at(&self, now: NaiveDateTime) -> Result<TickReport, DispatchError> {
        let minute = ClockTime::from_naive_time(now.time());
        let date = now.date();
        let tasks = self
            .tasks
            .find_active()
            .await
            .map_err(DispatchError::LoadTasks)?;

        let mut report = TickReport::default();
        let mut outgoing: BTreeMap<UserId, Vec<NotificationPayload>> = BTreeMap::new();
        for task in &tasks {
            report.tasks_evaluated += 1;
            if !self.gating.is_due(task, date) {
                continue;
            }
            for event in evaluate(minute, task.times(), task.reminder_lead()) {
                report.events_fired += 1;
                match NotificationPayload::for_reminder(task, &event) {
                    Ok(payload) => outgoing.entry(task.owner()).or_default().push(payload),
                    Err(err) => {
                        error!(task_id = %task.id(), error = %err, "failed to build reminder payload");
                    }
                }
            }
        }

        let mut deliveries = JoinSet::new();
        for (user_id, payloads) in outgoing {
            let Some(user) = self.load_recipient(user_id).await else {
                continue;
            };
            if self.honor_quiet_hours && user.is_quiet_at(minute) {
                debug!(user_id = %user_id, suppressed = payloads.len(), "quiet hours; reminders withheld");
                report.suppressed_by_quiet_hours += payloads.len();
                continue;
            }
            let service = self.notifications.clone();
            deliveries.spawn(async move { service.deliver(&user, &payloads).await });
        }

        while let Some(joined) = deliveries.join_next().await {
            match joined {
                Ok(Ok(delivery)) => report.absorb(&delivery),
                Ok(Err(err)) => warn!(error = %err, "reminder delivery skipped"),
                Err(join_error) => error!(error = %join_error, "reminder delivery task aborted"),
            }
        }
        Ok(report)
    }

    async fn load_recipient(&self, user_id: UserId) -> Option<User> {
        match self.notifications.users().find_by_id(user_id).await {
            Ok(Some(user)) if !user.subscriptions().is_empty() => Some(user),
            Ok(_) => {
                debug!(user_id = %user_id, "no push subscriptions; reminders dropped");
                None
            }
            Err(err) => {
                error!(user_id = %user_id, error = %err, "failed to load user for reminders");
                None
            }
        }
    }

    /// Runs ticks on every local minute boundary until `shutdown` resolves.
    ///
    /// The next boundary is recomputed from the wall clock before every
    /// sleep, so a clock step shifts the loop back into phase. Ticks never
    /// overlap: each one is awaited before the next boundary is computed, and
    /// boundaries passed during an overrunning tick are skipped. A minute is
    /// dispatched at most once even when the clock steps backwards. A failed
    /// or panicking tick is logged and the loop carries on.
    pub async fn run(self: Arc<Self>, shutdown: impl Future<Output = ()> + Send) {
        tokio::pin!(shutdown);
        info!("reminder dispatcher started");
        let mut last_minute: Option<NaiveDateTime> = None;

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                () = tokio::time::sleep_until(self.next_boundary()) => {
                    let now = calendar::local_now(&*self.clock);
                    let minute = start_of_minute(now);
                    if last_minute.is_some_and(|last| minute <= last) {
                        warn!(%minute, "wall clock moved back; minute already dispatched");
                    } else {
                        last_minute = Some(minute);
                        self.dispatch_tick(now).await;
                    }
                }
            }
        }
        info!("reminder dispatcher stopped");
    }

    async fn dispatch_tick(self: &Arc<Self>, now: NaiveDateTime) {
        let dispatcher = Arc::clone(self);
        let outcome = tokio::spawn(async move { dispatcher.tick_at(now).await }).await;
        match outcome {
            Ok(Ok(report)) if report.events_fired > 0 => info!(
                tasks = report.tasks_evaluated,
                fired = report.events_fired,
                users = report.users_notified,
                attempted = report.deliveries_attempted,
                failed = report.deliveries_failed,
                pruned = report.subscriptions_pruned,
                quiet = report.suppressed_by_quiet_hours,
                "reminder tick complete"
            ),
            Ok(Ok(report)) => debug!(tasks = report.tasks_evaluated, "reminder tick idle"),
            Ok(Err(err)) => error!(error = %err, "reminder tick failed"),
            Err(join_error) => error!(error = %join_error, "reminder tick panicked"),
        }
    }

    fn next_boundary(&self) -> Instant {
        let now = calendar::local_now(&*self.clock).time();
        // Leap seconds report nanoseconds past one billion.
        let nanos = now.nanosecond().min(999_999_999);
        let elapsed = Duration::from_secs(u64::from(now.second()))
            + Duration::from_nanos(u64::from(nanos));
        let wait = TICK_PERIOD.saturating_sub(elapsed) + BOUNDARY_SLACK;
        Instant::now() + wait
    }
}

fn start_of_minute(now: NaiveDateTime) -> NaiveDateTime {
    now.with_second(0)
        .and_then(|truncated| truncated.with_nanosecond(0))
        .unwrap_or(now)
}
