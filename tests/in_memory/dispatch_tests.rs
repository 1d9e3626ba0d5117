//! In-memory integration tests for the reminder dispatcher.

use super::helpers::{Backend, habit, june};
use nudge::reminder::{
    domain::{QuietHours, ScheduleGating, UserSettings},
    ports::UserRepository,
};
use nudge::task::{
    domain::{ClockTime, UserId},
    services::{ScheduleRequest, UpdateTaskRequest},
};
use rstest::{fixture, rstest};

#[fixture]
fn backend() -> Backend {
    Backend::at(june(11, 7, 0))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_morning_of_ticks_fires_pre_and_exact_once_each(backend: Backend) -> eyre::Result<()> {
    let owner = UserId::new();
    backend
        .subscribe(owner, &["https://push.example.com/phone", "https://push.example.com/laptop"])
        .await?;
    backend
        .task_service()
        .create_task(owner, habit("Take vitamins", &["08:00"]).with_reminder_before(5))
        .await?;
    let dispatcher = backend.dispatcher(ScheduleGating::HonorSchedule);

    let mut fired = 0;
    let mut attempted = 0;
    for minute in 45..60 {
        let report = dispatcher.tick_at(june(11, 7, minute)).await?;
        fired += report.events_fired;
        attempted += report.deliveries_attempted;
    }
    for minute in 0..15 {
        let report = dispatcher.tick_at(june(11, 8, minute)).await?;
        fired += report.events_fired;
        attempted += report.deliveries_attempted;
    }

    assert_eq!(fired, 2);
    assert_eq!(attempted, 4);
    assert_eq!(
        backend.delivered_titles(),
        [
            "Upcoming: Take vitamins",
            "Upcoming: Take vitamins",
            "Reminder: Take vitamins",
            "Reminder: Take vitamins",
        ]
    );
    Ok(())
}

async fn firing_days(
    backend: &Backend,
    gating: ScheduleGating,
    first_day: u32,
) -> eyre::Result<Vec<u32>> {
    let dispatcher = backend.dispatcher(gating);
    let mut days = Vec::new();
    for day in first_day..first_day + 7 {
        let report = dispatcher.tick_at(june(day, 9, 0)).await?;
        if report.events_fired > 0 {
            days.push(day);
        }
    }
    Ok(days)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn random_schedule_fires_on_the_requested_number_of_days(backend: Backend) -> eyre::Result<()> {
    let owner = UserId::new();
    backend.subscribe(owner, &["https://push.example.com/a"]).await?;
    backend
        .task_service()
        .create_task(
            owner,
            habit("Call a friend", &["09:00"])
                .with_reminder_before(1)
                .with_schedule(ScheduleRequest::random(3)),
        )
        .await?;

    // ISO weeks starting Monday 9 and Monday 16 June 2025.
    let first_week = firing_days(&backend, ScheduleGating::HonorSchedule, 9).await?;
    let repeated = firing_days(&backend, ScheduleGating::HonorSchedule, 9).await?;
    let second_week = firing_days(&backend, ScheduleGating::HonorSchedule, 16).await?;
    let every_day = firing_days(&backend, ScheduleGating::FireDaily, 9).await?;

    assert_eq!(first_week.len(), 3);
    assert_eq!(first_week, repeated);
    assert_eq!(second_week.len(), 3);
    assert_eq!(every_day.len(), 7);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn selected_days_fire_only_on_listed_weekdays(backend: Backend) -> eyre::Result<()> {
    let owner = UserId::new();
    backend.subscribe(owner, &["https://push.example.com/a"]).await?;
    backend
        .task_service()
        .create_task(
            owner,
            habit("Team sync", &["09:00"])
                .with_reminder_before(1)
                .with_schedule(ScheduleRequest::selected_days([1, 3])),
        )
        .await?;

    let days = firing_days(&backend, ScheduleGating::HonorSchedule, 9).await?;

    // Monday 9 and Wednesday 11 June 2025.
    assert_eq!(days, [9, 11]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn each_tick_sees_the_current_task_set(backend: Backend) -> eyre::Result<()> {
    let owner = UserId::new();
    backend.subscribe(owner, &["https://push.example.com/a"]).await?;
    let tasks = backend.task_service();
    let task = tasks
        .create_task(owner, habit("Water", &["10:00", "14:00"]).with_reminder_before(1))
        .await?;
    let dispatcher = backend.dispatcher(ScheduleGating::HonorSchedule);

    let before = dispatcher.tick_at(june(11, 10, 0)).await?;
    tasks
        .update_task(owner, task.id(), UpdateTaskRequest::new().with_active(false))
        .await?;
    let paused = dispatcher.tick_at(june(11, 14, 0)).await?;
    tasks
        .update_task(
            owner,
            task.id(),
            UpdateTaskRequest::new().with_active(true).with_times(["15:00"]),
        )
        .await?;
    let moved = dispatcher.tick_at(june(11, 15, 0)).await?;

    assert_eq!(before.events_fired, 1);
    assert_eq!(paused.tasks_evaluated, 0);
    assert_eq!(moved.events_fired, 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn quiet_hours_hold_back_ticks_but_not_on_demand_sends(backend: Backend) -> eyre::Result<()> {
    let sleeper = UserId::new();
    let night_owl = UserId::new();
    backend.subscribe(sleeper, &["https://push.example.com/sleeper"]).await?;
    backend.subscribe(night_owl, &["https://push.example.com/owl"]).await?;
    let mut user = backend
        .users
        .find_by_id(sleeper)
        .await?
        .ok_or_else(|| eyre::eyre!("subscribed user exists"))?;
    user.set_settings(UserSettings {
        timezone: "Europe/London".to_owned(),
        quiet_hours: QuietHours {
            enabled: true,
            start: ClockTime::from_hm(22, 0)?,
            end: ClockTime::from_hm(7, 0)?,
        },
    });
    backend.users.save(&user).await?;

    let tasks = backend.task_service();
    let late = tasks
        .create_task(sleeper, habit("Lights out", &["23:30"]).with_reminder_before(1))
        .await?;
    tasks
        .create_task(night_owl, habit("Stargaze", &["23:30"]).with_reminder_before(1))
        .await?;

    let report = backend
        .dispatcher(ScheduleGating::HonorSchedule)
        .tick_at(june(11, 23, 30))
        .await?;
    let on_demand = backend.notification_service().send_reminder(&late).await?;

    assert_eq!(report.events_fired, 2);
    assert_eq!(report.suppressed_by_quiet_hours, 1);
    assert_eq!(report.users_notified, 1);
    assert_eq!(on_demand.delivered, 1);
    assert_eq!(
        backend.delivered_titles(),
        ["Reminder: Stargaze", "Reminder: Lights out"]
    );
    Ok(())
}
