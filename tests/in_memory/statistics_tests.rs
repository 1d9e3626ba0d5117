//! In-memory integration tests for completion statistics.

use super::helpers::{Backend, habit, june};
use nudge::task::{
    domain::{TaskId, UserId},
    services::MarkCompleteRequest,
};
use rstest::{fixture, rstest};

#[fixture]
fn backend() -> Backend {
    Backend::at(june(11, 21, 0))
}

async fn complete_on(
    backend: &Backend,
    owner: UserId,
    task: TaskId,
    days: &[u32],
) -> eyre::Result<()> {
    for day in days {
        backend
            .moved_to(june(*day, 12, 0))
            .completion_service()
            .mark_complete(owner, task, MarkCompleteRequest::new())
            .await?;
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_week_of_completions(backend: Backend) -> eyre::Result<()> {
    let owner = UserId::new();
    let tasks = backend.task_service();
    let water = tasks.create_task(owner, habit("Water", &["09:00"])).await?;
    let walk = tasks.create_task(owner, habit("Walk", &["18:00"])).await?;
    complete_on(&backend, owner, water.id(), &[3, 8, 9, 10, 11]).await?;
    complete_on(&backend, owner, walk.id(), &[11]).await?;

    let stats = backend.statistics_service().statistics(owner).await?;

    assert_eq!(stats.total_active_tasks, 2);
    assert_eq!(stats.completed_today, 2);
    assert_eq!(stats.completion_rate, 100);
    assert_eq!(stats.streak, 4);
    let week: Vec<(u32, u64)> = stats
        .weekly_progress
        .iter()
        .map(|day| (day.day_number, day.completed))
        .collect();
    assert_eq!(week, [(5, 0), (6, 0), (7, 0), (8, 1), (9, 1), (10, 1), (11, 2)]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn an_open_today_keeps_yesterdays_streak(backend: Backend) -> eyre::Result<()> {
    let owner = UserId::new();
    let task = backend
        .task_service()
        .create_task(owner, habit("Practice piano", &["17:00"]))
        .await?;
    complete_on(&backend, owner, task.id(), &[8, 9, 10]).await?;

    let stats = backend.statistics_service().statistics(owner).await?;

    assert_eq!(stats.completed_today, 0);
    assert_eq!(stats.completion_rate, 0);
    assert_eq!(stats.streak, 3);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_missed_day_resets_the_streak(backend: Backend) -> eyre::Result<()> {
    let owner = UserId::new();
    let task = backend
        .task_service()
        .create_task(owner, habit("Study", &["20:00"]))
        .await?;
    complete_on(&backend, owner, task.id(), &[6, 7, 8, 10, 11]).await?;

    let stats = backend.statistics_service().statistics(owner).await?;

    assert_eq!(stats.streak, 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn paused_tasks_leave_the_rate_but_not_the_history(backend: Backend) -> eyre::Result<()> {
    let owner = UserId::new();
    let tasks = backend.task_service();
    let kept = tasks.create_task(owner, habit("Plan day", &["08:00"])).await?;
    let paused = tasks
        .create_task(owner, habit("Cold shower", &["07:00"]).with_active(false))
        .await?;
    tasks.create_task(owner, habit("Tidy desk", &["17:00"])).await?;
    complete_on(&backend, owner, kept.id(), &[11]).await?;
    complete_on(&backend, owner, paused.id(), &[10, 11]).await?;

    let stats = backend.statistics_service().statistics(owner).await?;

    assert_eq!(stats.total_active_tasks, 2);
    assert_eq!(stats.completed_today, 2);
    assert_eq!(stats.completion_rate, 100);
    assert_eq!(stats.streak, 2);
    Ok(())
}
