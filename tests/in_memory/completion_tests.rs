//! In-memory integration tests for daily completion tracking.

use super::helpers::{Backend, habit, june};
use nudge::task::{
    domain::{CompletionStatus, ScheduledSlot, TaskDomainError, UserId},
    services::{CreateTaskRequest, MarkCompleteRequest, TaskServiceError},
};
use rstest::{fixture, rstest};

#[fixture]
fn backend() -> Backend {
    Backend::at(june(11, 12, 0))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn one_completion_per_task_and_day(backend: Backend) -> eyre::Result<()> {
    let owner = UserId::new();
    let task = backend
        .task_service()
        .create_task(owner, habit("Meditate", &["19:00", "07:00"]))
        .await?;
    let today = backend.completion_service();

    let first = today
        .mark_complete(owner, task.id(), MarkCompleteRequest::new())
        .await?;
    let again = today
        .mark_complete(
            owner,
            task.id(),
            MarkCompleteRequest::new().with_scheduled_time("19:00"),
        )
        .await;
    let tomorrow = backend
        .moved_to(june(12, 7, 5))
        .completion_service()
        .mark_complete(owner, task.id(), MarkCompleteRequest::new().with_notes("early"))
        .await?;

    assert_eq!(first.status(), CompletionStatus::Completed);
    assert_eq!(first.scheduled_time().to_string(), "07:00");
    assert_eq!(first.date(), june(11, 0, 0).date());
    assert!(matches!(
        again,
        Err(TaskServiceError::AlreadyCompleted { task_id, date })
            if task_id == task.id() && date == june(11, 0, 0).date()
    ));
    assert_eq!(tomorrow.date(), june(12, 0, 0).date());
    assert_eq!(tomorrow.notes(), Some("early"));
    Ok(())
}

#[rstest]
#[case("ALL", true)]
#[case("13:45", true)]
#[case("all", false)]
#[case("1:45", false)]
#[tokio::test(flavor = "multi_thread")]
async fn scheduled_slot_is_validated(
    backend: Backend,
    #[case] slot: &str,
    #[case] accepted: bool,
) -> eyre::Result<()> {
    let owner = UserId::new();
    let task = backend
        .task_service()
        .create_task(owner, CreateTaskRequest::new("Water plants", "Custom"))
        .await?;

    let outcome = backend
        .completion_service()
        .mark_complete(
            owner,
            task.id(),
            MarkCompleteRequest::new().with_scheduled_time(slot),
        )
        .await;

    if accepted {
        let record = outcome?;
        assert_eq!(record.scheduled_time().to_string(), slot);
    } else {
        assert!(matches!(
            outcome,
            Err(TaskServiceError::Domain(TaskDomainError::InvalidClockTime(_)))
        ));
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_today_is_scoped_to_user_and_day(backend: Backend) -> eyre::Result<()> {
    let owner = UserId::new();
    let other = UserId::new();
    let tasks = backend.task_service();
    let walk = tasks.create_task(owner, habit("Walk", &["08:00"])).await?;
    let read = tasks.create_task(owner, habit("Read", &["21:00"])).await?;
    let theirs = tasks.create_task(other, habit("Swim", &["06:00"])).await?;

    backend
        .moved_to(june(10, 20, 0))
        .completion_service()
        .mark_complete(owner, read.id(), MarkCompleteRequest::new())
        .await?;
    let today = backend.completion_service();
    today
        .mark_complete(owner, walk.id(), MarkCompleteRequest::new())
        .await?;
    today
        .mark_complete(other, theirs.id(), MarkCompleteRequest::new())
        .await?;

    assert_eq!(today.completed_today(owner).await?, [walk.id()]);
    assert_eq!(today.completed_today(other).await?, [theirs.id()]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completion_requires_ownership(backend: Backend) -> eyre::Result<()> {
    let owner = UserId::new();
    let task = backend
        .task_service()
        .create_task(owner, habit("Floss", &["22:00"]))
        .await?;

    let outcome = backend
        .completion_service()
        .mark_complete(UserId::new(), task.id(), MarkCompleteRequest::new())
        .await;

    assert!(matches!(outcome, Err(TaskServiceError::NotAuthorized(_))));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleted_task_still_counts_as_completed_today(backend: Backend) -> eyre::Result<()> {
    let owner = UserId::new();
    let task = backend
        .task_service()
        .create_task(owner, habit("Call mum", &["18:00"]))
        .await?;
    let completion = backend.completion_service();
    let record = completion
        .mark_complete(owner, task.id(), MarkCompleteRequest::new())
        .await?;

    backend.task_service().delete_task(owner, task.id()).await?;

    assert_eq!(
        Some(record.scheduled_time()),
        task.times().first().map(ScheduledSlot::At)
    );
    assert_eq!(completion.completed_today(owner).await?, [task.id()]);
    Ok(())
}
