//! In-memory integration tests for task lifecycle operations.

use super::helpers::{Backend, habit, june};
use nudge::task::{
    domain::{MedicineDetails, MedicineInstruction, Schedule, TaskCategory, TaskDomainError, UserId},
    services::{CreateTaskRequest, ScheduleRequest, TaskServiceError, UpdateTaskRequest},
};
use rstest::{fixture, rstest};

#[fixture]
fn backend() -> Backend {
    Backend::at(june(11, 8, 0))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listing_is_newest_first_and_per_owner(backend: Backend) -> eyre::Result<()> {
    let owner = UserId::new();
    let older = backend
        .task_service()
        .create_task(owner, habit("Stretch", &["07:00"]))
        .await?;
    let newer = backend
        .moved_to(june(11, 9, 0))
        .task_service()
        .create_task(owner, habit("Read", &["21:00"]))
        .await?;
    backend
        .task_service()
        .create_task(UserId::new(), habit("Someone else", &["10:00"]))
        .await?;

    let listed = backend.task_service().list_tasks(owner).await?;

    let ids: Vec<_> = listed.iter().map(|task| task.id()).collect();
    assert_eq!(ids, [newer.id(), older.id()]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn configured_default_lead_applies_when_omitted(backend: Backend) -> eyre::Result<()> {
    let owner = UserId::new();
    let service = backend.task_service_with_lead(15);

    let implicit = service.create_task(owner, habit("Walk", &["18:00"])).await?;
    let explicit = service
        .create_task(owner, habit("Run", &["06:00"]).with_reminder_before(2))
        .await?;

    assert_eq!(implicit.reminder_lead().minutes(), 15);
    assert_eq!(explicit.reminder_lead().minutes(), 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_replaces_the_schedule_and_revalidates(backend: Backend) -> eyre::Result<()> {
    let owner = UserId::new();
    let service = backend.task_service();
    let task = service
        .create_task(
            owner,
            habit("Gym", &["18:00"]).with_schedule(ScheduleRequest::random(2)),
        )
        .await?;

    let updated = service
        .update_task(
            owner,
            task.id(),
            UpdateTaskRequest::new().with_schedule(ScheduleRequest::selected_days([1, 3, 5])),
        )
        .await?;
    let rejected = service
        .update_task(
            owner,
            task.id(),
            UpdateTaskRequest::new()
                .with_title("Gym and sauna")
                .with_reminder_before(0),
        )
        .await;
    let stored = service.get_task(owner, task.id()).await?;

    assert!(matches!(updated.schedule(), Schedule::SelectedDays { .. }));
    assert!(matches!(
        rejected,
        Err(TaskServiceError::Domain(TaskDomainError::InvalidReminderLead(0)))
    ));
    assert_eq!(stored.title(), "Gym");
    assert_eq!(stored.schedule(), updated.schedule());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn medicine_details_follow_the_category(backend: Backend) -> eyre::Result<()> {
    let owner = UserId::new();
    let service = backend.task_service();
    let details = MedicineDetails {
        dosage: Some("500mg".to_owned()),
        instructions: Some(MedicineInstruction::AfterFood),
        stock: Some(30),
    };

    let habit_task = service
        .create_task(
            owner,
            habit("Vitamins", &["09:00"]).with_medicine_details(details.clone()),
        )
        .await?;
    let medicine_task = service
        .create_task(
            owner,
            CreateTaskRequest::new("Antibiotics", "Medicine")
                .with_times(["08:00", "20:00"])
                .with_medicine_details(details.clone()),
        )
        .await?;
    let converted = service
        .update_task(
            owner,
            habit_task.id(),
            UpdateTaskRequest::new()
                .with_category("Medicine")
                .with_medicine_details(details.clone()),
        )
        .await?;

    assert_eq!(habit_task.medicine(), None);
    assert_eq!(medicine_task.category(), TaskCategory::Medicine);
    assert_eq!(medicine_task.medicine(), Some(&details));
    assert_eq!(converted.medicine(), Some(&details));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn only_the_owner_can_delete(backend: Backend) -> eyre::Result<()> {
    let owner = UserId::new();
    let intruder = UserId::new();
    let service = backend.task_service();
    let task = service.create_task(owner, habit("Journal", &["22:00"])).await?;

    let foreign = service.delete_task(intruder, task.id()).await;
    let deleted = service.delete_task(owner, task.id()).await?;
    let after = service.get_task(owner, task.id()).await;

    assert!(matches!(foreign, Err(TaskServiceError::NotAuthorized(id)) if id == task.id()));
    assert_eq!(deleted, task.id());
    assert!(matches!(after, Err(TaskServiceError::NotFound(id)) if id == task.id()));
    Ok(())
}

#[rstest]
#[case(CreateTaskRequest::new("  ", "Habit"))]
#[case(CreateTaskRequest::new("Nap", "Sleep"))]
#[case(CreateTaskRequest::new("Nap", "Habit").with_times(Vec::<String>::new()))]
#[case(CreateTaskRequest::new("Nap", "Habit").with_times(["8:00"]))]
#[case(CreateTaskRequest::new("Nap", "Habit").with_schedule(ScheduleRequest::selected_days([])))]
#[case(CreateTaskRequest::new("Nap", "Habit").with_schedule(ScheduleRequest::random(8)))]
#[case(CreateTaskRequest::new("Nap", "Habit").with_priority("Urgent"))]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_requests_store_nothing(backend: Backend, #[case] request: CreateTaskRequest) {
    let owner = UserId::new();
    let service = backend.task_service();

    let outcome = service.create_task(owner, request).await;
    let listed = service.list_tasks(owner).await.expect("listing succeeds");

    assert!(matches!(outcome, Err(TaskServiceError::Domain(_))));
    assert!(listed.is_empty());
}
