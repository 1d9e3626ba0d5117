//! Completion history against `PostgreSQL`.

use super::helpers::{
    CleanupGuard, create_database, database_name, june, june_day, test_runtime,
};
use chrono::{TimeZone, Utc};
use nudge::calendar::FixedClock;
use nudge::task::{
    adapters::postgres::{PostgresHistoryRepository, PostgresTaskRepository},
    domain::{CompletionStatus, DateRange, History, ScheduledSlot, TaskId, UserId},
    ports::{HistoryRepository, HistoryRepositoryError},
    services::{
        CompletionService, CreateTaskRequest, MarkCompleteRequest, TaskService, TaskServiceError,
    },
};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use std::collections::BTreeMap;
use std::sync::Arc;

fn completed_on(user: UserId, task: TaskId, day: u32) -> History {
    History::completed(
        user,
        task,
        june_day(day),
        ScheduledSlot::All,
        Utc.from_utc_datetime(&june(day, 8, 0)),
    )
}

#[rstest]
fn second_completion_on_the_same_day_is_rejected(shared_test_cluster: &'static TestCluster) {
    let db_name = database_name("history_same_day");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let pool = create_database(shared_test_cluster, &db_name).expect("database setup");
    let tasks = Arc::new(PostgresTaskRepository::new(pool.clone()));
    let history = Arc::new(PostgresHistoryRepository::new(pool));
    let morning = Arc::new(FixedClock::at(june(11, 9, 30)));
    let owner = UserId::new();
    let rt = test_runtime();

    let task = rt
        .block_on(
            TaskService::new(Arc::clone(&tasks), Arc::clone(&morning)).create_task(
                owner,
                CreateTaskRequest::new("Meditate", "Habit").with_times(["08:00"]),
            ),
        )
        .expect("create task");
    let today = CompletionService::new(Arc::clone(&tasks), Arc::clone(&history), morning);

    let first = rt
        .block_on(today.mark_complete(owner, task.id(), MarkCompleteRequest::new()))
        .expect("first completion");
    let again = rt.block_on(today.mark_complete(
        owner,
        task.id(),
        MarkCompleteRequest::new().with_notes("twice"),
    ));

    assert_eq!(first.date(), june_day(11));
    assert!(matches!(
        again,
        Err(TaskServiceError::AlreadyCompleted { task_id, date })
            if task_id == task.id() && date == june_day(11)
    ));

    let tomorrow = CompletionService::new(
        Arc::clone(&tasks),
        Arc::clone(&history),
        Arc::new(FixedClock::at(june(12, 7, 0))),
    );
    let next_day = rt
        .block_on(tomorrow.mark_complete(owner, task.id(), MarkCompleteRequest::new()))
        .expect("completion on the next day");
    assert_eq!(next_day.date(), june_day(12));
}

#[rstest]
fn unique_index_rejects_a_racing_completion(shared_test_cluster: &'static TestCluster) {
    let db_name = database_name("history_unique_index");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let pool = create_database(shared_test_cluster, &db_name).expect("database setup");
    let history = PostgresHistoryRepository::new(pool);
    let owner = UserId::new();
    let task = TaskId::new();
    let rt = test_runtime();

    rt.block_on(history.store(&completed_on(owner, task, 11)))
        .expect("store first completion");
    let err = rt
        .block_on(history.store(&completed_on(owner, task, 11)))
        .expect_err("second completed record for the day");

    assert!(matches!(
        err,
        HistoryRepositoryError::DuplicateCompletion { task_id, date }
            if task_id == task && date == june_day(11)
    ));
    assert!(matches!(
        TaskServiceError::from(err),
        TaskServiceError::AlreadyCompleted { .. }
    ));
    let stored = rt
        .block_on(history.find_for_day(owner, task, june_day(11)))
        .expect("query day")
        .expect("one record kept");
    assert_eq!(stored.status(), CompletionStatus::Completed);
}

#[rstest]
fn completions_are_counted_per_day(shared_test_cluster: &'static TestCluster) {
    let db_name = database_name("history_counts");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let pool = create_database(shared_test_cluster, &db_name).expect("database setup");
    let history = PostgresHistoryRepository::new(pool);
    let owner = UserId::new();
    let stretch = TaskId::new();
    let water = TaskId::new();
    let rt = test_runtime();

    for record in [
        completed_on(owner, stretch, 9),
        completed_on(owner, water, 9),
        completed_on(owner, stretch, 11),
        completed_on(owner, stretch, 14),
        completed_on(UserId::new(), stretch, 11),
    ] {
        rt.block_on(history.store(&record)).expect("store completion");
    }
    let week = DateRange::new(june_day(9), june_day(13));

    let by_day = rt
        .block_on(history.count_by_day(owner, week, CompletionStatus::Completed))
        .expect("count by day");
    let total = rt
        .block_on(history.count_in_range(owner, week, CompletionStatus::Completed))
        .expect("count in range");
    let on_ninth = rt
        .block_on(history.list_for_day(owner, june_day(9), CompletionStatus::Completed))
        .expect("list day");

    assert_eq!(
        by_day,
        BTreeMap::from([(june_day(9), 2), (june_day(11), 1)])
    );
    assert_eq!(total, 3);
    assert_eq!(on_ninth.len(), 2);
}
