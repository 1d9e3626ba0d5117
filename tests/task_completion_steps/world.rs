//! Shared world state for daily completion BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use nudge::calendar::FixedClock;
use nudge::stats::{domain::Statistics, services::StatisticsService};
use nudge::task::{
    adapters::memory::{InMemoryHistoryRepository, InMemoryTaskRepository},
    domain::{History, Task, UserId},
    services::{CompletionService, TaskService, TaskServiceError},
};
use rstest::fixture;

/// Completion service type used by the BDD world.
pub type TestCompletionService =
    CompletionService<InMemoryTaskRepository, InMemoryHistoryRepository, FixedClock>;

/// Scenario world for completion behaviour tests.
pub struct CompletionWorld {
    pub tasks: Arc<InMemoryTaskRepository>,
    pub history: Arc<InMemoryHistoryRepository>,
    pub now: NaiveDateTime,
    pub owner: UserId,
    pub created: HashMap<String, Task>,
    pub last_completion: Option<Result<History, TaskServiceError>>,
    pub last_statistics: Option<Statistics>,
}

impl CompletionWorld {
    /// Creates a world with empty repositories for a single owner.
    ///
    /// # Panics
    ///
    /// Panics if the fixed start date is invalid.
    #[must_use]
    pub fn new() -> Self {
        let now = NaiveDate::from_ymd_opt(2025, 6, 11)
            .and_then(|day| day.and_hms_opt(12, 0, 0))
            .expect("valid start time");
        Self {
            tasks: Arc::new(InMemoryTaskRepository::new()),
            history: Arc::new(InMemoryHistoryRepository::new()),
            now,
            owner: UserId::new(),
            created: HashMap::new(),
            last_completion: None,
            last_statistics: None,
        }
    }

    fn clock(&self) -> Arc<FixedClock> {
        Arc::new(FixedClock::at(self.now))
    }

    /// Task service reading the world's current local time.
    #[must_use]
    pub fn task_service(&self) -> TaskService<InMemoryTaskRepository, FixedClock> {
        TaskService::new(Arc::clone(&self.tasks), self.clock())
    }

    /// Completion service reading the world's current local time.
    #[must_use]
    pub fn completion_service(&self) -> TestCompletionService {
        CompletionService::new(
            Arc::clone(&self.tasks),
            Arc::clone(&self.history),
            self.clock(),
        )
    }

    /// Statistics service reading the world's current local time.
    #[must_use]
    pub fn statistics_service(
        &self,
    ) -> StatisticsService<InMemoryTaskRepository, InMemoryHistoryRepository, FixedClock> {
        StatisticsService::new(
            Arc::clone(&self.tasks),
            Arc::clone(&self.history),
            self.clock(),
        )
    }

    /// Looks up a task created earlier in the scenario.
    ///
    /// # Errors
    ///
    /// Returns an error when no task with `title` was created.
    pub fn task(&self, title: &str) -> Result<&Task, eyre::Report> {
        self.created
            .get(title)
            .ok_or_else(|| eyre::eyre!("no task titled {title:?} in scenario world"))
    }
}

impl Default for CompletionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> CompletionWorld {
    CompletionWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
