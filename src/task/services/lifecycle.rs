//! Service layer for task creation, retrieval, update and deletion.

use super::{TaskServiceError, TaskServiceResult};
use crate::task::{
    domain::{
        MedicineDetails, NotificationChannel, Priority, ReminderLead, ReminderTimes, Schedule,
        Task, TaskAttributes, TaskCategory, TaskDomainError, TaskId, TaskPatch, UserId,
    },
    ports::TaskRepository,
};
use mockable::Clock;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Raw recurrence fields as supplied by clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleRequest {
    #[serde(rename = "type")]
    kind: Option<String>,
    days: Vec<u8>,
    random_count: Option<u8>,
}

impl ScheduleRequest {
    /// Requests a daily schedule.
    #[must_use]
    pub fn daily() -> Self {
        Self {
            kind: Some("Daily".to_owned()),
            ..Self::default()
        }
    }

    /// Requests a schedule on the given Sunday-based weekdays.
    #[must_use]
    pub fn selected_days(days: impl IntoIterator<Item = u8>) -> Self {
        Self {
            kind: Some("SelectedDays".to_owned()),
            days: days.into_iter().collect(),
            random_count: None,
        }
    }

    /// Requests a random schedule firing on `count` days per week.
    #[must_use]
    pub fn random(count: u8) -> Self {
        Self {
            kind: Some("Random".to_owned()),
            days: Vec::new(),
            random_count: Some(count),
        }
    }

    fn into_schedule(self) -> Result<Schedule, TaskDomainError> {
        let kind = self.kind.as_deref().unwrap_or("Daily");
        Schedule::from_parts(kind, &self.days, self.random_count)
    }
}

/// Request payload for creating a task.
///
/// Fields arrive as raw client values and are validated when the task is
/// built; omitted optional fields take their documented defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTaskRequest {
    title: String,
    #[serde(rename = "type")]
    category: String,
    description: Option<String>,
    schedule: Option<ScheduleRequest>,
    times: Option<Vec<String>>,
    reminder_before: Option<u32>,
    notification_type: Option<String>,
    priority: Option<String>,
    medicine_details: Option<MedicineDetails>,
    is_active: Option<bool>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the recurrence rule.
    #[must_use]
    pub fn with_schedule(mut self, schedule: ScheduleRequest) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// Sets the scheduled clock times.
    #[must_use]
    pub fn with_times<S: Into<String>>(mut self, times: impl IntoIterator<Item = S>) -> Self {
        self.times = Some(times.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the pre-reminder lead time in minutes.
    #[must_use]
    pub fn with_reminder_before(mut self, minutes: u32) -> Self {
        self.reminder_before = Some(minutes);
        self
    }

    /// Sets the notification channel.
    #[must_use]
    pub fn with_notification_type(mut self, channel: impl Into<String>) -> Self {
        self.notification_type = Some(channel.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Sets medicine details.
    #[must_use]
    pub fn with_medicine_details(mut self, details: MedicineDetails) -> Self {
        self.medicine_details = Some(details);
        self
    }

    /// Sets the active flag.
    #[must_use]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    fn into_attributes(self, default_lead: ReminderLead) -> Result<TaskAttributes, TaskDomainError> {
        let category = TaskCategory::try_from(self.category.as_str())?;
        let mut attributes = TaskAttributes::new(self.title, category)?;
        attributes.reminder_lead = default_lead;
        if let Some(description) = self.description {
            attributes.description = description;
        }
        if let Some(schedule) = self.schedule {
            attributes.schedule = schedule.into_schedule()?;
        }
        if let Some(times) = self.times {
            attributes.times = ReminderTimes::parse(&times)?;
        }
        if let Some(minutes) = self.reminder_before {
            attributes.reminder_lead = ReminderLead::new(minutes)?;
        }
        if let Some(channel) = self.notification_type {
            attributes.channel = NotificationChannel::try_from(channel.as_str())?;
        }
        if let Some(priority) = self.priority {
            attributes.priority = Priority::try_from(priority.as_str())?;
        }
        attributes.medicine = self.medicine_details;
        if let Some(is_active) = self.is_active {
            attributes.is_active = is_active;
        }
        Ok(attributes)
    }
}

/// Request payload for a partial task update.
///
/// Only provided fields change; each is re-validated. A provided schedule
/// replaces the existing one as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateTaskRequest {
    title: Option<String>,
    #[serde(rename = "type")]
    category: Option<String>,
    description: Option<String>,
    schedule: Option<ScheduleRequest>,
    times: Option<Vec<String>>,
    reminder_before: Option<u32>,
    notification_type: Option<String>,
    priority: Option<String>,
    medicine_details: Option<MedicineDetails>,
    is_active: Option<bool>,
}

impl UpdateTaskRequest {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replaces the recurrence rule.
    #[must_use]
    pub fn with_schedule(mut self, schedule: ScheduleRequest) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// Replaces the scheduled clock times.
    #[must_use]
    pub fn with_times<S: Into<String>>(mut self, times: impl IntoIterator<Item = S>) -> Self {
        self.times = Some(times.into_iter().map(Into::into).collect());
        self
    }

    /// Replaces the pre-reminder lead time.
    #[must_use]
    pub fn with_reminder_before(mut self, minutes: u32) -> Self {
        self.reminder_before = Some(minutes);
        self
    }

    /// Replaces medicine details.
    #[must_use]
    pub fn with_medicine_details(mut self, details: MedicineDetails) -> Self {
        self.medicine_details = Some(details);
        self
    }

    /// Replaces the active flag.
    #[must_use]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    fn into_patch(self) -> Result<TaskPatch, TaskDomainError> {
        Ok(TaskPatch {
            title: self.title,
            description: self.description,
            category: self
                .category
                .as_deref()
                .map(TaskCategory::try_from)
                .transpose()?,
            schedule: self
                .schedule
                .map(ScheduleRequest::into_schedule)
                .transpose()?,
            times: self
                .times
                .as_deref()
                .map(ReminderTimes::parse)
                .transpose()?,
            reminder_lead: self.reminder_before.map(ReminderLead::new).transpose()?,
            channel: self
                .notification_type
                .as_deref()
                .map(NotificationChannel::try_from)
                .transpose()?,
            priority: self
                .priority
                .as_deref()
                .map(Priority::try_from)
                .transpose()?,
            medicine: self.medicine_details,
            is_active: self.is_active,
        })
    }
}

/// Task lifecycle orchestration service.
pub struct TaskService<R, C>
where
    R: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    default_lead: ReminderLead,
}

impl<R, C> Clone for TaskService<R, C>
where
    R: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
            default_lead: self.default_lead,
        }
    }
}

impl<R, C> TaskService<R, C>
where
    R: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new task service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            repository,
            clock,
            default_lead: ReminderLead::DEFAULT,
        }
    }

    /// Sets the lead time given to tasks created without one.
    #[must_use]
    pub const fn with_default_lead(mut self, lead: ReminderLead) -> Self {
        self.default_lead = lead;
        self
    }

    /// Creates a task owned by `user`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Domain`] when a field fails validation or
    /// [`TaskServiceError::Repository`] when persistence fails.
    pub async fn create_task(
        &self,
        user: UserId,
        request: CreateTaskRequest,
    ) -> TaskServiceResult<Task> {
        let attributes = request.into_attributes(self.default_lead)?;
        let task = Task::new(user, attributes, &*self.clock);
        self.repository.store(&task).await?;
        info!(task_id = %task.id(), user_id = %user, "task created");
        Ok(task)
    }

    /// Lists every task owned by `user`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Repository`] when the lookup fails.
    pub async fn list_tasks(&self, user: UserId) -> TaskServiceResult<Vec<Task>> {
        Ok(self.repository.list_for_user(user).await?)
    }

    /// Retrieves one task owned by `user`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the task does not exist and
    /// [`TaskServiceError::NotAuthorized`] when another user owns it.
    pub async fn get_task(&self, user: UserId, task_id: TaskId) -> TaskServiceResult<Task> {
        self.owned_task(user, task_id).await
    }

    /// Applies a partial update to a task owned by `user`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`], [`TaskServiceError::NotAuthorized`],
    /// or [`TaskServiceError::Domain`] when a provided field is invalid.
    pub async fn update_task(
        &self,
        user: UserId,
        task_id: TaskId,
        request: UpdateTaskRequest,
    ) -> TaskServiceResult<Task> {
        let mut task = self.owned_task(user, task_id).await?;
        let patch = request.into_patch()?;
        task.apply(patch, &*self.clock)?;
        self.repository.update(&task).await?;
        debug!(task_id = %task_id, user_id = %user, "task updated");
        Ok(task)
    }

    /// Deletes a task owned by `user`. Its history is retained.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] or
    /// [`TaskServiceError::NotAuthorized`].
    pub async fn delete_task(&self, user: UserId, task_id: TaskId) -> TaskServiceResult<TaskId> {
        self.owned_task(user, task_id).await?;
        self.repository.delete(task_id).await?;
        info!(task_id = %task_id, user_id = %user, "task deleted");
        Ok(task_id)
    }

    async fn owned_task(&self, user: UserId, task_id: TaskId) -> TaskServiceResult<Task> {
        load_owned_task(&*self.repository, user, task_id).await
    }
}

/// Loads a task and checks that `user` owns it.
pub(super) async fn load_owned_task<R>(
    repository: &R,
    user: UserId,
    task_id: TaskId,
) -> TaskServiceResult<Task>
where
    R: TaskRepository + ?Sized,
{
    let task = repository
        .find_by_id(task_id)
        .await?
        .ok_or(TaskServiceError::NotFound(task_id))?;
    if !task.is_owned_by(user) {
        return Err(TaskServiceError::NotAuthorized(task_id));
    }
    Ok(task)
}
