//! Task aggregate root and related attribute types.

use super::{ReminderLead, ReminderTimes, Schedule, TaskDomainError, TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Generates a closed string-backed enum with `as_str` and `TryFrom<&str>`.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $error:ident {
            $($(#[$variant_meta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Returns the canonical wire and storage representation.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TaskDomainError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                match value.trim() {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(TaskDomainError::$error(value.to_owned())),
                }
            }
        }
    };
}

wire_enum! {
    /// Kind of recurring activity a task tracks.
    TaskCategory, InvalidCategory {
        /// Habit building.
        Habit => "Habit",
        /// Medicine intake.
        Medicine => "Medicine",
        /// Meeting or appointment.
        Meeting => "Meeting",
        /// User-defined activity.
        Custom => "Custom",
        /// Water intake.
        Water => "Water",
        /// Work item.
        Work => "Work",
    }
}

wire_enum! {
    /// How the client should surface reminders.
    NotificationChannel, InvalidNotificationChannel {
        /// Push notification only.
        Push => "Push",
        /// Audible alert only.
        Sound => "Sound",
        /// Push notification with audible alert.
        Both => "Both",
    }
}

wire_enum! {
    /// Relative importance of a task.
    Priority, InvalidPriority {
        /// Low priority.
        Low => "Low",
        /// Medium priority.
        Medium => "Medium",
        /// High priority.
        High => "High",
        /// Critical priority.
        Critical => "Critical",
    }
}

wire_enum! {
    /// When a medicine should be taken relative to meals.
    MedicineInstruction, InvalidMedicineInstruction {
        /// Before food.
        BeforeFood => "Before Food",
        /// After food.
        AfterFood => "After Food",
        /// No meal constraint.
        Anytime => "Anytime",
    }
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::Push
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

/// Extra attributes tracked for medicine tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineDetails {
    /// Free-form dosage, such as `"500mg"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    /// Meal-relative intake instruction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<MedicineInstruction>,
    /// Remaining units in stock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

/// Validated attributes for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskAttributes {
    /// Non-empty title.
    pub title: String,
    /// Free-form description, possibly empty.
    pub description: String,
    /// Activity category.
    pub category: TaskCategory,
    /// Recurrence rule.
    pub schedule: Schedule,
    /// Scheduled clock times.
    pub times: ReminderTimes,
    /// Pre-reminder lead time.
    pub reminder_lead: ReminderLead,
    /// Client notification channel.
    pub channel: NotificationChannel,
    /// Task priority.
    pub priority: Priority,
    /// Medicine attributes, kept only for medicine tasks.
    pub medicine: Option<MedicineDetails>,
    /// Whether reminders and statistics include the task.
    pub is_active: bool,
}

impl TaskAttributes {
    /// Creates attributes with defaults for every optional field.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the title is blank.
    pub fn new(title: impl Into<String>, category: TaskCategory) -> Result<Self, TaskDomainError> {
        Ok(Self {
            title: validate_title(title.into())?,
            description: String::new(),
            category,
            schedule: Schedule::default(),
            times: ReminderTimes::default(),
            reminder_lead: ReminderLead::default(),
            channel: NotificationChannel::default(),
            priority: Priority::default(),
            medicine: None,
            is_active: true,
        })
    }
}

/// Partial update applied to an existing task.
///
/// `None` leaves the corresponding attribute untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement category.
    pub category: Option<TaskCategory>,
    /// Replacement schedule.
    pub schedule: Option<Schedule>,
    /// Replacement clock times.
    pub times: Option<ReminderTimes>,
    /// Replacement lead time.
    pub reminder_lead: Option<ReminderLead>,
    /// Replacement channel.
    pub channel: Option<NotificationChannel>,
    /// Replacement priority.
    pub priority: Option<Priority>,
    /// Replacement medicine details.
    pub medicine: Option<MedicineDetails>,
    /// Replacement active flag.
    pub is_active: Option<bool>,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    owner: UserId,
    title: String,
    description: String,
    #[serde(rename = "type")]
    category: TaskCategory,
    schedule: Schedule,
    times: ReminderTimes,
    #[serde(rename = "reminderBefore")]
    reminder_lead: ReminderLead,
    #[serde(rename = "notificationType")]
    channel: NotificationChannel,
    priority: Priority,
    #[serde(rename = "medicineDetails", skip_serializing_if = "Option::is_none")]
    medicine: Option<MedicineDetails>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owner.
    pub owner: UserId,
    /// Persisted attributes.
    pub attributes: TaskAttributes,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task owned by `owner`.
    #[must_use]
    pub fn new(owner: UserId, attributes: TaskAttributes, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        let mut task = Self::from_persisted(PersistedTaskData {
            id: TaskId::new(),
            owner,
            attributes,
            created_at: timestamp,
            updated_at: timestamp,
        });
        task.normalize_medicine();
        task
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        let TaskAttributes {
            title,
            description,
            category,
            schedule,
            times,
            reminder_lead,
            channel,
            priority,
            medicine,
            is_active,
        } = data.attributes;
        Self {
            id: data.id,
            owner: data.owner,
            title,
            description,
            category,
            schedule,
            times,
            reminder_lead,
            channel,
            priority,
            medicine,
            is_active,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns `true` when `user` owns this task.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner == user
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, possibly empty.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the category.
    #[must_use]
    pub const fn category(&self) -> TaskCategory {
        self.category
    }

    /// Returns the recurrence rule.
    #[must_use]
    pub const fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Returns the scheduled clock times.
    #[must_use]
    pub const fn times(&self) -> &ReminderTimes {
        &self.times
    }

    /// Returns the pre-reminder lead time.
    #[must_use]
    pub const fn reminder_lead(&self) -> ReminderLead {
        self.reminder_lead
    }

    /// Returns the client notification channel.
    #[must_use]
    pub const fn channel(&self) -> NotificationChannel {
        self.channel
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns medicine details, if any.
    #[must_use]
    pub const fn medicine(&self) -> Option<&MedicineDetails> {
        self.medicine.as_ref()
    }

    /// Returns whether the task is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns a copy of the mutable attributes.
    #[must_use]
    pub fn attributes(&self) -> TaskAttributes {
        TaskAttributes {
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category,
            schedule: self.schedule,
            times: self.times.clone(),
            reminder_lead: self.reminder_lead,
            channel: self.channel,
            priority: self.priority,
            medicine: self.medicine.clone(),
            is_active: self.is_active,
        }
    }

    /// Applies a partial update.
    ///
    /// Medicine details survive only while the category is `Medicine`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the replacement title is
    /// blank; the task is left unchanged in that case.
    pub fn apply(&mut self, patch: TaskPatch, clock: &impl Clock) -> Result<(), TaskDomainError> {
        let title = patch.title.map(validate_title).transpose()?;
        if let Some(value) = title {
            self.title = value;
        }
        if let Some(value) = patch.description {
            self.description = value;
        }
        if let Some(value) = patch.category {
            self.category = value;
        }
        if let Some(value) = patch.schedule {
            self.schedule = value;
        }
        if let Some(value) = patch.times {
            self.times = value;
        }
        if let Some(value) = patch.reminder_lead {
            self.reminder_lead = value;
        }
        if let Some(value) = patch.channel {
            self.channel = value;
        }
        if let Some(value) = patch.priority {
            self.priority = value;
        }
        if let Some(value) = patch.medicine {
            self.medicine = Some(value);
        }
        if let Some(value) = patch.is_active {
            self.is_active = value;
        }
        self.normalize_medicine();
        self.touch(clock);
        Ok(())
    }

    fn normalize_medicine(&mut self) {
        if self.category != TaskCategory::Medicine {
            self.medicine = None;
        }
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

fn validate_title(title: String) -> Result<String, TaskDomainError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskDomainError::EmptyTitle);
    }
    Ok(trimmed.to_owned())
}
