//! Diesel schema for task and history persistence.

diesel::table! {
    /// Recurring task records.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Owning user identifier.
        owner_id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Free-form description.
        description -> Text,
        /// Task category.
        #[max_length = 50]
        category -> Varchar,
        /// Recurrence rule payload.
        schedule -> Jsonb,
        /// Scheduled `HH:MM` clock times.
        times -> Jsonb,
        /// Pre-reminder lead time in minutes.
        reminder_before -> Int4,
        /// Client notification channel.
        #[max_length = 50]
        notification_channel -> Varchar,
        /// Task priority.
        #[max_length = 50]
        priority -> Varchar,
        /// Medicine attributes for medicine tasks.
        medicine_details -> Nullable<Jsonb>,
        /// Whether the task is active.
        is_active -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-day completion history. `task_id` is a soft reference.
    task_history (id) {
        /// History record identifier.
        id -> Uuid,
        /// Owning user identifier.
        user_id -> Uuid,
        /// Referenced task identifier.
        task_id -> Uuid,
        /// Calendar day.
        day -> Date,
        /// Scheduled `HH:MM` slot or `ALL`.
        #[max_length = 5]
        scheduled_time -> Varchar,
        /// Completion status.
        #[max_length = 20]
        status -> Varchar,
        /// Instant the status was recorded.
        completion_time -> Timestamptz,
        /// Optional notes.
        notes -> Nullable<Text>,
    }
}
