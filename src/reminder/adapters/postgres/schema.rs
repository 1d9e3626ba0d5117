//! Diesel schema for user records.

diesel::table! {
    /// Users known to the reminder core.
    users (id) {
        /// User identifier.
        id -> Uuid,
        /// Push subscriptions payload.
        subscriptions -> Jsonb,
        /// Notification settings payload.
        settings -> Jsonb,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
