//! Error types for reminder domain validation.

use thiserror::Error;

/// Errors returned while constructing reminder domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReminderDomainError {
    /// A push subscription endpoint is missing or blank.
    #[error("push subscription endpoint is required")]
    EmptyEndpoint,

    /// The VAPID public key is not a base64 encoded uncompressed P-256 point.
    #[error("VAPID public key must decode to 65 bytes")]
    InvalidVapidKey,

    /// A notification template failed to render.
    #[error("failed to render notification text: {0}")]
    TemplateRender(String),
}
