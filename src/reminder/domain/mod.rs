//! Domain model for reminder evaluation and push delivery.

mod error;
mod evaluator;
mod gating;
mod payload;
mod subscription;
mod user;

pub use error::ReminderDomainError;
pub use evaluator::{FireEvent, FireKind, evaluate};
pub use gating::ScheduleGating;
pub use payload::{NotificationAction, NotificationData, NotificationPayload};
pub use subscription::{PushSubscription, SubscriptionKeys, VapidPublicKey, endpoint_host};
pub use user::{QuietHours, User, UserSettings};
