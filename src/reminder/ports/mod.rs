//! Port contracts for push delivery and user records.

pub mod sender;
pub mod user;

pub use sender::{NotificationSendError, NotificationSender, SendFailureKind};
pub use user::{UserRepository, UserRepositoryError, UserRepositoryResult};
