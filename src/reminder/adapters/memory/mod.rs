//! In-memory adapters for user records and push delivery.

mod sender;
mod user;

pub use sender::{RecordedDelivery, RecordingNotificationSender};
pub use user::InMemoryUserRepository;
