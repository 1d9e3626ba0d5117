//! Reminder services: push subscription handling and the dispatch loop.

mod dispatcher;
mod notification;

pub use dispatcher::{DispatchError, ReminderDispatcher, TickReport};
pub use notification::{
    DeliveryReport, NotificationService, NotificationServiceError, NotificationServiceResult,
};
