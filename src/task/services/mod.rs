//! Application services for task lifecycle and completion tracking.

mod completion;
mod error;
mod lifecycle;

pub use completion::{CompletionService, MarkCompleteRequest};
pub use error::{TaskServiceError, TaskServiceResult};
pub use lifecycle::{CreateTaskRequest, ScheduleRequest, TaskService, UpdateTaskRequest};
