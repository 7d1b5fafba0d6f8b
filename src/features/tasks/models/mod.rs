mod task;
mod task_filter;

pub use task::{Task, TaskData, TaskPriority, TaskStats, TaskStatus};
pub use task_filter::{TaskFilter, TaskOrderField, TaskOrdering};
