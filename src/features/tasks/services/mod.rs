mod task_service;

pub use task_service::{TaskService, CATEGORY_NOT_FOUND};
