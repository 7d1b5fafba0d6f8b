mod attachment_service;

pub use attachment_service::{AttachmentService, TASK_NOT_FOUND};
