mod attachment;

pub use attachment::{AttachmentData, TaskAttachment};
