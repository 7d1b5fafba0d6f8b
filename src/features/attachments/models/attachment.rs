use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a file attached to a task
#[derive(Debug, Clone, FromRow)]
pub struct TaskAttachment {
    pub id: Uuid,
    pub task_id: Uuid,
    /// Object storage key
    pub file_key: String,
    pub filename: String,
    pub content_type: String,
    pub file_size: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// Writable attachment fields
#[derive(Debug, Clone)]
pub struct AttachmentData {
    pub task_id: Uuid,
    pub file_key: String,
    pub filename: String,
    pub content_type: String,
    pub file_size: i64,
}

impl From<&TaskAttachment> for AttachmentData {
    fn from(a: &TaskAttachment) -> Self {
        Self {
            task_id: a.task_id,
            file_key: a.file_key.clone(),
            filename: a.filename.clone(),
            content_type: a.content_type.clone(),
            file_size: a.file_size,
        }
    }
}
