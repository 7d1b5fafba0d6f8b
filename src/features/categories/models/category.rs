use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for category, with the number of tasks referencing it
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub task_count: i64,
}

/// Writable category fields
#[derive(Debug, Clone)]
pub struct CategoryData {
    pub name: String,
    pub color: String,
}
