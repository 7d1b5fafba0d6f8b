use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::attachments::models::{AttachmentData, TaskAttachment};

/// Attachment persistence, scoped through the owner of the parent task
#[async_trait]
pub trait AttachmentRepository: Send + Sync {
    /// Newest upload first
    async fn list(&self, owner_id: Uuid) -> Result<Vec<TaskAttachment>>;

    async fn list_for_task(&self, owner_id: Uuid, task_id: Uuid) -> Result<Vec<TaskAttachment>>;

    async fn find(&self, owner_id: Uuid, id: Uuid) -> Result<Option<TaskAttachment>>;

    /// `None` when `data.task_id` is not a task owned by `owner_id`; nothing is written then
    async fn create(&self, owner_id: Uuid, data: &AttachmentData)
        -> Result<Option<TaskAttachment>>;

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        data: &AttachmentData,
    ) -> Result<Option<TaskAttachment>>;

    /// Returns the removed row so its stored object can be cleaned up
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<Option<TaskAttachment>>;
}

pub struct PgAttachmentRepository {
    pool: PgPool,
}

impl PgAttachmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttachmentRepository for PgAttachmentRepository {
    async fn list(&self, owner_id: Uuid) -> Result<Vec<TaskAttachment>> {
        let attachments = sqlx::query_as::<_, TaskAttachment>(
            r#"
            SELECT a.id, a.task_id, a.file_key, a.filename, a.content_type, a.file_size,
                   a.uploaded_at
            FROM task_attachments a
            JOIN tasks t ON t.id = a.task_id
            WHERE t.user_id = $1
            ORDER BY a.uploaded_at DESC, a.id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list attachments: {:?}", e);
            e
        })?;

        Ok(attachments)
    }

    async fn list_for_task(&self, owner_id: Uuid, task_id: Uuid) -> Result<Vec<TaskAttachment>> {
        let attachments = sqlx::query_as::<_, TaskAttachment>(
            r#"
            SELECT a.id, a.task_id, a.file_key, a.filename, a.content_type, a.file_size,
                   a.uploaded_at
            FROM task_attachments a
            JOIN tasks t ON t.id = a.task_id
            WHERE a.task_id = $1 AND t.user_id = $2
            ORDER BY a.uploaded_at, a.id
            "#,
        )
        .bind(task_id)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attachments)
    }

    async fn find(&self, owner_id: Uuid, id: Uuid) -> Result<Option<TaskAttachment>> {
        let attachment = sqlx::query_as::<_, TaskAttachment>(
            r#"
            SELECT a.id, a.task_id, a.file_key, a.filename, a.content_type, a.file_size,
                   a.uploaded_at
            FROM task_attachments a
            JOIN tasks t ON t.id = a.task_id
            WHERE a.id = $1 AND t.user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attachment)
    }

    async fn create(
        &self,
        owner_id: Uuid,
        data: &AttachmentData,
    ) -> Result<Option<TaskAttachment>> {
        // The ownership check and the insert are one statement
        let attachment = sqlx::query_as::<_, TaskAttachment>(
            r#"
            INSERT INTO task_attachments
                (id, task_id, file_key, filename, content_type, file_size)
            SELECT $1, t.id, $4, $5, $6, $7
            FROM tasks t
            WHERE t.id = $2 AND t.user_id = $3
            RETURNING id, task_id, file_key, filename, content_type, file_size, uploaded_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.task_id)
        .bind(owner_id)
        .bind(&data.file_key)
        .bind(&data.filename)
        .bind(&data.content_type)
        .bind(data.file_size)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create attachment: {:?}", e);
            e
        })?;

        Ok(attachment)
    }

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        data: &AttachmentData,
    ) -> Result<Option<TaskAttachment>> {
        let attachment = sqlx::query_as::<_, TaskAttachment>(
            r#"
            UPDATE task_attachments a
            SET file_key = $3, filename = $4, content_type = $5, file_size = $6
            FROM tasks t
            WHERE a.id = $1 AND t.id = a.task_id AND t.user_id = $2
            RETURNING a.id, a.task_id, a.file_key, a.filename, a.content_type, a.file_size,
                      a.uploaded_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(&data.file_key)
        .bind(&data.filename)
        .bind(&data.content_type)
        .bind(data.file_size)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attachment)
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<Option<TaskAttachment>> {
        let attachment = sqlx::query_as::<_, TaskAttachment>(
            r#"
            DELETE FROM task_attachments a
            USING tasks t
            WHERE a.id = $1 AND t.id = a.task_id AND t.user_id = $2
            RETURNING a.id, a.task_id, a.file_key, a.filename, a.content_type, a.file_size,
                      a.uploaded_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attachment)
    }
}
