use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::tasks::models::{Task, TaskData, TaskFilter, TaskStats, TaskStatus};
use crate::shared::validation::like_patterns;

/// Task persistence; every operation is scoped to `owner_id`
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn list(&self, owner_id: Uuid, filter: &TaskFilter) -> Result<Vec<Task>>;

    async fn find(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Task>>;

    async fn create(&self, owner_id: Uuid, data: &TaskData) -> Result<Task>;

    async fn update(&self, owner_id: Uuid, id: Uuid, data: &TaskData) -> Result<Option<Task>>;

    async fn set_status(&self, owner_id: Uuid, id: Uuid, status: TaskStatus)
        -> Result<Option<Task>>;

    /// Attachment rows go with the task
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool>;

    async fn stats(&self, owner_id: Uuid) -> Result<TaskStats>;
}

pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const TASK_COLUMNS: &str = r#"
    t.id, t.user_id, t.title, t.description, t.category_id, c.name AS category_name,
    t.priority, t.status, t.due_date, t.created_at, t.updated_at
"#;

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn list(&self, owner_id: Uuid, filter: &TaskFilter) -> Result<Vec<Task>> {
        let patterns = filter.search.as_deref().map(like_patterns).unwrap_or_default();

        // ORDER BY comes from a fixed set of columns, never from user text
        let sql = format!(
            r#"
            SELECT {}
            FROM tasks t
            LEFT JOIN categories c ON c.id = t.category_id
            WHERE t.user_id = $1
              AND ($2::UUID IS NULL OR t.category_id = $2)
              AND ($3::task_priority IS NULL OR t.priority = $3)
              AND ($4::task_status IS NULL OR t.status = $4)
              AND NOT EXISTS (
                  SELECT 1 FROM UNNEST($5::TEXT[]) AS term
                  WHERE NOT (t.title ILIKE term OR t.description ILIKE term)
              )
            ORDER BY {}
            "#,
            TASK_COLUMNS,
            filter.ordering.as_sql()
        );

        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(owner_id)
            .bind(filter.category_id)
            .bind(filter.priority)
            .bind(filter.status)
            .bind(patterns)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list tasks: {:?}", e);
                e
            })?;

        Ok(tasks)
    }

    async fn find(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Task>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM tasks t
            LEFT JOIN categories c ON c.id = t.category_id
            WHERE t.id = $1 AND t.user_id = $2
            "#,
            TASK_COLUMNS
        );

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(task)
    }

    async fn create(&self, owner_id: Uuid, data: &TaskData) -> Result<Task> {
        let sql = format!(
            r#"
            WITH t AS (
                INSERT INTO tasks
                    (id, user_id, title, description, category_id, priority, status, due_date)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
            )
            SELECT {}
            FROM t
            LEFT JOIN categories c ON c.id = t.category_id
            "#,
            TASK_COLUMNS
        );

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(Uuid::new_v4())
            .bind(owner_id)
            .bind(&data.title)
            .bind(&data.description)
            .bind(data.category_id)
            .bind(data.priority)
            .bind(data.status)
            .bind(data.due_date)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create task: {:?}", e);
                e
            })?;

        Ok(task)
    }

    async fn update(&self, owner_id: Uuid, id: Uuid, data: &TaskData) -> Result<Option<Task>> {
        let sql = format!(
            r#"
            WITH t AS (
                UPDATE tasks
                SET title = $3, description = $4, category_id = $5, priority = $6,
                    status = $7, due_date = $8, updated_at = NOW()
                WHERE id = $1 AND user_id = $2
                RETURNING *
            )
            SELECT {}
            FROM t
            LEFT JOIN categories c ON c.id = t.category_id
            "#,
            TASK_COLUMNS
        );

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner_id)
            .bind(&data.title)
            .bind(&data.description)
            .bind(data.category_id)
            .bind(data.priority)
            .bind(data.status)
            .bind(data.due_date)
            .fetch_optional(&self.pool)
            .await?;

        Ok(task)
    }

    async fn set_status(
        &self,
        owner_id: Uuid,
        id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<Task>> {
        let sql = format!(
            r#"
            WITH t AS (
                UPDATE tasks
                SET status = $3, updated_at = NOW()
                WHERE id = $1 AND user_id = $2
                RETURNING *
            )
            SELECT {}
            FROM t
            LEFT JOIN categories c ON c.id = t.category_id
            "#,
            TASK_COLUMNS
        );

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner_id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?;

        Ok(task)
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn stats(&self, owner_id: Uuid) -> Result<TaskStats> {
        let stats = sqlx::query_as::<_, TaskStats>(
            r#"
            SELECT
                COUNT(*) AS total_tasks,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed_tasks,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending_tasks,
                COUNT(*) FILTER (WHERE priority = 'high') AS high_priority_tasks
            FROM tasks
            WHERE user_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }
}
