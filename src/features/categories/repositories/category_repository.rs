use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::categories::models::{Category, CategoryData};
use crate::shared::validation::like_patterns;

/// Category persistence; every operation is scoped to `owner_id`
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Newest first; every search term must appear in the name, case-insensitively
    async fn list(&self, owner_id: Uuid, search: Option<&str>) -> Result<Vec<Category>>;

    async fn find(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Category>>;

    async fn create(&self, owner_id: Uuid, data: &CategoryData) -> Result<Category>;

    async fn update(&self, owner_id: Uuid, id: Uuid, data: &CategoryData)
        -> Result<Option<Category>>;

    /// Tasks referencing the category keep existing with their category cleared
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool>;
}

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn list(&self, owner_id: Uuid, search: Option<&str>) -> Result<Vec<Category>> {
        let patterns = search.map(like_patterns).unwrap_or_default();

        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT c.id, c.user_id, c.name, c.color, c.created_at,
                   (SELECT COUNT(*) FROM tasks t WHERE t.category_id = c.id) AS task_count
            FROM categories c
            WHERE c.user_id = $1
              AND NOT EXISTS (
                  SELECT 1 FROM UNNEST($2::TEXT[]) AS term WHERE c.name NOT ILIKE term
              )
            ORDER BY c.created_at DESC, c.id
            "#,
        )
        .bind(owner_id)
        .bind(patterns)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            e
        })?;

        Ok(categories)
    }

    async fn find(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT c.id, c.user_id, c.name, c.color, c.created_at,
                   (SELECT COUNT(*) FROM tasks t WHERE t.category_id = c.id) AS task_count
            FROM categories c
            WHERE c.id = $1 AND c.user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn create(&self, owner_id: Uuid, data: &CategoryData) -> Result<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, user_id, name, color)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, color, created_at, 0::BIGINT AS task_count
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(&data.name)
        .bind(&data.color)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        data: &CategoryData,
    ) -> Result<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            WITH updated AS (
                UPDATE categories
                SET name = $3, color = $4
                WHERE id = $1 AND user_id = $2
                RETURNING id, user_id, name, color, created_at
            )
            SELECT u.id, u.user_id, u.name, u.color, u.created_at,
                   (SELECT COUNT(*) FROM tasks t WHERE t.category_id = u.id) AS task_count
            FROM updated u
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(&data.name)
        .bind(&data.color)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool> {
        // tasks.category_id is ON DELETE SET NULL
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
