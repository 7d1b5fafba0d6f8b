use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::dtos::{
    CategoryQueryParams, CategoryResponseDto, CreateCategoryDto, UpdateCategoryDto,
};
use crate::features::categories::models::CategoryData;
use crate::features::categories::repositories::CategoryRepository;
use crate::shared::constants::DEFAULT_CATEGORY_COLOR;

/// Service for category operations, always scoped to the requester
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Category {} not found", id))
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        params: &CategoryQueryParams,
    ) -> Result<Vec<CategoryResponseDto>> {
        let categories = self
            .categories
            .list(user.user_id, params.search.as_deref())
            .await?;

        Ok(categories.into_iter().map(Into::into).collect())
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: Uuid) -> Result<CategoryResponseDto> {
        self.categories
            .find(user.user_id, id)
            .await?
            .map(Into::into)
            .ok_or_else(|| not_found(id))
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        dto: CreateCategoryDto,
    ) -> Result<CategoryResponseDto> {
        let data = CategoryData {
            name: dto.name,
            color: dto
                .color
                .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
        };

        let category = self.categories.create(user.user_id, &data).await?;
        tracing::info!(category_id = %category.id, user_id = %user.user_id, "Category created");

        Ok(category.into())
    }

    /// Full replacement (PUT)
    pub async fn replace(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        dto: CreateCategoryDto,
    ) -> Result<CategoryResponseDto> {
        let data = CategoryData {
            name: dto.name,
            color: dto
                .color
                .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
        };

        self.write(user, id, data).await
    }

    /// Partial update (PATCH); absent fields keep their current value
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        dto: UpdateCategoryDto,
    ) -> Result<CategoryResponseDto> {
        let current = self
            .categories
            .find(user.user_id, id)
            .await?
            .ok_or_else(|| not_found(id))?;

        let data = CategoryData {
            name: dto.name.unwrap_or(current.name),
            color: dto.color.unwrap_or(current.color),
        };

        self.write(user, id, data).await
    }

    async fn write(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        data: CategoryData,
    ) -> Result<CategoryResponseDto> {
        let category = self
            .categories
            .update(user.user_id, id, &data)
            .await?
            .ok_or_else(|| not_found(id))?;

        tracing::info!(category_id = %id, user_id = %user.user_id, "Category updated");
        Ok(category.into())
    }

    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> Result<()> {
        if !self.categories.delete(user.user_id, id).await? {
            return Err(not_found(id));
        }

        tracing::info!(category_id = %id, user_id = %user.user_id, "Category deleted");
        Ok(())
    }
}
