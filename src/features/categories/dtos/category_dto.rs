use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::categories::models::Category;
use crate::shared::validation::HEX_COLOR_REGEX;

/// Query params for listing categories
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryQueryParams {
    /// Case-insensitive substring match on the category name
    pub search: Option<String>,
}

/// Request DTO for creating or replacing (PUT) a category
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// `#RRGGBB`, defaults to `#007bff`
    #[validate(regex(path = *HEX_COLOR_REGEX, message = "Color must be a hex value like #007bff"))]
    #[schema(example = "#007bff")]
    pub color: Option<String>,
}

/// Request DTO for partially updating (PATCH) a category
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(regex(path = *HEX_COLOR_REGEX, message = "Color must be a hex value like #007bff"))]
    pub color: Option<String>,
}

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    /// Number of tasks currently in this category
    pub task_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            color: c.color,
            task_count: c.task_count,
            created_at: c.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_dto_rejects_empty_name_and_bad_color() {
        let dto = CreateCategoryDto {
            name: String::new(),
            color: Some("blue".to_string()),
        };
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("color"));
    }

    #[test]
    fn test_update_dto_allows_empty_patch() {
        assert!(UpdateCategoryDto::default().validate().is_ok());
    }
}
