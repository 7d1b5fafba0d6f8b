use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::attachments::{dtos as attachments_dtos, handlers as attachments_handlers};
use crate::features::auth::{dtos as auth_dtos, handlers as auth_handlers};
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::tasks::{dtos as tasks_dtos, handlers as tasks_handlers, models as tasks_models};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth_handlers::register,
        auth_handlers::login,
        auth_handlers::refresh_token,
        auth_handlers::get_me,
        // Categories
        categories_handlers::list_categories,
        categories_handlers::create_category,
        categories_handlers::get_category,
        categories_handlers::replace_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
        // Tasks
        tasks_handlers::list_tasks,
        tasks_handlers::create_task,
        tasks_handlers::my_stats,
        tasks_handlers::get_task,
        tasks_handlers::replace_task,
        tasks_handlers::update_task,
        tasks_handlers::delete_task,
        tasks_handlers::mark_completed,
        // Attachments
        attachments_handlers::list_attachments,
        attachments_handlers::create_attachment,
        attachments_handlers::get_attachment,
        attachments_handlers::replace_attachment,
        attachments_handlers::update_attachment,
        attachments_handlers::delete_attachment,
    ),
    components(
        schemas(
            Meta,
            // Auth
            auth_dtos::RegisterRequestDto,
            auth_dtos::LoginRequestDto,
            auth_dtos::RefreshTokenRequestDto,
            auth_dtos::TokenPairResponseDto,
            auth_dtos::AccessTokenResponseDto,
            auth_dtos::UserResponseDto,
            ApiResponse<auth_dtos::UserResponseDto>,
            ApiResponse<auth_dtos::TokenPairResponseDto>,
            ApiResponse<auth_dtos::AccessTokenResponseDto>,
            // Categories
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            categories_dtos::CategoryResponseDto,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            // Tasks
            tasks_models::TaskPriority,
            tasks_models::TaskStatus,
            tasks_dtos::CreateTaskDto,
            tasks_dtos::UpdateTaskDto,
            tasks_dtos::TaskListItemDto,
            tasks_dtos::TaskResponseDto,
            tasks_dtos::TaskStatsDto,
            ApiResponse<tasks_dtos::TaskResponseDto>,
            ApiResponse<Vec<tasks_dtos::TaskListItemDto>>,
            ApiResponse<tasks_dtos::TaskStatsDto>,
            // Attachments
            attachments_dtos::UploadAttachmentDto,
            attachments_dtos::AttachmentResponseDto,
            attachments_dtos::TaskAttachmentDto,
            ApiResponse<attachments_dtos::AttachmentResponseDto>,
            ApiResponse<Vec<attachments_dtos::AttachmentResponseDto>>,
        )
    ),
    tags(
        (name = "auth", description = "Registration and JWT tokens"),
        (name = "categories", description = "The caller's task categories"),
        (name = "tasks", description = "The caller's tasks, stats and completion"),
        (name = "attachments", description = "Files attached to the caller's tasks"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Taskboard API",
        version = "0.1.0",
        description = "Personal task management API",
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_resource() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/register",
            "/api/categories/{id}",
            "/api/tasks/my_stats",
            "/api/tasks/{id}/mark_completed",
            "/api/attachments",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
