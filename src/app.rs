use std::sync::Arc;

use axum::{http::StatusCode, middleware::from_fn_with_state, routing::get, Router};
use sqlx::PgPool;

use crate::core::config::AuthTokenConfig;
use crate::core::middleware;
use crate::features::attachments::{
    routes as attachments_routes, AttachmentRepository, AttachmentService, PgAttachmentRepository,
};
use crate::features::auth::{routes as auth_routes, AuthService, TokenService};
use crate::features::categories::{
    routes as categories_routes, CategoryRepository, CategoryService, PgCategoryRepository,
};
use crate::features::tasks::{routes as tasks_routes, PgTaskRepository, TaskRepository, TaskService};
use crate::features::users::{PgUserRepository, UserRepository};
use crate::modules::storage::ObjectStorage;

/// Data access implementations the services are built on
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub attachments: Arc<dyn AttachmentRepository>,
}

impl Repositories {
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            categories: Arc::new(PgCategoryRepository::new(pool.clone())),
            tasks: Arc::new(PgTaskRepository::new(pool.clone())),
            attachments: Arc::new(PgAttachmentRepository::new(pool.clone())),
        }
    }
}

/// Every service behind the HTTP routes
pub struct Services {
    pub tokens: Arc<TokenService>,
    pub auth: Arc<AuthService>,
    pub categories: Arc<CategoryService>,
    pub tasks: Arc<TaskService>,
    pub attachments: Arc<AttachmentService>,
}

impl Services {
    pub fn new(
        repositories: Repositories,
        storage: Arc<dyn ObjectStorage>,
        token_config: AuthTokenConfig,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(token_config));
        let auth = Arc::new(AuthService::new(repositories.users, Arc::clone(&tokens)));
        let categories = Arc::new(CategoryService::new(Arc::clone(&repositories.categories)));
        let attachments = Arc::new(AttachmentService::new(repositories.attachments, storage));
        let tasks = Arc::new(TaskService::new(
            repositories.tasks,
            repositories.categories,
            Arc::clone(&attachments),
        ));

        Self {
            tokens,
            auth,
            categories,
            tasks,
            attachments,
        }
    }
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// API routes plus `/health`; transport layers and Swagger are added by the caller
pub fn build_router(services: &Services) -> Router {
    // Protected routes (require a valid access token)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes(Arc::clone(&services.auth)))
        .merge(categories_routes::routes(Arc::clone(&services.categories)))
        .merge(tasks_routes::routes(Arc::clone(&services.tasks)))
        .merge(attachments_routes::routes(Arc::clone(&services.attachments)))
        .route_layer(from_fn_with_state(
            Arc::clone(&services.tokens),
            middleware::auth_middleware,
        ));

    let public_routes = Router::new()
        .merge(auth_routes::public_routes(Arc::clone(&services.auth)))
        .route("/health", get(health_check));

    Router::new().merge(protected_routes).merge(public_routes)
}
