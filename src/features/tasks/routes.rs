use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::tasks::handlers;
use crate::features::tasks::services::TaskService;

/// Create routes for the tasks feature (authenticated)
pub fn routes(service: Arc<TaskService>) -> Router {
    Router::new()
        .route(
            "/api/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route("/api/tasks/my_stats", get(handlers::my_stats))
        .route(
            "/api/tasks/{id}",
            get(handlers::get_task)
                .put(handlers::replace_task)
                .patch(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .route(
            "/api/tasks/{id}/mark_completed",
            post(handlers::mark_completed),
        )
        .with_state(service)
}
