use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};

use crate::features::attachments::handlers;
use crate::features::attachments::services::AttachmentService;
use crate::shared::constants::MAX_ATTACHMENT_SIZE;

/// Create routes for the attachments feature (authenticated)
pub fn routes(service: Arc<AttachmentService>) -> Router {
    Router::new()
        .route(
            "/api/attachments",
            get(handlers::list_attachments).post(handlers::create_attachment),
        )
        .route(
            "/api/attachments/{id}",
            get(handlers::get_attachment)
                .put(handlers::replace_attachment)
                .patch(handlers::update_attachment)
                .delete(handlers::delete_attachment),
        )
        // Allow MAX_ATTACHMENT_SIZE plus a buffer for multipart overhead
        .layer(DefaultBodyLimit::max(MAX_ATTACHMENT_SIZE + 1024 * 1024))
        .with_state(service)
}
