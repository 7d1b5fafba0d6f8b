use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::attachments::dtos::{
    AttachmentForm, AttachmentResponseDto, UploadAttachmentDto,
};
use crate::features::attachments::services::AttachmentService;
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::types::ApiResponse;

/// List attachments on the caller's tasks
#[utoipa::path(
    get,
    path = "/api/attachments",
    responses(
        (status = 200, description = "List of attachments", body = ApiResponse<Vec<AttachmentResponseDto>>),
        (status = 401, description = "Authentication required")
    ),
    tag = "attachments",
    security(("bearer_auth" = []))
)]
pub async fn list_attachments(
    user: AuthenticatedUser,
    State(service): State<Arc<AttachmentService>>,
) -> Result<Json<ApiResponse<Vec<AttachmentResponseDto>>>> {
    let attachments = service.list(&user).await?;
    Ok(Json(ApiResponse::list(attachments)))
}

/// Upload a file to one of the caller's tasks
///
/// Accepts multipart/form-data with:
/// - `task`: ID of a task owned by the caller (required)
/// - `file`: The file to upload (required, at most 10 MB)
#[utoipa::path(
    post,
    path = "/api/attachments",
    request_body(
        content = UploadAttachmentDto,
        content_type = "multipart/form-data",
        description = "Task ID and file",
    ),
    responses(
        (status = 201, description = "Attachment created", body = ApiResponse<AttachmentResponseDto>),
        (status = 400, description = "Missing field, oversized file, or task not found"),
        (status = 401, description = "Authentication required"),
        (status = 413, description = "Request body too large")
    ),
    tag = "attachments",
    security(("bearer_auth" = []))
)]
pub async fn create_attachment(
    user: AuthenticatedUser,
    State(service): State<Arc<AttachmentService>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<AttachmentResponseDto>>)> {
    let form = AttachmentForm::read(multipart).await?;

    let attachment = service.create(&user, form).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(attachment), None, None)),
    ))
}

/// Get one attachment
#[utoipa::path(
    get,
    path = "/api/attachments/{id}",
    params(("id" = Uuid, Path, description = "Attachment ID")),
    responses(
        (status = 200, description = "Attachment found", body = ApiResponse<AttachmentResponseDto>),
        (status = 404, description = "Attachment not found")
    ),
    tag = "attachments",
    security(("bearer_auth" = []))
)]
pub async fn get_attachment(
    user: AuthenticatedUser,
    State(service): State<Arc<AttachmentService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AttachmentResponseDto>>> {
    let attachment = service.get(&user, id).await?;
    Ok(Json(ApiResponse::success(Some(attachment), None, None)))
}

/// Replace the stored file of an attachment
#[utoipa::path(
    put,
    path = "/api/attachments/{id}",
    params(("id" = Uuid, Path, description = "Attachment ID")),
    request_body(
        content = UploadAttachmentDto,
        content_type = "multipart/form-data",
        description = "Replacement file (required) and optional filename",
    ),
    responses(
        (status = 200, description = "Attachment updated", body = ApiResponse<AttachmentResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Attachment not found")
    ),
    tag = "attachments",
    security(("bearer_auth" = []))
)]
pub async fn replace_attachment(
    user: AuthenticatedUser,
    State(service): State<Arc<AttachmentService>>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<AttachmentResponseDto>>> {
    let form = AttachmentForm::read(multipart).await?;

    let attachment = service.update(&user, id, form, true).await?;
    Ok(Json(ApiResponse::success(Some(attachment), None, None)))
}

/// Rename an attachment or swap its file
#[utoipa::path(
    patch,
    path = "/api/attachments/{id}",
    params(("id" = Uuid, Path, description = "Attachment ID")),
    request_body(
        content = UploadAttachmentDto,
        content_type = "multipart/form-data",
        description = "Optional file and optional filename",
    ),
    responses(
        (status = 200, description = "Attachment updated", body = ApiResponse<AttachmentResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Attachment not found")
    ),
    tag = "attachments",
    security(("bearer_auth" = []))
)]
pub async fn update_attachment(
    user: AuthenticatedUser,
    State(service): State<Arc<AttachmentService>>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<AttachmentResponseDto>>> {
    let form = AttachmentForm::read(multipart).await?;

    let attachment = service.update(&user, id, form, false).await?;
    Ok(Json(ApiResponse::success(Some(attachment), None, None)))
}

/// Delete an attachment and its stored file
#[utoipa::path(
    delete,
    path = "/api/attachments/{id}",
    params(("id" = Uuid, Path, description = "Attachment ID")),
    responses(
        (status = 204, description = "Attachment deleted"),
        (status = 404, description = "Attachment not found")
    ),
    tag = "attachments",
    security(("bearer_auth" = []))
)]
pub async fn delete_attachment(
    user: AuthenticatedUser,
    State(service): State<Arc<AttachmentService>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    service.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use serde_json::{json, Value};

    use crate::shared::test_helpers::{id_of, TestApp, TestUser};

    fn file_part(name: &str, bytes: &'static [u8]) -> Part {
        Part::bytes(bytes).file_name(name).mime_type("text/plain")
    }

    async fn upload(app: &TestApp, user: &TestUser, task_id: &str) -> Value {
        let form = MultipartForm::new()
            .add_text("task", task_id.to_string())
            .add_part("file", file_part("notes.txt", b"remember the milk"));

        let response = app
            .server
            .post("/api/attachments")
            .authorization_bearer(&user.access)
            .multipart(form)
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["data"].clone()
    }

    #[tokio::test]
    async fn test_upload_uses_original_filename_and_nests_in_task() {
        let app = TestApp::new();
        let user = app.user().await;
        let task = app.create_task(&user, json!({ "title": "Groceries" })).await;

        let form = MultipartForm::new()
            .add_text("task", id_of(&task))
            .add_text("filename", "ignored.bin")
            .add_part("file", file_part("list.txt", b"eggs"));
        let response = app
            .server
            .post("/api/attachments")
            .authorization_bearer(&user.access)
            .multipart(form)
            .await;
        response.assert_status(StatusCode::CREATED);
        let attachment = response.json::<Value>()["data"].clone();
        assert_eq!(attachment["filename"], "list.txt");
        assert_eq!(attachment["task"], id_of(&task));

        let file_url = attachment["file"].as_str().unwrap_or_default();
        assert!(file_url.contains(&format!("attachments/tasks/{}/", id_of(&task))));
        assert!(file_url.contains(".txt"));
        assert_eq!(app.storage.object_count(), 1);

        let detail = app
            .server
            .get(&format!("/api/tasks/{}", id_of(&task)))
            .authorization_bearer(&user.access)
            .await;
        let body = detail.json::<Value>();
        assert_eq!(body["data"]["attachments"][0]["id"], attachment["id"]);

        let nested = &body["data"]["attachments"][0];
        assert_eq!(nested["filename"], "list.txt");
        let mut keys: Vec<&str> = nested
            .as_object()
            .map(|o| o.keys().map(String::as_str).collect())
            .unwrap_or_default();
        keys.sort();
        assert_eq!(keys, vec!["file", "filename", "id", "uploaded_at"]);
    }

    #[tokio::test]
    async fn test_upload_to_another_users_task_is_rejected() {
        let app = TestApp::new();
        let owner = app.user().await;
        let intruder = app.user().await;
        let task = app.create_task(&owner, json!({ "title": "Owner's task" })).await;

        let form = MultipartForm::new()
            .add_text("task", id_of(&task))
            .add_part("file", file_part("evil.txt", b"payload"));
        let response = app
            .server
            .post("/api/attachments")
            .authorization_bearer(&intruder.access)
            .multipart(form)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["errors"][0], "Task not found");

        assert_eq!(app.db.attachment_count(), 0);
        assert_eq!(app.storage.object_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_requires_task_and_file() {
        let app = TestApp::new();
        let user = app.user().await;
        let task = app.create_task(&user, json!({ "title": "Paperwork" })).await;

        let without_file = MultipartForm::new().add_text("task", id_of(&task));
        app.server
            .post("/api/attachments")
            .authorization_bearer(&user.access)
            .multipart(without_file)
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let without_task = MultipartForm::new().add_part("file", file_part("a.txt", b"a"));
        app.server
            .post("/api/attachments")
            .authorization_bearer(&user.access)
            .multipart(without_task)
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let bad_task = MultipartForm::new()
            .add_text("task", "not-a-uuid")
            .add_part("file", file_part("a.txt", b"a"));
        let response = app
            .server
            .post("/api/attachments")
            .authorization_bearer(&user.access)
            .multipart(bad_task)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["message"], "Task not found");

        assert_eq!(app.db.attachment_count(), 0);
    }

    #[tokio::test]
    async fn test_attachments_are_isolated_between_users() {
        let app = TestApp::new();
        let owner = app.user().await;
        let intruder = app.user().await;
        let task = app.create_task(&owner, json!({ "title": "Taxes" })).await;
        let attachment = upload(&app, &owner, &id_of(&task)).await;
        let path = format!("/api/attachments/{}", id_of(&attachment));

        let listed = app
            .server
            .get("/api/attachments")
            .authorization_bearer(&intruder.access)
            .await;
        assert_eq!(listed.json::<Value>()["meta"]["total"], 0);

        app.server
            .get(&path)
            .authorization_bearer(&intruder.access)
            .await
            .assert_status(StatusCode::NOT_FOUND);
        app.server
            .patch(&path)
            .authorization_bearer(&intruder.access)
            .multipart(MultipartForm::new().add_text("filename", "stolen.txt"))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        app.server
            .delete(&path)
            .authorization_bearer(&intruder.access)
            .await
            .assert_status(StatusCode::NOT_FOUND);

        assert_eq!(app.db.attachment_count(), 1);
        assert_eq!(app.storage.object_count(), 1);

        let owned = app
            .server
            .get("/api/attachments")
            .authorization_bearer(&owner.access)
            .await;
        assert_eq!(owned.json::<Value>()["meta"]["total"], 1);
    }

    #[tokio::test]
    async fn test_patch_renames_and_put_replaces_file() {
        let app = TestApp::new();
        let user = app.user().await;
        let task = app.create_task(&user, json!({ "title": "Photos" })).await;
        let attachment = upload(&app, &user, &id_of(&task)).await;
        let path = format!("/api/attachments/{}", id_of(&attachment));

        let renamed = app
            .server
            .patch(&path)
            .authorization_bearer(&user.access)
            .multipart(MultipartForm::new().add_text("filename", "shopping.txt"))
            .await;
        renamed.assert_status_ok();
        assert_eq!(renamed.json::<Value>()["data"]["filename"], "shopping.txt");

        app.server
            .put(&path)
            .authorization_bearer(&user.access)
            .multipart(MultipartForm::new().add_text("filename", "no-file.txt"))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let replaced = app
            .server
            .put(&path)
            .authorization_bearer(&user.access)
            .multipart(MultipartForm::new().add_part("file", file_part("beach.png", b"png")))
            .await;
        replaced.assert_status_ok();
        let body = replaced.json::<Value>();
        assert_eq!(body["data"]["filename"], "beach.png");
        assert!(body["data"]["file"].as_str().is_some_and(|u| u.contains(".png")));

        // Old object removed, new one stored
        assert_eq!(app.storage.object_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_row_and_object() {
        let app = TestApp::new();
        let user = app.user().await;
        let task = app.create_task(&user, json!({ "title": "Receipts" })).await;
        let attachment = upload(&app, &user, &id_of(&task)).await;

        app.server
            .delete(&format!("/api/attachments/{}", id_of(&attachment)))
            .authorization_bearer(&user.access)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        assert_eq!(app.db.attachment_count(), 0);
        assert_eq!(app.storage.object_count(), 0);
    }

    #[tokio::test]
    async fn test_task_delete_cascades_to_attachments() {
        let app = TestApp::new();
        let user = app.user().await;
        let task = app.create_task(&user, json!({ "title": "Move house" })).await;
        upload(&app, &user, &id_of(&task)).await;
        upload(&app, &user, &id_of(&task)).await;

        app.server
            .delete(&format!("/api/tasks/{}", id_of(&task)))
            .authorization_bearer(&user.access)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        assert_eq!(app.db.task_count(), 0);
        assert_eq!(app.db.attachment_count(), 0);
        assert_eq!(app.storage.object_count(), 0);
    }
}
