use axum::extract::Multipart;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::shared::constants::MAX_ATTACHMENT_SIZE;

/// Multipart form for creating or updating an attachment.
/// Note: This struct is for Swagger UI documentation only.
/// The handlers read the body with axum's Multipart extractor.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadAttachmentDto {
    /// Task the file belongs to (create only)
    pub task: Option<Uuid>,
    /// The file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: Option<String>,
    /// New display name (update only)
    pub filename: Option<String>,
}

/// Response DTO for attachment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttachmentResponseDto {
    pub id: Uuid,
    /// Parent task ID
    pub task: Uuid,
    /// Time-limited download URL
    pub file: String,
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Attachment summary nested inside a task payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskAttachmentDto {
    pub id: Uuid,
    /// Time-limited download URL
    pub file: String,
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<AttachmentResponseDto> for TaskAttachmentDto {
    fn from(a: AttachmentResponseDto) -> Self {
        Self {
            id: a.id,
            file: a.file,
            filename: a.filename,
            uploaded_at: a.uploaded_at,
        }
    }
}

/// A file part read from a multipart body
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub data: Vec<u8>,
    /// Name the client gave the file
    pub original_name: String,
    pub content_type: String,
}

/// Fields read from an attachment multipart body
#[derive(Debug, Default)]
pub struct AttachmentForm {
    pub task: Option<String>,
    pub file: Option<UploadedFile>,
    pub filename: Option<String>,
}

impl AttachmentForm {
    /// Read every part of `multipart`, rejecting files over the size limit
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = AttachmentForm::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            debug!("Failed to read multipart field: {}", e);
            AppError::BadRequest(format!("Failed to read multipart data: {}", e))
        })? {
            let field_name = field.name().unwrap_or("").to_string();

            match field_name.as_str() {
                "file" => {
                    let content_type = field
                        .content_type()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "application/octet-stream".to_string());
                    let original_name = field
                        .file_name()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "unnamed".to_string());

                    let data = field.bytes().await.map_err(|e| {
                        debug!("Failed to read file bytes: {}", e);
                        AppError::BadRequest(format!("Failed to read file data: {}", e))
                    })?;

                    if data.len() > MAX_ATTACHMENT_SIZE {
                        return Err(AppError::field(
                            "file",
                            format!(
                                "File too large. Maximum size is {} MB",
                                MAX_ATTACHMENT_SIZE / 1024 / 1024
                            ),
                        ));
                    }

                    form.file = Some(UploadedFile {
                        data: data.to_vec(),
                        original_name,
                        content_type,
                    });
                }
                "task" | "filename" => {
                    let text = field.text().await.map_err(|e| {
                        AppError::BadRequest(format!("Failed to read {} field: {}", field_name, e))
                    })?;
                    let text = text.trim().to_string();
                    if text.is_empty() {
                        continue;
                    }
                    if field_name == "task" {
                        form.task = Some(text);
                    } else {
                        form.filename = Some(text);
                    }
                }
                _ => {
                    debug!("Ignoring unknown field: {}", field_name);
                }
            }
        }

        Ok(form)
    }
}
