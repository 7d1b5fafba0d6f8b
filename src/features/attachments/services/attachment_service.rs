use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::attachments::dtos::{AttachmentForm, AttachmentResponseDto, UploadedFile};
use crate::features::attachments::models::{AttachmentData, TaskAttachment};
use crate::features::attachments::repositories::AttachmentRepository;
use crate::features::auth::model::AuthenticatedUser;
use crate::modules::storage::{attachment_key, ObjectStorage};
use crate::shared::constants::MAX_FILENAME_LENGTH;

pub const TASK_NOT_FOUND: &str = "Task not found";

/// Service for attachment operations, scoped through task ownership
pub struct AttachmentService {
    attachments: Arc<dyn AttachmentRepository>,
    storage: Arc<dyn ObjectStorage>,
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Attachment {} not found", id))
}

impl AttachmentService {
    pub fn new(attachments: Arc<dyn AttachmentRepository>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            attachments,
            storage,
        }
    }

    /// Build the response payload, presigning the stored object
    pub async fn to_response(&self, attachment: TaskAttachment) -> Result<AttachmentResponseDto> {
        let file = self.storage.presigned_url(&attachment.file_key).await?;

        Ok(AttachmentResponseDto {
            id: attachment.id,
            task: attachment.task_id,
            file,
            filename: attachment.filename,
            uploaded_at: attachment.uploaded_at,
        })
    }

    pub async fn to_responses(
        &self,
        attachments: Vec<TaskAttachment>,
    ) -> Result<Vec<AttachmentResponseDto>> {
        let mut responses = Vec::with_capacity(attachments.len());
        for attachment in attachments {
            responses.push(self.to_response(attachment).await?);
        }
        Ok(responses)
    }

    pub async fn list(&self, user: &AuthenticatedUser) -> Result<Vec<AttachmentResponseDto>> {
        let attachments = self.attachments.list(user.user_id).await?;
        self.to_responses(attachments).await
    }

    /// Payloads for the attachments nested in a task view
    pub async fn list_for_task(
        &self,
        user: &AuthenticatedUser,
        task_id: Uuid,
    ) -> Result<Vec<AttachmentResponseDto>> {
        let attachments = self.attachments.list_for_task(user.user_id, task_id).await?;
        self.to_responses(attachments).await
    }

    /// Rows on `task_id`, read before the task is deleted so their objects can be purged
    pub async fn stored_for_task(
        &self,
        user: &AuthenticatedUser,
        task_id: Uuid,
    ) -> Result<Vec<TaskAttachment>> {
        self.attachments.list_for_task(user.user_id, task_id).await
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: Uuid) -> Result<AttachmentResponseDto> {
        let attachment = self
            .attachments
            .find(user.user_id, id)
            .await?
            .ok_or_else(|| not_found(id))?;

        self.to_response(attachment).await
    }

    /// Store the file and record it against one of the caller's tasks.
    ///
    /// A task that is unparseable, missing, or owned by someone else is a
    /// validation error, not a 404.
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        form: AttachmentForm,
    ) -> Result<AttachmentResponseDto> {
        let (task, file) = match (form.task, form.file) {
            (Some(task), Some(file)) => (task, file),
            (task, file) => {
                let mut errors = Vec::new();
                if file.is_none() {
                    errors.push("file: No file was submitted.".to_string());
                }
                if task.is_none() {
                    errors.push("task: This field is required.".to_string());
                }
                return Err(AppError::FieldErrors(errors));
            }
        };

        let task_id = Uuid::parse_str(&task)
            .map_err(|_| AppError::Validation(TASK_NOT_FOUND.to_string()))?;

        let data = self.store(task_id, file).await?;

        let created = match self.attachments.create(user.user_id, &data).await {
            Ok(Some(attachment)) => attachment,
            Ok(None) => {
                self.discard(&data.file_key).await;
                return Err(AppError::Validation(TASK_NOT_FOUND.to_string()));
            }
            Err(e) => {
                self.discard(&data.file_key).await;
                return Err(e);
            }
        };

        info!(
            attachment_id = %created.id,
            task_id = %created.task_id,
            user_id = %user.user_id,
            size = created.file_size,
            "Attachment uploaded"
        );

        self.to_response(created).await
    }

    /// Replace and/or rename an attachment.
    ///
    /// With `require_file` set (PUT) a new file must be supplied. A new file
    /// re-derives `filename`; an explicit `filename` field wins over it.
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        form: AttachmentForm,
        require_file: bool,
    ) -> Result<AttachmentResponseDto> {
        if require_file && form.file.is_none() {
            return Err(AppError::field("file", "No file was submitted."));
        }
        if form
            .filename
            .as_ref()
            .is_some_and(|f| f.chars().count() > MAX_FILENAME_LENGTH)
        {
            return Err(AppError::field(
                "filename",
                format!(
                    "Ensure this field has no more than {} characters.",
                    MAX_FILENAME_LENGTH
                ),
            ));
        }

        let current = self
            .attachments
            .find(user.user_id, id)
            .await?
            .ok_or_else(|| not_found(id))?;

        let mut data = AttachmentData::from(&current);
        let replaced = match form.file {
            Some(file) => {
                data = self.store(current.task_id, file).await?;
                true
            }
            None => false,
        };
        if let Some(filename) = form.filename {
            data.filename = filename;
        }

        let updated = match self.attachments.update(user.user_id, id, &data).await {
            Ok(Some(attachment)) => attachment,
            Ok(None) => {
                if replaced {
                    self.discard(&data.file_key).await;
                }
                return Err(not_found(id));
            }
            Err(e) => {
                if replaced {
                    self.discard(&data.file_key).await;
                }
                return Err(e);
            }
        };

        if replaced {
            self.discard(&current.file_key).await;
        }

        info!(attachment_id = %id, user_id = %user.user_id, "Attachment updated");
        self.to_response(updated).await
    }

    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> Result<()> {
        let removed = self
            .attachments
            .delete(user.user_id, id)
            .await?
            .ok_or_else(|| not_found(id))?;

        self.discard(&removed.file_key).await;

        info!(attachment_id = %id, user_id = %user.user_id, "Attachment deleted");
        Ok(())
    }

    /// Remove stored objects whose rows are already gone
    pub async fn purge_objects(&self, attachments: &[TaskAttachment]) {
        for attachment in attachments {
            self.discard(&attachment.file_key).await;
        }
    }

    async fn store(&self, task_id: Uuid, file: UploadedFile) -> Result<AttachmentData> {
        let file_key = attachment_key(self.storage.key_prefix(), task_id, &file.original_name);
        let file_size = file.data.len() as i64;

        self.storage
            .upload(&file_key, file.data, &file.content_type)
            .await?;

        Ok(AttachmentData {
            task_id,
            file_key,
            filename: file.original_name.chars().take(MAX_FILENAME_LENGTH).collect(),
            content_type: file.content_type,
            file_size,
        })
    }

    /// Best-effort object removal; the database row is the source of truth
    async fn discard(&self, key: &str) {
        if let Err(e) = self.storage.delete(key).await {
            warn!("Failed to delete stored object {}: {}", key, e);
        }
    }
}
