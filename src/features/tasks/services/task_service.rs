use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::attachments::services::AttachmentService;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::repositories::CategoryRepository;
use crate::features::tasks::dtos::{
    validate_due_date, CreateTaskDto, TaskListItemDto, TaskQueryParams, TaskResponseDto,
    TaskStatsDto, UpdateTaskDto,
};
use crate::features::tasks::models::{Task, TaskData, TaskFilter, TaskStatus};
use crate::features::tasks::repositories::TaskRepository;

pub const CATEGORY_NOT_FOUND: &str = "Category not found";

/// Service for task operations, always scoped to the requester
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
    categories: Arc<dyn CategoryRepository>,
    attachments: Arc<AttachmentService>,
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Task {} not found", id))
}

impl TaskService {
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        categories: Arc<dyn CategoryRepository>,
        attachments: Arc<AttachmentService>,
    ) -> Self {
        Self {
            tasks,
            categories,
            attachments,
        }
    }

    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        params: TaskQueryParams,
    ) -> Result<Vec<TaskListItemDto>> {
        let filter = TaskFilter::from(params);
        let tasks = self.tasks.list(user.user_id, &filter).await?;

        Ok(tasks.into_iter().map(Into::into).collect())
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: Uuid) -> Result<TaskResponseDto> {
        let task = self.find(user, id).await?;
        self.to_response(user, task).await
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        dto: CreateTaskDto,
    ) -> Result<TaskResponseDto> {
        validate_due_date(dto.due_date, Utc::now())?;
        self.ensure_category(user, dto.category).await?;

        let data = TaskData {
            title: dto.title,
            description: dto.description.unwrap_or_default(),
            category_id: dto.category,
            priority: dto.priority.unwrap_or_default(),
            status: dto.status.unwrap_or_default(),
            due_date: dto.due_date,
        };

        let task = self.tasks.create(user.user_id, &data).await?;
        tracing::info!(task_id = %task.id, user_id = %user.user_id, "Task created");

        // A new task has no attachments yet
        Ok(TaskResponseDto::new(task, Vec::new()))
    }

    /// Full replacement (PUT); omitted optional fields reset to their defaults
    pub async fn replace(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        dto: CreateTaskDto,
    ) -> Result<TaskResponseDto> {
        self.find(user, id).await?;

        validate_due_date(dto.due_date, Utc::now())?;
        self.ensure_category(user, dto.category).await?;

        let data = TaskData {
            title: dto.title,
            description: dto.description.unwrap_or_default(),
            category_id: dto.category,
            priority: dto.priority.unwrap_or_default(),
            status: dto.status.unwrap_or_default(),
            due_date: dto.due_date,
        };

        self.write(user, id, data).await
    }

    /// Partial update (PATCH); only supplied fields are validated and changed
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        dto: UpdateTaskDto,
    ) -> Result<TaskResponseDto> {
        let current = self.find(user, id).await?;
        let mut data = TaskData::from(&current);

        if let Some(due_date) = dto.due_date {
            validate_due_date(due_date, Utc::now())?;
            data.due_date = due_date;
        }
        if let Some(category_id) = dto.category {
            self.ensure_category(user, category_id).await?;
            data.category_id = category_id;
        }
        if let Some(title) = dto.title {
            data.title = title;
        }
        if let Some(description) = dto.description {
            data.description = description;
        }
        if let Some(priority) = dto.priority {
            data.priority = priority;
        }
        if let Some(status) = dto.status {
            data.status = status;
        }

        self.write(user, id, data).await
    }

    /// Deletes the task, its attachment rows, and their stored files
    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> Result<()> {
        let stored = self.attachments.stored_for_task(user, id).await?;

        if !self.tasks.delete(user.user_id, id).await? {
            return Err(not_found(id));
        }

        self.attachments.purge_objects(&stored).await;

        tracing::info!(
            task_id = %id,
            user_id = %user.user_id,
            attachments = stored.len(),
            "Task deleted"
        );
        Ok(())
    }

    /// Idempotent: a completed task stays completed
    pub async fn mark_completed(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
    ) -> Result<TaskResponseDto> {
        let task = self
            .tasks
            .set_status(user.user_id, id, TaskStatus::Completed)
            .await?
            .ok_or_else(|| not_found(id))?;

        tracing::info!(task_id = %id, user_id = %user.user_id, "Task marked completed");
        self.to_response(user, task).await
    }

    pub async fn stats(&self, user: &AuthenticatedUser) -> Result<TaskStatsDto> {
        let stats = self.tasks.stats(user.user_id).await?;
        Ok(stats.into())
    }

    async fn find(&self, user: &AuthenticatedUser, id: Uuid) -> Result<Task> {
        self.tasks
            .find(user.user_id, id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn write(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        data: TaskData,
    ) -> Result<TaskResponseDto> {
        let task = self
            .tasks
            .update(user.user_id, id, &data)
            .await?
            .ok_or_else(|| not_found(id))?;

        tracing::info!(task_id = %id, user_id = %user.user_id, "Task updated");
        self.to_response(user, task).await
    }

    /// A referenced category must belong to the caller
    async fn ensure_category(
        &self,
        user: &AuthenticatedUser,
        category_id: Option<Uuid>,
    ) -> Result<()> {
        let Some(category_id) = category_id else {
            return Ok(());
        };

        match self.categories.find(user.user_id, category_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::field("category", CATEGORY_NOT_FOUND)),
        }
    }

    async fn to_response(&self, user: &AuthenticatedUser, task: Task) -> Result<TaskResponseDto> {
        let attachments = self.attachments.list_for_task(user, task.id).await?;
        Ok(TaskResponseDto::new(task, attachments))
    }
}
