use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::AppError;
use crate::features::attachments::dtos::{AttachmentResponseDto, TaskAttachmentDto};
use crate::features::tasks::models::{
    Task, TaskFilter, TaskOrdering, TaskPriority, TaskStats, TaskStatus,
};
use crate::shared::types::double_option;

pub const DUE_DATE_IN_PAST: &str = "Due date cannot be in the past";

/// Reject a due date earlier than `now`
pub fn validate_due_date(due_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Result<(), AppError> {
    match due_date {
        Some(due) if due < now => Err(AppError::field("due_date", DUE_DATE_IN_PAST)),
        _ => Ok(()),
    }
}

/// Query params for listing tasks
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaskQueryParams {
    /// Exact category match
    pub category: Option<Uuid>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    /// Case-insensitive substring match on title or description
    pub search: Option<String>,
    /// `created_at`, `due_date` or `priority`, prefixed with `-` for descending
    #[param(example = "-due_date")]
    pub ordering: Option<String>,
}

impl From<TaskQueryParams> for TaskFilter {
    fn from(params: TaskQueryParams) -> Self {
        Self {
            category_id: params.category,
            priority: params.priority,
            status: params.status,
            search: params.search.filter(|s| !s.trim().is_empty()),
            ordering: TaskOrdering::from_query(params.ordering.as_deref()),
        }
    }
}

/// Request DTO for creating or replacing (PUT) a task
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTaskDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    /// ID of one of the caller's categories
    pub category: Option<Uuid>,

    /// Defaults to `medium`
    pub priority: Option<TaskPriority>,

    /// Defaults to `pending`
    pub status: Option<TaskStatus>,

    /// Must not be in the past
    pub due_date: Option<DateTime<Utc>>,
}

/// Request DTO for partially updating (PATCH) a task.
///
/// Nullable fields distinguish "absent" from an explicit `null`, which clears them.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTaskDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub category: Option<Option<Uuid>>,

    pub priority: Option<TaskPriority>,

    pub status: Option<TaskStatus>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

/// Reduced task view used by the list endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskListItemDto {
    pub id: Uuid,
    pub title: String,
    pub category_name: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Task> for TaskListItemDto {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            title: t.title,
            category_name: t.category_name,
            priority: t.priority,
            status: t.status,
            due_date: t.due_date,
            created_at: t.created_at,
        }
    }
}

/// Full task view
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskResponseDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Category ID
    pub category: Option<Uuid>,
    pub category_name: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub attachments: Vec<TaskAttachmentDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskResponseDto {
    pub fn new(t: Task, attachments: Vec<AttachmentResponseDto>) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            category: t.category_id,
            category_name: t.category_name,
            priority: t.priority,
            status: t.status,
            due_date: t.due_date,
            attachments: attachments.into_iter().map(Into::into).collect(),
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Aggregate counts over the caller's tasks
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskStatsDto {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub pending_tasks: i64,
    pub high_priority_tasks: i64,
}

impl From<TaskStats> for TaskStatsDto {
    fn from(s: TaskStats) -> Self {
        Self {
            total_tasks: s.total_tasks,
            completed_tasks: s.completed_tasks,
            pending_tasks: s.pending_tasks,
            high_priority_tasks: s.high_priority_tasks,
        }
    }
}
