use std::cmp::Ordering;

use uuid::Uuid;

use crate::features::tasks::models::{Task, TaskPriority, TaskStatus};
use crate::shared::types::SortDirection;
use crate::shared::validation::search_terms;

/// Columns a task list may be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOrderField {
    CreatedAt,
    DueDate,
    Priority,
}

/// Parsed `ordering` query value such as `-due_date`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskOrdering {
    pub field: TaskOrderField,
    pub direction: SortDirection,
}

impl Default for TaskOrdering {
    /// Newest first
    fn default() -> Self {
        Self {
            field: TaskOrderField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl TaskOrdering {
    /// Parse `field` or `-field`; unknown fields yield `None`
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let (direction, name) = match value.strip_prefix('-') {
            Some(rest) => (SortDirection::Desc, rest),
            None => (SortDirection::Asc, value),
        };

        let field = match name {
            "created_at" => TaskOrderField::CreatedAt,
            "due_date" => TaskOrderField::DueDate,
            "priority" => TaskOrderField::Priority,
            _ => return None,
        };

        Some(Self { field, direction })
    }

    /// Parse an optional query value, falling back to the default ordering
    pub fn from_query(value: Option<&str>) -> Self {
        value.and_then(Self::parse).unwrap_or_default()
    }

    /// ORDER BY clause for the `t`-aliased tasks table; ties break by id
    pub fn as_sql(&self) -> String {
        let column = match self.field {
            TaskOrderField::CreatedAt => "t.created_at",
            TaskOrderField::DueDate => "t.due_date",
            TaskOrderField::Priority => "t.priority",
        };
        format!("{} {}, t.id ASC", column, self.direction.as_sql())
    }

    /// In-process equivalent of [`as_sql`](Self::as_sql).
    ///
    /// Missing due dates sort after present ones ascending (and before them
    /// descending), as Postgres orders NULLs.
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let primary = match self.field {
            TaskOrderField::CreatedAt => a.created_at.cmp(&b.created_at),
            TaskOrderField::Priority => a.priority.cmp(&b.priority),
            TaskOrderField::DueDate => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        };

        let primary = match self.direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };

        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// List filters; all present conditions must hold
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub category_id: Option<Uuid>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    /// Whitespace- or comma-separated terms; each must appear in the title
    /// or the description, case-insensitively
    pub search: Option<String>,
    pub ordering: TaskOrdering,
}

impl TaskFilter {
    /// Whether `task` satisfies the filter conditions (ordering aside)
    pub fn matches(&self, task: &Task) -> bool {
        if self.category_id.is_some() && task.category_id != self.category_id {
            return false;
        }
        if self.priority.is_some_and(|p| p != task.priority) {
            return false;
        }
        if self.status.is_some_and(|s| s != task.status) {
            return false;
        }
        let Some(query) = self.search.as_deref() else {
            return true;
        };
        let title = task.title.to_lowercase();
        let description = task.description.to_lowercase();
        search_terms(&query.to_lowercase())
            .iter()
            .all(|term| title.contains(term.as_str()) || description.contains(term.as_str()))
    }
}
