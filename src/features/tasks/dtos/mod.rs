mod task_dto;

pub use task_dto::{
    validate_due_date, CreateTaskDto, TaskListItemDto, TaskQueryParams, TaskResponseDto,
    TaskStatsDto, UpdateTaskDto, DUE_DATE_IN_PAST,
};
