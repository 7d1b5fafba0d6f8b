pub mod task_handler;

pub use task_handler::{
    __path_create_task, __path_delete_task, __path_get_task, __path_list_tasks,
    __path_mark_completed, __path_my_stats, __path_replace_task, __path_update_task, create_task,
    delete_task, get_task, list_tasks, mark_completed, my_stats, replace_task, update_task,
};
