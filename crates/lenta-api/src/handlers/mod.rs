mod get_post;
mod submit_post;
mod task_status;

pub use get_post::get_post;
pub use submit_post::submit_post;
pub use task_status::get_task_status;
