pub mod post;
pub mod task;
pub mod user;

pub use post::{Post, PostDraft, PostView};
pub use task::{TaskResponse, TaskState, WorkerResult};
pub use user::{User, UserView};
