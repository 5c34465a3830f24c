//! Application state.
//!
//! Everything a handler needs is constructed once during setup and injected
//! here; no component reaches for a global connection after startup.

use lenta_db::PostRepository;
use lenta_worker::PostSubmissionService;

pub struct AppState {
    pub submission: PostSubmissionService,
    pub posts: PostRepository,
}
