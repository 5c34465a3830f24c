//! Client-facing message strings.
//!
//! These are part of the wire contract: task status labels are matched by
//! polling clients and the failure texts end up verbatim in the fallen-task
//! collection, so they are centralized here rather than scattered as literals.

/// Task accepted, no terminal result yet.
pub const POST_ACCEPTED_FOR_PROCESSING: &str = "accepted for processing";
/// Task finished, post created.
pub const POST_READY: &str = "ready";
/// Task finished with an error.
pub const POST_TASK_FALLEN: &str = "fallen";

pub const USER_DOES_NOT_EXIST: &str = "user does not exist";
pub const INCORRECTLY_MARKED_USERS: &str = "incorrectly marked users";
pub const TASK_DOES_NOT_EXIST: &str = "task does not exist";
pub const POST_DOES_NOT_EXIST: &str = "post does not exist";

pub const INVALID_BASE64_PADDING: &str = "invalid base64 padding";
pub const BYTES_ARE_NOT_AN_IMAGE: &str = "bytes are not an image";
pub const INVALID_IMAGE: &str = "invalid image";
