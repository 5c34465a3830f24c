/// Versioned prefix for every route.
pub const API_PREFIX: &str = "/api/v0";
