//! Route paths.

pub const GET_HEALTH: &str = "/health";
pub const GET_AUTH_GOOGLE_URL: &str = "/auth/google/url";
pub const AUTH_GOOGLE_LOGIN: &str = "/auth/google/login";
pub const POST_AUTH_REFRESH: &str = "/auth/refresh";
pub const POST_AUTH_LOGOUT: &str = "/auth/logout";
pub const GET_AUTH_ME: &str = "/auth/me";
