//! API endpoint paths and wire types.

use serde::{Deserialize, Serialize};

use tripkit_core::Profile;

/// Endpoint for session creation.
pub const LOGIN: &str = "auth/login";

/// Endpoint for token refresh.
pub const REFRESH: &str = "auth/refresh";

/// Endpoint for session termination.
pub const LOGOUT: &str = "auth/logout";

/// Endpoint for the authenticated profile.
pub const PROFILE: &str = "users/me";

/// Endpoint for course listing.
pub const COURSES: &str = "courses";

/// Endpoint for the authenticated traveler's applications.
pub const MY_APPLICATIONS: &str = "users/me/applications";

/// Endpoint for a single course.
pub fn course(id: u64) -> String {
    format!("courses/{id}")
}

/// Endpoint for applying to a course.
pub fn course_applications(id: u64) -> String {
    format!("courses/{id}/applications")
}

/// Success envelope wrapping every API response body.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Error body shape returned by the API on failure.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: Option<String>,
    pub message: Option<String>,
}

/// Request body for login.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response data from login.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: Profile,
}

/// Request body for token refresh.
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Response data from token refresh.
///
/// The server may omit `refresh_token` when it does not rotate it.
#[derive(Debug, Deserialize)]
pub struct RefreshedTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}
