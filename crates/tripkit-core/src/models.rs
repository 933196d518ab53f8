//! Wire models for the marketplace API.
//!
//! Every success body from the API arrives wrapped in a `{ "data": ... }`
//! envelope; these are the shapes inside it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Account role on the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A traveler booking courses.
    User,
    /// A trip organizer publishing courses.
    Influencer,
    /// A platform operator.
    Admin,
}

/// The authenticated account's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: u64,
    pub email: String,
    pub nickname: String,
    pub role: Role,
}

/// A course as it appears in list responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseSummary {
    pub id: u64,
    pub title: String,
    pub region: String,
    /// Price in the platform's minor currency unit.
    pub price: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A page of course summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseList {
    pub courses: Vec<CourseSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<u32>,
}

/// The organizer shown on a course detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organizer {
    pub id: u64,
    pub nickname: String,
}

/// Full course detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub region: String,
    pub price: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub capacity: u32,
    pub organizer: Organizer,
}

/// Lifecycle state of a booking application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

/// A traveler's application for a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: u64,
    pub course_id: u64,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}
