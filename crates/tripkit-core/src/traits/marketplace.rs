//! Typed marketplace operations.

use async_trait::async_trait;

use crate::models::{Application, Course, CourseList, Profile};
use crate::Result;

/// The typed operations the marketplace API exposes to an authenticated
/// client.
///
/// Implementations own credential handling; callers never see tokens.
#[async_trait]
pub trait Marketplace: Send + Sync {
    /// Fetch the authenticated account's profile.
    async fn profile(&self) -> Result<Profile>;

    /// List published courses, optionally filtered by region.
    async fn list_courses(&self, region: Option<&str>, page: Option<u32>) -> Result<CourseList>;

    /// Fetch a single course by id.
    async fn get_course(&self, id: u64) -> Result<Course>;

    /// Apply for a course on behalf of the authenticated traveler.
    async fn apply(&self, course_id: u64) -> Result<Application>;

    /// List the authenticated traveler's applications.
    async fn my_applications(&self) -> Result<Vec<Application>>;
}
