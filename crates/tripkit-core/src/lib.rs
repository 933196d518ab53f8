//! tripkit-core - Core types and traits for the tripkit marketplace client.

pub mod credentials;
pub mod error;
pub mod models;
pub mod notify;
pub mod store;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::Credentials;
pub use error::Error;
pub use models::{
    Application, ApplicationStatus, Course, CourseList, CourseSummary, Organizer, Profile, Role,
};
pub use notify::SessionExpired;
pub use store::{MemoryTokenStore, TokenStore};
pub use tokens::{AccessToken, RefreshToken};
pub use traits::Marketplace;
pub use types::ApiUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
