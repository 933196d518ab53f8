//! Core tripkit types.
//!
//! These types enforce invariants at construction time,
//! ensuring invalid states are unrepresentable.

mod api_url;

pub use api_url::ApiUrl;
