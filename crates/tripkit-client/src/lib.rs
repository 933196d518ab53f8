//! tripkit-client - HTTP session client for the tripkit marketplace API.
//!
//! Wraps outbound HTTP calls, injects bearer credentials, and keeps the
//! access token valid transparently to callers: a 401 triggers a
//! single-flight token refresh shared by every request in flight, with
//! exactly one retry of each original request.

mod endpoints;
mod http;
mod session;

pub use session::SessionClient;

pub use reqwest::Method;
pub use reqwest::header::HeaderMap;
