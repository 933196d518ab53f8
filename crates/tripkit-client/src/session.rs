//! Session client with transparent token refresh.
//!
//! The client attaches the stored access token to every request. On a 401
//! it coordinates a single token refresh across all requests in flight:
//! the first 401 claims the refresh, later 401s queue behind it, and every
//! queued request observes the same outcome. Each original request is
//! re-issued at most once.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};

use tripkit_core::error::{AuthError, Error, InvalidInputError, RefreshError};
use tripkit_core::notify::{NoopSessionExpired, SessionExpired};
use tripkit_core::types::ApiUrl;
use tripkit_core::{
    AccessToken, Application, Course, CourseList, Credentials, Marketplace, Profile, RefreshToken,
    Result, TokenStore,
};

use crate::endpoints::{self, Envelope, LoginRequest, LoginResponse};
use crate::http::HttpClient;

/// Outcome of a refresh attempt, broadcast to every queued waiter.
type RefreshOutcome = std::result::Result<AccessToken, RefreshError>;

/// Session client for the marketplace API.
#[derive(Clone)]
pub struct SessionClient {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    http: HttpClient,
    store: Arc<dyn TokenStore>,
    on_expired: Arc<dyn SessionExpired>,
    refresh: Mutex<RefreshGate>,
}

/// Coordination state for the single-flight refresh.
///
/// `in_flight` is checked and set under the mutex with no await point in
/// between, so at most one refresh call exists at a time. Waiters are
/// drained in arrival order when the refresh settles.
struct RefreshGate {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// One outbound API call, kept in a re-issuable form so a request can be
/// retried with a fresh token after a refresh.
struct ApiCall<'a> {
    method: Method,
    path: &'a str,
    query: &'a [(&'a str, String)],
    body: Option<&'a Value>,
    headers: Option<&'a HeaderMap>,
}

impl SessionClient {
    /// Create a session client with no expiry notification.
    pub fn new(base: ApiUrl, store: Arc<dyn TokenStore>) -> Self {
        Self::with_expiry_hook(base, store, Arc::new(NoopSessionExpired))
    }

    /// Create a session client that invokes `on_expired` when a token
    /// refresh terminally fails.
    pub fn with_expiry_hook(
        base: ApiUrl,
        store: Arc<dyn TokenStore>,
        on_expired: Arc<dyn SessionExpired>,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                http: HttpClient::new(base),
                store,
                on_expired,
                refresh: Mutex::new(RefreshGate {
                    in_flight: false,
                    waiters: Vec::new(),
                }),
            }),
        }
    }

    /// Returns the API base URL.
    pub fn base(&self) -> &ApiUrl {
        self.inner.http.base()
    }

    /// Returns true if an access token is currently stored.
    pub fn is_authenticated(&self) -> bool {
        self.inner.store.access_token().is_some()
    }

    /// Create a session, storing the returned credential pair.
    #[instrument(skip(self, credentials), fields(api = %self.base()))]
    pub async fn login(&self, credentials: Credentials) -> Result<Profile> {
        info!("creating session");

        let request = LoginRequest {
            email: credentials.email(),
            password: credentials.password(),
        };
        let body = serde_json::to_value(&request).map_err(|e| InvalidInputError::Response {
            message: e.to_string(),
        })?;

        // Unauthenticated call: a 401 here means bad credentials, not an
        // expired token, so it must not enter the refresh path.
        let value = self
            .inner
            .http
            .send(Method::POST, endpoints::LOGIN, &[], Some(&body), None, None)
            .await?;
        let response: LoginResponse = unwrap_envelope(value)?;

        self.inner.store.set_tokens(
            AccessToken::new(response.access_token),
            Some(RefreshToken::new(response.refresh_token)),
        );

        Ok(response.user)
    }

    /// Terminate the session.
    ///
    /// The server call is best-effort; the local credential pair is
    /// cleared regardless.
    #[instrument(skip(self), fields(api = %self.base()))]
    pub async fn logout(&self) -> Result<()> {
        if let Some(token) = self.inner.store.access_token() {
            let result = self
                .inner
                .http
                .send(Method::POST, endpoints::LOGOUT, &[], None, None, Some(&token))
                .await;
            if let Err(e) = result {
                warn!(error = %e, "logout call failed, clearing local session anyway");
            }
        }

        self.inner.store.clear();
        Ok(())
    }

    /// Force a token refresh, joining any refresh already in flight.
    #[instrument(skip(self), fields(api = %self.base()))]
    pub async fn refresh_session(&self) -> Result<()> {
        self.refreshed_token()
            .await
            .map_err(AuthError::RefreshFailed)?;
        Ok(())
    }

    /// Issue an authenticated API request, returning the parsed response
    /// body unchanged.
    ///
    /// On a 401 the request joins the shared refresh cycle and is
    /// re-issued once with the fresh token; a second 401 surfaces as
    /// [`AuthError::Expired`]. All other errors pass through.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        headers: Option<&HeaderMap>,
    ) -> Result<Value> {
        self.execute(&ApiCall {
            method,
            path,
            query: &[],
            body,
            headers,
        })
        .await
    }

    async fn execute(&self, call: &ApiCall<'_>) -> Result<Value> {
        let token = self.inner.store.access_token();
        let first = self.send(call, token.as_ref()).await;

        match first {
            Err(Error::Api(e)) if e.is_auth_error() => {
                debug!(path = call.path, "401 received, entering refresh cycle");
                let fresh = self
                    .refreshed_token()
                    .await
                    .map_err(AuthError::RefreshFailed)?;

                let second = self.send(call, Some(&fresh)).await;
                match second {
                    // Already retried once: a repeat 401 is terminal.
                    Err(Error::Api(e)) if e.is_auth_error() => Err(AuthError::Expired.into()),
                    other => other,
                }
            }
            other => other,
        }
    }

    async fn send(&self, call: &ApiCall<'_>, token: Option<&AccessToken>) -> Result<Value> {
        self.inner
            .http
            .send(
                call.method.clone(),
                call.path,
                call.query,
                call.body,
                call.headers,
                token,
            )
            .await
    }

    /// Obtain a fresh access token, joining the in-flight refresh if one
    /// exists.
    async fn refreshed_token(&self) -> RefreshOutcome {
        // Flag check-and-set is atomic: no await between observing
        // in_flight and claiming leadership.
        let rx = {
            let mut gate = self.inner.refresh.lock().unwrap();
            if gate.in_flight {
                let (tx, rx) = oneshot::channel();
                gate.waiters.push(tx);
                Some(rx)
            } else {
                gate.in_flight = true;
                None
            }
        };

        match rx {
            Some(rx) => {
                debug!("queued behind in-flight refresh");
                rx.await.unwrap_or(Err(RefreshError::Aborted))
            }
            None => self.lead_refresh().await,
        }
    }

    /// Perform the single refresh call and drain the waiter queue with
    /// its outcome.
    async fn lead_refresh(&self) -> RefreshOutcome {
        info!("refreshing session");

        // The guard drains waiters and resets the flag even if this
        // future is dropped mid-refresh.
        let guard = DrainGuard::new(&self.inner);
        let outcome = self.perform_refresh().await;
        guard.settle(&outcome);

        if let Err(ref e) = outcome {
            warn!(error = %e, "session refresh failed, terminating session");
            self.inner.store.clear();
            self.inner.on_expired.on_session_expired();
        }

        outcome
    }

    async fn perform_refresh(&self) -> RefreshOutcome {
        let refresh_token = self
            .inner
            .store
            .refresh_token()
            .ok_or(RefreshError::MissingToken)?;

        let refreshed = self.inner.http.refresh(&refresh_token).await?;

        let access = AccessToken::new(refreshed.access_token);
        // Keep the previous refresh token if the server did not rotate it
        let rotated = refreshed
            .refresh_token
            .map(RefreshToken::new)
            .or(Some(refresh_token));
        self.inner.store.set_tokens(access.clone(), rotated);

        debug!("session refreshed");
        Ok(access)
    }

    async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let value = self
            .execute(&ApiCall {
                method: Method::GET,
                path,
                query,
                body: None,
                headers: None,
            })
            .await?;
        unwrap_envelope(value)
    }

    async fn post_data<T: DeserializeOwned>(&self, path: &str, body: Option<&Value>) -> Result<T> {
        let value = self
            .execute(&ApiCall {
                method: Method::POST,
                path,
                query: &[],
                body,
                headers: None,
            })
            .await?;
        unwrap_envelope(value)
    }
}

/// Resets the refresh flag and drains waiters on every exit path of a
/// refresh attempt.
struct DrainGuard<'a> {
    inner: &'a SessionInner,
    settled: bool,
}

impl<'a> DrainGuard<'a> {
    fn new(inner: &'a SessionInner) -> Self {
        Self {
            inner,
            settled: false,
        }
    }

    /// Drain the queue with the refresh outcome, in arrival order.
    fn settle(mut self, outcome: &RefreshOutcome) {
        self.settled = true;
        for waiter in take_waiters(self.inner) {
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        // Leader dropped before settling: waiters must not hang.
        for waiter in take_waiters(self.inner) {
            let _ = waiter.send(Err(RefreshError::Aborted));
        }
    }
}

/// Take the waiter list and reset the in-flight flag in one locked
/// section, so a new 401 can start a fresh cycle immediately after.
fn take_waiters(inner: &SessionInner) -> Vec<oneshot::Sender<RefreshOutcome>> {
    let mut gate = inner.refresh.lock().unwrap();
    gate.in_flight = false;
    std::mem::take(&mut gate.waiters)
}

fn unwrap_envelope<T: DeserializeOwned>(value: Value) -> Result<T> {
    let envelope: Envelope<T> =
        serde_json::from_value(value).map_err(|e| InvalidInputError::Response {
            message: e.to_string(),
        })?;
    Ok(envelope.data)
}

#[async_trait]
impl Marketplace for SessionClient {
    #[instrument(skip(self), fields(api = %self.base()))]
    async fn profile(&self) -> Result<Profile> {
        debug!("fetching profile");
        self.get_data(endpoints::PROFILE, &[]).await
    }

    #[instrument(skip(self), fields(api = %self.base()))]
    async fn list_courses(&self, region: Option<&str>, page: Option<u32>) -> Result<CourseList> {
        debug!("listing courses");
        let mut query = Vec::new();
        if let Some(region) = region {
            query.push(("region", region.to_string()));
        }
        if let Some(page) = page {
            query.push(("page", page.to_string()));
        }
        self.get_data(endpoints::COURSES, &query).await
    }

    #[instrument(skip(self), fields(api = %self.base()))]
    async fn get_course(&self, id: u64) -> Result<Course> {
        debug!("fetching course");
        self.get_data(&endpoints::course(id), &[]).await
    }

    #[instrument(skip(self), fields(api = %self.base()))]
    async fn apply(&self, course_id: u64) -> Result<Application> {
        debug!("applying to course");
        self.post_data(&endpoints::course_applications(course_id), None)
            .await
    }

    #[instrument(skip(self), fields(api = %self.base()))]
    async fn my_applications(&self) -> Result<Vec<Application>> {
        debug!("listing applications");
        self.get_data(endpoints::MY_APPLICATIONS, &[]).await
    }
}

impl std::fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("api", self.base())
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
