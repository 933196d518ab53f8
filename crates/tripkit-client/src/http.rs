//! HTTP transport for the marketplace API.

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, instrument, trace};

use tripkit_core::error::{ApiError, Error, InvalidInputError, RefreshError, TransportError};
use tripkit_core::types::ApiUrl;
use tripkit_core::{AccessToken, RefreshToken};

use crate::endpoints::{self, ApiErrorResponse, Envelope, RefreshRequest, RefreshedTokens};

/// Thin wrapper over [`reqwest::Client`] for marketplace API calls.
#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    client: reqwest::Client,
    base: ApiUrl,
}

impl HttpClient {
    /// Create a new HTTP client for the given API base URL.
    pub(crate) fn new(base: ApiUrl) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tripkit/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client");

        Self { client, base }
    }

    /// Returns the API base URL this client is configured for.
    pub(crate) fn base(&self) -> &ApiUrl {
        &self.base
    }

    /// Issue a single API request and parse the response body as JSON.
    ///
    /// An empty success body parses as `Value::Null`. Non-2xx responses
    /// become [`Error::Api`]; 401 is not special at this layer.
    #[instrument(skip(self, body, headers, token), fields(api = %self.base))]
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        headers: Option<&HeaderMap>,
        token: Option<&AccessToken>,
    ) -> Result<Value, Error> {
        let url = self.base.endpoint_url(path);
        debug!(%method, path, authed = token.is_some(), "API request");
        trace!(?query, "query parameters");

        let mut request = self.client.request(method, &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(extra) = headers {
            request = request.headers(extra.clone());
        }
        if let Some(token) = token {
            request = request.headers(self.auth_headers(token.as_str()));
        }

        let response = request.send().await.map_err(transport)?;
        self.handle_response(response).await
    }

    /// Exchange a refresh token for new session tokens.
    ///
    /// Any failure, transport or otherwise, collapses into
    /// [`RefreshError`]: the caller treats them all as an authentication
    /// rejection.
    #[instrument(skip(self, refresh_token), fields(api = %self.base))]
    pub(crate) async fn refresh(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<RefreshedTokens, RefreshError> {
        let url = self.base.endpoint_url(endpoints::REFRESH);
        debug!("token refresh request");

        let request = RefreshRequest {
            refresh_token: refresh_token.as_str(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RefreshError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RefreshError::Rejected {
                status: status.as_u16(),
            });
        }

        let envelope: Envelope<RefreshedTokens> =
            response
                .json()
                .await
                .map_err(|e| RefreshError::Transport {
                    message: format!("malformed refresh response: {e}"),
                })?;

        Ok(envelope.data)
    }

    /// Create authorization headers for authenticated requests.
    fn auth_headers(&self, token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", token);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value).expect("invalid token characters"),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    /// Handle an API response, parsing the body or error.
    async fn handle_response(&self, response: reqwest::Response) -> Result<Value, Error> {
        let status = response.status();
        trace!(status = %status, "API response");

        if status.is_success() {
            let bytes = response.bytes().await.map_err(transport)?;
            if bytes.is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_slice(&bytes).map_err(|e| {
                InvalidInputError::Response {
                    message: e.to_string(),
                }
                .into()
            })
        } else {
            let error = self.parse_error_response(response).await;
            Err(Error::Api(error))
        }
    }

    /// Parse an API error response.
    async fn parse_error_response(&self, response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();

        // Try to parse the API's error body shape
        match response.json::<ApiErrorResponse>().await {
            Ok(error_body) => ApiError::new(status, error_body.error, error_body.message),
            Err(_) => ApiError::new(status, None, None),
        }
    }
}

/// Map a reqwest error onto the transport taxonomy.
fn transport(err: reqwest::Error) -> Error {
    let inner = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let base = ApiUrl::new("https://api.tripkit.io").unwrap();
        let client = HttpClient::new(base.clone());
        assert_eq!(client.base().as_str(), base.as_str());
    }
}
