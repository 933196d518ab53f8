//! Token storage boundary.

use std::sync::RwLock;

use crate::tokens::{AccessToken, RefreshToken};

/// Storage for the session's credential pair.
///
/// Operations are synchronous and infallible; absence of a token is the
/// sentinel `None`, not an error. The session client is the only writer:
/// it overwrites the pair on login and refresh and clears it on logout or
/// terminal refresh failure.
pub trait TokenStore: Send + Sync {
    /// Returns the stored access token, if any.
    fn access_token(&self) -> Option<AccessToken>;

    /// Returns the stored refresh token, if any.
    fn refresh_token(&self) -> Option<RefreshToken>;

    /// Replace the stored credential pair.
    fn set_tokens(&self, access: AccessToken, refresh: Option<RefreshToken>);

    /// Remove both stored tokens.
    fn clear(&self);
}

/// In-memory token store.
///
/// The default store for library consumers that do not persist sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<StoredPair>,
}

#[derive(Debug, Default)]
struct StoredPair {
    access: Option<AccessToken>,
    refresh: Option<RefreshToken>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a credential pair.
    pub fn with_tokens(access: AccessToken, refresh: Option<RefreshToken>) -> Self {
        Self {
            tokens: RwLock::new(StoredPair {
                access: Some(access),
                refresh,
            }),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Option<AccessToken> {
        self.tokens.read().unwrap().access.clone()
    }

    fn refresh_token(&self) -> Option<RefreshToken> {
        self.tokens.read().unwrap().refresh.clone()
    }

    fn set_tokens(&self, access: AccessToken, refresh: Option<RefreshToken>) {
        let mut tokens = self.tokens.write().unwrap();
        tokens.access = Some(access);
        tokens.refresh = refresh;
    }

    fn clear(&self) {
        let mut tokens = self.tokens.write().unwrap();
        tokens.access = None;
        tokens.refresh = None;
    }
}
