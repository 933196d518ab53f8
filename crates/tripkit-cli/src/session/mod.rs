//! Session persistence and client construction for the CLI.

pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};

use tripkit_client::SessionClient;

use crate::output;
use storage::FileTokenStore;

/// Build a session client from the stored session.
///
/// Refreshed tokens are written back to disk by the file-backed store, so
/// a refresh triggered by any command survives to the next invocation.
pub fn connect() -> Result<SessionClient> {
    let store = FileTokenStore::load()
        .context("Failed to load session")?
        .context("No active session. Run 'tripkit login' first.")?;

    let api = store.api().clone();
    Ok(SessionClient::with_expiry_hook(
        api,
        Arc::new(store),
        Arc::new(|| {
            output::error("Session expired. Run 'tripkit login' again.");
        }),
    ))
}
