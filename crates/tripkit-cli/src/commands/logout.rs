//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs) -> Result<()> {
    let client = session::connect()?;

    client.logout().await.context("Failed to logout")?;

    output::success("Logged out");
    Ok(())
}
