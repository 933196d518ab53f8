//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use tripkit_core::Marketplace;

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub async fn run(_args: WhoamiArgs) -> Result<()> {
    let client = session::connect()?;

    let profile = client.profile().await.context("Failed to fetch profile")?;

    output::field("Email", &profile.email);
    output::field("Nickname", &profile.nickname);
    output::field("Role", &format!("{:?}", profile.role).to_lowercase());

    Ok(())
}
