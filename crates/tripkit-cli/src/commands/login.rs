//! Login command implementation.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use tripkit_client::SessionClient;
use tripkit_core::{ApiUrl, Credentials};

use crate::output;
use crate::session::storage::FileTokenStore;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,

    /// API base URL
    #[arg(long, env = "TRIPKIT_API", default_value = "https://api.tripkit.io")]
    pub api: String,
}

pub async fn run(args: LoginArgs) -> Result<()> {
    let api = ApiUrl::new(&args.api).context("Invalid API URL")?;
    let credentials = Credentials::new(&args.email, &args.password);

    eprintln!("{}", "Logging in...".dimmed());

    // The file-backed store persists the returned tokens
    let store = FileTokenStore::create(api.clone()).context("Failed to prepare session storage")?;
    let client = SessionClient::new(api, Arc::new(store));

    let profile = client
        .login(credentials)
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("Email", &profile.email);
    output::field("Nickname", &profile.nickname);
    output::field("Role", &format!("{:?}", profile.role).to_lowercase());

    Ok(())
}
