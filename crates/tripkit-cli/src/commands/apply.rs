//! Apply command implementation.

use anyhow::{Context, Result};
use clap::Args;

use tripkit_core::Marketplace;

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Course id to apply for
    pub course_id: u64,
}

pub async fn run(args: ApplyArgs) -> Result<()> {
    let client = session::connect()?;

    let application = client
        .apply(args.course_id)
        .await
        .context("Failed to apply")?;

    output::success(&format!("Applied to course #{}", application.course_id));
    output::field("Application", &application.id.to_string());
    output::field(
        "Status",
        &format!("{:?}", application.status).to_lowercase(),
    );

    Ok(())
}
