//! Applications listing command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use tripkit_core::Marketplace;

use crate::session;

#[derive(Args, Debug)]
pub struct ApplicationsArgs {}

pub async fn run(_args: ApplicationsArgs) -> Result<()> {
    let client = session::connect()?;

    let applications = client
        .my_applications()
        .await
        .context("Failed to list applications")?;

    if applications.is_empty() {
        println!("{}", "No applications yet.".dimmed());
        return Ok(());
    }

    for application in &applications {
        println!(
            "{}  course #{}  {}  ({})",
            format!("#{}", application.id).cyan(),
            application.course_id,
            format!("{:?}", application.status).to_lowercase(),
            application.applied_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}
