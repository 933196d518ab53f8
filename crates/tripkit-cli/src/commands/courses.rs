//! Course listing command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use tripkit_core::Marketplace;

use crate::session;

#[derive(Args, Debug)]
pub struct CoursesArgs {
    /// Filter by region
    #[arg(long)]
    pub region: Option<String>,

    /// Page number
    #[arg(long)]
    pub page: Option<u32>,
}

pub async fn run(args: CoursesArgs) -> Result<()> {
    let client = session::connect()?;

    let list = client
        .list_courses(args.region.as_deref(), args.page)
        .await
        .context("Failed to list courses")?;

    if list.courses.is_empty() {
        println!("{}", "No courses found.".dimmed());
        return Ok(());
    }

    for course in &list.courses {
        println!(
            "{}  {} ({}, {} → {})",
            format!("#{}", course.id).cyan(),
            course.title,
            course.region,
            course.start_date,
            course.end_date
        );
    }

    if let Some(next) = list.next_page {
        println!();
        println!("{}", format!("More results: --page {next}").dimmed());
    }

    Ok(())
}
