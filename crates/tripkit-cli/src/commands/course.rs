//! Course detail command implementation.

use anyhow::{Context, Result};
use clap::Args;

use tripkit_core::Marketplace;

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct CourseArgs {
    /// Course id
    pub id: u64,

    /// Output raw JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: CourseArgs) -> Result<()> {
    let client = session::connect()?;

    let course = client
        .get_course(args.id)
        .await
        .context("Failed to fetch course")?;

    if args.json {
        return output::json_pretty(&course);
    }

    output::field("Title", &course.title);
    output::field("Region", &course.region);
    output::field(
        "Dates",
        &format!("{} → {}", course.start_date, course.end_date),
    );
    output::field("Price", &course.price.to_string());
    output::field("Capacity", &course.capacity.to_string());
    output::field("Organizer", &course.organizer.nickname);
    println!();
    println!("{}", course.description);

    Ok(())
}
