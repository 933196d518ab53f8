//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::{
    applications, apply, course, courses, login, logout, refresh_token, whoami,
};

/// CLI for the tripkit travel marketplace.
#[derive(Parser, Debug)]
#[command(name = "tripkit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a session (login)
    Login(login::LoginArgs),

    /// Terminate the session
    Logout(logout::LogoutArgs),

    /// Display the authenticated profile
    Whoami(whoami::WhoamiArgs),

    /// Refresh the session tokens
    RefreshToken(refresh_token::RefreshTokenArgs),

    /// List published courses
    Courses(courses::CoursesArgs),

    /// Show a single course
    Course(course::CourseArgs),

    /// Apply for a course
    Apply(apply::ApplyArgs),

    /// List your applications
    Applications(applications::ApplicationsArgs),
}
