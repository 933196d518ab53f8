//! Subcommand implementations.

pub mod applications;
pub mod apply;
pub mod course;
pub mod courses;
pub mod login;
pub mod logout;
pub mod refresh_token;
pub mod whoami;

use anyhow::Result;

use crate::cli::Commands;

pub async fn handle(command: Commands) -> Result<()> {
    match command {
        Commands::Login(args) => login::run(args).await,
        Commands::Logout(args) => logout::run(args).await,
        Commands::Whoami(args) => whoami::run(args).await,
        Commands::RefreshToken(args) => refresh_token::run(args).await,
        Commands::Courses(args) => courses::run(args).await,
        Commands::Course(args) => course::run(args).await,
        Commands::Apply(args) => apply::run(args).await,
        Commands::Applications(args) => applications::run(args).await,
    }
}
