//! Managed user commands

use crate::cli::error::CliResult;
use crate::cli::messages;
use clap::{Args, Subcommand};
use stremio_addon_manager::AddonManagerService;

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List managed users and their last sync time
    List,

    /// Add a user after checking the credentials with Stremio
    Add {
        email: String,

        #[arg(long, env = "ADDON_MANAGER_USER_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Stop managing a user
    Remove { email: String },
}

pub async fn execute_users(service: &AddonManagerService, args: UsersArgs) -> CliResult<()> {
    let registry = service.users();

    match args.command {
        UsersCommand::List => {
            let users = registry.list().await?;
            if users.is_empty() {
                println!("{}", messages::info("No managed users"));
            }
            for user in users {
                let last_sync = user
                    .last_sync
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "never".to_string());
                println!("{:<40} {}", user.email, last_sync);
            }
        }
        UsersCommand::Add { email, password } => {
            registry.add(&email, &password).await?;
            println!("{}", messages::ok(&format!("Added {}", email)));
        }
        UsersCommand::Remove { email } => {
            registry.remove(&email).await?;
            println!("{}", messages::ok(&format!("Removed {}", email)));
        }
    }

    Ok(())
}
