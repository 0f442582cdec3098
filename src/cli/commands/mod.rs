//! Command modules for CLI

pub mod addons;
pub mod serve;
pub mod sync;
pub mod users;

use clap::Subcommand;

#[derive(Debug, Subcommand)]
#[command(about = "Addon manager commands")]
pub enum Commands {
    /// Run the HTTP server
    #[command(about = "Serve the admin API and addon index")]
    Serve(serve::ServeArgs),

    /// Sync one or all managed users
    #[command(about = "Push the addon collection to managed Stremio accounts")]
    Sync(sync::SyncArgs),

    /// Manage the curated addon list
    #[command(about = "List, add, remove, import or export curated addons")]
    Addons(addons::AddonsArgs),

    /// Manage Stremio accounts
    #[command(about = "List, add or remove managed Stremio accounts")]
    Users(users::UsersArgs),
}
