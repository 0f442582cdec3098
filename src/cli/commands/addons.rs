//! Addon registry commands

use crate::cli::error::CliResult;
use crate::cli::messages;
use clap::{Args, Subcommand};
use std::path::PathBuf;
use stremio_addon_manager::{AddonEntry, AddonManagerService};

#[derive(Debug, Args)]
pub struct AddonsArgs {
    #[command(subcommand)]
    pub command: AddonsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AddonsCommand {
    /// List curated addons
    List {
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Fetch a manifest and add it
    Add {
        /// Manifest URL
        url: String,
    },

    /// Remove an addon by manifest id
    Remove {
        /// Manifest id
        id: String,
    },

    /// Write the registry as JSON
    Export {
        /// Output file (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Import entries from an exported JSON file
    Import {
        /// File produced by `addons export`
        file: PathBuf,
    },
}

pub async fn execute_addons(service: &AddonManagerService, args: AddonsArgs) -> CliResult<()> {
    let registry = service.addons();

    match args.command {
        AddonsCommand::List { json } => {
            let entries = registry.list().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("{}", messages::info("No addons in the registry"));
            } else {
                for entry in &entries {
                    println!(
                        "{:<40} {:<10} {}",
                        entry.id(),
                        entry.manifest.version(),
                        entry.transport_url
                    );
                }
            }
        }
        AddonsCommand::Add { url } => {
            let entry = registry.add(&url).await?;
            println!(
                "{}",
                messages::ok(&format!("Added {} ({})", entry.manifest.name(), entry.id()))
            );
        }
        AddonsCommand::Remove { id } => {
            registry.remove(&id).await?;
            println!("{}", messages::ok(&format!("Removed {}", id)));
        }
        AddonsCommand::Export { output } => {
            let json = serde_json::to_string_pretty(&registry.export().await?)?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, json).await?;
                    println!(
                        "{}",
                        messages::ok(&format!("Exported to {}", path.display()))
                    );
                }
                None => println!("{}", json),
            }
        }
        AddonsCommand::Import { file } => {
            let raw = tokio::fs::read_to_string(&file).await?;
            let entries: Vec<AddonEntry> = serde_json::from_str(&raw)?;
            let summary = registry.import(entries).await?;
            println!(
                "{}",
                messages::ok(&format!(
                    "Imported {} addons ({} failed, {} duplicates)",
                    summary.success, summary.failed, summary.duplicates
                ))
            );
        }
    }

    Ok(())
}
