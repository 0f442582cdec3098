//! Sync command implementation

use crate::cli::error::{CliError, CliResult};
use crate::cli::messages;
use clap::Args;
use stremio_addon_manager::core::sync::{SyncOutcome, SyncReport};
use stremio_addon_manager::AddonManagerService;

/// Push the protected and curated addons to managed accounts
#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Email of the account to sync
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub email: Option<String>,

    /// Sync every managed account
    #[arg(long)]
    pub all: bool,
}

pub async fn execute_sync(service: &AddonManagerService, args: SyncArgs) -> CliResult<()> {
    let orchestrator = service.sync();

    if let Some(email) = args.email {
        let report = orchestrator.sync_user(&email).await.map_err(|e| {
            eprintln!("{}", messages::error(&format!("Sync failed for {}: {}", email, e)));
            CliError::Service(e)
        })?;
        print_report(&report);
        return Ok(());
    }

    let results = orchestrator.sync_all().await?;
    let total = results.len();
    let mut failures = 0;

    for (index, result) in results.iter().enumerate() {
        match &result.report {
            Some(report) => print_report(report),
            None => {
                failures += 1;
                let reason = result.error.as_deref().unwrap_or("unknown error");
                eprintln!(
                    "{}",
                    messages::sync_failed(index + 1, total, &result.email, reason)
                );
            }
        }
    }

    println!(
        "{}",
        messages::info(&format!("Synced {} of {} users", total - failures, total))
    );

    if failures > 0 {
        return Err(CliError::SyncFailures(failures, total));
    }
    Ok(())
}

fn print_report(report: &SyncReport) {
    let summary = format!(
        "{}: pushed {} protected + {} curated addons",
        report.email, report.protected_count, report.local_count
    );
    match report.outcome {
        SyncOutcome::Complete => println!("{}", messages::ok(&summary)),
        SyncOutcome::Partial => {
            println!("{}", messages::warning(&format!("{} (partial)", summary)));
            for warning in &report.warnings {
                println!("    {}: {}", warning.stage, warning.message);
            }
        }
    }
    if !report.replaced.is_empty() {
        println!(
            "{}",
            messages::warning(&format!(
                "Removed from remote collection: {}",
                report.replaced.join(", ")
            ))
        );
    }
}
