use clap::Parser;
use mimalloc::MiMalloc;
use stayops::cli::{Cli, Commands, MigrateCmd};
use stayops::config::Config;
use stayops::migrate::{MigrationReport, StepOutcome};
use stayops::{Migrator, StayError};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut cfg = Config::load().map_err(StayError::from)?;
    if let Some(url) = cli.database_url {
        cfg.database_url = url;
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(database_url = %cfg.database_url, loglevel = %cfg.loglevel);

    let pool = stayops::db::connect(&cfg).await?;
    let migrator = Migrator::new(pool.clone()).with_lock_holder(cfg.lock_holder.clone());

    let Commands::Migrate { action } = cli.command;
    match action {
        MigrateCmd::Status => {
            for step in migrator.status().await? {
                let state = match step.applied_at {
                    Some(at) => format!("applied {}", at.to_rfc3339()),
                    None => "pending".to_string(),
                };
                let marker = if step.reversible { "" } else { " (irreversible)" };
                println!("{:<52} {}{}", step.id, state, marker);
            }
        }
        MigrateCmd::Up { to } => {
            let report = migrator.up(to.as_deref()).await?;
            print_report(&report);
        }
        MigrateCmd::Down { steps } => {
            let report = migrator.down(steps).await?;
            print_report(&report);
        }
        MigrateCmd::Unlock => {
            if migrator.force_unlock().await? {
                println!("migration lock cleared");
            } else {
                println!("no migration lock held");
            }
        }
    }

    pool.close().await;
    Ok(())
}

fn print_report(report: &MigrationReport) {
    if report.is_empty() {
        println!("nothing to do");
        return;
    }
    for step in &report.steps {
        let verb = match &step.outcome {
            StepOutcome::Applied => "applied",
            StepOutcome::Reverted => "reverted",
            StepOutcome::Irreversible { .. } => "unrecorded",
        };
        println!("{verb:<10} {} ({} ms)", step.id, step.elapsed.as_millis());
    }
    for step in report.irreversible() {
        if let StepOutcome::Irreversible { reason } = step.outcome {
            warn!(id = step.id, "manual intervention required: {reason}");
        }
    }
}
