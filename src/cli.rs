use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "stayops",
    version,
    about = "Schema migrations for the rental operations database",
    after_help = "Examples:\n  \
    stayops migrate status\n  \
    stayops migrate up\n  \
    stayops migrate up --to 20250301090400_create_property_contacts\n  \
    stayops migrate down --steps 2"
)]
pub struct Cli {
    /// Overrides `database_url` from stayops.toml / STAYOPS_DATABASE_URL
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect or move the schema along the migration chain
    Migrate {
        #[command(subcommand)]
        action: MigrateCmd,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum MigrateCmd {
    /// Apply pending migrations
    Up {
        /// Stop after this migration id
        #[arg(long = "to", value_name = "ID")]
        to: Option<String>,
    },
    /// Revert the most recently applied migrations
    Down {
        #[arg(long, default_value_t = 1)]
        steps: usize,
    },
    /// List every migration and whether it is applied
    Status,
    /// Clear a lock left behind by a crashed run
    Unlock,
}
