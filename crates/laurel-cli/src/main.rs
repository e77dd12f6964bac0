//! Operator CLI for the award ledger: idempotent schema creation, status,
//! and the reporting reads that feed the external scoreboard and wiki
//! collaborators. The scan/rescan network loop is the outer driver and has
//! no entry point here.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use laurel_config::{load_layered_yaml, BotConfig};
use laurel_ledger::LedgerStore;

#[derive(Parser)]
#[command(name = "laurel")]
#[command(about = "Laurel award-bot operator CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ledger database commands
    Db {
        #[command(subcommand)]
        cmd: DbCmd,
    },

    /// Reporting reads over the award ledger
    Report {
        #[command(subcommand)]
        cmd: ReportCmd,
    },

    /// Configuration utilities
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },
}

#[derive(Subcommand)]
enum DbCmd {
    /// Create the awards and dispo_log tables if absent. Safe on every startup.
    Migrate {
        #[arg(long, default_value = "laurel.db")]
        database: String,
    },

    /// Connectivity + schema presence.
    Status {
        #[arg(long, default_value = "laurel.db")]
        database: String,
    },
}

#[derive(Subcommand)]
enum ReportCmd {
    /// Awards granted in one calendar month (half-open window on awarding time)
    Month {
        #[arg(long)]
        year: i32,

        #[arg(long)]
        month: u32,

        #[arg(long, default_value = "laurel.db")]
        database: String,
    },

    /// Awards received by one author
    Awardee {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "laurel.db")]
        database: String,
    },
}

#[derive(Subcommand)]
enum ConfigCmd {
    /// Compute the layered config hash + print canonical JSON
    Hash {
        /// Paths in merge order (base -> overrides)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Validate that the layered config matches the expected shape
    Check {
        /// Paths in merge order (base -> overrides)
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Db { cmd } => match cmd {
            DbCmd::Migrate { database } => {
                // `open` applies the idempotent schema on every connect.
                let store = LedgerStore::open(&database)
                    .await
                    .with_context(|| format!("open ledger db: {database}"))?;
                let status = store.status().await?;
                info!(database, "migrate complete");
                println!(
                    "ok={} awards_table={} dispo_log_table={}",
                    status.ok, status.has_awards_table, status.has_dispo_log_table
                );
            }
            DbCmd::Status { database } => {
                let store = LedgerStore::open(&database)
                    .await
                    .with_context(|| format!("open ledger db: {database}"))?;
                let status = store.status().await?;
                println!(
                    "ok={} awards_table={} dispo_log_table={}",
                    status.ok, status.has_awards_table, status.has_dispo_log_table
                );
            }
        },

        Commands::Report { cmd } => match cmd {
            ReportCmd::Month {
                year,
                month,
                database,
            } => {
                let store = LedgerStore::open(&database).await?;
                let awards = store.awards_by_month(year, month).await?;
                println!("{}", serde_json::to_string_pretty(&awards)?);
            }
            ReportCmd::Awardee { name, database } => {
                let store = LedgerStore::open(&database).await?;
                let awards = store.awards_by_awardee(&name).await?;
                println!("{}", serde_json::to_string_pretty(&awards)?);
            }
        },

        Commands::Config { cmd } => match cmd {
            ConfigCmd::Hash { paths } => {
                let path_refs: Vec<&str> = paths.iter().map(String::as_str).collect();
                let loaded = load_layered_yaml(&path_refs)?;
                println!("config_hash={}", loaded.config_hash);
                println!("{}", loaded.canonical_json);
            }
            ConfigCmd::Check { paths } => {
                let path_refs: Vec<&str> = paths.iter().map(String::as_str).collect();
                let loaded = load_layered_yaml(&path_refs)?;
                let cfg = BotConfig::from_loaded(&loaded)?;
                println!(
                    "ok account={} community={} tokens={} rescan_days={}",
                    cfg.account.username,
                    cfg.community,
                    cfg.tokens.len(),
                    cfg.days_to_rescan
                );
            }
        },
    }

    Ok(())
}
