use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod reconcile;
mod report;
mod shops_cmd;

#[derive(Debug, Parser)]
#[command(name = "shopintel")]
#[command(about = "Shop SEM/traffic analytics reconciliation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage the tracked-shop catalog
    Shops {
        #[command(subcommand)]
        command: ShopsCommands,
    },
    /// Run a reconciliation pass over shops with missing metrics
    Reconcile {
        /// Restrict the pass to a single shop (by domain)
        #[arg(long)]
        domain: Option<String>,

        /// Preview which shops would be processed without opening a browser
        #[arg(long)]
        dry_run: bool,

        /// Process at most this many shops
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show the status breakdown and recent runs
    Report {
        /// Show the per-shop results of one run instead
        #[arg(long)]
        run: Option<i64>,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum ShopsCommands {
    /// Seed the catalog from the shops YAML file
    Seed {
        /// Override the configured shops file path
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// List tracked shops
    List,
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = shopintel_core::load_app_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let pool = shopintel_db::connect_pool(
        &config.database_url,
        shopintel_db::PoolConfig::from_app_config(&config),
    )
    .await?;

    match cli.command {
        Commands::Shops { command } => match command {
            ShopsCommands::Seed { file } => {
                shops_cmd::run_shops_seed(&pool, &config, file).await?;
            }
            ShopsCommands::List => shops_cmd::run_shops_list(&pool).await?,
        },
        Commands::Reconcile {
            domain,
            dry_run,
            limit,
        } => {
            reconcile::run_reconcile(&pool, &config, domain.as_deref(), dry_run, limit).await?;
        }
        Commands::Report { run } => report::run_report(&pool, run).await?,
        Commands::Db { command } => match command {
            DbCommands::Migrate => {
                let applied = shopintel_db::run_migrations(&pool).await?;
                println!("applied {applied} migrations");
            }
        },
    }

    Ok(())
}

/// Mark a collection run failed on a best-effort basis; an error here must
/// not mask the error that sank the run.
pub(crate) async fn fail_run_best_effort(
    pool: &sqlx::PgPool,
    run_id: i64,
    run_type: &str,
    message: String,
) {
    if let Err(e) = shopintel_db::fail_collection_run(pool, run_id, &message).await {
        tracing::error!(
            run_id,
            run_type,
            error = %e,
            "failed to mark collection run as failed"
        );
    }
}
