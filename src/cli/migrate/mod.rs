//! Migrate command - manages the PostgreSQL schema

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::storage::{
    create_pool, revert_last_migration, run_migrations, PostgresConfig,
};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Revert the most recently applied migration instead
    #[arg(long)]
    pub revert: bool,

    /// Database URL, overriding `storage.database_url`
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

/// Apply pending migrations, or revert the latest one
pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging);

    let url = args
        .database_url
        .unwrap_or_else(|| config.storage.database_url.clone());
    let pool = create_pool(&PostgresConfig::new(url).with_max_connections(1)).await?;

    if args.revert {
        match revert_last_migration(&pool).await? {
            Some(version) => info!(version, "Reverted migration"),
            None => info!("No migrations to revert"),
        }
    } else {
        let applied = run_migrations(&pool).await?;
        info!(applied, "Migrations complete");
    }

    pool.close().await;
    Ok(())
}
