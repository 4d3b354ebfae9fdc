use adapter::{
    database::{connect_database_with, migrate},
    loader::{parse_keys, parse_products},
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use registry::AppRegistry;
use shared::config::AppConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// 商品とライセンスキーを区切り文字 `|` のテキストファイルから一括登録する
#[derive(Debug, Parser)]
#[command(name = "seed", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// name|description|price
    Products { file: PathBuf },
    /// product_id|key
    Keys { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let app_config = AppConfig::new()?;
    let pool = connect_database_with(&app_config.database);
    migrate(&pool)
        .await
        .context("failed to apply database migrations")?;
    let registry = AppRegistry::new(pool, &app_config);
    let seeder = registry.seed_repository();

    match cli.command {
        Command::Products { file } => {
            let input = read(&file)?;
            let products = parse_products(&input)?;
            let parsed = products.len();
            let inserted = seeder.load_products(products).await?;
            tracing::info!(parsed, inserted, file = %file.display(), "products loaded");
        }
        Command::Keys { file } => {
            let input = read(&file)?;
            let keys = parse_keys(&input)?;
            let parsed = keys.len();
            let inserted = seeder.load_keys(keys).await?;
            tracing::info!(parsed, inserted, file = %file.display(), "keys loaded");
        }
    }

    Ok(())
}

fn read(file: &PathBuf) -> Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
}
