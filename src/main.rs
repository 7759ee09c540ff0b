use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod error;
mod models;
mod services;
mod utils;

use crate::error::AppError;
use crate::services::{catalog_service, relink_service, thumbnail_service};

#[derive(Parser)]
#[command(name = "catalog-tools", version, about = "Maintenance tools for a personal video-asset catalog")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rewrite catalog URLs from a dump of freshly uploaded share links
    Relink {
        /// Path to the share-link dump, one link per line
        #[arg(long, default_value = "temp.txt")]
        links: PathBuf,
        /// Path to the catalog JSON to update
        #[arg(long, default_value = "videos.json")]
        catalog: PathBuf,
        /// Write a .bak copy of the catalog before modifying it
        #[arg(long)]
        backup: bool,
    },
    /// Extract a midpoint preview frame for every video under a folder
    Thumbnails {
        /// Folder to scan recursively for video files
        folder: PathBuf,
        /// Directory the extracted frames go to
        #[arg(long, default_value = "thumbnails")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Relink {
            links,
            catalog,
            backup,
        } => run_relink(&links, &catalog, backup).await,
        Command::Thumbnails { folder, output } => run_thumbnails(&folder, &output).await,
    };

    if let Err(err) = result {
        error!("{:#}", err);
        std::process::exit(err.exit_code());
    }
}

async fn run_relink(links: &Path, catalog_path: &Path, backup: bool) -> Result<(), AppError> {
    if !links.exists() {
        return Err(AppError::MissingLinkDump(links.to_path_buf()));
    }
    if !catalog_path.exists() {
        return Err(AppError::MissingCatalog(catalog_path.to_path_buf()));
    }

    let dump = tokio::fs::read_to_string(links)
        .await
        .with_context(|| format!("failed to read {}", links.display()))?;
    let table = relink_service::build_link_table(&dump);
    if table.is_empty() {
        return Err(AppError::EmptyLinkTable(links.to_path_buf()));
    }

    let mut records = catalog_service::load_catalog(catalog_path).await?;

    if backup {
        let bak = catalog_service::write_backup(catalog_path, &records).await?;
        info!("backup written to {}", bak.display());
    }

    let summary = relink_service::reconcile(&mut records, &table);
    catalog_service::write_catalog(catalog_path, &records).await?;

    info!(
        "replaced {} URLs of {} non-thumbnail entries using {} dump entries",
        summary.updated,
        summary.eligible,
        table.len()
    );
    if summary.updated < summary.eligible {
        warn!("not every eligible entry had a matching dump link; the rest were left unchanged");
    }
    Ok(())
}

async fn run_thumbnails(folder: &Path, output: &Path) -> Result<(), AppError> {
    let summary = thumbnail_service::generate_thumbnails(folder, output).await?;
    info!(
        "done: {} thumbnails written to {} ({} failed)",
        summary.generated,
        output.display(),
        summary.failed
    );
    Ok(())
}
