use anyhow::Result;
use clap::{Parser, Subcommand};
use photosync::{BackupCoordinator, RestoreCoordinator};
use photosync_core::{CatalogClient, CatalogStore, OauthTokenProvider, PhotosLibraryClient};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "photosync")]
#[command(about = "Back up local media to a managed photo library and restore it")]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan all photo sources and upload new media
    Backup,
    /// Rebuild catalog rows or local files from the remote library
    Restore {
        #[command(subcommand)]
        target: RestoreTarget,
    },
    /// Register a local directory as a photo source
    AddSource {
        /// Directory to scan for media
        path: PathBuf,
    },
    /// Print the OAuth consent URL for granting offline access
    Authenticate,
}

#[derive(Subcommand)]
enum RestoreTarget {
    /// Recreate missing albums and media item rows in the catalog
    Database,
    /// Download media files that are missing on disk
    Downloads {
        /// Directory to restore files into
        dirpath: PathBuf,
        /// Restore only items from this catalog album
        #[arg(long)]
        album_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Backup => {
            let catalog = CatalogClient::new(&config.catalog_url)?;
            let remote = remote_client(&config)?;

            let coordinator = BackupCoordinator::new(&catalog, &remote);
            let report = coordinator.run().await?;

            let unresolved = report.unresolved();
            println!(
                "Backup finished: {} item(s) processed, {} unresolved",
                report.processed.len(),
                unresolved.len()
            );
            if !unresolved.is_empty() {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Restore { target } => {
            let catalog = CatalogClient::new(&config.catalog_url)?;
            let remote = remote_client(&config)?;
            let coordinator = RestoreCoordinator::new(&catalog, &remote);

            match target {
                RestoreTarget::Database => {
                    info!("Restoring catalog from the remote library");
                    coordinator.restore_catalog().await?;
                    println!("Catalog restore finished");
                }
                RestoreTarget::Downloads { dirpath, album_id } => {
                    info!("Restoring downloads into {}", dirpath.display());
                    coordinator
                        .restore_downloads(&dirpath, album_id.as_deref())
                        .await?;
                    println!("Download restore finished");
                }
            }
            Ok(())
        }
        Commands::AddSource { path } => {
            let catalog = CatalogClient::new(&config.catalog_url)?;
            let path = tokio::fs::canonicalize(&path).await?;
            let uri = format!("file://{}", path.display());

            let source = catalog.create_photo_source(&uri).await?;
            println!("Registered photo source {} ({})", source.uri, source.id);
            Ok(())
        }
        Commands::Authenticate => {
            let url = OauthTokenProvider::consent_url(
                &config.google.auth_endpoint,
                &config.google.client_id,
                &config.google.redirect_uri,
                &config.google.scope,
            );
            println!("Visit this URL to authorize access:");
            println!("{url}");
            Ok(())
        }
    }
}

fn remote_client(config: &Config) -> Result<PhotosLibraryClient> {
    let tokens = OauthTokenProvider::new(
        &config.google.token_endpoint,
        &config.google.client_id,
        &config.google.client_secret,
        &config.google.refresh_token,
    );
    Ok(PhotosLibraryClient::new(
        &config.google.api_base,
        Arc::new(tokens),
    )?)
}
