//! Command-line driver for the photo catalog client
use anyhow::Context;
use clap::{Parser, Subcommand};
use photo_catalog::controller::{CatalogController, ControllerEvent};
use photo_catalog::{AppConfig, CatalogApi, CatalogService, PhotoType};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "photo-catalog", version, about = "Browse the photo-type catalog and upload photos")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Page through the catalog and print each entry
    List {
        /// Maximum number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Upload a photo for a photo type
    Upload {
        #[arg(long)]
        type_id: i64,
        /// Image file; any format the decoder understands, sent as JPEG
        #[arg(long)]
        image: PathBuf,
        /// Display name; defaults to UPLOAD_DISPLAY_NAME
        #[arg(long)]
        name: Option<String>,
    },
    /// Post a photo type record
    SendType {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        image_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let cli = Cli::parse();

    let config = AppConfig::from_env()?;
    info!(base_url = %config.base_url, "Configuration loaded");

    let service = Arc::new(CatalogService::from_config(&config)?);
    let controller = CatalogController::new(service.clone());
    spawn_event_logger(&controller);

    match cli.command {
        Command::List { pages } => {
            for _ in 0..pages {
                controller.load_next_page().await;
                if controller.state().is_last_page {
                    break;
                }
            }
            let state = controller.state();
            for entry in &state.entries {
                println!(
                    "{:>6}  {}  {}",
                    entry.id,
                    entry.name,
                    entry.image.as_deref().unwrap_or("-")
                );
            }
            info!(
                entries = state.entries.len(),
                next_page = state.current_page,
                is_last = state.is_last_page,
                "Listing finished"
            );
        }
        Command::Upload {
            type_id,
            image,
            name,
        } => {
            let decoded = image::open(&image)
                .with_context(|| format!("failed to read image {}", image.display()))?;
            let name = name.unwrap_or_else(|| config.upload_display_name.clone());

            controller
                .submit_upload(Some(decoded), &name, type_id)
                .await;

            let state = controller.state();
            println!("{}", state.upload_result_message.unwrap_or_default());
            if state.last_upload_succeeded != Some(true) {
                anyhow::bail!("upload failed");
            }
        }
        Command::SendType {
            id,
            name,
            image_url,
        } => {
            let photo_type = PhotoType {
                id,
                name,
                image: image_url,
            };
            service.send_photo_type(&photo_type).await?;
            println!("Photo type {} sent", photo_type.id);
        }
    }

    controller.shutdown();
    Ok(())
}

fn spawn_event_logger(controller: &CatalogController) {
    let mut events = controller.events();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ControllerEvent::PageFailed { page, error }) => {
                    warn!(page, %error, "Page could not be loaded");
                }
                Ok(event) => info!(?event, "Controller event"),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event logger lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });
}
