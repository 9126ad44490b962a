use crate::app_config::AppConfig;
use crate::command_input::read_commands;
use crate::domain::events::Event;
use crate::journal::{HttpJournal, JournalRepository};
use crate::map::{GeoJsonMapLibrary, MapLibrary};
use crate::view::MapView;
use crate::view_listener::view_listener;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task;
use tracing::info;

mod app_config;
mod clustering;
mod command_input;
mod domain;
mod extensions;
mod journal;
mod map;
mod view;
mod view_listener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    info!("🪵 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load()?;
    info!(threshold_deg = config.map().proximity_threshold_deg(), "✅  Loaded configuration");

    let journal_client = journal::authenticated_client(config.journal().api_key())?;
    let journal: Arc<dyn JournalRepository> = Arc::new(HttpJournal::new(journal_client, &config));
    // Tile requests must not carry the journal API key
    let library: Arc<dyn MapLibrary> = Arc::new(GeoJsonMapLibrary::new(reqwest::Client::new(), &config));

    let (tx, rx) = mpsc::channel::<Event>(config.core().event_buffer_size());
    let mut view = MapView::new(rx, tx.clone(), journal, library, &config);
    let notifier_rx = view.notifier();

    task::spawn(async move {
        view_listener(notifier_rx).await;
    });
    info!("✅  Initialized view listener");

    let view_task = task::spawn(async move {
        view.listen().await;
    });
    info!("✅  Initialized map view");

    tx.send(Event::MountMap).await?;
    tx.send(Event::Reload).await?;

    info!("🔥 {} is up and running", env!("CARGO_PKG_NAME"));
    task::spawn(read_commands(tx));

    view_task.await?;

    Ok(())
}
