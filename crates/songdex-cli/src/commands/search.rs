use anyhow::{Context, Result};
use songdex_worker::Config;
use tokio::sync::oneshot;

use crate::tui::{self, SearchResources};

/// Start the interactive search screen.
///
/// The worker and the catalog fetch are started on the runtime first; the
/// screen then runs on a blocking thread and picks both up as they become
/// ready.
pub async fn run_search(config: Config) -> Result<()> {
    let worker = match songdex_worker::spawn() {
        Ok(worker) => Some(worker),
        Err(e) => {
            log::error!("Could not start search worker: {}", e);
            None
        }
    };

    let (catalog_tx, catalog_rx) = oneshot::channel();
    let source = config.catalog_source();
    let retries = config.fetch_retries;
    log::info!("Loading catalog from {}", source);
    tokio::spawn(async move {
        let result = source.fetch(retries).await;
        if catalog_tx.send(result).is_err() {
            log::debug!("Search screen closed before the catalog arrived");
        }
    });

    let resources = SearchResources {
        worker,
        catalog: catalog_rx,
    };
    tokio::task::spawn_blocking(move || tui::run_tui(&config, resources))
        .await
        .context("Search screen panicked")?
}
