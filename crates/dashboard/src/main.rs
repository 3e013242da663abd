use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;

use solestock_dashboard::{BoardReport, DashboardSession, sample_inventory, sample_listings};
use solestock_events::{InMemoryEventBus, Notification};
use solestock_infra::{CatalogService, DashboardConfig, InMemoryRecordSource, load_records};

fn main() -> anyhow::Result<()> {
    let config = DashboardConfig::from_env().context("invalid dashboard configuration")?;
    solestock_observability::init(&config.log);

    let inventory = match &config.inventory_path {
        Some(path) => load_records(path)
            .with_context(|| format!("loading inventory from {}", path.display()))?,
        None => sample_inventory().context("loading bundled inventory")?,
    };
    let listings = match &config.listings_path {
        Some(path) => load_records(path)
            .with_context(|| format!("loading listings from {}", path.display()))?,
        None => sample_listings().context("loading bundled listings")?,
    };
    tracing::info!(
        inventory = inventory.len(),
        listings = listings.len(),
        "records loaded"
    );

    let source = Arc::new(InMemoryRecordSource::new(inventory, listings));
    let bus: Arc<InMemoryEventBus<Notification>> = Arc::new(InMemoryEventBus::new());
    let catalog = CatalogService::new(source, bus, config.cache);

    let session =
        DashboardSession::new(catalog, config.query.as_str(), config.view_mode, Utc::now())
            .context("building dashboard view")?;

    let report = BoardReport::new(
        session.query(),
        session.criteria(),
        session.inventory(),
        session.listings(),
    );
    let json = serde_json::to_string_pretty(&report).context("serializing board report")?;
    println!("{json}");
    Ok(())
}
