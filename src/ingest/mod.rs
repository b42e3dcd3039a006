//! Bulk-ingestion pipeline: fetch, decompress, parse, batch-apply.
//!
//! One-shot bulk load, not incremental sync: each dump-backed collection is
//! loaded only when empty, guarded by a cheap existence probe before any
//! download or parse work. Countries are re-seeded on every run.

mod alternates;
mod batch;
pub mod config;
mod fetch;
mod places;
mod seed;

pub use alternates::LanguageFilter;
pub use batch::{StreamStats, IN_FLIGHT_BATCHES};
pub use config::IngestConfig;
pub use seed::seed_countries;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::models::CountrySeed;
use crate::store::{GeoStore, StoreStats};

/// Per-collection load counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollectionReport {
    pub rows_read: u64,
    /// Malformed or filtered rows, recovered locally.
    pub rows_skipped: u64,
    pub inserted: u64,
    /// Rows whose id was already present (insert-ignore).
    pub ignored: u64,
    /// Alternate names referencing an unknown place.
    pub orphaned: u64,
    /// The collection was already populated; the load did not run.
    pub skipped_existing: bool,
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct IngestReport {
    pub countries_seeded: usize,
    pub places: CollectionReport,
    pub alternate_names: CollectionReport,
    pub stats: StoreStats,
}

/// Run the whole pipeline: seed countries, load both dumps, refresh store
/// statistics.
///
/// Download or decompression failures abort the run; row-level problems are
/// counted in the report instead. Re-running against a populated store is a
/// safe no-op for the dump-backed collections.
pub async fn run(
    store: &Arc<GeoStore>,
    config: &IngestConfig,
    seeds: &[CountrySeed],
) -> Result<IngestReport> {
    let started = Instant::now();
    let mut report = IngestReport {
        countries_seeded: seed_countries(store, seeds),
        ..Default::default()
    };

    let client = reqwest::Client::builder()
        .user_agent(concat!("meridian/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;

    if store.place_count() > 0 {
        info!("places collection already populated, skipping load");
        report.places.skipped_existing = true;
    } else {
        let dump = stage_dump(&client, &config.places_url, config)
            .await
            .context("places dump fetch failed")?;
        report.places = places::load_places(store, &dump, config)
            .await
            .context("places load failed")?;
    }

    if store.alternate_count() > 0 {
        info!("alternate-names collection already populated, skipping load");
        report.alternate_names.skipped_existing = true;
    } else {
        let dump = stage_dump(&client, &config.alternate_names_url, config)
            .await
            .context("alternate-names dump fetch failed")?;
        report.alternate_names = alternates::load_alternates(store, &dump, config)
            .await
            .context("alternate-names load failed")?;
    }

    // Post-load maintenance; a cheap no-op when nothing was loaded.
    report.stats = store.refresh_statistics();

    info!(
        places = report.stats.places,
        alternate_names = report.stats.alternate_names,
        countries = report.stats.countries,
        elapsed_s = started.elapsed().as_secs(),
        "ingestion complete"
    );
    Ok(report)
}

/// Fetch one archive into the cache and decompress it into the working
/// directory. Archives are staged one at a time, never in parallel.
async fn stage_dump(
    client: &reqwest::Client,
    url: &str,
    config: &IngestConfig,
) -> Result<PathBuf> {
    let archive = fetch::download_if_missing(client, url, &config.cache_dir).await?;
    let work_dir = config.work_dir.clone();
    let dump = tokio::task::spawn_blocking(move || fetch::decompress(&archive, &work_dir))
        .await
        .context("decompression task panicked")??;
    Ok(dump)
}
