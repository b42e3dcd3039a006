//! Places dump loader.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use csv::StringRecord;
use tracing::info;

use crate::ingest::batch::stream_batches;
use crate::ingest::{CollectionReport, IngestConfig};
use crate::models::Place;
use crate::store::GeoStore;

// Tab-separated column layout of the places dump:
// 0 id, 1 name, 2 asciiname, 3 alternatenames, 4 latitude, 5 longitude,
// 6 feature class, 7 feature code, 8 country code, 9 cc2, 10 admin1,
// 11 admin2, 12 admin3, 13 admin4, 14 population, 15 elevation, 16 dem,
// 17 timezone, 18 modification date
const MIN_FIELDS: usize = 19;

/// Parse one dump record into a typed place. `None` skips the row: too few
/// fields, or any numeric field that fails to parse.
pub(crate) fn parse_place(record: &StringRecord) -> Option<Place> {
    if record.len() < MIN_FIELDS {
        return None;
    }

    let id: i64 = field(record, 0).parse().ok()?;
    let lat: f64 = field(record, 4).parse().ok()?;
    let lon: f64 = field(record, 5).parse().ok()?;
    let population = optional(field(record, 14))?;
    let elevation = optional(field(record, 15))?;

    // The modification date is informational; a bad value degrades to None
    // rather than dropping the row.
    let modified = NaiveDate::parse_from_str(field(record, 18), "%Y-%m-%d").ok();

    Some(Place {
        id,
        name: field(record, 1).to_string(),
        ascii_name: field(record, 2).to_string(),
        country_code: field(record, 8).to_ascii_uppercase(),
        admin_region: field(record, 10).to_string(),
        lat,
        lon,
        population,
        elevation,
        timezone: field(record, 17).to_string(),
        modified,
    })
}

fn field<'r>(record: &'r StringRecord, index: usize) -> &'r str {
    record.get(index).unwrap_or("").trim()
}

/// Empty is `None`; a non-empty value must parse or the row is skipped.
fn optional<T: FromStr>(raw: &str) -> Option<Option<T>> {
    if raw.is_empty() {
        return Some(None);
    }
    raw.parse().ok().map(Some)
}

/// Stream the places dump into the store with insert-ignore semantics.
pub(crate) async fn load_places(
    store: &Arc<GeoStore>,
    dump: &Path,
    config: &IngestConfig,
) -> Result<CollectionReport> {
    let mut report = CollectionReport::default();
    let applier = Arc::clone(store);

    let stats = stream_batches(
        dump,
        config.batch_size,
        config.log_every,
        parse_place,
        |batch| {
            let (inserted, ignored) = applier.insert_places(batch);
            report.inserted += inserted;
            report.ignored += ignored;
            Ok(())
        },
    )
    .await?;

    report.rows_read = stats.rows_read;
    report.rows_skipped = stats.rows_skipped + stats.rows_malformed;
    info!(
        inserted = report.inserted,
        skipped = report.rows_skipped,
        "places load complete"
    );
    Ok(report)
}
