//! Alternate-names dump loader.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use csv::StringRecord;
use hashbrown::HashSet;
use tracing::info;

use crate::ingest::batch::stream_batches;
use crate::ingest::{CollectionReport, IngestConfig};
use crate::models::{AlternateName, NameFlags};
use crate::store::GeoStore;

// Tab-separated column layout of the alternate-names dump:
// 0 id, 1 place id, 2 language code, 3 name, 4 preferred, 5 short,
// 6 colloquial, 7 historic, then optional from/to period columns.
const MIN_FIELDS: usize = 8;

/// Language codes longer than this are link/pseudo entries, not names.
pub const MAX_LANG_LEN: usize = 7;

/// Names longer than this are junk rows.
pub const MAX_NAME_LEN: usize = 400;

/// Case-insensitive language allow-list. Unconfigured, or containing the
/// wildcard "all", it accepts everything.
#[derive(Debug, Clone)]
pub struct LanguageFilter {
    accept_all: bool,
    allowed: HashSet<String>,
}

impl LanguageFilter {
    pub fn new(languages: &[String]) -> Self {
        let allowed: HashSet<String> = languages
            .iter()
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .collect();
        Self {
            accept_all: allowed.is_empty() || allowed.contains("all"),
            allowed,
        }
    }

    pub fn accepts(&self, lang: &str) -> bool {
        self.accept_all || self.allowed.contains(&lang.to_lowercase())
    }
}

/// Parse one dump record into a typed alternate name. `None` skips the row:
/// too few fields, missing/oversized language or name, a filtered-out
/// language, or an unparsable id. The referential check against the store
/// happens later, at apply time.
pub(crate) fn parse_alternate(
    record: &StringRecord,
    filter: &LanguageFilter,
) -> Option<AlternateName> {
    if record.len() < MIN_FIELDS {
        return None;
    }

    let lang = record.get(2)?.trim();
    if lang.is_empty() || lang.chars().count() > MAX_LANG_LEN {
        return None;
    }

    let name = record.get(3)?.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return None;
    }

    // Applied before any store access.
    if !filter.accepts(lang) {
        return None;
    }

    let id: i64 = record.get(0)?.trim().parse().ok()?;
    let place_id: i64 = record.get(1)?.trim().parse().ok()?;

    Some(AlternateName {
        id,
        place_id,
        lang: lang.to_string(),
        name: name.to_string(),
        flags: NameFlags {
            preferred: flag(record, 4),
            short: flag(record, 5),
            colloquial: flag(record, 6),
            historic: flag(record, 7),
        },
    })
}

fn flag(record: &StringRecord, index: usize) -> bool {
    record.get(index).map(str::trim) == Some("1")
}

/// Stream the alternate-names dump into the store. Rows referencing an
/// unknown place are dropped silently and counted as orphaned.
pub(crate) async fn load_alternates(
    store: &Arc<GeoStore>,
    dump: &Path,
    config: &IngestConfig,
) -> Result<CollectionReport> {
    let filter = LanguageFilter::new(&config.languages);
    let mut report = CollectionReport::default();
    let applier = Arc::clone(store);

    let stats = stream_batches(
        dump,
        config.batch_size,
        config.log_every,
        move |record| parse_alternate(record, &filter),
        |batch| {
            let outcome = applier.insert_alternates(batch);
            report.inserted += outcome.inserted;
            report.ignored += outcome.duplicates;
            report.orphaned += outcome.orphaned;
            Ok(())
        },
    )
    .await?;

    report.rows_read = stats.rows_read;
    report.rows_skipped = stats.rows_skipped + stats.rows_malformed;
    info!(
        inserted = report.inserted,
        skipped = report.rows_skipped,
        orphaned = report.orphaned,
        "alternate names load complete"
    );
    Ok(report)
}
