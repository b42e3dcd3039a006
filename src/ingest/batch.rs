//! Bounded-memory batch streaming from a delimited dump into the store.
//!
//! A blocking reader task walks the dump record by record and accumulates
//! parsed rows into fixed-size batches; the async side applies one batch at
//! a time. The two stages are connected by a bounded channel, so the reader
//! parks in `blocking_send` whenever the applier falls behind.

use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// How many batches may sit between the reader and the applier.
///
/// With one batch queued here, one accumulating in the reader and one
/// draining in the applier, read-but-unapplied rows never exceed
/// `(IN_FLIGHT_BATCHES + 2) * batch_size` regardless of input size.
pub const IN_FLIGHT_BATCHES: usize = 1;

/// Counters from one streaming pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Records pulled from the dump, including ones later skipped.
    pub rows_read: u64,
    /// Records rejected by the parse/filter closure.
    pub rows_skipped: u64,
    /// Records the reader could not even tokenize.
    pub rows_malformed: u64,
    /// Batches handed to the applier.
    pub batches: u64,
}

/// Stream `path` as tab-separated records, parse each with `parse`, and
/// hand fixed-size batches to `apply`.
///
/// `parse` returning `None` counts the row as skipped; unreadable records
/// are counted as malformed. Neither aborts the pass. An error from `apply`
/// is fatal and tears the reader down.
pub async fn stream_batches<T, P, A>(
    path: &Path,
    batch_size: usize,
    log_every: u64,
    parse: P,
    mut apply: A,
) -> Result<StreamStats>
where
    T: Send + 'static,
    P: FnMut(&csv::StringRecord) -> Option<T> + Send + 'static,
    A: FnMut(Vec<T>) -> Result<()>,
{
    let (tx, mut rx) = mpsc::channel::<Vec<T>>(IN_FLIGHT_BATCHES);
    let dump = path.to_path_buf();

    let reader_task = tokio::task::spawn_blocking(move || read_into(dump, batch_size, log_every, parse, tx));

    let mut batches = 0u64;
    while let Some(batch) = rx.recv().await {
        apply(batch)?;
        batches += 1;
    }

    let mut stats = reader_task
        .await
        .context("dump reader task panicked")??;
    stats.batches = batches;
    Ok(stats)
}

fn read_into<T, P>(
    dump: std::path::PathBuf,
    batch_size: usize,
    log_every: u64,
    mut parse: P,
    tx: mpsc::Sender<Vec<T>>,
) -> Result<StreamStats>
where
    P: FnMut(&csv::StringRecord) -> Option<T>,
{
    // The dumps are unquoted tab-separated text with a varying trailing
    // column count; the csv reader pulls records incrementally.
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_path(&dump)
        .with_context(|| format!("failed to open dump {}", dump.display()))?;

    let mut stats = StreamStats::default();
    let mut batch = Vec::with_capacity(batch_size);
    let mut record = csv::StringRecord::new();

    loop {
        match reader.read_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => {
                stats.rows_malformed += 1;
                debug!("skipping unreadable record: {err}");
                continue;
            }
        }

        stats.rows_read += 1;
        if stats.rows_read % log_every == 0 {
            info!("{} rows read from {}", stats.rows_read, dump.display());
        }

        match parse(&record) {
            Some(item) => {
                batch.push(item);
                if batch.len() >= batch_size {
                    let full = std::mem::replace(&mut batch, Vec::with_capacity(batch_size));
                    // Suspension point: parks until the applier drains the
                    // queued batch.
                    if tx.blocking_send(full).is_err() {
                        // Applier gone; it already reported its error.
                        return Ok(stats);
                    }
                }
            }
            None => stats.rows_skipped += 1,
        }
    }

    if !batch.is_empty() {
        let _ = tx.blocking_send(batch);
    }

    Ok(stats)
}
