//! Archive download and decompression.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::info;
use url::Url;

use crate::error::FetchError;

/// Download `url` into `cache_dir` unless a cached copy already exists.
/// Returns the path to the local archive.
///
/// The body is streamed to a `.part` file and renamed on completion, so an
/// interrupted download is never mistaken for a cached archive on the next
/// run. Any transport error or non-success status is fatal.
pub async fn download_if_missing(
    client: &reqwest::Client,
    url: &str,
    cache_dir: &Path,
) -> Result<PathBuf, FetchError> {
    let parsed = Url::parse(url).map_err(|source| FetchError::BadUrl {
        url: url.to_string(),
        source,
    })?;
    let target = cache_dir.join(archive_name(&parsed));

    if target.exists() {
        info!("archive {} already cached, skipping download", target.display());
        return Ok(target);
    }

    fs::create_dir_all(cache_dir)?;
    info!("downloading {}", url);

    let response = client
        .get(parsed)
        .send()
        .await
        .map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let partial = target.with_extension("part");
    let mut file = tokio::fs::File::create(&partial).await?;
    let mut stream = response.bytes_stream();
    let mut bytes = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;
        bytes += chunk.len() as u64;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&partial, &target).await?;
    info!("downloaded {} ({} bytes)", target.display(), bytes);

    Ok(target)
}

/// Decompress a gzip archive into `work_dir`, stripping the `.gz` suffix.
/// Returns the path to the plain dump file.
pub fn decompress(archive: &Path, work_dir: &Path) -> Result<PathBuf, FetchError> {
    fs::create_dir_all(work_dir)?;

    let name = archive
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("dump.txt.gz");
    let target = work_dir.join(name.strip_suffix(".gz").unwrap_or(name));

    info!("decompressing {} -> {}", archive.display(), target.display());

    let file = File::open(archive)?;
    let mut decoder = GzDecoder::new(io::BufReader::new(file));
    let mut out = File::create(&target)?;
    io::copy(&mut decoder, &mut out).map_err(|source| FetchError::Decompress {
        path: archive.to_path_buf(),
        source,
    })?;

    Ok(target)
}

/// Local file name for a dump URL, from the last path segment.
fn archive_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back().map(str::to_string))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "download.gz".to_string())
}
