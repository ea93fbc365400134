// Streaming download of model artifacts.
//
// Artifacts land in the models directory once and are reused across restarts.
// Gated hosts get a bearer token from configuration, never from source.

use anyhow::{anyhow, Result};
use futures_util::StreamExt;
use reqwest::Client;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Download `url` to `dest`, streaming to disk with coarse progress logs.
///
/// A partial file from an interrupted run is overwritten, not resumed.
pub async fn fetch_to_file(
    client: &Client,
    url: &str,
    dest: &Path,
    auth_token: Option<&str>,
) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| anyhow!("failed to create {}: {}", parent.display(), e))?;
    }

    log::info!("Downloading {} -> {}", url, dest.display());

    let mut request = client.get(url);
    if let Some(token) = auth_token {
        request = request.bearer_auth(token);
    }

    let response = request
        .send()
        .await
        .map_err(|e| anyhow!("failed to start download: {}", e))?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "download of {} failed with status {}",
            url,
            response.status()
        ));
    }

    let total_size = response.content_length().unwrap_or(0);
    log::info!(
        "Content length: {:.1} MB",
        total_size as f64 / (1024.0 * 1024.0)
    );

    let mut file = fs::File::create(dest)
        .await
        .map_err(|e| anyhow!("failed to create {}: {}", dest.display(), e))?;

    let mut stream = response.bytes_stream();
    let mut downloaded = 0u64;
    let mut last_logged_pct = 0u8;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| anyhow!("download stream error: {}", e))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| anyhow!("failed to write {}: {}", dest.display(), e))?;
        downloaded += chunk.len() as u64;

        if total_size > 0 {
            let pct = ((downloaded as f64 / total_size as f64) * 100.0) as u8;
            if pct >= last_logged_pct + 10 {
                last_logged_pct = pct - (pct % 10);
                log::info!(
                    "Download progress: {}% ({:.1} / {:.1} MB)",
                    last_logged_pct,
                    downloaded as f64 / (1024.0 * 1024.0),
                    total_size as f64 / (1024.0 * 1024.0)
                );
            }
        }
    }

    file.flush()
        .await
        .map_err(|e| anyhow!("failed to flush {}: {}", dest.display(), e))?;

    log::info!(
        "Download complete: {} ({:.1} MB)",
        dest.display(),
        downloaded as f64 / (1024.0 * 1024.0)
    );
    Ok(())
}
