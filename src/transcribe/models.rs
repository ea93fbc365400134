// Whisper model registry and startup fetching.

use anyhow::{anyhow, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

use crate::download::fetch_to_file;

/// Known ggml model sizes: (name, filename, approximate size in MB).
pub const MODEL_CONFIGS: &[(&str, &str, u32)] = &[
    ("tiny", "ggml-tiny.bin", 78),
    ("tiny.en", "ggml-tiny.en.bin", 78),
    ("base", "ggml-base.bin", 148),
    ("base.en", "ggml-base.en.bin", 148),
    ("small", "ggml-small.bin", 488),
    ("small.en", "ggml-small.en.bin", 488),
    ("medium", "ggml-medium.bin", 1530),
    ("medium.en", "ggml-medium.en.bin", 1530),
    ("large-v3", "ggml-large-v3.bin", 3100),
    ("large-v3-turbo", "ggml-large-v3-turbo.bin", 1620),
];

const MODEL_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// ggml file magic, little-endian.
const GGML_MAGIC: u32 = 0x67676d6c;

pub fn model_filename(model_name: &str) -> Option<&'static str> {
    MODEL_CONFIGS
        .iter()
        .find(|(name, _, _)| *name == model_name)
        .map(|(_, filename, _)| *filename)
}

pub fn model_size_mb(model_name: &str) -> Option<u32> {
    MODEL_CONFIGS
        .iter()
        .find(|(name, _, _)| *name == model_name)
        .map(|(_, _, size)| *size)
}

pub fn model_url(model_name: &str) -> Option<String> {
    model_filename(model_name).map(|filename| format!("{}/{}", MODEL_BASE_URL, filename))
}

/// Resolve the on-disk path for a model, downloading it when absent.
/// Files that fail header validation are re-fetched.
pub async fn ensure_model(
    client: &Client,
    models_dir: &Path,
    model_name: &str,
    auth_token: Option<&str>,
) -> Result<PathBuf> {
    let filename =
        model_filename(model_name).ok_or_else(|| anyhow!("unsupported whisper model: {}", model_name))?;
    let path = models_dir.join(filename);

    if path.exists() {
        match validate_model_file(&path).await {
            Ok(()) => {
                log::info!("Whisper model '{}' already present at {}", model_name, path.display());
                return Ok(path);
            }
            Err(e) => {
                log::warn!("Model file {} failed validation ({}), re-downloading", path.display(), e);
            }
        }
    }

    let url = model_url(model_name).ok_or_else(|| anyhow!("no URL for model {}", model_name))?;
    if let Some(size_mb) = model_size_mb(model_name) {
        log::info!("Fetching whisper model '{}' (~{} MB)", model_name, size_mb);
    }
    fetch_to_file(client, &url, &path, auth_token).await?;
    validate_model_file(&path).await?;
    Ok(path)
}

/// Check the ggml header so an interrupted or HTML-error download is not
/// handed to whisper.cpp.
async fn validate_model_file(path: &Path) -> Result<()> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut header = [0u8; 4];
    file.read_exact(&mut header)
        .await
        .map_err(|e| anyhow!("model file too short: {}", e))?;

    if u32::from_le_bytes(header) != GGML_MAGIC {
        return Err(anyhow!("not a ggml model file: {}", path.display()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_default_model() {
        assert_eq!(model_filename("medium"), Some("ggml-medium.bin"));
        assert!(model_url("medium").unwrap().ends_with("/ggml-medium.bin"));
        assert_eq!(model_size_mb("medium"), Some(1530));
    }

    #[test]
    fn unknown_model_is_rejected() {
        assert!(model_filename("colossal-v9").is_none());
    }

    #[tokio::test]
    async fn validation_rejects_non_ggml_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ggml-medium.bin");
        tokio::fs::write(&path, b"<html>rate limited</html>")
            .await
            .unwrap();
        assert!(validate_model_file(&path).await.is_err());
    }

    #[tokio::test]
    async fn validation_accepts_ggml_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ggml-tiny.bin");
        let mut bytes = GGML_MAGIC.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0u8; 16]);
        tokio::fs::write(&path, &bytes).await.unwrap();
        assert!(validate_model_file(&path).await.is_ok());
    }
}
