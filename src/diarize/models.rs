// Diarization model artifacts.
//
// The segmentation and speaker-embedding ONNX models are fetched once at
// startup. A gated mirror can be used by configuring a bearer token; the
// token always comes from configuration or the environment.

use anyhow::Result;
use reqwest::Client;
use std::path::{Path, PathBuf};

use crate::download::fetch_to_file;

const SEGMENTATION_MODEL_URL: &str =
    "https://github.com/thewh1teagle/pyannote-rs/releases/download/v0.1.0/segmentation-3.0.onnx";
const EMBEDDING_MODEL_URL: &str =
    "https://github.com/thewh1teagle/pyannote-rs/releases/download/v0.1.0/wespeaker_en_voxceleb_CAM++.onnx";

pub const SEGMENTATION_MODEL_NAME: &str = "segmentation-3.0.onnx";
pub const EMBEDDING_MODEL_NAME: &str = "wespeaker_en_voxceleb_CAM++.onnx";

/// Paths for the two diarization models under the models directory.
pub fn model_paths(models_dir: &Path) -> (PathBuf, PathBuf) {
    (
        models_dir.join(SEGMENTATION_MODEL_NAME),
        models_dir.join(EMBEDDING_MODEL_NAME),
    )
}

/// Fetch any missing diarization model.
pub async fn ensure_models(
    client: &Client,
    models_dir: &Path,
    auth_token: Option<&str>,
) -> Result<(PathBuf, PathBuf)> {
    let (segmentation, embedding) = model_paths(models_dir);

    if !segmentation.exists() {
        fetch_to_file(client, SEGMENTATION_MODEL_URL, &segmentation, auth_token).await?;
    } else {
        log::info!("Segmentation model already present at {}", segmentation.display());
    }

    if !embedding.exists() {
        fetch_to_file(client, EMBEDDING_MODEL_URL, &embedding, auth_token).await?;
    } else {
        log::info!("Embedding model already present at {}", embedding.display());
    }

    Ok((segmentation, embedding))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_use_expected_names() {
        let (seg, emb) = model_paths(Path::new("/models"));
        assert!(seg.ends_with(SEGMENTATION_MODEL_NAME));
        assert!(emb.ends_with(EMBEDDING_MODEL_NAME));
    }
}
