// Route handlers.
//
// Both upload endpoints run the whole pipeline inside the request: the
// CPU-bound model work moves to a blocking thread, but the response is not
// sent until the recap is complete.

use anyhow::anyhow;
use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::response::Html;

use super::{views, AppError};
use crate::pipeline::{self, RecapResult};
use crate::state::AppState;

/// GET /, the intake form.
pub async fn index() -> Html<String> {
    Html(views::index_page())
}

/// POST /upload-audio/, multipart field `file`.
pub async fn upload_audio(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let (file_name, bytes) = read_field(multipart, "file").await?;
    let result = run_pipeline(state, Some(file_name), bytes).await?;
    Ok(Html(views::result_page(&result)))
}

/// POST /record-audio/, multipart field `audio_data` from the recorder
/// widget.
pub async fn record_audio(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let (_, bytes) = read_field(multipart, "audio_data").await?;
    let result = run_pipeline(state, None, bytes).await?;
    Ok(Html(views::result_page(&result)))
}

/// Pull the named field out of the multipart stream.
async fn read_field(mut multipart: Multipart, name: &str) -> Result<(String, Bytes), AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(name) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await?;
        log::info!(
            "Received '{}' ({} bytes) in field '{}'",
            file_name,
            bytes.len(),
            name
        );
        return Ok((file_name, bytes));
    }
    Err(AppError(anyhow!("multipart field '{}' missing", name)))
}

/// Run the pipeline on a blocking thread; model inference must not stall the
/// async executor.
async fn run_pipeline(
    state: AppState,
    upload_name: Option<String>,
    bytes: Bytes,
) -> Result<RecapResult, AppError> {
    let result = tokio::task::spawn_blocking(move || match upload_name {
        Some(name) => pipeline::run_with_upload(&state.engines, &state.config, &name, &bytes),
        None => pipeline::run_with_recording(&state.engines, &state.config, &bytes),
    })
    .await??;
    Ok(result)
}
