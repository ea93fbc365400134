// HTTP presentation layer.

pub mod handlers;
pub mod views;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the application router. Uploads of any size are accepted; malformed
/// audio is only discovered by the decoder.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/upload-audio/", post(handlers::upload_audio))
        .route("/record-audio/", post(handlers::record_audio))
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

/// Adapter so pipeline errors become HTTP responses via `?`.
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        log::error!("Request failed: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("processing failed: {:#}", self.0),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
