// recap server entry point.
//
// Loads configuration, fetches any missing model artifacts, initializes the
// engines once, then serves the HTTP pipeline until Ctrl+C.

use anyhow::Result;
use std::net::SocketAddr;

use recap::config::Config;
use recap::diarize::{self, DiarizationEngine};
use recap::state::{AppState, Engines};
use recap::summarize::Summarizer;
use recap::transcribe::{self, WhisperEngine};
use recap::web;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load_or_default(&Config::default_path())?.with_env_overrides();
    let models_dir = config.models_dir();
    std::fs::create_dir_all(config.work_dir())?;
    std::fs::create_dir_all(&models_dir)?;

    let auth_token = config.models.auth_token.clone();
    let client = reqwest::Client::new();

    // Fetch whatever is missing before any engine loads.
    let whisper_model = transcribe::models::ensure_model(
        &client,
        &models_dir,
        &config.transcriber.model,
        auth_token.as_deref(),
    )
    .await?;

    let diarization_models = if config.diarization.enabled {
        Some(diarize::models::ensure_models(&client, &models_dir, auth_token.as_deref()).await?)
    } else {
        None
    };

    // Engines load once and are shared for the life of the process.
    let language = config.transcriber.language.clone();
    let whisper =
        tokio::task::spawn_blocking(move || WhisperEngine::load(&whisper_model, language))
            .await??;

    let summarizer_config = config.summarizer.clone();
    let summarizer_token = auth_token.clone();
    let summarizer = tokio::task::spawn_blocking(move || {
        Summarizer::load(&summarizer_config, summarizer_token.as_deref())
    })
    .await??;

    let diarizer = match diarization_models {
        Some((segmentation, embedding)) => Some(DiarizationEngine::new(
            segmentation,
            embedding,
            config.diarization.max_speakers,
            config.diarization.similarity_threshold,
        )?),
        None => None,
    };

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let engines = Engines {
        whisper,
        diarizer: diarizer.map(std::sync::Mutex::new),
        summarizer: std::sync::Mutex::new(summarizer),
    };
    let app = web::router(AppState::new(config, engines));

    log::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            log::info!("Shutdown requested (Ctrl+C)");
        }
    }

    Ok(())
}
