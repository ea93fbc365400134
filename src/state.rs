// Shared application state.
//
// Every model engine is created once at startup and shared for the life of
// the process. The whisper context is read-only per request; the diarizer
// and summarizer hold inference state, so access is mutex-serialized.

use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::diarize::DiarizationEngine;
use crate::summarize::Summarizer;
use crate::transcribe::WhisperEngine;

pub struct Engines {
    pub whisper: WhisperEngine,
    /// Present only when diarization is enabled in configuration.
    pub diarizer: Option<Mutex<DiarizationEngine>>,
    pub summarizer: Mutex<Summarizer>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub engines: Arc<Engines>,
}

impl AppState {
    pub fn new(config: Config, engines: Engines) -> Self {
        Self {
            config: Arc::new(config),
            engines: Arc::new(engines),
        }
    }
}
