// Whisper transcription engine.
//
// The context is created once at startup and shared read-only across
// requests; each transcription gets its own decode state.

use anyhow::{anyhow, Result};
use std::path::Path;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use super::text_cleaner::clean_repetitive_text;
use super::types::TranscriptSegment;
use crate::audio::wav;

const BEAM_SIZE: i32 = 5;

/// Detect available GPU acceleration capabilities
pub fn detect_gpu_acceleration() -> bool {
    // On macOS, prefer Metal GPU acceleration
    if cfg!(target_os = "macos") {
        log::info!("macOS detected - attempting to enable Metal GPU acceleration");
        return true;
    }

    if cfg!(feature = "cuda") {
        log::info!("CUDA feature enabled - attempting GPU acceleration");
        return true;
    }

    if cfg!(feature = "vulkan") {
        log::info!("Vulkan feature enabled - attempting GPU acceleration");
        return true;
    }

    if cfg!(feature = "hipblas") {
        log::info!("hipBLAS feature enabled - attempting GPU acceleration");
        return true;
    }

    log::info!("No GPU acceleration features detected - using CPU processing");
    false
}

pub struct WhisperEngine {
    ctx: WhisperContext,
    language: Option<String>,
}

impl WhisperEngine {
    /// Load a ggml model from disk. GPU use follows the compiled
    /// acceleration features; whisper.cpp picks the matching compute
    /// precision for the device it ends up on.
    pub fn load(model_path: &Path, language: Option<String>) -> Result<Self> {
        // Suppress verbose whisper.cpp logs
        std::env::set_var("WHISPER_LOG_LEVEL", "1");

        let use_gpu = detect_gpu_acceleration();
        let context_param = WhisperContextParameters {
            use_gpu,
            gpu_device: 0,
            ..Default::default()
        };

        log::info!(
            "Loading whisper model {} (gpu: {})",
            model_path.display(),
            use_gpu
        );
        let ctx = WhisperContext::new_with_params(&model_path.to_string_lossy(), context_param)
            .map_err(|e| anyhow!("failed to load whisper model {}: {}", model_path.display(), e))?;

        Ok(Self { ctx, language })
    }

    /// Transcribe a normalized waveform file into ordered segments.
    pub fn transcribe_wav(&self, path: &Path) -> Result<Vec<TranscriptSegment>> {
        let samples = wav::read_mono_f32(path)?;
        self.transcribe(&samples)
    }

    /// Transcribe 16 kHz mono samples into ordered, time-stamped segments.
    pub fn transcribe(&self, samples: &[f32]) -> Result<Vec<TranscriptSegment>> {
        let mut params = FullParams::new(SamplingStrategy::BeamSearch {
            beam_size: BEAM_SIZE,
            patience: 1.0,
        });

        params.set_language(self.language.as_deref());
        params.set_translate(false);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_suppress_blank(true);
        params.set_suppress_non_speech_tokens(true);
        params.set_temperature(0.0);
        params.set_no_context(true);

        let duration_seconds = samples.len() as f64 / crate::audio::PIPELINE_SAMPLE_RATE as f64;
        log::info!(
            "Starting transcription of {} samples ({:.1}s duration)",
            samples.len(),
            duration_seconds
        );

        let mut state = self.ctx.create_state()?;
        state.full(params, samples)?;

        let num_segments = state.full_n_segments()?;
        let mut segments = Vec::with_capacity(num_segments as usize);

        for i in 0..num_segments {
            let segment_text = match state.full_get_segment_text_lossy(i) {
                Ok(text) => text,
                Err(_) => continue,
            };

            // Whisper timestamps are in 10 ms ticks.
            let start = state.full_get_segment_t0(i).unwrap_or(0) as f64 / 100.0;
            let end = state.full_get_segment_t1(i).unwrap_or(0) as f64 / 100.0;

            let cleaned = clean_repetitive_text(segment_text.trim());
            if cleaned.is_empty() {
                continue;
            }

            segments.push(TranscriptSegment {
                start,
                end,
                text: cleaned,
            });
        }

        log::info!(
            "Transcription complete: {} segments over {:.1}s",
            segments.len(),
            duration_seconds
        );
        Ok(segments)
    }
}
