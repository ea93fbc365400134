// The request pipeline, in data-flow order: intake, preprocessing, optional
// diarization, transcription with speaker attribution, summarization,
// bullet formatting.
//
// Every stage propagates its error; there is no retry and no partial
// result. Working files are scoped guards, removed on all exit paths.

use anyhow::{anyhow, Result};

use crate::audio::{self, WorkFile};
use crate::config::Config;
use crate::state::Engines;
use crate::summarize::{self, format_bullets, split_into_chunks};
use crate::transcribe::{attribute_speakers, Utterance};

/// Fixed intake name for the browser-recording path.
const RECORDED_AUDIO_NAME: &str = "recorded_audio.wav";

/// Everything the result view renders.
#[derive(Debug, Clone)]
pub struct RecapResult {
    pub utterances: Vec<Utterance>,
    pub summary: String,
    pub bullets: String,
}

/// Run the pipeline for an uploaded file, kept under a unique working name.
pub fn run_with_upload(
    engines: &Engines,
    config: &Config,
    original_name: &str,
    bytes: &[u8],
) -> Result<RecapResult> {
    let intake = WorkFile::create_unique(config.work_dir(), original_name, bytes)?;
    run(engines, config, &intake)
}

/// Run the pipeline for recorded bytes, kept under the fixed recording name.
pub fn run_with_recording(engines: &Engines, config: &Config, bytes: &[u8]) -> Result<RecapResult> {
    let intake = WorkFile::create(config.work_dir(), RECORDED_AUDIO_NAME, bytes)?;
    run(engines, config, &intake)
}

fn run(engines: &Engines, config: &Config, intake: &WorkFile) -> Result<RecapResult> {
    // Preprocess: decode, normalize loudness, re-export as canonical WAV.
    let samples = audio::decode_to_mono_16k(intake.path())?;
    let normalizer = audio::LoudnessNormalizer::new(1, audio::PIPELINE_SAMPLE_RATE);
    let normalized = normalizer.normalize(&samples)?;
    let waveform = audio::wav::write_normalized(config.work_dir(), &intake.stem(), &normalized)?;

    // Diarize first so transcription can attribute speakers.
    let intervals = match &engines.diarizer {
        Some(diarizer) => {
            let mut guard = diarizer
                .lock()
                .map_err(|_| anyhow!("diarization engine lock poisoned"))?;
            guard.diarize_wav(waveform.path(), audio::PIPELINE_SAMPLE_RATE)?
        }
        None => Vec::new(),
    };

    // Transcribe and attribute by temporal overlap.
    let segments = engines.whisper.transcribe_wav(waveform.path())?;
    let utterances = attribute_speakers(segments, &intervals);

    // Summarize chunk by chunk, then format as bullets.
    let summary = summarize_utterances(engines, &utterances)?;
    let bullets = format_bullets(&summary);

    Ok(RecapResult {
        utterances,
        summary,
        bullets,
    })
}

/// Join the transcript text, chunk it, and summarize each chunk in order.
/// The per-chunk outputs are concatenated with a space; the joined text is
/// not re-summarized.
fn summarize_utterances(engines: &Engines, utterances: &[Utterance]) -> Result<String> {
    let text = utterances
        .iter()
        .map(|u| u.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let chunks = split_into_chunks(&text, summarize::CHUNK_CHARS);
    if chunks.is_empty() {
        return Ok(String::new());
    }

    let mut guard = engines
        .summarizer
        .lock()
        .map_err(|_| anyhow!("summarizer lock poisoned"))?;

    let mut parts = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        log::info!("Summarizing chunk {} of {}", i + 1, chunks.len());
        parts.push(guard.summarize(chunk)?);
    }

    Ok(parts.join(" "))
}
