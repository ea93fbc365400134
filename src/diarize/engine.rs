// Speaker diarization using pyannote-rs.
//
// Wraps segmentation and speaker embedding extraction. The engine is built
// once at startup and shared; each request gets a fresh clustering pass so
// speaker numbering is stable within a file.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use log::{info, warn};
use pyannote_rs::{get_segments, EmbeddingExtractor, EmbeddingManager};

use crate::audio::wav;

/// A speech region attributed to one speaker. Ordered by start time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeakerInterval {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Display label, "Speaker 1".."Speaker N"
    pub speaker: String,
}

pub struct DiarizationEngine {
    segmentation_model_path: PathBuf,
    embedding_extractor: EmbeddingExtractor,
    max_speakers: usize,
    similarity_threshold: f32,
}

impl DiarizationEngine {
    pub fn new(
        segmentation_model_path: PathBuf,
        embedding_model_path: PathBuf,
        max_speakers: usize,
        similarity_threshold: f32,
    ) -> Result<Self> {
        info!("Initializing diarization engine");

        if !segmentation_model_path.exists() {
            return Err(anyhow!(
                "segmentation model not found: {}",
                segmentation_model_path.display()
            ));
        }
        if !embedding_model_path.exists() {
            return Err(anyhow!(
                "embedding model not found: {}",
                embedding_model_path.display()
            ));
        }

        // pyannote-rs reports errors through eyre; convert to anyhow
        let embedding_extractor = EmbeddingExtractor::new(&embedding_model_path)
            .map_err(|e| anyhow!("failed to create embedding extractor: {}", e))?;

        info!("Diarization engine initialized");

        Ok(Self {
            segmentation_model_path,
            embedding_extractor,
            max_speakers,
            similarity_threshold,
        })
    }

    /// Diarize a normalized waveform file.
    pub fn diarize_wav(&mut self, path: &Path, sample_rate: u32) -> Result<Vec<SpeakerInterval>> {
        let samples = wav::read_mono_f32(path)?;
        self.diarize(&wav::to_i16(&samples), sample_rate)
    }

    /// Run diarization over i16 samples, labeling each detected speech
    /// region with a per-file speaker number.
    pub fn diarize(&mut self, samples: &[i16], sample_rate: u32) -> Result<Vec<SpeakerInterval>> {
        info!(
            "Running diarization on {} samples at {} Hz",
            samples.len(),
            sample_rate
        );

        let segments_iter = get_segments(samples, sample_rate, &self.segmentation_model_path)
            .map_err(|e| anyhow!("failed to run segmentation: {}", e))?;

        // Fresh clustering per file keeps labels independent across requests.
        let mut embedding_manager = EmbeddingManager::new(self.max_speakers);
        let mut intervals = Vec::new();

        for segment_result in segments_iter {
            let segment = match segment_result {
                Ok(seg) => seg,
                Err(e) => {
                    warn!("Failed to process speech segment: {}", e);
                    continue;
                }
            };

            let embedding: Vec<f32> = match self.embedding_extractor.compute(&segment.samples) {
                Ok(iter) => iter.collect(),
                Err(e) => {
                    warn!("Failed to compute embedding for segment: {}", e);
                    continue;
                }
            };

            let speaker = match embedding_manager
                .search_speaker(embedding, self.similarity_threshold)
            {
                Some(speaker_idx) => format!("Speaker {}", speaker_idx + 1),
                None => {
                    warn!(
                        "Speaker cap ({}) reached, labeling segment as Unknown",
                        self.max_speakers
                    );
                    "Unknown".to_string()
                }
            };

            intervals.push(SpeakerInterval {
                start: segment.start,
                end: segment.end,
                speaker,
            });
        }

        info!("Diarization complete: {} intervals", intervals.len());
        Ok(intervals)
    }
}
