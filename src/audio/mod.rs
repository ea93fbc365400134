// src/audio/mod.rs
pub mod decoder;
pub mod normalizer;
pub mod wav;
pub mod workfile;

pub use decoder::decode_to_mono_16k;
pub use normalizer::LoudnessNormalizer;
pub use workfile::WorkFile;

/// Sample rate every model stage expects.
pub const PIPELINE_SAMPLE_RATE: u32 = 16_000;
