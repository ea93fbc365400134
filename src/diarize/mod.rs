// src/diarize/mod.rs
pub mod engine;
pub mod models;

pub use engine::{DiarizationEngine, SpeakerInterval};
