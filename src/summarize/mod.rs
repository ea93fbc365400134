// src/summarize/mod.rs
pub mod bullets;
pub mod chunker;
pub mod engine;

pub use bullets::format_bullets;
pub use chunker::split_into_chunks;
pub use engine::Summarizer;

/// Characters per summarization chunk. Chunking is by character count, not
/// sentence boundaries, so a chunk can end mid-word.
pub const CHUNK_CHARS: usize = 1000;
