// Audio decoding via an ffmpeg subprocess.
//
// Decodes any container/codec ffmpeg understands to raw f32 PCM at the
// pipeline rate (16 kHz mono). Malformed or empty input surfaces here as a
// decode error before any model is invoked.

use anyhow::{anyhow, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::PIPELINE_SAMPLE_RATE;

/// Environment variable overriding the ffmpeg binary location.
pub const FFMPEG_ENV: &str = "RECAP_FFMPEG";

/// Locate the ffmpeg binary: explicit override first, then PATH.
pub fn find_ffmpeg_path() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var(FFMPEG_ENV) {
        let path = PathBuf::from(explicit);
        if path.exists() {
            return Some(path);
        }
        log::warn!("{} points at a missing file, falling back to PATH", FFMPEG_ENV);
    }
    which::which("ffmpeg").ok()
}

/// Decode an audio file to raw f32 samples, 16 kHz mono.
pub fn decode_to_mono_16k(audio_path: &Path) -> Result<Vec<f32>> {
    if !audio_path.exists() {
        return Err(anyhow!("audio file does not exist: {}", audio_path.display()));
    }

    let ffmpeg_path =
        find_ffmpeg_path().ok_or_else(|| anyhow!("ffmpeg not found; install it or set {}", FFMPEG_ENV))?;

    log::info!("Decoding audio file: {}", audio_path.display());
    log::debug!("Using ffmpeg at: {}", ffmpeg_path.display());

    let mut command = Command::new(&ffmpeg_path);
    command
        .arg("-i")
        .arg(audio_path)
        .arg("-f")
        .arg("f32le")
        .arg("-acodec")
        .arg("pcm_f32le")
        .arg("-ar")
        .arg(PIPELINE_SAMPLE_RATE.to_string())
        .arg("-ac")
        .arg("1")
        .arg("-")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command
        .spawn()
        .map_err(|e| anyhow!("failed to spawn ffmpeg: {}", e))?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("failed to capture ffmpeg stdout"))?;

    let mut raw_bytes = Vec::new();
    stdout.read_to_end(&mut raw_bytes)?;

    let output = child.wait_with_output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("ffmpeg failed to decode audio: {}", stderr.trim()));
    }

    if raw_bytes.is_empty() {
        return Err(anyhow!(
            "ffmpeg produced no samples for {}",
            audio_path.display()
        ));
    }
    if raw_bytes.len() % 4 != 0 {
        return Err(anyhow!(
            "invalid decoded length: {} bytes (not divisible by 4)",
            raw_bytes.len()
        ));
    }

    let samples: Vec<f32> = raw_bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    let duration_seconds = samples.len() as f32 / PIPELINE_SAMPLE_RATE as f32;
    log::info!(
        "Decoded {} samples ({:.2} seconds) from {}",
        samples.len(),
        duration_seconds,
        audio_path.display()
    );

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_error() {
        let err = decode_to_mono_16k(Path::new("/nonexistent/clip.mp3")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
