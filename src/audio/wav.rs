// Canonical waveform I/O.
//
// The preprocessor's output contract is a 16-bit PCM WAV at the pipeline
// rate, named `normalized_<stem>.wav` in the working directory. Downstream
// stages (diarizer, transcriber) read samples back from that file.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::workfile::WorkFile;
use super::PIPELINE_SAMPLE_RATE;

/// Write mono f32 samples as a 16-bit PCM WAV. Returns a scoped handle so
/// the file is cleaned up with the rest of the request's working set.
pub fn write_normalized(work_dir: &Path, stem: &str, samples: &[f32]) -> Result<WorkFile> {
    let path = normalized_path(work_dir, stem);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: PIPELINE_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(&path, spec)
        .with_context(|| format!("create {}", path.display()))?;
    for &sample in samples {
        let value = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
        writer.write_sample(value)?;
    }
    writer.finalize()?;

    log::info!(
        "Wrote normalized waveform: {} ({} samples)",
        path.display(),
        samples.len()
    );
    Ok(WorkFile::adopt(path))
}

/// Naming convention for preprocessed audio.
pub fn normalized_path(work_dir: &Path, stem: &str) -> PathBuf {
    work_dir.join(format!("normalized_{}.wav", stem))
}

/// Read a WAV back as mono f32 samples.
pub fn read_mono_f32(path: &Path) -> Result<Vec<f32>> {
    let mut reader =
        hound::WavReader::open(path).with_context(|| format!("open {}", path.display()))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()?
        }
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
    };

    if spec.channels <= 1 {
        return Ok(samples);
    }

    // Average interleaved channels down to mono.
    let channels = spec.channels as usize;
    Ok(samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect())
}

/// Convert f32 samples to i16, the representation the diarizer consumes.
pub fn to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s * 32767.0).clamp(-32768.0, 32767.0) as i16)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_wav() {
        let dir = tempfile::tempdir().unwrap();
        let samples: Vec<f32> = (0..1600).map(|i| (i as f32 * 0.1).sin() * 0.5).collect();

        let file = write_normalized(dir.path(), "clip", &samples).unwrap();
        assert!(file
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("normalized_"));

        let read_back = read_mono_f32(file.path()).unwrap();
        assert_eq!(read_back.len(), samples.len());
        for (a, b) in samples.iter().zip(read_back.iter()) {
            // Quantization to i16 costs up to two LSBs round-tripping.
            assert!((a - b).abs() < 2.0 / 32768.0, "{} vs {}", a, b);
        }
    }

    #[test]
    fn normalized_naming_convention() {
        let path = normalized_path(Path::new("work"), "meeting");
        assert_eq!(path, PathBuf::from("work/normalized_meeting.wav"));
    }

    #[test]
    fn to_i16_clamps_out_of_range() {
        let out = to_i16(&[0.0, 1.5, -1.5]);
        assert_eq!(out[0], 0);
        assert_eq!(out[1], 32767);
        assert_eq!(out[2], -32768);
    }
}
