// Loudness normalization using the EBU R128 standard.

use anyhow::Result;
use log::warn;

/// True peak limiter with lookahead buffer
pub struct TruePeakLimiter {
    lookahead_samples: usize,
    buffer: Vec<f32>,
    gain_reduction: Vec<f32>,
    current_position: usize,
}

impl TruePeakLimiter {
    pub fn new(sample_rate: u32) -> Self {
        const LIMITER_LOOKAHEAD_MS: usize = 10;
        let lookahead_samples = ((sample_rate as usize * LIMITER_LOOKAHEAD_MS) / 1000).max(1);

        Self {
            lookahead_samples,
            buffer: vec![0.0; lookahead_samples],
            gain_reduction: vec![1.0; lookahead_samples],
            current_position: 0,
        }
    }

    pub fn lookahead(&self) -> usize {
        self.lookahead_samples
    }

    pub fn process(&mut self, sample: f32, true_peak_limit: f32) -> f32 {
        self.buffer[self.current_position] = sample;

        let sample_abs = sample.abs();
        if sample_abs > true_peak_limit {
            self.gain_reduction[self.current_position] = true_peak_limit / sample_abs;
        } else {
            self.gain_reduction[self.current_position] = 1.0;
        }

        let output_position = (self.current_position + 1) % self.lookahead_samples;
        let output_sample = self.buffer[output_position] * self.gain_reduction[output_position];

        self.current_position = output_position;
        output_sample
    }
}

/// Offline loudness normalizer: measures integrated loudness over the whole
/// buffer, then applies a single gain toward the target, true-peak limited.
pub struct LoudnessNormalizer {
    channels: u32,
    sample_rate: u32,
    true_peak_limit: f32,
}

impl LoudnessNormalizer {
    const TARGET_LUFS: f64 = -23.0;
    const TRUE_PEAK_LIMIT_DB: f32 = -1.0;

    pub fn new(channels: u32, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
            true_peak_limit: 10_f32.powf(Self::TRUE_PEAK_LIMIT_DB / 20.0),
        }
    }

    /// Normalize a full buffer of interleaved f32 samples.
    pub fn normalize(&self, samples: &[f32]) -> Result<Vec<f32>> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let gain = self.measure_gain(samples)?;
        Ok(self.apply_gain(samples, gain))
    }

    /// Linear gain that moves the buffer's integrated loudness to the target.
    /// Silence (non-finite loudness) gets unity gain.
    fn measure_gain(&self, samples: &[f32]) -> Result<f32> {
        let mut meter = ebur128::EbuR128::new(
            self.channels,
            self.sample_rate,
            ebur128::Mode::I | ebur128::Mode::TRUE_PEAK,
        )
        .map_err(|e| anyhow::anyhow!("Failed to create EBU R128 meter: {}", e))?;

        if let Err(e) = meter.add_frames_f32(samples) {
            warn!("Failed to add frames to EBU R128: {}", e);
            return Ok(1.0);
        }

        match meter.loudness_global() {
            Ok(lufs) if lufs.is_finite() && lufs < 0.0 => {
                let gain_db = Self::TARGET_LUFS - lufs;
                let gain = 10_f32.powf(gain_db as f32 / 20.0);
                log::info!(
                    "Measured {:.1} LUFS, applying {:.1} dB of gain",
                    lufs,
                    gain_db
                );
                Ok(gain)
            }
            Ok(_) => Ok(1.0),
            Err(e) => {
                warn!("Loudness measurement failed: {}", e);
                Ok(1.0)
            }
        }
    }

    /// Run every sample through the limiter, feeding zeros at the end to
    /// flush the lookahead delay so output length matches input length.
    fn apply_gain(&self, samples: &[f32], gain: f32) -> Vec<f32> {
        let mut limiter = TruePeakLimiter::new(self.sample_rate);
        let lookahead = limiter.lookahead();
        let mut out = Vec::with_capacity(samples.len());

        for (i, &sample) in samples
            .iter()
            .chain(std::iter::repeat(&0.0).take(lookahead))
            .enumerate()
        {
            let limited = limiter.process(sample * gain, self.true_peak_limit);
            if i >= lookahead {
                out.push(limited);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_stays_empty() {
        let normalizer = LoudnessNormalizer::new(1, 16000);
        assert!(normalizer.normalize(&[]).unwrap().is_empty());
    }

    #[test]
    fn output_length_matches_input() {
        let normalizer = LoudnessNormalizer::new(1, 16000);
        let samples: Vec<f32> = (0..48000)
            .map(|i| (i as f32 * 0.05).sin() * 0.1)
            .collect();
        let out = normalizer.normalize(&samples).unwrap();
        assert_eq!(out.len(), samples.len());
    }

    #[test]
    fn silence_passes_through_unchanged() {
        let normalizer = LoudnessNormalizer::new(1, 16000);
        let samples = vec![0.0f32; 16000];
        let out = normalizer.normalize(&samples).unwrap();
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn output_respects_true_peak_limit() {
        let normalizer = LoudnessNormalizer::new(1, 16000);
        // Quiet sine that will receive substantial positive gain.
        let samples: Vec<f32> = (0..32000)
            .map(|i| (i as f32 * 0.2).sin() * 0.01)
            .collect();
        let out = normalizer.normalize(&samples).unwrap();
        let peak = out.iter().fold(0.0f32, |max, &s| max.max(s.abs()));
        assert!(peak <= 1.0, "peak {} exceeds full scale", peak);
    }

    #[test]
    fn limiter_attenuates_over_limit_samples() {
        let mut limiter = TruePeakLimiter::new(16000);
        let limit = 0.5;
        let mut max_out = 0.0f32;
        for _ in 0..1000 {
            let out = limiter.process(0.9, limit);
            max_out = max_out.max(out.abs());
        }
        assert!(max_out <= limit + 1e-6);
    }
}
