// Abstractive summarization with a quantized Flan-T5 model via candle.
//
// Model artifacts come from the HuggingFace hub on first use and are cached
// by hf-hub. Decoding is greedy with a token budget and bigram repetition
// blocking; inference holds a KV cache, so callers serialize access.

use anyhow::{anyhow, Result};
use std::collections::HashSet;

use candle_core::{Device, Tensor};
use candle_transformers::models::quantized_t5::{Config as T5Config, T5ForConditionalGeneration};
use candle_transformers::quantized_var_builder::VarBuilder;
use hf_hub::api::sync::ApiBuilder;
use tokenizers::Tokenizer;

use crate::config::SummarizerConfig;

/// T5 task prefix for summarization.
const TASK_PREFIX: &str = "summarize: ";

/// Maximum number of tokens generated per chunk.
const MAX_NEW_TOKENS: usize = 120;

/// The end-of-sequence token is suppressed until this many tokens exist, so
/// the model cannot bail out with a two-word summary.
const MIN_NEW_TOKENS: usize = 30;

/// T5 end-of-sequence token id.
const EOS_TOKEN: u32 = 1;

/// T5 decoder start (pad) token id.
const DECODER_START_TOKEN: u32 = 0;

pub struct Summarizer {
    model: T5ForConditionalGeneration,
    tokenizer: Tokenizer,
    device: Device,
}

impl Summarizer {
    /// Load the quantized model, config and tokenizer from the hub cache,
    /// downloading on first use. A token from configuration unlocks gated
    /// repositories.
    pub fn load(config: &SummarizerConfig, auth_token: Option<&str>) -> Result<Self> {
        let device = Device::Cpu;

        let api = ApiBuilder::new()
            .with_token(auth_token.map(str::to_string))
            .build()
            .map_err(|e| anyhow!("HF hub API init: {}", e))?;
        let repo = api.model(config.hf_repo.clone());

        let model_path = repo
            .get(&config.model_file)
            .map_err(|e| anyhow!("download model {}: {}", config.model_file, e))?;
        let config_path = repo
            .get(&config.config_file)
            .map_err(|e| anyhow!("download config {}: {}", config.config_file, e))?;
        let tokenizer_path = repo
            .get(&config.tokenizer_file)
            .map_err(|e| anyhow!("download tokenizer {}: {}", config.tokenizer_file, e))?;

        let config_bytes = std::fs::read(&config_path)?;
        let t5_config: T5Config = serde_json::from_slice(&config_bytes)
            .map_err(|e| anyhow!("parse T5 config: {}", e))?;

        let vb = VarBuilder::from_gguf(&model_path, &device)
            .map_err(|e| anyhow!("load GGUF model {}: {}", model_path.display(), e))?;
        let model = T5ForConditionalGeneration::load(vb, &t5_config)
            .map_err(|e| anyhow!("init T5 model: {}", e))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("load tokenizer {}: {}", tokenizer_path.display(), e))?;

        log::info!("Summarization model loaded from {}", config.hf_repo);

        Ok(Self {
            model,
            tokenizer,
            device,
        })
    }

    /// Summarize one chunk of transcript text.
    pub fn summarize(&mut self, text: &str) -> Result<String> {
        self.model.clear_kv_cache();
        self.generate(&format!("{}{}", TASK_PREFIX, text))
    }

    /// Encode the prompt and run greedy decoding with an incremental KV
    /// cache: first step feeds the pad token, later steps only the newest
    /// token.
    fn generate(&mut self, prompt: &str) -> Result<String> {
        let encoding = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| anyhow!("tokenize: {}", e))?;

        let input_ids: Vec<u32> = encoding.get_ids().to_vec();
        let input_tensor = Tensor::new(input_ids.as_slice(), &self.device)?.unsqueeze(0)?;

        let encoder_output = self.model.encode(&input_tensor)?;

        let mut decoded_ids: Vec<u32> = vec![DECODER_START_TOKEN];
        let mut next_input = vec![DECODER_START_TOKEN];
        let mut seen_bigrams: HashSet<(u32, u32)> = HashSet::new();

        for step in 0..MAX_NEW_TOKENS {
            let decoder_input = Tensor::new(next_input.as_slice(), &self.device)?.unsqueeze(0)?;

            let logits = self.model.decode(&decoder_input, &encoder_output)?;
            let seq_len = logits.dim(1)?;
            let next_logits: Vec<f32> = logits
                .get_on_dim(1, seq_len - 1)?
                .flatten_all()?
                .to_vec1::<f32>()?;

            let last_token = *decoded_ids.last().unwrap_or(&DECODER_START_TOKEN);
            let banned = banned_tokens(&seen_bigrams, last_token);
            let allow_eos = step >= MIN_NEW_TOKENS;

            let next_token = pick_next_token(&next_logits, &banned, allow_eos)
                .ok_or_else(|| anyhow!("decoder produced no candidate token"))?;

            if next_token == EOS_TOKEN {
                break;
            }

            seen_bigrams.insert((last_token, next_token));
            decoded_ids.push(next_token);
            next_input = vec![next_token];
        }

        let output = self
            .tokenizer
            .decode(&decoded_ids[1..], true)
            .map_err(|e| anyhow!("detokenize: {}", e))?;

        Ok(output.trim().to_string())
    }
}

/// Tokens that would repeat an already-generated bigram after `last_token`.
fn banned_tokens(seen_bigrams: &HashSet<(u32, u32)>, last_token: u32) -> HashSet<u32> {
    seen_bigrams
        .iter()
        .filter(|(first, _)| *first == last_token)
        .map(|(_, second)| *second)
        .collect()
}

/// Greedy pick over raw logits, skipping banned tokens and, until the
/// minimum length is reached, the end-of-sequence token.
fn pick_next_token(logits: &[f32], banned: &HashSet<u32>, allow_eos: bool) -> Option<u32> {
    logits
        .iter()
        .enumerate()
        .filter(|(idx, _)| {
            let token = *idx as u32;
            if banned.contains(&token) {
                return false;
            }
            allow_eos || token != EOS_TOKEN
        })
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(idx, _)| idx as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_argmax() {
        let logits = vec![0.1, 0.2, 5.0, 0.3];
        assert_eq!(pick_next_token(&logits, &HashSet::new(), true), Some(2));
    }

    #[test]
    fn banned_tokens_are_skipped() {
        let logits = vec![0.1, 0.2, 5.0, 0.3];
        let banned: HashSet<u32> = [2].into_iter().collect();
        assert_eq!(pick_next_token(&logits, &banned, true), Some(3));
    }

    #[test]
    fn eos_is_suppressed_before_minimum_length() {
        // EOS (id 1) has the highest logit but must not win yet.
        let logits = vec![0.1, 9.0, 0.5, 0.3];
        assert_eq!(pick_next_token(&logits, &HashSet::new(), false), Some(2));
        assert_eq!(pick_next_token(&logits, &HashSet::new(), true), Some(1));
    }

    #[test]
    fn bigram_blocking_bans_the_right_followers() {
        let mut seen = HashSet::new();
        seen.insert((7, 9));
        seen.insert((7, 11));
        seen.insert((8, 9));

        let banned = banned_tokens(&seen, 7);
        assert!(banned.contains(&9));
        assert!(banned.contains(&11));
        assert_eq!(banned.len(), 2);

        assert!(banned_tokens(&seen, 3).is_empty());
    }

    #[test]
    fn everything_banned_yields_none() {
        let logits = vec![0.1, 0.2];
        let banned: HashSet<u32> = [0u32, 1].into_iter().collect();
        assert_eq!(pick_next_token(&logits, &banned, true), None);
    }

    #[test]
    fn summarizer_is_send() {
        fn assert_send<T: Send + 'static>() {}
        assert_send::<Summarizer>();
    }
}
