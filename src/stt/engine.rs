//! Whisper-based transcription engine

use std::path::Path;

use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::config::{InferenceParams, ModelSize};
use crate::error::{EngineError, Result};

/// Raw model output before post-processing
#[derive(Debug, Clone)]
pub struct RawTranscription {
    /// Ordered transcription segments
    pub segments: Vec<Segment>,
    /// Language the decode ran with
    pub language: String,
}

/// Individual transcription segment
#[derive(Debug, Clone)]
pub struct Segment {
    /// Segment text
    pub text: String,
    /// Start time in milliseconds
    pub start_ms: i64,
    /// End time in milliseconds
    pub end_ms: i64,
}

/// Whisper-based Speech-to-Text engine
pub struct SttEngine {
    ctx: WhisperContext,
    language: String,
}

impl SttEngine {
    /// Load a GGML model file onto the selected device
    pub fn load(model_path: &Path, size: ModelSize, language: &str, use_gpu: bool) -> Result<Self> {
        if !model_path.exists() {
            return Err(EngineError::ModelNotFound {
                size,
                path: model_path.display().to_string(),
            }
            .into());
        }

        info!("Loading Whisper model from: {}", model_path.display());

        let mut ctx_params = WhisperContextParameters::default();
        ctx_params.use_gpu(use_gpu);

        let ctx =
            WhisperContext::new_with_params(model_path.to_str().unwrap_or_default(), ctx_params)
                .map_err(|e| EngineError::ModelLoad(e.to_string()))?;

        info!("Whisper model loaded");

        Ok(Self {
            ctx,
            language: language.to_string(),
        })
    }

    /// Run inference over 16kHz mono f32 samples
    pub fn transcribe(&self, samples: &[f32], params: &InferenceParams) -> Result<RawTranscription> {
        if samples.is_empty() {
            return Err(EngineError::InvalidAudioData.into());
        }

        debug!(
            "Transcribing {} samples ({:.2}s)",
            samples.len(),
            samples.len() as f32 / 16000.0
        );

        let strategy = if params.beam_size > 1 {
            SamplingStrategy::BeamSearch {
                beam_size: params.beam_size as i32,
                patience: -1.0,
            }
        } else {
            SamplingStrategy::Greedy { best_of: 1 }
        };

        let mut full_params = FullParams::new(strategy);
        full_params.set_n_threads(num_threads());
        full_params.set_language(Some(&self.language));
        full_params.set_translate(false);
        full_params.set_temperature(params.temperature);
        full_params.set_entropy_thold(params.entropy_threshold);
        full_params.set_logprob_thold(params.logprob_threshold);
        full_params.set_no_speech_thold(params.no_speech_threshold);
        // No conditioning on previous text: keeps decode loops from
        // propagating across segments
        full_params.set_no_context(true);
        full_params.set_print_special(false);
        full_params.set_print_progress(false);
        full_params.set_print_realtime(false);
        full_params.set_print_timestamps(false);
        full_params.set_single_segment(false);

        // Create state and run inference
        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| EngineError::Whisper(e.to_string()))?;

        state
            .full(full_params, samples)
            .map_err(|e| EngineError::Transcription(e.to_string()))?;

        // Extract results
        let num_segments = state
            .full_n_segments()
            .map_err(|e| EngineError::Transcription(e.to_string()))?;

        let mut segments = Vec::with_capacity(num_segments as usize);
        for i in 0..num_segments {
            let text = state
                .full_get_segment_text(i)
                .map_err(|e| EngineError::Transcription(e.to_string()))?;

            let start = state
                .full_get_segment_t0(i)
                .map_err(|e| EngineError::Transcription(e.to_string()))? as i64
                * 10; // centiseconds to ms

            let end = state
                .full_get_segment_t1(i)
                .map_err(|e| EngineError::Transcription(e.to_string()))? as i64
                * 10;

            segments.push(Segment {
                text,
                start_ms: start,
                end_ms: end,
            });
        }

        let language = state
            .full_lang_id()
            .ok()
            .and_then(whisper_rs::get_lang_str)
            .map(|lang| lang.to_string())
            .unwrap_or_else(|| self.language.clone());

        debug!("Transcription complete: {} segments", segments.len());

        Ok(RawTranscription { segments, language })
    }

    /// Get the language configured for transcription
    pub fn language(&self) -> &str {
        &self.language
    }
}

fn num_threads() -> i32 {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .min(8) as i32
}
