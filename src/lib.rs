//! Single-shot Whisper transcription with repetition guards
//!
//! Transcribes one audio file with a local Whisper model and renders the
//! outcome as exactly one JSON record on stdout; diagnostics go to stderr.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `audio`: WAV decoding, resampling, and voice-activity filtering
//! - `device`: compute device detection
//! - `stt`: Whisper engine integration and repetition guards
//! - `config`: configuration structures
//! - `output`: the stdout JSON records
//! - `error`: error types
//!
//! # Example
//!
//! ```no_run
//! use whisper_cli::{Config, DeviceProfile, InferenceParams, ModelSize, SttEngine};
//!
//! let config = Config::default();
//! let profile = DeviceProfile::detect();
//! let params = InferenceParams::for_device(&profile);
//!
//! let engine = SttEngine::load(
//!     &config.model_path(ModelSize::Small),
//!     ModelSize::Small,
//!     &config.language,
//!     profile.gpu_available,
//! )
//! .unwrap();
//!
//! let audio = whisper_cli::load_wav(std::path::Path::new("input.wav")).unwrap();
//! let raw = engine
//!     .transcribe(&audio.into_whisper_input().unwrap(), &params)
//!     .unwrap();
//! let text = whisper_cli::clamp_repetition(whisper_cli::assemble_text(
//!     raw.segments.into_iter().map(|s| s.text),
//! ));
//! ```

pub mod audio;
pub mod config;
pub mod device;
pub mod error;
pub mod output;
pub mod stt;

// Re-exports for convenience
pub use audio::{load_wav, suppress_silence, DecodedAudio, VadConfig, WHISPER_SAMPLE_RATE};
pub use config::{Config, InferenceParams, ModelSize};
pub use device::DeviceProfile;
pub use error::{AudioError, ConfigError, EngineError, Result, TranscribeError};
pub use output::{emit, ErrorReport, Timing, TranscriptionReport};
pub use stt::{assemble_text, clamp_repetition, RawTranscription, Segment, SttEngine};
