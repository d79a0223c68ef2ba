//! JSON records written to stdout
//!
//! The calling process parses stdout as a single JSON object, success or
//! failure, so nothing else may ever be written there. Diagnostics belong on
//! stderr.

use std::io::{self, Write};

use serde::Serialize;

use crate::error::{EngineError, TranscribeError};

/// Success record emitted after a completed transcription
#[derive(Debug, Serialize)]
pub struct TranscriptionReport {
    /// Final transcript after repetition guards
    pub text: String,
    /// Language the decode ran with
    pub language: String,
    /// Confidence of the language choice (1.0 when pinned)
    pub language_probability: f64,
    /// Source audio duration in seconds
    pub duration: f64,
    /// Compute device identifier
    pub device: &'static str,
    /// Numeric precision mode
    pub compute_type: &'static str,
    /// Model size used
    pub model_size: String,
    /// Beam search width used for decoding
    pub beam_size: u32,
    /// Whether voice-activity filtering ran
    pub vad_filter: bool,
    /// Whether an accelerator was available
    pub gpu_available: bool,
    /// Wall-clock timing breakdown
    pub timing: Timing,
}

/// Wall-clock timing in whole milliseconds
#[derive(Debug, Serialize)]
pub struct Timing {
    pub model_load_ms: u64,
    pub transcription_ms: u64,
    pub total_ms: u64,
}

/// Failure record emitted on any error
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_file: Option<String>,
}

impl ErrorReport {
    /// Record for an invalid command line
    pub fn usage(program: &str) -> Self {
        Self {
            error: format!("usage: {} <audio_file_path> [model_size]", program),
            details: None,
            install_command: None,
            audio_file: None,
        }
    }

    /// Map a pipeline error to the record shape the caller expects.
    ///
    /// A missing model file is the precondition failure and carries a fetch
    /// hint; everything else reports as a failed transcription of the input.
    pub fn from_error(err: &TranscribeError, audio_file: &str) -> Self {
        match err {
            TranscribeError::Engine(EngineError::ModelNotFound { size, .. }) => Self {
                error: "whisper model not available".to_string(),
                details: Some(err.to_string()),
                install_command: Some(size.download_hint()),
                audio_file: None,
            },
            _ => Self {
                error: "transcription failed".to_string(),
                details: Some(err.to_string()),
                install_command: None,
                audio_file: Some(audio_file.to_string()),
            },
        }
    }
}

/// Write one JSON record to stdout as a single line.
///
/// Serialization of these record types cannot realistically fail, but a
/// parseable object is still emitted if it somehow does.
pub fn emit<T: Serialize>(record: &T) -> io::Result<()> {
    let line = serde_json::to_string(record).unwrap_or_else(|e| {
        format!("{{\"error\": \"serialization failed\", \"details\": \"{}\"}}", e)
    });

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", line)?;
    stdout.flush()
}
