//! Custom error types for whisper-cli

use thiserror::Error;

use crate::config::ModelSize;

/// Main error type for the transcription pipeline
#[derive(Error, Debug)]
pub enum TranscribeError {
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Audio decoding errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to open audio file: {0}")]
    Open(String),

    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("Resampling error: {0}")]
    Resampling(String),

    #[error("Audio file contains no samples")]
    Empty,
}

/// Transcription engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Model file not found: {path}")]
    ModelNotFound { size: ModelSize, path: String },

    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Whisper error: {0}")]
    Whisper(String),

    #[error("Invalid audio data for transcription")]
    InvalidAudioData,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration value: {field} = {value}")]
    InvalidValue { field: String, value: String },
}

pub type Result<T> = std::result::Result<T, TranscribeError>;
