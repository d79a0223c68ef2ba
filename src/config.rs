//! Configuration structures for whisper-cli

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::device::DeviceProfile;
use crate::error::ConfigError;

/// Environment variable pointing at an optional TOML configuration file
pub const CONFIG_ENV: &str = "WHISPER_CLI_CONFIG";
/// Environment variable overriding the model directory
pub const MODEL_DIR_ENV: &str = "WHISPER_CLI_MODEL_DIR";

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding GGML model files
    pub model_dir: PathBuf,
    /// Language for transcription
    pub language: String,
    /// Model size used when none is given on the command line
    pub model_size: ModelSize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("./models"),
            language: "en".to_string(),
            model_size: ModelSize::Small,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Resolve configuration: the file named by `WHISPER_CLI_CONFIG` when set,
    /// defaults otherwise, with the model directory env override applied last.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };

        if let Ok(dir) = std::env::var(MODEL_DIR_ENV) {
            config.model_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// Path of the GGML model file for the given size
    pub fn model_path(&self, size: ModelSize) -> PathBuf {
        self.model_dir.join(size.ggml_filename())
    }
}

/// Whisper model sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelSize {
    Tiny,
    Base,
    Small,
    Medium,
    Large,
}

impl Default for ModelSize {
    fn default() -> Self {
        ModelSize::Small
    }
}

impl std::fmt::Display for ModelSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelSize::Tiny => write!(f, "tiny"),
            ModelSize::Base => write!(f, "base"),
            ModelSize::Small => write!(f, "small"),
            ModelSize::Medium => write!(f, "medium"),
            ModelSize::Large => write!(f, "large"),
        }
    }
}

impl std::str::FromStr for ModelSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tiny" => Ok(ModelSize::Tiny),
            "base" => Ok(ModelSize::Base),
            "small" => Ok(ModelSize::Small),
            "medium" => Ok(ModelSize::Medium),
            "large" => Ok(ModelSize::Large),
            _ => Err(format!(
                "unknown model size '{}' (expected tiny, base, small, medium or large)",
                s
            )),
        }
    }
}

impl ModelSize {
    /// GGML file name this size resolves to
    pub fn ggml_filename(&self) -> String {
        format!("ggml-{}.bin", self)
    }

    /// Shell command that fetches the model file for this size
    pub fn download_hint(&self) -> String {
        format!(
            "curl -L --progress-bar -o models/{} https://huggingface.co/ggerganov/whisper.cpp/resolve/main/{}",
            self.ggml_filename(),
            self.ggml_filename()
        )
    }
}

/// Decoding parameters tied to the selected compute device
#[derive(Debug, Clone)]
pub struct InferenceParams {
    /// Beam search width (1 = greedy decoding)
    pub beam_size: u32,
    /// Suppress non-speech regions before inference
    pub vad_filter: bool,
    /// Sampling temperature (0 = deterministic)
    pub temperature: f32,
    /// Entropy threshold flagging compression-style loops
    pub entropy_threshold: f32,
    /// Mean log-probability below which a segment is rejected
    pub logprob_threshold: f32,
    /// Probability above which a segment is treated as non-speech
    pub no_speech_threshold: f32,
}

impl InferenceParams {
    /// Parameter set for the given device: wide beam and VAD filtering on an
    /// accelerator, cheapest settings on CPU.
    pub fn for_device(profile: &DeviceProfile) -> Self {
        Self {
            beam_size: if profile.gpu_available { 5 } else { 1 },
            vad_filter: profile.gpu_available,
            temperature: 0.0,
            entropy_threshold: 2.4,
            logprob_threshold: -1.0,
            no_speech_threshold: 0.6,
        }
    }
}
