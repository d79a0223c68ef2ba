//! Voice Activity Detection module
//!
//! Energy-based detection used to suppress non-speech regions before
//! inference on the accelerator path.

use tracing::{debug, trace};

/// Result of voice activity detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadResult {
    /// Speech detected
    Speech,
    /// Silence/noise detected
    Silence,
}

/// Voice activity filter configuration
#[derive(Debug, Clone)]
pub struct VadConfig {
    /// Energy threshold for speech detection (0.0 - 1.0)
    pub threshold: f32,
    /// Minimum speech duration before entering the speech state (seconds)
    pub min_speech_duration: f32,
    /// Minimum silence duration before leaving the speech state (seconds)
    pub min_silence_duration: f32,
    /// Audio kept before each speech onset (seconds)
    pub pre_roll: f32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            threshold: 0.05,
            min_speech_duration: 0.25,
            min_silence_duration: 0.5,
            pre_roll: 0.2,
        }
    }
}

/// Voice Activity Detector using energy-based thresholding
pub struct VoiceActivityDetector {
    /// Energy threshold for speech detection
    threshold: f32,
    /// Minimum speech duration in samples
    min_speech_samples: usize,
    /// Minimum silence duration in samples
    min_silence_samples: usize,
    /// Current state
    current_state: VadResult,
    /// Counter for state persistence
    state_counter: usize,
    /// Running average of energy for adaptive threshold
    energy_avg: f32,
    /// Smoothing factor for energy average
    energy_alpha: f32,
}

impl VoiceActivityDetector {
    /// Create a new VAD instance
    pub fn new(config: &VadConfig, sample_rate: u32) -> Self {
        let min_speech_samples = (config.min_speech_duration * sample_rate as f32) as usize;
        let min_silence_samples = (config.min_silence_duration * sample_rate as f32) as usize;

        Self {
            threshold: config.threshold,
            min_speech_samples,
            min_silence_samples,
            current_state: VadResult::Silence,
            state_counter: 0,
            energy_avg: 0.0,
            energy_alpha: 0.01, // Slow adaptation
        }
    }

    /// Process a frame of audio and return VAD result
    pub fn process(&mut self, samples: &[f32]) -> VadResult {
        let energy = self.calculate_energy(samples);

        // Update running average
        self.energy_avg = self.energy_alpha * energy + (1.0 - self.energy_alpha) * self.energy_avg;

        // Speech when over the absolute threshold OR well above the adaptive floor
        let is_speech = energy > self.threshold
            || (self.energy_avg > 0.001 && energy > self.energy_avg * 2.0);

        // State machine with hysteresis
        match (self.current_state, is_speech) {
            (VadResult::Silence, true) => {
                self.state_counter += samples.len();
                if self.state_counter >= self.min_speech_samples {
                    self.current_state = VadResult::Speech;
                    self.state_counter = 0;
                    trace!("VAD: Silence -> Speech (energy: {:.4})", energy);
                }
            }
            (VadResult::Silence, false) => {
                self.state_counter = 0;
            }
            (VadResult::Speech, false) => {
                self.state_counter += samples.len();
                if self.state_counter >= self.min_silence_samples {
                    self.current_state = VadResult::Silence;
                    self.state_counter = 0;
                    trace!("VAD: Speech -> Silence (energy: {:.4})", energy);
                }
            }
            (VadResult::Speech, true) => {
                self.state_counter = 0;
            }
        }

        self.current_state
    }

    /// Calculate RMS energy of audio samples
    fn calculate_energy(&self, samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }

        let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
        (sum_squares / samples.len() as f32).sqrt()
    }

    /// Get current VAD state
    pub fn current_state(&self) -> VadResult {
        self.current_state
    }

    /// Check if currently in speech state
    pub fn is_speech(&self) -> bool {
        self.current_state == VadResult::Speech
    }

    /// Reset VAD state
    pub fn reset(&mut self) {
        self.current_state = VadResult::Silence;
        self.state_counter = 0;
        self.energy_avg = 0.0;
    }
}

/// Remove non-speech regions from `samples`.
///
/// Returns the concatenation of detected speech regions, each preceded by a
/// short pre-roll so onsets are not clipped. Falls back to the unfiltered
/// input when the detector would discard everything.
pub fn suppress_silence(samples: &[f32], sample_rate: u32, config: &VadConfig) -> Vec<f32> {
    let mut vad = VoiceActivityDetector::new(config, sample_rate);

    let frame_size = (sample_rate as usize / 50).max(1); // 20ms frames
    let pre_roll_samples = (config.pre_roll * sample_rate as f32) as usize;

    let mut pre_roll_buffer: Vec<f32> = Vec::with_capacity(pre_roll_samples);
    let mut kept = Vec::new();
    let mut in_speech = false;

    for chunk in samples.chunks(frame_size) {
        match vad.process(chunk) {
            VadResult::Speech => {
                if !in_speech {
                    // Start of a speech region: include pre-roll
                    kept.extend(&pre_roll_buffer);
                    in_speech = true;
                }
                kept.extend(chunk);
            }
            VadResult::Silence => {
                in_speech = false;
            }
        }

        // Update pre-roll buffer
        pre_roll_buffer.extend(chunk);
        if pre_roll_buffer.len() > pre_roll_samples {
            let excess = pre_roll_buffer.len() - pre_roll_samples;
            pre_roll_buffer.drain(0..excess);
        }
    }

    if kept.is_empty() {
        debug!("VAD removed all audio, using unfiltered input");
        return samples.to_vec();
    }

    debug!("VAD kept {}/{} samples", kept.len(), samples.len());
    kept
}
