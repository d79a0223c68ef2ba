//! Integration tests for whisper-cli

use std::path::Path;

use whisper_cli::{
    assemble_text, clamp_repetition, load_wav, suppress_silence, Config, ErrorReport, ModelSize,
    SttEngine, VadConfig, WHISPER_SAMPLE_RATE,
};

/// Generate synthetic audio that simulates speech
fn generate_speech(sample_rate: u32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (sample_rate as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            // Mix of frequencies to simulate speech formants
            let f1 = 300.0;
            let f2 = 1000.0;
            let f3 = 2500.0;

            amplitude
                * (0.5 * (2.0 * std::f32::consts::PI * f1 * t).sin()
                    + 0.3 * (2.0 * std::f32::consts::PI * f2 * t).sin()
                    + 0.2 * (2.0 * std::f32::consts::PI * f3 * t).sin())
        })
        .collect()
}

/// Generate silence with minimal noise
fn generate_silence(sample_rate: u32, duration_secs: f32) -> Vec<f32> {
    let num_samples = (sample_rate as f32 * duration_secs) as usize;
    vec![0.0001; num_samples]
}

fn write_wav(path: &Path, samples: &[f32], sample_rate: u32, channels: u16) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("Failed to create WAV");
    for sample in samples {
        writer.write_sample(*sample).expect("Failed to write sample");
    }
    writer.finalize().expect("Failed to finalize WAV");
}

#[test]
fn test_config_defaults() {
    let config = Config::default();
    assert_eq!(config.language, "en");
    assert_eq!(config.model_size, ModelSize::Small);
    assert!(config
        .model_path(ModelSize::Small)
        .ends_with("ggml-small.bin"));
}

#[test]
fn test_config_from_toml() {
    let toml_str = r#"
        model_dir = "/data/whisper"
        model_size = "tiny"
    "#;

    let config: Config = toml::from_str(toml_str).expect("Failed to parse TOML");
    assert_eq!(config.model_dir, std::path::PathBuf::from("/data/whisper"));
    assert_eq!(config.model_size, ModelSize::Tiny);
    // Unset fields keep their defaults
    assert_eq!(config.language, "en");
}

#[cfg(not(any(feature = "cuda", feature = "metal")))]
#[test]
fn test_cpu_build_selects_cheap_parameters() {
    use whisper_cli::{DeviceProfile, InferenceParams};

    let profile = DeviceProfile::detect();
    let params = InferenceParams::for_device(&profile);

    assert!(!profile.gpu_available);
    assert_eq!(profile.device, "cpu");
    assert_eq!(profile.compute_type, "int8");
    assert_eq!(params.beam_size, 1);
    assert!(!params.vad_filter);
    assert_eq!(params.temperature, 0.0);
}

#[test]
fn test_five_identical_segments_keep_four() {
    let segments: Vec<String> = vec!["foo".to_string(); 5];
    let text = assemble_text(segments);
    assert_eq!(text.matches("foo").count(), 4);
}

#[test]
fn test_repetitive_transcript_is_truncated() {
    // 40 words, 5 unique: ratio 8 > 3, keep min(50, 40/3) = 13 words
    let words: Vec<&str> = ["alpha", "beta", "gamma", "delta", "epsilon"]
        .iter()
        .cycle()
        .take(40)
        .copied()
        .collect();
    let text = clamp_repetition(words.join(" "));
    assert_eq!(text.split_whitespace().count(), 13);
}

#[test]
fn test_short_segments_never_appear() {
    let segments: Vec<String> = vec![
        "  ".to_string(),
        "a".to_string(),
        "so".to_string(),
        "this stays".to_string(),
    ];
    let text = assemble_text(segments);
    assert_eq!(text, "this stays");
}

#[test]
fn test_guard_pipeline_end_to_end() {
    // Simulates a looping decode: one real sentence, then a stuck segment
    let mut segments = vec!["the meeting starts at noon".to_string()];
    segments.extend(vec!["thank you".to_string(); 10]);

    let text = clamp_repetition(assemble_text(segments));

    // The stuck segment is cut off at four occurrences
    assert!(text.matches("thank you").count() <= 4);
    assert!(text.starts_with("the meeting starts at noon"));
}

#[test]
fn test_wav_loader_roundtrip() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("tone.wav");

    let samples = generate_speech(WHISPER_SAMPLE_RATE, 1.0, 0.3);
    write_wav(&path, &samples, WHISPER_SAMPLE_RATE, 1);

    let decoded = load_wav(&path).expect("Failed to load WAV");
    assert_eq!(decoded.sample_rate, WHISPER_SAMPLE_RATE);
    assert_eq!(decoded.samples.len(), samples.len());
    assert!((decoded.duration_secs() - 1.0).abs() < 0.01);

    // Already at the target rate: no resampling
    let input = decoded.into_whisper_input().expect("Conversion failed");
    assert_eq!(input.len(), samples.len());
}

#[test]
fn test_wav_loader_downmixes_stereo() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("stereo.wav");

    // Interleaved stereo: 16000 frames
    let mono = generate_speech(WHISPER_SAMPLE_RATE, 1.0, 0.3);
    let interleaved: Vec<f32> = mono.iter().flat_map(|s| [*s, *s]).collect();
    write_wav(&path, &interleaved, WHISPER_SAMPLE_RATE, 2);

    let decoded = load_wav(&path).expect("Failed to load WAV");
    assert_eq!(decoded.samples.len(), mono.len());
    assert!((decoded.duration_secs() - 1.0).abs() < 0.01);
}

#[test]
fn test_wav_loader_resamples_to_whisper_rate() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("hi_rate.wav");

    let samples = generate_speech(44_100, 1.0, 0.3);
    write_wav(&path, &samples, 44_100, 1);

    let decoded = load_wav(&path).expect("Failed to load WAV");
    // Duration reflects the source rate
    assert!((decoded.duration_secs() - 1.0).abs() < 0.01);

    let input = decoded.into_whisper_input().expect("Resampling failed");
    // Approximately one second at 16 kHz, with resampler tolerance
    assert!(
        input.len() > 14_000 && input.len() <= 16_000,
        "Expected ~16000 samples, got {}",
        input.len()
    );
}

#[test]
fn test_wav_loader_rejects_missing_file() {
    assert!(load_wav(Path::new("/nonexistent/audio.wav")).is_err());
}

#[test]
fn test_vad_filter_removes_leading_silence() {
    let sample_rate = WHISPER_SAMPLE_RATE;
    let config = VadConfig {
        threshold: 0.01,
        min_speech_duration: 0.1,
        min_silence_duration: 0.2,
        pre_roll: 0.1,
    };

    let mut audio = generate_silence(sample_rate, 1.0);
    audio.extend(generate_speech(sample_rate, 0.5, 0.3));
    audio.extend(generate_silence(sample_rate, 1.0));

    let kept = suppress_silence(&audio, sample_rate, &config);
    assert!(!kept.is_empty());
    assert!(
        kept.len() < audio.len(),
        "Expected silence removed, kept {}/{}",
        kept.len(),
        audio.len()
    );
}

#[test]
fn test_missing_model_yields_install_hint() {
    let result = SttEngine::load(
        Path::new("/nonexistent/ggml-small.bin"),
        ModelSize::Small,
        "en",
        false,
    );
    let err = result.err().expect("Expected load failure");

    let value = serde_json::to_value(ErrorReport::from_error(&err, "input.wav")).unwrap();
    assert_eq!(value["error"], "whisper model not available");
    assert!(value["install_command"]
        .as_str()
        .unwrap()
        .contains("ggml-small.bin"));
    assert!(value.get("audio_file").is_none());
}
