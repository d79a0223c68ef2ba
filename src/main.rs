//! whisper-cli: transcribe one audio file, print one JSON record

use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use whisper_cli::{
    assemble_text, clamp_repetition, emit, load_wav, suppress_silence, Config, DeviceProfile,
    ErrorReport, InferenceParams, ModelSize, Result, SttEngine, Timing, TranscriptionReport,
    VadConfig,
};

const PROGRAM: &str = "whisper-cli";

/// Transcribe an audio file with a local Whisper model
#[derive(Parser)]
#[command(name = "whisper-cli")]
#[command(about = "Transcribe an audio file and print one JSON record", long_about = None)]
struct Cli {
    /// Audio file to transcribe (WAV)
    audio_file: String,

    /// Model size (tiny, base, small, medium, large)
    model_size: Option<String>,
}

fn main() -> ExitCode {
    // Diagnostics go to stderr only; stdout carries the JSON record
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let started = Instant::now();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Keep clap's rendering for humans, the record for the caller
            eprintln!("{}", e.render());
            let _ = emit(&ErrorReport::usage(PROGRAM));
            return ExitCode::FAILURE;
        }
    };

    match transcribe(Path::new(&cli.audio_file), cli.model_size.as_deref(), started) {
        Ok(report) => {
            if emit(&report).is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            let _ = emit(&ErrorReport::from_error(&err, &cli.audio_file));
            ExitCode::FAILURE
        }
    }
}

/// Run the full pipeline: device selection, model load, decode, inference,
/// repetition guards, report assembly.
fn transcribe(
    audio_path: &Path,
    requested_size: Option<&str>,
    started: Instant,
) -> Result<TranscriptionReport> {
    let config = Config::load()?;
    let size: ModelSize = match requested_size {
        Some(raw) => raw.parse().map_err(|_| {
            whisper_cli::ConfigError::InvalidValue {
                field: "model_size".to_string(),
                value: raw.to_string(),
            }
        })?,
        None => config.model_size,
    };

    let profile = DeviceProfile::detect();
    let params = InferenceParams::for_device(&profile);
    info!(
        "Transcription settings: model={}, beam_size={}, vad_filter={}, temperature={}",
        size, params.beam_size, params.vad_filter, params.temperature
    );

    let engine = SttEngine::load(
        &config.model_path(size),
        size,
        &config.language,
        profile.gpu_available,
    )?;
    let model_load_ms = started.elapsed().as_millis() as u64;

    let inference_started = Instant::now();

    let decoded = load_wav(audio_path)?;
    let duration = decoded.duration_secs();

    let mut samples = decoded.into_whisper_input()?;
    if params.vad_filter {
        samples = suppress_silence(&samples, whisper_cli::WHISPER_SAMPLE_RATE, &VadConfig::default());
    }

    let raw = engine.transcribe(&samples, &params)?;
    let language = raw.language.clone();
    let text = clamp_repetition(assemble_text(raw.segments.into_iter().map(|s| s.text)));

    let transcription_ms = inference_started.elapsed().as_millis() as u64;
    let total_ms = started.elapsed().as_millis() as u64;

    info!("Final text length: {} chars", text.len());

    Ok(TranscriptionReport {
        text,
        language,
        language_probability: 1.0,
        duration,
        device: profile.device,
        compute_type: profile.compute_type,
        model_size: size.to_string(),
        beam_size: params.beam_size,
        vad_filter: params.vad_filter,
        gpu_available: profile.gpu_available,
        timing: Timing {
            model_load_ms,
            transcription_ms,
            total_ms,
        },
    })
}
