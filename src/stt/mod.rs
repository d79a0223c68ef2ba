//! Speech-to-text engine and transcript post-processing

pub mod engine;
pub mod repetition;

pub use engine::{RawTranscription, Segment, SttEngine};
pub use repetition::{assemble_text, clamp_repetition};
