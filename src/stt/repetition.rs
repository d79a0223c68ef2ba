//! Repetition guards for degenerate decoder output
//!
//! A looping decode shows up two ways: the same segment emitted back to back,
//! or a transcript where a handful of words repeat endlessly. The segment
//! guard stops consumption after four identical segments in a row; the ratio
//! guard truncates a transcript whose word count is more than three times its
//! unique-word count. The truncation discards the tail outright rather than
//! trying to resynchronize.

use std::collections::HashSet;

use tracing::{debug, warn};

/// Consecutive identical segments tolerated before consumption stops
pub const MAX_SEGMENT_REPEATS: u32 = 4;
/// Segments with this many characters or fewer are dropped
pub const MIN_SEGMENT_CHARS: usize = 2;
/// Words-per-unique-word ratio above which the transcript is truncated
pub const REPETITION_RATIO_LIMIT: f64 = 3.0;
/// Upper bound on words kept when the ratio guard fires
pub const TRUNCATED_WORD_CAP: usize = 50;
/// Transcripts at or below this word count bypass the ratio guard
pub const RATIO_GUARD_MIN_WORDS: usize = 10;

/// Concatenate segment texts, stopping once the same trimmed text has
/// repeated `MAX_SEGMENT_REPEATS` times in a row.
///
/// The repeat check runs before the length filter, so segments too short to
/// be kept still count toward a repeat run. A segment that differs from its
/// predecessor resets the run.
pub fn assemble_text<I>(segments: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut text = String::new();
    let mut last = String::new();
    let mut repeats = 0u32;
    let mut consumed = 0usize;

    for segment in segments {
        consumed += 1;
        let trimmed = segment.trim();

        if trimmed == last {
            repeats += 1;
            warn!(
                "Repetitive segment detected (count: {}): '{}'",
                repeats,
                snippet(trimmed)
            );
            if repeats >= MAX_SEGMENT_REPEATS {
                warn!("Stopping segment consumption due to excessive repetition");
                break;
            }
        } else {
            repeats = 0;
            last = trimmed.to_string();
        }

        if trimmed.chars().count() > MIN_SEGMENT_CHARS {
            text.push_str(trimmed);
            text.push(' ');
        }
    }

    debug!("Processed {} segments, {} chars", consumed, text.len());
    text.trim().to_string()
}

/// Truncate `text` when its word-level repetition ratio exceeds the limit.
///
/// Keeps the first `min(TRUNCATED_WORD_CAP, word_count / 3)` words joined by
/// single spaces; short transcripts pass through untouched.
pub fn clamp_repetition(text: String) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= RATIO_GUARD_MIN_WORDS {
        return text;
    }

    let unique: HashSet<&str> = words.iter().copied().collect();
    let ratio = words.len() as f64 / unique.len() as f64;
    if ratio <= REPETITION_RATIO_LIMIT {
        return text;
    }

    let keep = TRUNCATED_WORD_CAP.min(words.len() / 3);
    warn!(
        "High repetition ratio {:.2}, truncating {} words to {}",
        ratio,
        words.len(),
        keep
    );
    words[..keep].join(" ")
}

fn snippet(text: &str) -> String {
    text.chars().take(50).collect()
}
