//! Text helpers shared by the read-aloud path.

use unicode_normalization::UnicodeNormalization;

/// Normalize a block's text for speech synthesis. Returns an empty string for
/// blocks with nothing speakable.
pub fn speakable_text(content: &str) -> String {
    content.nfc().collect::<String>().trim().to_string()
}

/// Character offsets at which words start, in the same block-relative frame
/// that speech-boundary callbacks report.
pub fn word_start_offsets(text: &str) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut in_word = false;
    for (offset, ch) in text.chars().enumerate() {
        if ch.is_whitespace() {
            in_word = false;
        } else if !in_word {
            in_word = true;
            offsets.push(offset);
        }
    }
    offsets
}
