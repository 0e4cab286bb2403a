//! Emoji extraction from message text.
//!
//! Emoji are matched at the grapheme-cluster level so multi-codepoint
//! sequences (skin tones, ZWJ families, variation selectors) count as one
//! emoji each.

use unicode_segmentation::UnicodeSegmentation;

/// All emoji graphemes in `text`, in order of appearance.
pub fn emojis_in(text: &str) -> Vec<&str> {
    text.graphemes(true)
        .filter(|grapheme| emojis::get(grapheme).is_some())
        .collect()
}

/// Number of emoji graphemes in `text`.
pub fn emoji_count(text: &str) -> usize {
    emojis_in(text).len()
}
