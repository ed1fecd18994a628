//! Tag classification tables for the markup tokenizer.

use phf::{phf_set, Set};

/// Tags whose content is raw text and must not be tokenized as markup.
pub static RAW_TEXT_TAGS: Set<&'static str> = phf_set! {
    "script",
    "style",
    "textarea",
    "title",
};

/// Check if a tag's content is raw text (case-insensitive).
#[inline]
pub fn is_raw_text_tag(tag: &str) -> bool {
    if tag.bytes().any(|b| b.is_ascii_uppercase()) {
        RAW_TEXT_TAGS.contains(tag.to_ascii_lowercase().as_str())
    } else {
        RAW_TEXT_TAGS.contains(tag)
    }
}
