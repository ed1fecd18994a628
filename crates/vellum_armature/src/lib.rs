//! Armature - The markup tokenizer under Vellum's template walker.
//!
//! The tokenizer is a byte-level state machine that reports tags,
//! attributes, comments, text and `{...}` blocks through the [`Callbacks`]
//! trait. It never builds a tree and never rejects malformed markup.

pub mod tokenizer;

pub use tokenizer::{Callbacks, QuoteType, Tokenizer};
