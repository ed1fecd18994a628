//! Relief - The documented surface of a Vellum component.
//!
//! Every type a parse produces or consumes lives here: the semantic items
//! emitted by the walkers, the typed expressions parsed out of doc comments,
//! the final component document, parse options and errors.

pub mod document;
pub mod errors;
pub mod item;
pub mod options;
pub mod types;

pub use document::{Category, ComponentDoc};
pub use errors::{Diagnostic, DiagnosticCode, ParseError};
pub use item::*;
pub use options::{
    ComponentSource, DefaultVisibilities, Features, ParseOptions, ResolvedOptions, ScriptBlock,
};
pub use types::*;
