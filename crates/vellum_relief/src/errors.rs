//! Parse errors and non-fatal diagnostics.

use serde::Serialize;
use thiserror::Error;

use crate::types::{Location, ScriptScope};

/// Fatal outcome of a parse.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A requested feature name is not supported.
    #[error("unsupported feature `{name}`, expected one of: {expected}")]
    UnsupportedFeature { name: String, expected: String },

    /// An ignored visibility is not one of public/protected/private.
    #[error("unsupported visibility `{0}` in ignored visibilities, expected public, protected or private")]
    UnsupportedVisibility(String),

    /// Script text that does not parse. Aborts the whole component.
    #[error("syntax error in {scope} script at offset {offset}: {message}")]
    Syntax {
        scope: ScriptScope,
        offset: u32,
        message: String,
    },

    /// Options that could not be deserialized.
    #[error("invalid options: {0}")]
    Options(#[from] serde_json::Error),
}

/// Kind of a recoverable issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticCode {
    /// A dispatched event name could not be traced to a literal.
    UnresolvedEventName,
    /// A dispatch call carries an `@event` keyword without a name.
    EmptyEventKeyword,
}

/// A recoverable issue found while walking; never aborts the parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            code,
            message: message.into(),
            location,
        }
    }
}
