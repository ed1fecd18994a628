//! OXC-based script walker.
//!
//! Walks one script block (or one inline markup expression) depth-first and
//! emits documented items into the shared [`ParseState`]:
//! - Variable and function declarations, including exports
//! - Reactive `$:` assignments
//! - Imports and imported sub-components
//! - Event dispatch calls
//!
//! ## Module Structure
//!
//! - [`process`] - Level-0 statement rules
//! - [`walk`] - Nested walking, dispatch detection and dependency collection
//! - [`extract`] - Comments, binding names, parameters and literal inspection

mod extract;
mod process;
mod walk;

use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;
use vellum_carton::{CompactString, FxHashMap};
use vellum_relief::{DocComment, ParseError, ScriptBlock, ScriptScope, Visibility};

use crate::comment::parse_comment;
use crate::context::{ParseContext, ParseState};
use crate::table::{resolve_path, Declaration};

pub use extract::leading_comment;

/// Name given to events whose name could not be resolved.
pub const UNRESOLVED_EVENT_NAME: &str = "****unhandled-event-name****";

/// Walker state for one block.
pub(crate) struct ScriptWalker<'s, 'a> {
    pub(crate) ctx: ParseContext<'a>,
    pub(crate) state: &'s mut ParseState,
    /// Declarations of enclosing function bodies, innermost last.
    frames: Vec<FxHashMap<CompactString, Declaration>>,
    /// Start of the statement currently being walked.
    statement_start: Option<u32>,
}

impl<'s, 'a> ScriptWalker<'s, 'a> {
    pub(crate) fn new(ctx: ParseContext<'a>, state: &'s mut ParseState) -> Self {
        Self {
            ctx,
            state,
            frames: Vec::new(),
            statement_start: None,
        }
    }

    #[inline]
    pub(crate) fn enter_frame(&mut self) {
        self.frames.push(FxHashMap::default());
    }

    #[inline]
    pub(crate) fn exit_frame(&mut self) {
        self.frames.pop();
    }

    /// Record a nested declaration in the innermost frame.
    pub(crate) fn record_local(&mut self, name: CompactString, declaration: Declaration) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name, declaration);
        }
    }

    /// Resolve a member path, nearest enclosing frame first, then the table.
    pub(crate) fn resolve_path(&self, path: &[CompactString]) -> Option<CompactString> {
        resolve_path(path, &|name: &str| {
            self.frames
                .iter()
                .rev()
                .find_map(|frame| frame.get(name))
                .or_else(|| self.state.table.resolve(name))
        })
    }

    /// First comment immediately preceding one of the candidate offsets.
    pub(crate) fn comment_before(&self, candidates: &[u32]) -> Option<&'a str> {
        candidates
            .iter()
            .find_map(|&pos| leading_comment(self.ctx.source, pos))
    }

    /// Parsed comment for the candidates, or an empty one.
    pub(crate) fn doc_comment(&self, candidates: &[u32], default: Visibility) -> DocComment {
        match self.comment_before(candidates) {
            Some(text) => parse_comment(text, default),
            None => DocComment::empty(default),
        }
    }

    /// Run `f` with `start` as the current statement.
    pub(crate) fn in_statement(&mut self, start: u32, f: impl FnOnce(&mut Self)) {
        let previous = self.statement_start.replace(start);
        f(self);
        self.statement_start = previous;
    }
}

fn syntax_error(ctx: &ParseContext<'_>, message: String) -> ParseError {
    ParseError::Syntax {
        scope: ctx.scope,
        offset: ctx.offset,
        message,
    }
}

/// Walk one script block.
///
/// A syntax error anywhere in the block aborts the whole component parse.
pub fn parse_script_block(block: &ScriptBlock, state: &mut ParseState) -> Result<(), ParseError> {
    let ctx = ParseContext::for_block(block);
    let source_type = if block.is_typescript() {
        SourceType::mjs().with_typescript(true)
    } else {
        SourceType::mjs()
    };

    tracing::debug!(
        scope = %ctx.scope,
        offset = ctx.offset,
        typescript = block.is_typescript(),
        "walking script block"
    );

    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, ctx.source, source_type).parse();

    if !ret.errors.is_empty() {
        let message = ret
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(syntax_error(&ctx, message));
    }

    let mut walker = ScriptWalker::new(ctx, state);
    for stmt in ret.program.body.iter() {
        process::process_statement(&mut walker, stmt);
    }

    Ok(())
}

/// Walk an expression embedded in a markup attribute.
///
/// `offset` is the position of `expression` in the component file.
pub fn parse_inline_expression(
    expression: &str,
    offset: u32,
    state: &mut ParseState,
) -> Result<(), ParseError> {
    // Wrap in parentheses so object literals parse as expressions
    let mut wrapped = String::with_capacity(expression.len() + 2);
    wrapped.push('(');
    wrapped.push_str(expression);
    wrapped.push(')');

    let ctx = ParseContext::new(ScriptScope::Inline, offset.saturating_sub(1), &wrapped);

    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, &wrapped, SourceType::mjs()).parse_expression();

    match parsed {
        Ok(expr) => {
            let mut walker = ScriptWalker::new(ctx, state);
            walk::walk_expression(&mut walker, &expr);
            Ok(())
        }
        Err(errors) => {
            let message = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            Err(ParseError::Syntax {
                scope: ScriptScope::Inline,
                offset,
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests;
