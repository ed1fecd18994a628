//! Per-block context and per-parse state shared by both walkers.

use vellum_carton::{CompactString, FxHashMap};
use vellum_relief::{
    Diagnostic, DiagnosticCode, DocComment, Location, ResolvedOptions, ScriptBlock, ScriptScope,
    SemanticItem, Visibility,
};

use crate::table::IdentifierTable;

/// Immutable view of one script block or inline expression.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    pub scope: ScriptScope,
    /// Position of `source` in the component file.
    pub offset: u32,
    pub source: &'a str,
}

impl<'a> ParseContext<'a> {
    pub fn new(scope: ScriptScope, offset: u32, source: &'a str) -> Self {
        Self {
            scope,
            offset,
            source,
        }
    }

    /// Context for a script block, picking the module or instance scope.
    pub fn for_block(block: &'a ScriptBlock) -> Self {
        let scope = if block.is_module() {
            ScriptScope::Module
        } else {
            ScriptScope::Instance
        };
        Self::new(scope, block.offset, &block.content)
    }

    /// Translate a block-relative span into file coordinates.
    #[inline]
    pub fn location(&self, start: u32, end: u32) -> Location {
        Location::new(start, end).offset_by(self.offset)
    }

    /// Declarations in a module block are shared between instances.
    #[inline]
    pub fn is_static(&self) -> bool {
        self.scope == ScriptScope::Module
    }
}

/// Mutable state for one component parse.
#[derive(Debug)]
pub struct ParseState {
    pub options: ResolvedOptions,
    pub table: IdentifierTable,
    /// Items in emission order.
    pub items: Vec<SemanticItem>,
    pub diagnostics: Vec<Diagnostic>,
    /// Comment documenting the whole component.
    pub component_doc: Option<DocComment>,
    /// Events already emitted by the markup walker, with their visibility.
    pub(crate) markup_events: FxHashMap<CompactString, Visibility>,
}

impl ParseState {
    pub fn new(options: ResolvedOptions) -> Self {
        Self {
            options,
            table: IdentifierTable::new(),
            items: Vec::new(),
            diagnostics: Vec::new(),
            component_doc: None,
            markup_events: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn emit(&mut self, item: SemanticItem) {
        tracing::trace!(
            category = %item.category(),
            name = %item.name,
            visibility = %item.visibility,
            "emit"
        );
        self.items.push(item);
    }

    /// Record a recoverable issue.
    pub fn report(&mut self, code: DiagnosticCode, message: String, location: Option<Location>) {
        tracing::warn!(?code, ?location, "{}", message);
        self.diagnostics.push(Diagnostic::new(code, message, location));
    }
}
