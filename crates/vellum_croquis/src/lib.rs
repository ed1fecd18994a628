//! # vellum_croquis
//!
//! Croquis - The semantic extraction layer for Vellum.
//!
//! ## Name Origin
//!
//! **Croquis** (/kʁɔ.ki/) is a quick drawing that captures the essential
//! features of a subject. `vellum_croquis` sketches a component's public API
//! from its script blocks and markup without executing any of it.
//!
//! ## Purpose
//!
//! - **Comment Grammar**: Visibility, description and `@keyword` tags
//! - **Identifier Table**: Level-0 declarations and event dispatchers
//! - **Script Walker**: Data, methods, computed values, imports and events
//! - **Markup Walker**: Slots, bindings, refs, actions and forwarded events
//! - **Merge**: One record per item, filtered for the caller
//!
//! ## Architecture
//!
//! ```text
//!  script blocks ──→ script_parser ─┐
//!                                   ├─→ ParseState.items ─→ merge ─→ ComponentDoc
//!  template ──→ vellum_armature ──→ markup
//! ```
//!
//! Script blocks run first, in source order, so the markup walker sees every
//! dispatcher the scripts registered.

pub mod comment;
pub mod context;
pub mod markup;
pub mod merge;
pub mod script_parser;
pub mod table;

pub use comment::{parse_comment, parse_param_keyword, parse_return_keyword, parse_type_keyword};
pub use context::{ParseContext, ParseState};
pub use markup::walk_markup;
pub use merge::{merge_into, Aggregator};
pub use script_parser::{parse_inline_expression, parse_script_block, UNRESOLVED_EVENT_NAME};
pub use table::{Declaration, IdentifierTable};
