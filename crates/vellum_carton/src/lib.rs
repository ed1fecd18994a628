//! Carton - The toolbox shared by every Vellum crate.
//!
//! Holds the collection and string types the other crates build on, plus a
//! handful of text helpers used by both the markup and the script side.
//!
//! # Example
//!
//! ```
//! use vellum_carton::{is_component_name, strip_mustache, CompactString};
//!
//! let name = CompactString::new("ShoppingCart");
//! assert!(is_component_name(&name));
//! assert_eq!(strip_mustache(" {total} "), "total");
//! ```

pub mod dom_tag_config;
pub mod general;

// Re-export compact_str::CompactString for convenience
pub use compact_str::CompactString;

// Re-export smallvec for stack-optimized collections
pub use smallvec::{smallvec, SmallVec};

// Re-export bitflags for flag types
pub use bitflags::bitflags;

// Re-export rustc-hash for fast hash maps/sets
pub use rustc_hash::{FxHashMap, FxHashSet};

// Re-export phf for compile-time perfect hash functions
pub use phf::{phf_set, Set as PhfSet};

// Re-export shared utilities
pub use dom_tag_config::*;
pub use general::*;
