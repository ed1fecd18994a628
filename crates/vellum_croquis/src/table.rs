//! Identifier table and dispatcher registry.
//!
//! Both live for one parse. The table is flat: only level-0 declarations of
//! each script block are recorded, and nested lookups never write to it.

use vellum_carton::{CompactString, FxHashMap, FxHashSet, SmallVec};

/// Module that exports the event dispatcher factory.
pub const DISPATCHER_MODULE: &str = "svelte";

/// Name of the event dispatcher factory.
pub const DISPATCHER_FACTORY: &str = "createEventDispatcher";

/// Maximum number of alias/property hops followed when resolving a chain.
const MAX_RESOLVE_DEPTH: usize = 16;

/// Member path such as `events.CHANGE` split into its segments.
pub type MemberPath = SmallVec<[CompactString; 4]>;

/// What a local name was declared as.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// A string literal or substitution-free template literal.
    StringLiteral(CompactString),
    /// An object literal with statically named properties.
    Object(FxHashMap<CompactString, Declaration>),
    /// Another identifier or member chain.
    Alias(MemberPath),
    /// An import binding.
    Import {
        path: CompactString,
        original: CompactString,
    },
    /// A function declaration or function-valued initializer.
    Function,
    /// Anything the resolver cannot see through.
    Opaque,
}

/// Resolve a member path to a string literal.
///
/// `lookup` maps a root identifier to its declaration. Aliases are followed
/// through `lookup` again, objects are indexed by the next path segment.
pub fn resolve_path<'d>(
    path: &[CompactString],
    lookup: &dyn Fn(&str) -> Option<&'d Declaration>,
) -> Option<CompactString> {
    let (root, rest) = path.split_first()?;
    let declaration = lookup(root.as_str())?;
    resolve_declaration(declaration, rest, lookup, 0)
}

fn resolve_declaration<'d>(
    declaration: &'d Declaration,
    rest: &[CompactString],
    lookup: &dyn Fn(&str) -> Option<&'d Declaration>,
    depth: usize,
) -> Option<CompactString> {
    if depth > MAX_RESOLVE_DEPTH {
        return None;
    }

    match declaration {
        Declaration::StringLiteral(value) if rest.is_empty() => Some(value.clone()),
        Declaration::Object(properties) => {
            let (key, rest) = rest.split_first()?;
            resolve_declaration(properties.get(key)?, rest, lookup, depth + 1)
        }
        Declaration::Alias(target) => {
            let (root, target_rest) = target.split_first()?;
            let mut chain: MemberPath = target_rest.iter().cloned().collect();
            chain.extend(rest.iter().cloned());
            resolve_declaration(lookup(root.as_str())?, &chain, lookup, depth + 1)
        }
        _ => None,
    }
}

/// Per-parse identifier table plus dispatcher registry.
#[derive(Debug)]
pub struct IdentifierTable {
    declarations: FxHashMap<CompactString, Declaration>,
    factories: FxHashSet<CompactString>,
    dispatchers: FxHashSet<CompactString>,
}

impl Default for IdentifierTable {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentifierTable {
    /// Create a table that already knows the factory by its exported name.
    pub fn new() -> Self {
        let mut factories = FxHashSet::default();
        factories.insert(CompactString::const_new(DISPATCHER_FACTORY));
        Self {
            declarations: FxHashMap::default(),
            factories,
            dispatchers: FxHashSet::default(),
        }
    }

    /// Record a level-0 declaration. A later declaration of the same name
    /// replaces the earlier one.
    pub fn record(&mut self, name: impl Into<CompactString>, declaration: Declaration) {
        self.declarations.insert(name.into(), declaration);
    }

    #[inline]
    pub fn resolve(&self, name: &str) -> Option<&Declaration> {
        self.declarations.get(name)
    }

    /// Resolve an identifier or member chain against the table only.
    pub fn resolve_chain(&self, path: &[CompactString]) -> Option<CompactString> {
        resolve_path(path, &|name: &str| self.resolve(name))
    }

    pub fn register_dispatcher_factory(&mut self, local: impl Into<CompactString>) {
        self.factories.insert(local.into());
    }

    #[inline]
    pub fn is_dispatcher_factory(&self, name: &str) -> bool {
        self.factories.contains(name)
    }

    pub fn register_dispatcher(&mut self, name: impl Into<CompactString>) {
        self.dispatchers.insert(name.into());
    }

    /// Check if a name is a dispatcher, directly or through one alias.
    pub fn is_dispatcher(&self, name: &str) -> bool {
        if self.dispatchers.contains(name) {
            return true;
        }
        match self.resolve(name) {
            Some(Declaration::Alias(path)) if path.len() == 1 => {
                self.dispatchers.contains(path[0].as_str())
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_carton::smallvec;

    fn path(segments: &[&str]) -> MemberPath {
        segments.iter().map(|s| CompactString::new(s)).collect()
    }

    #[test]
    fn test_resolve_string_literal() {
        let mut table = IdentifierTable::new();
        table.record("EVENT", Declaration::StringLiteral("notify".into()));
        assert_eq!(table.resolve_chain(&path(&["EVENT"])).as_deref(), Some("notify"));
        assert_eq!(table.resolve_chain(&path(&["MISSING"])), None);
    }

    #[test]
    fn test_resolve_through_objects_and_aliases() {
        let mut table = IdentifierTable::new();
        let mut inner = FxHashMap::default();
        inner.insert(
            CompactString::new("CHANGE"),
            Declaration::StringLiteral("change".into()),
        );
        let mut outer = FxHashMap::default();
        outer.insert(CompactString::new("input"), Declaration::Object(inner));
        table.record("EVENTS", Declaration::Object(outer));
        table.record("INPUT", Declaration::Alias(path(&["EVENTS", "input"])));
        table.record("name", Declaration::Alias(path(&["INPUT", "CHANGE"])));

        assert_eq!(
            table.resolve_chain(&path(&["EVENTS", "input", "CHANGE"])).as_deref(),
            Some("change")
        );
        assert_eq!(
            table.resolve_chain(&path(&["INPUT", "CHANGE"])).as_deref(),
            Some("change")
        );
        assert_eq!(table.resolve_chain(&path(&["name"])).as_deref(), Some("change"));
        assert_eq!(table.resolve_chain(&path(&["EVENTS", "output"])), None);
    }

    #[test]
    fn test_resolve_cycle_terminates() {
        let mut table = IdentifierTable::new();
        table.record("a", Declaration::Alias(smallvec![CompactString::new("b")]));
        table.record("b", Declaration::Alias(smallvec![CompactString::new("a")]));
        assert_eq!(table.resolve_chain(&path(&["a"])), None);
    }

    #[test]
    fn test_dispatcher_registry() {
        let mut table = IdentifierTable::new();
        assert!(table.is_dispatcher_factory(DISPATCHER_FACTORY));
        assert!(!table.is_dispatcher_factory("makeDispatcher"));
        table.register_dispatcher_factory("makeDispatcher");
        assert!(table.is_dispatcher_factory("makeDispatcher"));

        assert!(!table.is_dispatcher("dispatch"));
        table.register_dispatcher("dispatch");
        assert!(table.is_dispatcher("dispatch"));

        table.record("fire", Declaration::Alias(path(&["dispatch"])));
        assert!(table.is_dispatcher("fire"));
    }
}
