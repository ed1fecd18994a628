//! Aggregation and merge.
//!
//! Folds the ordered item stream into one record per `(category, name)`.
//! The first emission fixes an item's position; later emissions only
//! escalate visibility, fill fields that are still missing, and append
//! locations and bind mappings.

use vellum_carton::{CompactString, FxHashMap};
use vellum_relief::{
    Category, ComponentDoc, DocComment, Features, ItemDetail, ResolvedOptions, SemanticItem,
    SlotParameter, TypedExpression,
};

/// Accumulates items in first-emission order.
#[derive(Debug, Default)]
pub struct Aggregator {
    items: Vec<SemanticItem>,
    index: FxHashMap<(Category, CompactString), usize>,
    /// Local data name → exported name, from `export { local as exported }`.
    aliases: FxHashMap<CompactString, CompactString>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merged items so far.
    #[inline]
    pub fn items(&self) -> &[SemanticItem] {
        &self.items
    }

    pub fn push(&mut self, item: SemanticItem) {
        let category = item.category();
        let mut name = item.name.clone();

        if let ItemDetail::Data(data) = &item.detail {
            match &data.local_name {
                Some(local)
                    if *local != item.name
                        && !self.index.contains_key(&(Category::Data, item.name.clone())) =>
                {
                    // Rename the local item to its exported name
                    if let Some(idx) = self.index.remove(&(Category::Data, local.clone())) {
                        tracing::trace!(%local, exported = %item.name, "merging re-export");
                        self.items[idx].name = item.name.clone();
                        self.index.insert((Category::Data, item.name.clone()), idx);
                    }
                    self.aliases.insert(local.clone(), item.name.clone());
                }
                _ => {
                    if let Some(exported) = self.aliases.get(&item.name) {
                        name = exported.clone();
                    }
                }
            }
        }

        match self.index.get(&(category, name.clone())) {
            Some(&idx) => merge_into(&mut self.items[idx], item),
            None => {
                self.index.insert((category, name), self.items.len());
                self.items.push(item);
            }
        }
    }

    /// Build the document for the requested features.
    ///
    /// Items with an ignored visibility are dropped here, after every merge,
    /// so a later public emission can still rescue a private one.
    pub fn finish(
        self,
        options: &ResolvedOptions,
        component_doc: Option<DocComment>,
        name: Option<&str>,
    ) -> ComponentDoc {
        let mut doc = ComponentDoc::default();
        let component_doc = component_doc.unwrap_or_default();

        if options.features.contains(Features::NAME) {
            doc.name = name.map(CompactString::new);
        }
        if options.features.contains(Features::DESCRIPTION) {
            doc.description = Some(component_doc.description);
        }
        if options.features.contains(Features::KEYWORDS) {
            doc.keywords = Some(component_doc.keywords);
        }

        for category in Category::ALL {
            if options.wants(category) {
                *doc.items_mut(category) = Some(Vec::new());
            }
        }

        for mut item in self.items {
            if options.is_ignored(item.visibility) {
                continue;
            }
            let Some(list) = doc.items_mut(item.category()).as_mut() else {
                continue;
            };

            if let ItemDetail::Data(data) = &mut item.detail {
                if data.type_expr.is_none() {
                    data.type_expr = Some(TypedExpression::any());
                }
            }
            if !options.include_source_locations {
                item.locations.clear();
            }
            list.push(item);
        }

        doc
    }
}

impl Extend<SemanticItem> for Aggregator {
    fn extend<T: IntoIterator<Item = SemanticItem>>(&mut self, iter: T) {
        for item in iter {
            self.push(item);
        }
    }
}

#[inline]
fn fill<T>(target: &mut Option<T>, source: Option<T>) {
    if target.is_none() {
        *target = source;
    }
}

#[inline]
fn fill_vec<T>(target: &mut Vec<T>, source: Vec<T>) {
    if target.is_empty() {
        *target = source;
    }
}

/// Merge a later emission into an existing item of the same category.
pub fn merge_into(target: &mut SemanticItem, source: SemanticItem) {
    target.visibility = target.visibility.merge(source.visibility);
    if target.description.is_empty() {
        target.description = source.description;
    }
    fill_vec(&mut target.keywords, source.keywords);
    target.locations.extend(source.locations);

    match (&mut target.detail, source.detail) {
        (ItemDetail::Data(target), ItemDetail::Data(source)) => {
            fill(&mut target.kind, source.kind);
            fill(&mut target.type_expr, source.type_expr);
            fill(&mut target.default_value, source.default_value);
            fill(&mut target.import_path, source.import_path);
            fill(&mut target.original_name, source.original_name);
            fill(&mut target.local_name, source.local_name);
            target.bind.extend(source.bind);
        }
        (ItemDetail::Method(target), ItemDetail::Method(source)) => {
            fill_vec(&mut target.params, source.params);
            fill(&mut target.return_value, source.return_value);
        }
        (ItemDetail::Computed(target), ItemDetail::Computed(source)) => {
            fill_vec(&mut target.dependencies, source.dependencies);
            fill(&mut target.type_expr, source.type_expr);
        }
        (ItemDetail::Event(target), ItemDetail::Event(source)) => {
            fill(&mut target.parent, source.parent);
            fill_vec(&mut target.modifiers, source.modifiers);
        }
        (ItemDetail::Slot(target), ItemDetail::Slot(source)) => {
            for parameter in source.parameters {
                merge_slot_parameter(&mut target.parameters, parameter);
            }
        }
        (ItemDetail::Ref(target), ItemDetail::Ref(source)) => {
            fill(&mut target.parent, source.parent);
        }
        (ItemDetail::Action(target), ItemDetail::Action(source)) => {
            fill(&mut target.parent, source.parent);
        }
        (ItemDetail::Component(target), ItemDetail::Component(source)) => {
            if target.import_path.is_empty() {
                target.import_path = source.import_path;
            }
        }
        _ => {}
    }
}

fn merge_slot_parameter(parameters: &mut Vec<SlotParameter>, source: SlotParameter) {
    let Some(target) = parameters.iter_mut().find(|p| p.name == source.name) else {
        parameters.push(source);
        return;
    };

    target.visibility = target.visibility.merge(source.visibility);
    if target.description.is_empty() {
        target.description = source.description;
    }
    if target.type_expr.is_any() {
        target.type_expr = source.type_expr;
    }
    fill_vec(&mut target.keywords, source.keywords);
}
