//! The final component document.

use std::fmt;

use serde::Serialize;
use vellum_carton::CompactString;

use crate::item::SemanticItem;
use crate::types::Keyword;

/// Item category, one list per category in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Data,
    Computed,
    Methods,
    Actions,
    Events,
    Slots,
    Refs,
    Components,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Self::Data,
        Self::Computed,
        Self::Methods,
        Self::Actions,
        Self::Events,
        Self::Slots,
        Self::Refs,
        Self::Components,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Computed => "computed",
            Self::Methods => "methods",
            Self::Actions => "actions",
            Self::Events => "events",
            Self::Slots => "slots",
            Self::Refs => "refs",
            Self::Components => "components",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Documentation of one component.
///
/// Categories that were not requested stay `None` and are omitted from the
/// serialized output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComponentDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<CompactString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<Keyword>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<SemanticItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed: Option<Vec<SemanticItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<SemanticItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<SemanticItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<SemanticItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slots: Option<Vec<SemanticItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refs: Option<Vec<SemanticItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<SemanticItem>>,
}

impl ComponentDoc {
    /// Items of a category, `None` when the category was not requested.
    pub fn items(&self, category: Category) -> Option<&[SemanticItem]> {
        match category {
            Category::Data => self.data.as_deref(),
            Category::Computed => self.computed.as_deref(),
            Category::Methods => self.methods.as_deref(),
            Category::Actions => self.actions.as_deref(),
            Category::Events => self.events.as_deref(),
            Category::Slots => self.slots.as_deref(),
            Category::Refs => self.refs.as_deref(),
            Category::Components => self.components.as_deref(),
        }
    }

    /// Mutable slot for a category's item list.
    pub fn items_mut(&mut self, category: Category) -> &mut Option<Vec<SemanticItem>> {
        match category {
            Category::Data => &mut self.data,
            Category::Computed => &mut self.computed,
            Category::Methods => &mut self.methods,
            Category::Actions => &mut self.actions,
            Category::Events => &mut self.events,
            Category::Slots => &mut self.slots,
            Category::Refs => &mut self.refs,
            Category::Components => &mut self.components,
        }
    }

    /// Find an item by category and name.
    pub fn find(&self, category: Category, name: &str) -> Option<&SemanticItem> {
        self.items(category)?.iter().find(|item| item.name == name)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
