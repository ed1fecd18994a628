//! Semantic items: one record per documented symbol.

use serde::Serialize;
use vellum_carton::CompactString;

use crate::document::Category;
use crate::types::{DocComment, Keyword, Location, TypedExpression, Visibility};

/// One documented symbol emitted by a walker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticItem {
    pub name: CompactString,
    pub description: String,
    pub visibility: Visibility,
    pub keywords: Vec<Keyword>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    #[serde(flatten)]
    pub detail: ItemDetail,
}

impl SemanticItem {
    /// Create an undocumented private item.
    pub fn new(name: impl Into<CompactString>, detail: impl Into<ItemDetail>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            visibility: Visibility::Private,
            keywords: Vec::new(),
            locations: Vec::new(),
            detail: detail.into(),
        }
    }

    /// Apply a parsed comment: visibility, description and keywords.
    pub fn with_doc(mut self, doc: DocComment) -> Self {
        self.visibility = doc.visibility;
        self.description = doc.description;
        self.keywords = doc.keywords;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    #[inline]
    pub fn category(&self) -> Category {
        self.detail.category()
    }

    pub fn as_data(&self) -> Option<&DataDetail> {
        match &self.detail {
            ItemDetail::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodDetail> {
        match &self.detail {
            ItemDetail::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn as_computed(&self) -> Option<&ComputedDetail> {
        match &self.detail {
            ItemDetail::Computed(computed) => Some(computed),
            _ => None,
        }
    }

    pub fn as_event(&self) -> Option<&EventDetail> {
        match &self.detail {
            ItemDetail::Event(event) => Some(event),
            _ => None,
        }
    }

    pub fn as_slot(&self) -> Option<&SlotDetail> {
        match &self.detail {
            ItemDetail::Slot(slot) => Some(slot),
            _ => None,
        }
    }

    /// Parent tag for events, refs and actions.
    pub fn parent(&self) -> Option<&str> {
        match &self.detail {
            ItemDetail::Event(EventDetail { parent, .. })
            | ItemDetail::Ref(RefDetail { parent })
            | ItemDetail::Action(ActionDetail { parent }) => parent.as_deref(),
            _ => None,
        }
    }
}

/// Kind-specific payload of a [`SemanticItem`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemDetail {
    Data(DataDetail),
    Method(MethodDetail),
    Computed(ComputedDetail),
    Event(EventDetail),
    Slot(SlotDetail),
    Ref(RefDetail),
    Action(ActionDetail),
    Component(ComponentDetail),
}

impl ItemDetail {
    pub fn category(&self) -> Category {
        match self {
            Self::Data(_) => Category::Data,
            Self::Method(_) => Category::Methods,
            Self::Computed(_) => Category::Computed,
            Self::Event(_) => Category::Events,
            Self::Slot(_) => Category::Slots,
            Self::Ref(_) => Category::Refs,
            Self::Action(_) => Category::Actions,
            Self::Component(_) => Category::Components,
        }
    }
}

macro_rules! impl_from_detail {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ItemDetail {
                #[inline]
                fn from(detail: $ty) -> Self {
                    Self::$variant(detail)
                }
            }
        )*
    };
}

impl_from_detail! {
    Data => DataDetail,
    Method => MethodDetail,
    Computed => ComputedDetail,
    Event => EventDetail,
    Slot => SlotDetail,
    Ref => RefDetail,
    Action => ActionDetail,
    Component => ComponentDetail,
}

/// Declaration keyword of a data item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Var,
    Let,
    Const,
}

/// `bind:` mapping from a child element or component property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindMapping {
    pub source: CompactString,
    pub property: CompactString,
}

/// Component state: declared variables, imports and bound properties.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataDetail {
    /// `None` for imports and markup bindings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<VariableKind>,
    #[serde(rename = "static")]
    pub is_static: bool,
    pub readonly: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_expr: Option<TypedExpression>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_path: Option<CompactString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_name: Option<CompactString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_name: Option<CompactString>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bind: Vec<BindMapping>,
}

/// A function declared in a script block.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MethodDetail {
    pub params: Vec<MethodParam>,
    #[serde(rename = "return", skip_serializing_if = "Option::is_none")]
    pub return_value: Option<MethodReturn>,
    #[serde(rename = "static")]
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodParam {
    pub name: CompactString,
    #[serde(rename = "type")]
    pub type_expr: TypedExpression,
    pub optional: bool,
    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    pub description: String,
    pub repeated: bool,
}

impl MethodParam {
    /// An untyped, required, undocumented parameter.
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            type_expr: TypedExpression::any(),
            optional: false,
            default_value: None,
            description: String::new(),
            repeated: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodReturn {
    #[serde(rename = "type")]
    pub type_expr: TypedExpression,
    pub description: String,
}

/// A reactive `$:` assignment.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ComputedDetail {
    pub dependencies: Vec<CompactString>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_expr: Option<TypedExpression>,
    #[serde(rename = "static")]
    pub is_static: bool,
}

/// An event dispatched by the component or forwarded from a child.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EventDetail {
    pub parent: Option<CompactString>,
    pub modifiers: Vec<CompactString>,
}

/// A `<slot>` exposed by the template.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SlotDetail {
    pub parameters: Vec<SlotParameter>,
}

/// A value passed from a slot to its consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotParameter {
    pub name: CompactString,
    pub description: String,
    pub visibility: Visibility,
    #[serde(rename = "type")]
    pub type_expr: TypedExpression,
    pub keywords: Vec<Keyword>,
}

/// An element reference captured with `bind:this`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RefDetail {
    pub parent: Option<CompactString>,
}

/// A function applied to an element with `use:`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ActionDetail {
    pub parent: Option<CompactString>,
}

/// A sub-component imported by the script.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDetail {
    pub import_path: CompactString,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_json_shape() {
        let item = SemanticItem::new(
            "totalCost",
            DataDetail {
                kind: Some(VariableKind::Let),
                bind: vec![BindMapping {
                    source: "ShoppingCart".into(),
                    property: "totalCost".into(),
                }],
                ..Default::default()
            },
        );

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["name"], "totalCost");
        assert_eq!(json["visibility"], "private");
        assert_eq!(json["kind"], "let");
        assert_eq!(json["static"], false);
        assert_eq!(json["bind"][0]["source"], "ShoppingCart");
        assert!(json.get("locations").is_none());
        assert!(json.get("importPath").is_none());
    }

    #[test]
    fn test_event_parent_serializes_null() {
        let item = SemanticItem::new("notify", EventDetail::default())
            .with_visibility(Visibility::Public);
        let json = serde_json::to_value(&item).unwrap();
        assert!(json["parent"].is_null());
        assert_eq!(json["modifiers"], serde_json::json!([]));
        assert_eq!(item.category(), Category::Events);
    }
}
