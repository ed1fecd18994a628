//! Shared value types: visibility, scope tags, locations, keywords and the
//! typed expressions parsed out of documentation comments.

use std::fmt;

use serde::{Deserialize, Serialize};
use vellum_carton::CompactString;

/// Visibility of a documented symbol.
///
/// Ordered `Private < Protected < Public`; merging two visibilities keeps
/// the greater one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private = 0,
    Protected = 1,
    Public = 2,
}

impl Visibility {
    pub const ALL: [Visibility; 3] = [Self::Public, Self::Protected, Self::Private];

    #[inline]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "public" => Some(Self::Public),
            "protected" => Some(Self::Protected),
            "private" => Some(Self::Private),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
        }
    }

    /// Combine two visibilities, escalating to the more visible one.
    #[inline]
    pub fn merge(self, other: Self) -> Self {
        self.max(other)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a script block (or expression) lives in the component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptScope {
    /// Shared `context="module"` block; its declarations are static.
    Module,
    /// Per-instance `<script>` block.
    Instance,
    /// Expression embedded in a markup attribute.
    Inline,
}

impl ScriptScope {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Instance => "instance",
            Self::Inline => "inline",
        }
    }
}

impl fmt::Display for ScriptScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open byte range relative to the whole component file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub start: u32,
    pub end: u32,
}

impl Location {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Shift a block-relative range into file coordinates.
    #[inline]
    pub const fn offset_by(self, offset: u32) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

/// A `@name value` tag from a documentation comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub name: CompactString,
    pub description: String,
}

impl Keyword {
    pub fn new(name: impl Into<CompactString>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Visibility, description and keywords parsed from one comment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocComment {
    pub visibility: Visibility,
    pub description: String,
    pub keywords: Vec<Keyword>,
}

impl DocComment {
    /// An empty comment with the given visibility.
    pub fn empty(visibility: Visibility) -> Self {
        Self {
            visibility,
            ..Default::default()
        }
    }

    /// First keyword with the given name.
    pub fn keyword(&self, name: &str) -> Option<&Keyword> {
        self.keywords.iter().find(|k| k.name == name)
    }

    /// All keywords with the given name, in source order.
    pub fn keywords_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Keyword> + 'a {
        self.keywords.iter().filter(move |k| k.name == name)
    }

    /// Whether the comment named a visibility explicitly.
    pub fn has_visibility_keyword(&self) -> bool {
        self.keywords
            .iter()
            .any(|k| Visibility::from_name(&k.name).is_some())
    }
}

/// Type expression parsed from a `{...}` annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypedExpression {
    /// A named type such as `string` or `Array<number>`.
    Type {
        text: String,
        #[serde(rename = "type")]
        type_name: String,
    },
    /// A single-quoted literal such as `'primary'`.
    Const {
        text: String,
        #[serde(rename = "type")]
        type_name: String,
        value: String,
    },
    /// Pipe-separated alternatives.
    Union {
        text: String,
        #[serde(rename = "type")]
        types: Vec<TypedExpression>,
    },
}

impl TypedExpression {
    /// The catch-all `any` type.
    pub fn any() -> Self {
        Self::named("any")
    }

    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::Type {
            text: name.clone(),
            type_name: name,
        }
    }

    pub fn constant(value: impl Into<String>) -> Self {
        let value = value.into();
        Self::Const {
            text: format!("'{}'", value),
            type_name: "string".into(),
            value,
        }
    }

    /// Source text the expression was parsed from.
    pub fn text(&self) -> &str {
        match self {
            Self::Type { text, .. } | Self::Const { text, .. } | Self::Union { text, .. } => text,
        }
    }

    #[inline]
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Type { type_name, .. } if type_name == "any")
    }
}
