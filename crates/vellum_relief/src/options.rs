//! Parse input and options.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use vellum_carton::{bitflags, SmallVec};

use crate::document::Category;
use crate::errors::ParseError;
use crate::types::Visibility;

bitflags! {
    /// Requested document categories.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Features: u16 {
        const NAME = 1 << 0;
        const DESCRIPTION = 1 << 1;
        const KEYWORDS = 1 << 2;
        const DATA = 1 << 3;
        const COMPUTED = 1 << 4;
        const METHODS = 1 << 5;
        const ACTIONS = 1 << 6;
        const EVENTS = 1 << 7;
        const SLOTS = 1 << 8;
        const REFS = 1 << 9;
        const COMPONENTS = 1 << 10;
    }
}

impl Features {
    /// Feature names accepted in [`ParseOptions::features`].
    pub const NAMES: [(&'static str, Features); 11] = [
        ("name", Self::NAME),
        ("description", Self::DESCRIPTION),
        ("keywords", Self::KEYWORDS),
        ("data", Self::DATA),
        ("computed", Self::COMPUTED),
        ("methods", Self::METHODS),
        ("actions", Self::ACTIONS),
        ("events", Self::EVENTS),
        ("slots", Self::SLOTS),
        ("refs", Self::REFS),
        ("components", Self::COMPONENTS),
    ];

    /// Feature for a lower-case name as accepted in options.
    pub fn from_feature_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, feature)| *feature)
    }

    /// Feature flag that requests a category.
    pub const fn for_category(category: Category) -> Self {
        match category {
            Category::Data => Self::DATA,
            Category::Computed => Self::COMPUTED,
            Category::Methods => Self::METHODS,
            Category::Actions => Self::ACTIONS,
            Category::Events => Self::EVENTS,
            Category::Slots => Self::SLOTS,
            Category::Refs => Self::REFS,
            Category::Components => Self::COMPONENTS,
        }
    }

    fn expected_names() -> String {
        Self::NAMES
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// `name`, `name="v"`, `name='v'` or `name=v` in an opening tag.
static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=]+)))?"#)
        .expect("valid attribute regex")
});

/// One script block, already cut out of the component file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptBlock {
    pub content: String,
    /// Raw attribute text of the opening tag, e.g. `context="module" lang="ts"`.
    #[serde(default)]
    pub attributes: String,
    /// Byte offset of `content` in the component file.
    #[serde(default)]
    pub offset: u32,
}

impl ScriptBlock {
    pub fn new(content: impl Into<String>, attributes: impl Into<String>, offset: u32) -> Self {
        Self {
            content: content.into(),
            attributes: attributes.into(),
            offset,
        }
    }

    /// Value of an attribute; `Some("")` for a bare attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        ATTRIBUTE
            .captures_iter(&self.attributes)
            .find(|caps| &caps[1] == name)
            .map(|caps| {
                caps.get(2)
                    .or_else(|| caps.get(3))
                    .or_else(|| caps.get(4))
                    .map_or("", |m| m.as_str())
            })
    }

    /// Whether the block carries the module-scope marker.
    pub fn is_module(&self) -> bool {
        self.attribute("context") == Some("module") || self.attribute("module").is_some()
    }

    /// Whether the block is written in TypeScript.
    pub fn is_typescript(&self) -> bool {
        matches!(self.attribute("lang"), Some("ts" | "typescript"))
    }
}

/// A component split into its template and script blocks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentSource {
    /// Used for the document `name`.
    pub file_name: Option<String>,
    pub template: String,
    /// Byte offset of `template` in the component file.
    pub template_offset: u32,
    /// Script blocks in source order.
    pub scripts: Vec<ScriptBlock>,
}

/// Default visibilities for items that carry no visibility keyword.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultVisibilities {
    pub method: Option<Visibility>,
    pub action: Option<Visibility>,
}

/// Options as supplied by the caller, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParseOptions {
    /// Requested feature names.
    pub features: Vec<String>,
    /// Attach `{start, end}` locations to emitted items.
    pub include_source_locations: bool,
    pub default_visibilities: DefaultVisibilities,
    /// Visibilities dropped from the final document.
    pub ignored_visibilities: Vec<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            features: Features::NAMES
                .iter()
                .map(|(name, _)| (*name).to_string())
                .collect(),
            include_source_locations: false,
            default_visibilities: DefaultVisibilities::default(),
            ignored_visibilities: vec!["private".into(), "protected".into()],
        }
    }
}

impl ParseOptions {
    /// Options requesting only the given features, with nothing ignored.
    pub fn with_features(features: &[&str]) -> Self {
        Self {
            features: features.iter().map(|f| (*f).to_string()).collect(),
            ignored_visibilities: Vec::new(),
            ..Default::default()
        }
    }

    /// Deserialize options from JSON, filling unspecified fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check feature names and ignored visibilities.
    pub fn validate(&self) -> Result<ResolvedOptions, ParseError> {
        let mut features = Features::empty();
        for name in &self.features {
            features |= Features::from_feature_name(name).ok_or_else(|| {
                ParseError::UnsupportedFeature {
                    name: name.clone(),
                    expected: Features::expected_names(),
                }
            })?;
        }

        let mut ignored = SmallVec::new();
        for name in &self.ignored_visibilities {
            let visibility = Visibility::from_name(name)
                .ok_or_else(|| ParseError::UnsupportedVisibility(name.clone()))?;
            if !ignored.contains(&visibility) {
                ignored.push(visibility);
            }
        }

        Ok(ResolvedOptions {
            features,
            include_source_locations: self.include_source_locations,
            method_visibility: self
                .default_visibilities
                .method
                .unwrap_or(Visibility::Private),
            action_visibility: self
                .default_visibilities
                .action
                .unwrap_or(Visibility::Private),
            ignored_visibilities: ignored,
        })
    }
}

/// Validated options used by the walkers.
#[derive(Debug, Clone)]
pub struct ResolvedOptions {
    pub features: Features,
    pub include_source_locations: bool,
    pub method_visibility: Visibility,
    pub action_visibility: Visibility,
    pub ignored_visibilities: SmallVec<[Visibility; 3]>,
}

impl ResolvedOptions {
    #[inline]
    pub fn is_ignored(&self, visibility: Visibility) -> bool {
        self.ignored_visibilities.contains(&visibility)
    }

    #[inline]
    pub fn wants(&self, category: Category) -> bool {
        self.features.contains(Features::for_category(category))
    }
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        Self {
            features: Features::all(),
            include_source_locations: false,
            method_visibility: Visibility::Private,
            action_visibility: Visibility::Private,
            ignored_visibilities: SmallVec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_validate() {
        let resolved = ParseOptions::default().validate().unwrap();
        assert_eq!(resolved.features, Features::all());
        assert!(resolved.is_ignored(Visibility::Private));
        assert!(resolved.is_ignored(Visibility::Protected));
        assert!(!resolved.is_ignored(Visibility::Public));
    }

    #[test]
    fn test_feature_names() {
        assert_eq!(Features::from_feature_name("events"), Some(Features::EVENTS));
        assert_eq!(Features::from_feature_name("components"), Some(Features::COMPONENTS));
        assert_eq!(Features::from_feature_name("EVENTS"), None);
        // Flag names generated by bitflags stay upper-case.
        assert_eq!(Features::from_name("EVENTS"), Some(Features::EVENTS));
    }

    #[test]
    fn test_unsupported_feature() {
        let options = ParseOptions::with_features(&["data", "props"]);
        let err = options.validate().unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedFeature { ref name, .. } if name == "props"));
        assert!(err.to_string().contains("expected one of: name, description"));
    }

    #[test]
    fn test_unsupported_visibility() {
        let options = ParseOptions {
            ignored_visibilities: vec!["internal".into()],
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(ParseError::UnsupportedVisibility(ref v)) if v == "internal"
        ));
    }

    #[test]
    fn test_options_from_json() {
        let options = ParseOptions::from_json(
            r#"{
                "features": ["events"],
                "includeSourceLocations": true,
                "defaultVisibilities": { "method": "public" }
            }"#,
        )
        .unwrap();
        let resolved = options.validate().unwrap();
        assert_eq!(resolved.features, Features::EVENTS);
        assert!(resolved.include_source_locations);
        assert_eq!(resolved.method_visibility, Visibility::Public);
        assert_eq!(resolved.action_visibility, Visibility::Private);
        // Unspecified fields fall back to defaults.
        assert!(resolved.is_ignored(Visibility::Private));

        assert!(matches!(
            ParseOptions::from_json(r#"{ "defaultVisibilities": { "method": "secret" } }"#),
            Err(ParseError::Options(_))
        ));
    }

    #[test]
    fn test_script_block_attributes() {
        let block = ScriptBlock::new("", r#"context="module" lang='ts' defer"#, 0);
        assert!(block.is_module());
        assert!(block.is_typescript());
        assert_eq!(block.attribute("defer"), Some(""));
        assert_eq!(block.attribute("src"), None);

        let instance = ScriptBlock::new("", "", 0);
        assert!(!instance.is_module());
        assert!(!instance.is_typescript());

        assert!(ScriptBlock::new("", "module", 0).is_module());
    }

    #[test]
    fn test_script_block_attribute_forms() {
        let block = ScriptBlock::new("", "lang = \"typescript\" context=module generics='T'", 0);
        assert_eq!(block.attribute("lang"), Some("typescript"));
        assert_eq!(block.attribute("context"), Some("module"));
        assert_eq!(block.attribute("generics"), Some("T"));
        assert!(block.is_module());
        assert!(block.is_typescript());

        // Values are not attribute names.
        let block = ScriptBlock::new("", r#"data-x="module""#, 0);
        assert_eq!(block.attribute("module"), None);
        assert!(!block.is_module());
    }
}
