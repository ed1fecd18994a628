//! # Vellum
//!
//! Documentation extractor for Svelte-style components.
//!
//! Takes a component already split into its template and script blocks and
//! returns a [`ComponentDoc`]: data, computed values, methods, actions,
//! events, slots, refs and imported components, each with its description,
//! visibility and `@keywords`.
//!
//! ## Crates
//!
//! - [`carton`] - Shared collections and text helpers
//! - [`relief`] - Items, documents, options and errors
//! - [`armature`] - Markup tokenizer
//! - [`croquis`] - Script and markup walkers, merge
//!
//! ## Example
//!
//! ```
//! use vellum::{parse, ComponentSource, ParseOptions, ScriptBlock};
//!
//! let source = ComponentSource {
//!     file_name: Some("Notifier.svelte".into()),
//!     scripts: vec![ScriptBlock::new(
//!         "const dispatch = createEventDispatcher(); dispatch('notify');",
//!         "",
//!         8,
//!     )],
//!     ..Default::default()
//! };
//!
//! let output = parse(&source, &ParseOptions::with_features(&["name", "events"])).unwrap();
//! assert_eq!(output.document.name.as_deref(), Some("Notifier"));
//! assert_eq!(output.document.events.unwrap()[0].name, "notify");
//! ```

/// Shared collections and text helpers.
pub use vellum_carton as carton;

/// Items, documents, options and errors.
pub use vellum_relief as relief;

/// Markup tokenizer.
pub use vellum_armature as armature;

/// Script and markup walkers, merge.
pub use vellum_croquis as croquis;

pub use vellum_relief::{
    Category, ComponentDoc, ComponentSource, Diagnostic, DiagnosticCode, ParseError,
    ParseOptions, ResolvedOptions, ScriptBlock, SemanticItem, Visibility,
};

use serde::Serialize;
use vellum_carton::file_stem;
use vellum_croquis::{parse_script_block, walk_markup, Aggregator, ParseState};

/// Result of a successful parse.
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutput {
    pub document: ComponentDoc,
    /// Recoverable issues, in discovery order.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutput {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Parse one component.
///
/// Options are validated before anything is walked. Script blocks run in
/// source order, then the template.
pub fn parse(source: &ComponentSource, options: &ParseOptions) -> Result<ParseOutput, ParseError> {
    let options = options.validate()?;
    parse_resolved(source, options)
}

/// Parse one component with already validated options.
pub fn parse_resolved(
    source: &ComponentSource,
    options: ResolvedOptions,
) -> Result<ParseOutput, ParseError> {
    let name = source.file_name.as_deref().map(file_stem);
    tracing::debug!(
        name = name.unwrap_or("<anonymous>"),
        scripts = source.scripts.len(),
        "parsing component"
    );

    let mut state = ParseState::new(options);
    for block in &source.scripts {
        parse_script_block(block, &mut state)?;
    }
    walk_markup(&source.template, source.template_offset, &mut state)?;

    let ParseState {
        options,
        items,
        diagnostics,
        component_doc,
        ..
    } = state;

    let mut aggregator = Aggregator::new();
    aggregator.extend(items);
    let document = aggregator.finish(&options, component_doc, name);

    tracing::debug!(diagnostics = diagnostics.len(), "parsed component");
    Ok(ParseOutput {
        document,
        diagnostics,
    })
}

/// Parse one component on the tokio runtime.
///
/// Option errors are returned before the first suspension point. The walk
/// itself starts on the next scheduler turn and runs to completion.
pub async fn parse_async(
    source: ComponentSource,
    options: ParseOptions,
) -> Result<ParseOutput, ParseError> {
    let options = options.validate()?;
    tokio::task::yield_now().await;
    parse_resolved(&source, options)
}

/// Install a `tracing` subscriber writing to stderr.
///
/// Safe to call more than once; only the first call installs anything, and
/// an already installed global subscriber is left in place.
pub fn init_logging() {
    use std::sync::Once;

    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(template: &str, scripts: Vec<ScriptBlock>) -> ComponentSource {
        ComponentSource {
            file_name: Some("src/lib/ShoppingCart.svelte".into()),
            template: template.into(),
            template_offset: 0,
            scripts,
        }
    }

    #[test]
    fn test_invalid_options_fail_before_walking() {
        // The script would fail to parse; the option error must win.
        let component = source("", vec![ScriptBlock::new("let = ;", "", 0)]);
        let options = ParseOptions::with_features(&["props"]);
        assert!(matches!(
            parse(&component, &options),
            Err(ParseError::UnsupportedFeature { .. })
        ));
    }

    #[test]
    fn test_syntax_error_aborts_parse() {
        let component = source("<p on:click/>", vec![ScriptBlock::new("let = ;", "", 8)]);
        let err = parse(&component, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { offset: 8, .. }));
    }

    #[test]
    fn test_scripts_run_before_markup() {
        let component = source(
            "<button on:click={() => dispatch('checkout')}>Pay</button>",
            vec![ScriptBlock::new(
                "const dispatch = createEventDispatcher();",
                "",
                0,
            )],
        );
        let output = parse(&component, &ParseOptions::with_features(&["events"])).unwrap();
        let events = output.document.events.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "checkout");
    }

    #[test]
    fn test_name_and_description() {
        let component = source("<!-- The cart. -->\n<div></div>", Vec::new());
        let output = parse(
            &component,
            &ParseOptions::with_features(&["name", "description", "keywords"]),
        )
        .unwrap();

        assert_eq!(output.document.name.as_deref(), Some("ShoppingCart"));
        assert_eq!(output.document.description.as_deref(), Some("The cart."));
        assert_eq!(output.document.keywords, Some(Vec::new()));
        assert_eq!(output.document.data, None);
    }

    #[test]
    fn test_output_json_omits_unrequested_categories() {
        let component = source("<a on:click>x</a>", Vec::new());
        let output = parse(&component, &ParseOptions::with_features(&["events"])).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output.to_json().unwrap()).unwrap();

        assert_eq!(json["document"]["events"][0]["name"], "click");
        assert_eq!(json["document"]["events"][0]["parent"], "a");
        assert!(json["document"].get("data").is_none());
        assert_eq!(json["diagnostics"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_parse_async() {
        init_logging();
        let component = source(
            "",
            vec![ScriptBlock::new(
                "const dispatch = createEventDispatcher(); dispatch('notify')",
                "",
                0,
            )],
        );
        let output = parse_async(component, ParseOptions::with_features(&["events"]))
            .await
            .unwrap();
        assert_eq!(output.document.events.unwrap()[0].name, "notify");
    }

    #[tokio::test]
    async fn test_parse_async_rejects_options() {
        let options = ParseOptions {
            ignored_visibilities: vec!["internal".into()],
            ..Default::default()
        };
        let err = parse_async(ComponentSource::default(), options)
            .await
            .unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedVisibility(_)));
    }
}
