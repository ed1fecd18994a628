//! Markup walker.
//!
//! Drives the armature tokenizer over the template and turns tags and
//! directive attributes into items:
//! - `<slot>` elements become slots
//! - `bind:` becomes a bound data item, `bind:this` a ref
//! - `on:` without a value forwards an event, with a value it is an inline
//!   handler walked by the script walker
//! - `use:` becomes an action
//!
//! A comment documents the next tag only when nothing but whitespace sits
//! between them. The comment before the first element also documents the
//! component itself.

use vellum_armature::{Callbacks, QuoteType, Tokenizer};
use vellum_carton::{
    is_blank, is_raw_text_tag, root_identifier, strip_mustache, CompactString, SmallVec,
};
use vellum_relief::{
    ActionDetail, BindMapping, DataDetail, DocComment, EventDetail, Location, ParseError,
    RefDetail, SemanticItem, SlotDetail, SlotParameter, TypedExpression, Visibility,
};

use crate::comment::{parse_comment, parse_param_keyword};
use crate::context::ParseState;
use crate::script_parser::parse_inline_expression;

/// Slot name used when a `<slot>` has no `name` attribute.
pub const DEFAULT_SLOT_NAME: &str = "default";

/// One attribute of the tag being opened.
#[derive(Debug, Clone, Copy)]
struct Attribute {
    name_start: usize,
    name_end: usize,
    value: Option<(usize, usize)>,
    quote: QuoteType,
}

/// The tag currently being opened.
#[derive(Debug)]
struct OpenTag {
    /// Position of `<`.
    start: usize,
    name_start: usize,
    name_end: usize,
    attributes: SmallVec<[Attribute; 8]>,
}

/// Walk a template, emitting into `state`.
///
/// `template_offset` is the position of `template` in the component file.
/// A syntax error in an inline handler aborts the walk.
pub fn walk_markup(
    template: &str,
    template_offset: u32,
    state: &mut ParseState,
) -> Result<(), ParseError> {
    tracing::debug!(
        offset = template_offset,
        len = template.len(),
        "walking markup"
    );

    let mut walker = MarkupWalker::new(template, template_offset, state);
    let mut tokenizer = Tokenizer::new(
        template,
        MarkupCallbacks {
            walker: &mut walker,
        },
    );
    tokenizer.tokenize();

    match walker.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct MarkupWalker<'s, 'a> {
    source: &'a str,
    offset: u32,
    state: &'s mut ParseState,
    /// Content span of the most recent unconsumed comment.
    comment: Option<(usize, usize)>,
    before_first_element: bool,
    /// Inside `<script>` or `<style>` content.
    in_raw_text: bool,
    tag: Option<OpenTag>,
    attribute: Option<Attribute>,
    error: Option<ParseError>,
}

impl<'s, 'a> MarkupWalker<'s, 'a> {
    fn new(source: &'a str, offset: u32, state: &'s mut ParseState) -> Self {
        Self {
            source,
            offset,
            state,
            comment: None,
            before_first_element: true,
            in_raw_text: false,
            tag: None,
            attribute: None,
            error: None,
        }
    }

    #[inline]
    fn slice(&self, start: usize, end: usize) -> &'a str {
        self.source.get(start..end).unwrap_or_default()
    }

    #[inline]
    fn location(&self, start: usize, end: usize) -> Location {
        Location::new(start as u32, end as u32).offset_by(self.offset)
    }

    fn doc_comment(&self, default: Visibility) -> DocComment {
        match self.comment {
            Some((start, end)) => parse_comment(self.slice(start, end), default),
            None => DocComment::empty(default),
        }
    }

    fn on_text_impl(&mut self, start: usize, end: usize) {
        if !self.in_raw_text && !is_blank(self.slice(start, end)) {
            self.comment = None;
        }
    }

    fn on_comment_impl(&mut self, start: usize, end: usize) {
        self.comment = Some((start, end));
    }

    fn on_open_tag_name_impl(&mut self, start: usize, end: usize) {
        self.tag = Some(OpenTag {
            start: start.saturating_sub(1),
            name_start: start,
            name_end: end,
            attributes: SmallVec::new(),
        });
    }

    fn on_attrib_name_impl(&mut self, start: usize, end: usize) {
        self.attribute = Some(Attribute {
            name_start: start,
            name_end: end,
            value: None,
            quote: QuoteType::NoValue,
        });
    }

    fn on_attrib_data_impl(&mut self, start: usize, end: usize) {
        if let Some(attr) = self.attribute.as_mut() {
            attr.value = Some(match attr.value {
                Some((value_start, _)) => (value_start, end),
                None => (start, end),
            });
        }
    }

    fn on_attrib_end_impl(&mut self, quote: QuoteType) {
        if let Some(mut attr) = self.attribute.take() {
            attr.quote = quote;
            if let Some(tag) = self.tag.as_mut() {
                tag.attributes.push(attr);
            }
        }
    }

    fn on_close_tag_impl(&mut self, start: usize, end: usize) {
        if is_raw_text_tag(self.slice(start, end)) {
            self.in_raw_text = false;
        } else if !self.in_raw_text {
            self.comment = None;
        }
    }

    fn on_open_tag_end_impl(&mut self, end: usize, self_closing: bool) {
        let Some(tag) = self.tag.take() else {
            return;
        };
        let name = self.slice(tag.name_start, tag.name_end);

        // Script and style blocks are parsed separately
        if name.eq_ignore_ascii_case("script") || name.eq_ignore_ascii_case("style") {
            self.in_raw_text = !self_closing;
            return;
        }
        if is_raw_text_tag(name) && !self_closing {
            self.in_raw_text = true;
        }

        if self.error.is_none() {
            self.process_tag(&tag, end);
        }
        self.comment = None;
    }

    fn process_tag(&mut self, tag: &OpenTag, end: usize) {
        let name = self.slice(tag.name_start, tag.name_end);

        if self.before_first_element {
            self.before_first_element = false;
            if self.comment.is_some() && self.state.component_doc.is_none() {
                tracing::debug!(tag = name, "component documented by leading comment");
                self.state.component_doc = Some(self.doc_comment(Visibility::Public));
            }
        }

        if name == "slot" {
            self.process_slot(tag, end);
        }

        for attr in tag.attributes.iter() {
            let attr_name = self.slice(attr.name_start, attr.name_end);

            if let Some(property) = attr_name.strip_prefix("bind:") {
                if property == "this" {
                    self.process_ref(name, attr);
                } else {
                    self.process_bind(name, property, attr);
                }
            } else if let Some(event) = attr_name.strip_prefix("on:") {
                match attr.value {
                    Some(value) => self.process_handler(value, attr.quote),
                    None => self.process_forwarded_event(name, event, attr),
                }
            } else if let Some(action) = attr_name.strip_prefix("use:") {
                self.process_action(name, action, attr);
            }

            if self.error.is_some() {
                return;
            }
        }
    }

    fn attribute_location(&self, attr: &Attribute) -> Location {
        self.location(attr.name_start, attr.name_end)
    }

    fn attribute_value(&self, attr: &Attribute) -> Option<&'a str> {
        attr.value.map(|(start, end)| self.slice(start, end))
    }

    fn process_slot(&mut self, tag: &OpenTag, end: usize) {
        let doc = self.doc_comment(Visibility::Public);
        let mut slot_name = CompactString::const_new(DEFAULT_SLOT_NAME);
        let mut parameters = Vec::new();

        for attr in tag.attributes.iter() {
            let attr_name = self.slice(attr.name_start, attr.name_end);
            if attr_name == "name" {
                if let Some(value) = self.attribute_value(attr) {
                    let value = strip_mustache(value);
                    if !value.is_empty() {
                        slot_name = CompactString::new(value);
                    }
                }
                continue;
            }

            // `{item}` shorthand passes `item`
            let param_name = strip_mustache(attr_name);
            if param_name.is_empty() {
                continue;
            }
            parameters.push(slot_parameter(param_name, &doc));
        }

        let item = SemanticItem::new(slot_name, SlotDetail { parameters })
            .with_doc(doc)
            .with_location(self.location(tag.start, end + 1));
        self.state.emit(item);
    }

    fn process_bind(&mut self, tag_name: &str, property: &str, attr: &Attribute) {
        if property.is_empty() {
            return;
        }
        let target = self
            .attribute_value(attr)
            .map(|value| root_identifier(strip_mustache(value)))
            .filter(|target| !target.is_empty())
            .unwrap_or(property);

        let item = SemanticItem::new(
            target,
            DataDetail {
                bind: vec![BindMapping {
                    source: CompactString::new(tag_name),
                    property: CompactString::new(property),
                }],
                ..Default::default()
            },
        )
        .with_doc(self.doc_comment(Visibility::Private))
        .with_location(self.attribute_location(attr));
        self.state.emit(item);
    }

    fn process_ref(&mut self, tag_name: &str, attr: &Attribute) {
        let Some(value) = self.attribute_value(attr) else {
            return;
        };
        let target = root_identifier(strip_mustache(value));
        if target.is_empty() {
            return;
        }

        let item = SemanticItem::new(
            target,
            RefDetail {
                parent: Some(CompactString::new(tag_name)),
            },
        )
        .with_doc(self.doc_comment(Visibility::Private))
        .with_location(self.attribute_location(attr));
        self.state.emit(item);
    }

    /// `on:event|modifier` without a handler re-dispatches the child's event.
    fn process_forwarded_event(&mut self, tag_name: &str, directive: &str, attr: &Attribute) {
        let mut parts = directive.split('|');
        let event = parts.next().unwrap_or_default();
        if event.is_empty() {
            return;
        }
        let modifiers: Vec<CompactString> = parts
            .filter(|m| !m.is_empty())
            .map(CompactString::new)
            .collect();

        let doc = self.doc_comment(Visibility::Public);

        match self.state.markup_events.get(event) {
            Some(&previous)
                if !(doc.visibility == Visibility::Public && previous != Visibility::Public) =>
            {
                tracing::trace!(event, "skipping duplicate forwarded event");
                return;
            }
            _ => {}
        }
        self.state
            .markup_events
            .insert(CompactString::new(event), doc.visibility);

        let item = SemanticItem::new(
            event,
            EventDetail {
                parent: Some(CompactString::new(tag_name)),
                modifiers,
            },
        )
        .with_doc(doc)
        .with_location(self.attribute_location(attr));
        self.state.emit(item);
    }

    /// Hand an `on:event={...}` handler to the script walker.
    fn process_handler(&mut self, (start, end): (usize, usize), quote: QuoteType) {
        let raw = self.slice(start, end);
        // Quoted handlers need braces, `on:click="{go}"`
        if quote != QuoteType::Brace && !raw.trim_start().starts_with('{') {
            return;
        }
        let expression = strip_mustache(raw);
        if expression.is_empty() {
            return;
        }
        let inner_start = start + (expression.as_ptr() as usize - raw.as_ptr() as usize);
        let offset = self.offset + inner_start as u32;

        if let Err(err) = parse_inline_expression(expression, offset, self.state) {
            self.error = Some(err);
        }
    }

    fn process_action(&mut self, tag_name: &str, action: &str, attr: &Attribute) {
        if action.is_empty() {
            return;
        }
        let doc = self.doc_comment(self.state.options.action_visibility);
        let item = SemanticItem::new(
            action,
            ActionDetail {
                parent: Some(CompactString::new(tag_name)),
            },
        )
        .with_doc(doc)
        .with_location(self.attribute_location(attr));
        self.state.emit(item);
    }
}

/// A slot parameter, documented by a matching `@param` keyword.
fn slot_parameter(name: &str, doc: &DocComment) -> SlotParameter {
    let documented = doc
        .keywords_named("param")
        .map(|keyword| parse_param_keyword(&keyword.description))
        .find(|param| param.name == name);

    let (type_expr, description) = match documented {
        Some(param) => (
            param.type_expr.unwrap_or_else(TypedExpression::any),
            param.description,
        ),
        None => (TypedExpression::any(), String::new()),
    };

    SlotParameter {
        name: CompactString::new(name),
        description,
        visibility: Visibility::Public,
        type_expr,
        keywords: Vec::new(),
    }
}

/// Wrapper struct for implementing Callbacks
struct MarkupCallbacks<'w, 's, 'a> {
    walker: &'w mut MarkupWalker<'s, 'a>,
}

impl Callbacks for MarkupCallbacks<'_, '_, '_> {
    fn on_text(&mut self, start: usize, end: usize) {
        self.walker.on_text_impl(start, end);
    }

    fn on_mustache(&mut self, _start: usize, _end: usize) {
        self.walker.comment = None;
    }

    fn on_open_tag_name(&mut self, start: usize, end: usize) {
        self.walker.on_open_tag_name_impl(start, end);
    }

    fn on_open_tag_end(&mut self, end: usize) {
        self.walker.on_open_tag_end_impl(end, false);
    }

    fn on_self_closing_tag(&mut self, end: usize) {
        self.walker.on_open_tag_end_impl(end, true);
    }

    fn on_close_tag(&mut self, start: usize, end: usize) {
        self.walker.on_close_tag_impl(start, end);
    }

    fn on_attrib_name(&mut self, start: usize, end: usize) {
        self.walker.on_attrib_name_impl(start, end);
    }

    fn on_attrib_data(&mut self, start: usize, end: usize) {
        self.walker.on_attrib_data_impl(start, end);
    }

    fn on_attrib_end(&mut self, quote: QuoteType, _end: usize) {
        self.walker.on_attrib_end_impl(quote);
    }

    fn on_comment(&mut self, start: usize, end: usize) {
        self.walker.on_comment_impl(start, end);
    }
}
