use super::*;
use vellum_relief::{
    Category, DiagnosticCode, Location, ResolvedOptions, SemanticItem, TypedExpression,
    VariableKind,
};

fn parse_block(block: ScriptBlock) -> ParseState {
    let mut state = ParseState::new(ResolvedOptions::default());
    parse_script_block(&block, &mut state).unwrap();
    state
}

fn parse(content: &str) -> ParseState {
    parse_block(ScriptBlock::new(content, "", 0))
}

fn items(state: &ParseState, category: Category) -> Vec<&SemanticItem> {
    state
        .items
        .iter()
        .filter(|item| item.category() == category)
        .collect()
}

fn names(state: &ParseState, category: Category) -> Vec<&str> {
    items(state, category)
        .into_iter()
        .map(|item| item.name.as_str())
        .collect()
}

fn find<'s>(state: &'s ParseState, category: Category, name: &str) -> &'s SemanticItem {
    state
        .items
        .iter()
        .find(|item| item.category() == category && item.name == name)
        .unwrap_or_else(|| panic!("no {} item named {}", category, name))
}

#[test]
fn test_dispatch_literal_event() {
    let state = parse("const dispatch = createEventDispatcher(); dispatch('notify')");

    let events = items(&state, Category::Events);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "notify");
    assert_eq!(events[0].visibility, Visibility::Public);
    assert_eq!(events[0].parent(), None);
    assert!(state.diagnostics.is_empty());
}

#[test]
fn test_locations_are_file_relative() {
    let state = parse_block(ScriptBlock::new("let a;\nlet b = 2;", "", 100));
    let b = find(&state, Category::Data, "b");
    assert_eq!(b.locations, vec![Location::new(111, 112)]);
}

#[test]
fn test_variable_declarations() {
    let state = parse(
        r#"
export let size = 'md';
/** @protected */
export let variant;
/** Whether the panel is hidden */
let hidden = true;
const limit = -1;
var handler = () => {};
"#,
    );

    let size = find(&state, Category::Data, "size");
    assert_eq!(size.visibility, Visibility::Public);
    let data = size.as_data().unwrap();
    assert_eq!(data.kind, Some(VariableKind::Let));
    assert_eq!(data.type_expr, Some(TypedExpression::named("string")));
    assert_eq!(data.default_value.as_deref(), Some("'md'"));
    assert!(!data.readonly);
    assert!(!data.is_static);

    let variant = find(&state, Category::Data, "variant");
    assert_eq!(variant.visibility, Visibility::Protected);
    assert_eq!(variant.as_data().unwrap().type_expr, None);

    let hidden = find(&state, Category::Data, "hidden");
    assert_eq!(hidden.visibility, Visibility::Private);
    assert_eq!(hidden.description, "Whether the panel is hidden");
    assert_eq!(
        hidden.as_data().unwrap().type_expr,
        Some(TypedExpression::named("boolean"))
    );

    let limit = find(&state, Category::Data, "limit").as_data().unwrap();
    assert!(limit.readonly);
    assert_eq!(limit.type_expr, Some(TypedExpression::named("number")));
    assert_eq!(limit.default_value.as_deref(), Some("-1"));

    let handler = find(&state, Category::Data, "handler").as_data().unwrap();
    assert_eq!(handler.kind, Some(VariableKind::Var));
    assert_eq!(handler.type_expr, Some(TypedExpression::named("function")));
    assert_eq!(handler.default_value, None);
}

#[test]
fn test_documented_type_wins_over_inference() {
    let state = parse("/** @type {'sm'|'md'} */\nexport let size = 'md';");
    let data = find(&state, Category::Data, "size").as_data().unwrap();
    match data.type_expr.as_ref().unwrap() {
        TypedExpression::Union { types, .. } => assert_eq!(types.len(), 2),
        other => panic!("expected union, got {:?}", other),
    }
}

#[test]
fn test_destructured_declaration() {
    let state = parse("let { a, b: renamed, ...others } = props;");
    assert_eq!(names(&state, Category::Data), vec!["a", "renamed", "others"]);
    assert!(state
        .items
        .iter()
        .all(|item| item.as_data().unwrap().type_expr.is_none()));
}

#[test]
fn test_module_block_is_static() {
    let state = parse_block(ScriptBlock::new(
        "export const VERSION = '1.0';\nexport function reset() {}",
        r#"context="module""#,
        0,
    ));

    let version = find(&state, Category::Data, "VERSION").as_data().unwrap();
    assert!(version.is_static);
    assert!(version.readonly);
    assert!(find(&state, Category::Methods, "reset").as_method().unwrap().is_static);
}

#[test]
fn test_typescript_block() {
    let state = parse_block(ScriptBlock::new(
        "interface Props { a: string }\nexport let count: number = 0;",
        r#"lang="ts""#,
        0,
    ));
    let count = find(&state, Category::Data, "count");
    assert_eq!(count.visibility, Visibility::Public);
    assert_eq!(
        count.as_data().unwrap().type_expr,
        Some(TypedExpression::named("number"))
    );
}

#[test]
fn test_method_params_and_return() {
    let state = parse(
        r#"
/**
 * Adds numbers.
 * @param {number} a - first
 * @param {number} [b=2] - second
 * @returns {number} the sum
 */
function add(a, b = 2, ...rest) {
    return a + b;
}
"#,
    );

    let add = find(&state, Category::Methods, "add");
    assert_eq!(add.description, "Adds numbers.");
    assert_eq!(add.visibility, Visibility::Private);

    let method = add.as_method().unwrap();
    let params: Vec<_> = method
        .params
        .iter()
        .map(|p| {
            (
                p.name.as_str(),
                p.type_expr.text(),
                p.optional,
                p.default_value.as_deref(),
                p.description.as_str(),
                p.repeated,
            )
        })
        .collect();
    assert_eq!(
        params,
        vec![
            ("a", "number", false, None, "first", false),
            ("b", "number", true, Some("2"), "second", false),
            ("rest", "any", false, None, "", true),
        ]
    );

    let ret = method.return_value.as_ref().unwrap();
    assert_eq!(ret.type_expr, TypedExpression::named("number"));
    assert_eq!(ret.description, "the sum");
}

#[test]
fn test_method_visibility_default_and_export() {
    let mut options = ResolvedOptions::default();
    options.method_visibility = Visibility::Protected;
    let mut state = ParseState::new(options);
    let block = ScriptBlock::new("function a() {}\nexport function b() {}", "", 0);
    parse_script_block(&block, &mut state).unwrap();

    assert_eq!(find(&state, Category::Methods, "a").visibility, Visibility::Protected);
    assert_eq!(find(&state, Category::Methods, "b").visibility, Visibility::Public);
}

#[test]
fn test_nested_declarations_are_not_emitted() {
    let state = parse(
        r#"
function setup() {
    const d = createEventDispatcher();
    let counter = 0;
    function inner() {}
    d('ready');
}
"#,
    );

    assert_eq!(names(&state, Category::Methods), vec!["setup"]);
    assert!(names(&state, Category::Data).is_empty());
    assert_eq!(names(&state, Category::Events), vec!["ready"]);
}

#[test]
fn test_reactive_dependencies() {
    let state = parse(
        r#"
/** Order total */
$: total = price * count + tax.rate + price;
$: doubled = items.map((i) => i * factor);
$: console.log(total);
"#,
    );

    let total = find(&state, Category::Computed, "total");
    assert_eq!(total.description, "Order total");
    assert_eq!(
        total.as_computed().unwrap().dependencies,
        vec!["price", "count", "tax"]
    );

    let doubled = find(&state, Category::Computed, "doubled");
    assert_eq!(doubled.as_computed().unwrap().dependencies, vec!["items", "factor"]);

    assert_eq!(names(&state, Category::Computed).len(), 2);
}

#[test]
fn test_reactive_dependencies_in_function_bodies() {
    let state = parse(
        r#"
let a = 1;
$: f = () => { return a + b; };
$: g = function (x) {
    const scaled = x * ratio;
    if (scaled > limit) {
        return scaled;
    }
    return offset;
};
"#,
    );

    let f = find(&state, Category::Computed, "f");
    assert_eq!(f.as_computed().unwrap().dependencies, vec!["a", "b"]);

    let g = find(&state, Category::Computed, "g");
    assert_eq!(
        g.as_computed().unwrap().dependencies,
        vec!["ratio", "limit", "offset"]
    );
}

#[test]
fn test_imports() {
    let state = parse(
        r#"
import Button from './Button.svelte';
import utils from './utils';
import { format as fmt } from 'date-fns';
import * as store from './store';
"#,
    );

    let button = find(&state, Category::Components, "Button");
    assert_eq!(button.visibility, Visibility::Private);
    match &button.detail {
        vellum_relief::ItemDetail::Component(component) => {
            assert_eq!(component.import_path, "./Button.svelte");
        }
        other => panic!("expected component, got {:?}", other),
    }

    let imported: Vec<_> = items(&state, Category::Data)
        .into_iter()
        .map(|item| {
            let data = item.as_data().unwrap();
            (
                item.name.as_str(),
                data.original_name.as_deref(),
                data.import_path.as_deref(),
            )
        })
        .collect();
    assert_eq!(
        imported,
        vec![
            ("utils", Some("utils"), Some("./utils")),
            ("fmt", Some("format"), Some("date-fns")),
            ("store", Some("store"), Some("./store")),
        ]
    );
}

#[test]
fn test_export_specifiers() {
    let state = parse(
        r#"
let internal = 1;
export { internal as external };
export { helper } from './helpers';
"#,
    );

    let external = find(&state, Category::Data, "external");
    assert_eq!(external.visibility, Visibility::Public);
    assert_eq!(
        external.as_data().unwrap().local_name.as_deref(),
        Some("internal")
    );

    let helper = find(&state, Category::Data, "helper").as_data().unwrap();
    assert_eq!(helper.import_path.as_deref(), Some("./helpers"));
    assert_eq!(helper.original_name.as_deref(), Some("helper"));
    assert_eq!(helper.local_name, None);
}

#[test]
fn test_event_names_resolve_through_table() {
    let state = parse(
        r#"
import { createEventDispatcher as makeDispatcher } from 'svelte';
const EVENTS = { change: { value: 'value-change' } };
const CLOSE = 'close';
const ALIAS = EVENTS.change;
const fire = makeDispatcher();
const emit = fire;
function notify() {
    const local = 'local-event';
    fire(EVENTS.change.value);
    fire(CLOSE);
    fire(local);
    fire(`templated`);
    emit(ALIAS.value);
    emit(EVENTS['change'].value);
}
"#,
    );

    assert_eq!(
        names(&state, Category::Events),
        vec![
            "value-change",
            "close",
            "local-event",
            "templated",
            "value-change",
            "value-change",
        ]
    );
    assert!(state.diagnostics.is_empty());
}

#[test]
fn test_nearest_frame_wins() {
    let state = parse(
        r#"
const dispatch = createEventDispatcher();
const NAME = 'outer';
function a() {
    const NAME = 'inner';
    dispatch(NAME);
}
dispatch(NAME);
"#,
    );
    assert_eq!(names(&state, Category::Events), vec!["inner", "outer"]);
}

#[test]
fn test_dispatch_through_member_chain() {
    let state = parse(
        r#"
const dispatch = createEventDispatcher();
const api = { dispatch };
api.dispatch('member');
"#,
    );
    assert_eq!(names(&state, Category::Events), vec!["member"]);
}

#[test]
fn test_unresolved_event_name() {
    let source = "const dispatch = createEventDispatcher();\ndispatch(getName());";
    let state = parse(source);

    let events = items(&state, Category::Events);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, UNRESOLVED_EVENT_NAME);

    assert_eq!(state.diagnostics.len(), 1);
    let diagnostic = &state.diagnostics[0];
    assert_eq!(diagnostic.code, DiagnosticCode::UnresolvedEventName);
    assert!(diagnostic.message.contains("getName()"));
    let start = source.find("getName").unwrap() as u32;
    assert_eq!(diagnostic.location, Some(Location::new(start, start + 9)));
}

#[test]
fn test_event_keyword() {
    let state = parse(
        r#"
const dispatch = createEventDispatcher();
/**
 * Fired after a rename.
 * @event renamed
 */
dispatch(someVariable);
/** @event */
dispatch('kept');
"#,
    );

    let events = items(&state, Category::Events);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].name, "renamed");
    assert_eq!(events[0].description, "Fired after a rename.");
    assert_eq!(events[1].name, "kept");

    assert_eq!(state.diagnostics.len(), 1);
    assert_eq!(state.diagnostics[0].code, DiagnosticCode::EmptyEventKeyword);
}

#[test]
fn test_documented_event_visibility() {
    let state = parse(
        r#"
const dispatch = createEventDispatcher();
function go() {
    /** @private */
    dispatch('internal');
}
"#,
    );
    assert_eq!(
        find(&state, Category::Events, "internal").visibility,
        Visibility::Private
    );
}

#[test]
fn test_redeclaration_emits_each_occurrence() {
    let state = parse("/** first */\nvar size = 1;\nvar size = 2;");
    let sizes = items(&state, Category::Data);
    assert_eq!(sizes.len(), 2);
    assert_eq!(sizes[0].description, "first");
    assert_eq!(sizes[1].description, "");
}

#[test]
fn test_syntax_error_aborts() {
    let mut state = ParseState::new(ResolvedOptions::default());
    let block = ScriptBlock::new("let = ;", "", 42);
    let err = parse_script_block(&block, &mut state).unwrap_err();

    match err {
        ParseError::Syntax { scope, offset, .. } => {
            assert_eq!(scope, ScriptScope::Instance);
            assert_eq!(offset, 42);
        }
        other => panic!("expected syntax error, got {:?}", other),
    }
    assert!(state.items.is_empty());
}

#[test]
fn test_inline_expression() {
    let mut state = ParseState::new(ResolvedOptions::default());
    state.table.register_dispatcher("dispatch");

    parse_inline_expression("dispatch('x')", 10, &mut state).unwrap();
    parse_inline_expression("{ handler: () => dispatch('y') }", 30, &mut state).unwrap();

    let events = items(&state, Category::Events);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].name, "x");
    assert_eq!(events[0].locations, vec![Location::new(19, 22)]);
    assert_eq!(events[1].name, "y");

    let err = parse_inline_expression("() =>", 5, &mut state).unwrap_err();
    assert!(matches!(
        err,
        ParseError::Syntax {
            scope: ScriptScope::Inline,
            offset: 5,
            ..
        }
    ));
}
