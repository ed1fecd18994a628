//! Level-0 statement rules.
//!
//! Handles processing of:
//! - Variable declarations (const, let, var), exported or not
//! - Function declarations
//! - Export specifiers (`export { local as exported }`)
//! - Reactive `$:` assignments
//! - Import declarations
//!
//! Everything else is walked one level deeper.

use oxc_ast::ast::{
    AssignmentTarget, BindingPattern, Declaration as AstDeclaration, ExportNamedDeclaration,
    Expression, Function, ImportDeclaration, ImportDeclarationSpecifier, LabeledStatement,
    Statement, VariableDeclaration, VariableDeclarationKind,
};
use oxc_span::GetSpan;
use vellum_carton::{is_component_name, CompactString, SmallVec};
use vellum_relief::{
    ComponentDetail, ComputedDetail, DataDetail, DocComment, MethodDetail, SemanticItem,
    TypedExpression, VariableKind, Visibility,
};

use super::extract::{
    collect_binding_names, declaration_of, infer_type, literal_source, method_params,
};
use super::walk::{
    collect_dependencies, register_dispatcher_binding, walk_expression, walk_function,
    walk_statement,
};
use super::ScriptWalker;
use crate::comment::{parse_return_keyword, parse_type_keyword};
use crate::table::{Declaration, DISPATCHER_FACTORY, DISPATCHER_MODULE};

/// Process a single top-level statement
pub(crate) fn process_statement(w: &mut ScriptWalker<'_, '_>, stmt: &Statement<'_>) {
    match stmt {
        Statement::VariableDeclaration(decl) => {
            w.in_statement(decl.span.start, |w| process_variable_declaration(w, decl, None));
        }
        Statement::FunctionDeclaration(func) => {
            process_function_declaration(w, func, None);
        }
        Statement::ExportNamedDeclaration(export) => {
            w.in_statement(export.span.start, |w| process_export(w, export));
        }
        Statement::LabeledStatement(labeled) if labeled.label.name == "$" => {
            w.in_statement(labeled.span.start, |w| process_reactive(w, labeled));
        }
        Statement::ImportDeclaration(import) => {
            process_import(w, import);
        }
        _ => walk_statement(w, stmt),
    }
}

fn variable_kind(kind: VariableDeclarationKind) -> VariableKind {
    match kind {
        VariableDeclarationKind::Var => VariableKind::Var,
        VariableDeclarationKind::Let => VariableKind::Let,
        _ => VariableKind::Const,
    }
}

/// Exported declarations are public unless the comment says otherwise.
#[inline]
fn apply_export(doc: &mut DocComment, exported: bool) {
    if exported && !doc.has_visibility_keyword() {
        doc.visibility = Visibility::Public;
    }
}

/// `@type {...}` keyword, if any.
fn documented_type(doc: &DocComment) -> Option<TypedExpression> {
    doc.keyword("type")
        .and_then(|keyword| parse_type_keyword(&keyword.description))
}

fn process_variable_declaration(
    w: &mut ScriptWalker<'_, '_>,
    decl: &VariableDeclaration<'_>,
    export_start: Option<u32>,
) {
    let kind = variable_kind(decl.kind);

    for declarator in decl.declarations.iter() {
        let is_simple = matches!(declarator.id, BindingPattern::BindingIdentifier(_));
        let mut names = SmallVec::<[_; 4]>::new();
        collect_binding_names(&declarator.id, &mut names);

        for (name, span) in names {
            let mut candidates = SmallVec::<[u32; 4]>::new();
            candidates.extend([span.start, declarator.span.start, decl.span.start]);
            candidates.extend(export_start);

            let mut doc = w.doc_comment(&candidates, Visibility::Private);
            apply_export(&mut doc, export_start.is_some());

            let init = declarator.init.as_ref().filter(|_| is_simple);
            let type_expr = documented_type(&doc).or_else(|| init.map(infer_type));
            let default_value = init.and_then(|init| literal_source(init, w.ctx.source));

            let item = SemanticItem::new(
                name.clone(),
                DataDetail {
                    kind: Some(kind),
                    is_static: w.ctx.is_static(),
                    readonly: kind == VariableKind::Const,
                    type_expr,
                    default_value,
                    ..Default::default()
                },
            )
            .with_doc(doc)
            .with_location(w.ctx.location(span.start, span.end));
            w.state.emit(item);

            let declaration = init.map_or(Declaration::Opaque, declaration_of);
            w.state.table.record(name, declaration);
        }

        register_dispatcher_binding(w, declarator);

        if let Some(init) = &declarator.init {
            walk_expression(w, init);
        }
    }
}

fn process_function_declaration(
    w: &mut ScriptWalker<'_, '_>,
    func: &Function<'_>,
    export_start: Option<u32>,
) {
    if let Some(id) = &func.id {
        let mut candidates = SmallVec::<[u32; 3]>::new();
        candidates.extend([id.span.start, func.span.start]);
        candidates.extend(export_start);

        let mut doc = w.doc_comment(&candidates, w.state.options.method_visibility);
        apply_export(&mut doc, export_start.is_some());

        let params = method_params(&func.params, w.ctx.source, &doc);
        let return_value = doc
            .keyword("returns")
            .or_else(|| doc.keyword("return"))
            .map(|keyword| parse_return_keyword(&keyword.description));

        let name = CompactString::new(id.name.as_str());
        let item = SemanticItem::new(
            name.clone(),
            MethodDetail {
                params,
                return_value,
                is_static: w.ctx.is_static(),
            },
        )
        .with_doc(doc)
        .with_location(w.ctx.location(id.span.start, id.span.end));
        w.state.emit(item);
        w.state.table.record(name, Declaration::Function);
    }

    walk_function(w, &func.params, func.body.as_deref());
}

fn process_export(w: &mut ScriptWalker<'_, '_>, export: &ExportNamedDeclaration<'_>) {
    if export.export_kind.is_type() {
        return;
    }

    match &export.declaration {
        Some(AstDeclaration::VariableDeclaration(decl)) => {
            process_variable_declaration(w, decl, Some(export.span.start));
        }
        Some(AstDeclaration::FunctionDeclaration(func)) => {
            process_function_declaration(w, func, Some(export.span.start));
        }
        _ => {}
    }

    let import_path = export
        .source
        .as_ref()
        .map(|source| CompactString::new(source.value.as_str()));

    for spec in export.specifiers.iter() {
        if spec.export_kind.is_type() {
            continue;
        }

        let local = CompactString::new(spec.local.name().as_str());
        let exported = CompactString::new(spec.exported.name().as_str());

        let doc = w.doc_comment(&[spec.span.start, export.span.start], Visibility::Public);

        let detail = match &import_path {
            // Re-exported straight from another module
            Some(path) => DataDetail {
                is_static: w.ctx.is_static(),
                import_path: Some(path.clone()),
                original_name: Some(local),
                ..Default::default()
            },
            None => DataDetail {
                is_static: w.ctx.is_static(),
                local_name: Some(local),
                ..Default::default()
            },
        };

        let span = spec.exported.span();
        let item = SemanticItem::new(exported, detail)
            .with_doc(doc)
            .with_location(w.ctx.location(span.start, span.end));
        w.state.emit(item);
    }
}

/// `$: name = expression`
fn process_reactive(w: &mut ScriptWalker<'_, '_>, labeled: &LabeledStatement<'_>) {
    let assignment = match &labeled.body {
        Statement::ExpressionStatement(expr_stmt) => match &expr_stmt.expression {
            Expression::AssignmentExpression(assign) => Some(assign),
            _ => None,
        },
        _ => None,
    };

    let Some(assign) = assignment else {
        walk_statement(w, &labeled.body);
        return;
    };
    let AssignmentTarget::AssignmentTargetIdentifier(id) = &assign.left else {
        walk_statement(w, &labeled.body);
        return;
    };

    let doc = w.doc_comment(&[labeled.span.start], Visibility::Private);
    let type_expr = documented_type(&doc);

    let item = SemanticItem::new(
        id.name.as_str(),
        ComputedDetail {
            dependencies: collect_dependencies(&assign.right),
            type_expr,
            is_static: w.ctx.is_static(),
        },
    )
    .with_doc(doc)
    .with_location(w.ctx.location(id.span.start, id.span.end));
    w.state.emit(item);

    walk_expression(w, &assign.right);
}

fn process_import(w: &mut ScriptWalker<'_, '_>, import: &ImportDeclaration<'_>) {
    if import.import_kind.is_type() {
        return;
    }
    let Some(specifiers) = &import.specifiers else {
        return;
    };

    let path = CompactString::new(import.source.value.as_str());

    for spec in specifiers.iter() {
        let (local, local_span, spec_start, original, is_default) = match spec {
            ImportDeclarationSpecifier::ImportSpecifier(s) => {
                if s.import_kind.is_type() {
                    continue;
                }
                let original = CompactString::new(s.imported.name().as_str());
                (s.local.name.as_str(), s.local.span, s.span.start, original, false)
            }
            ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                let local = s.local.name.as_str();
                (local, s.local.span, s.span.start, CompactString::new(local), true)
            }
            ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                let local = s.local.name.as_str();
                (local, s.local.span, s.span.start, CompactString::new(local), false)
            }
        };

        if path == DISPATCHER_MODULE && original == DISPATCHER_FACTORY {
            tracing::debug!(local, "registered event dispatcher factory");
            w.state.table.register_dispatcher_factory(local);
        }

        w.state.table.record(
            local,
            Declaration::Import {
                path: path.clone(),
                original: original.clone(),
            },
        );

        let doc = w.doc_comment(
            &[local_span.start, spec_start, import.span.start],
            Visibility::Private,
        );
        let location = w.ctx.location(local_span.start, local_span.end);

        let item = if is_default && is_component_name(local) {
            SemanticItem::new(
                local,
                ComponentDetail {
                    import_path: path.clone(),
                },
            )
        } else {
            SemanticItem::new(
                local,
                DataDetail {
                    is_static: w.ctx.is_static(),
                    import_path: Some(path.clone()),
                    original_name: Some(original),
                    ..Default::default()
                },
            )
        };
        w.state.emit(item.with_doc(doc).with_location(location));
    }
}
