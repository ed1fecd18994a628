//! Nested walking below level 0.
//!
//! Nothing is declared from here except events: nested declarations only
//! feed the enclosing frame so dispatched event names can be resolved, and
//! dispatcher bindings are registered at any depth.

use oxc_ast::ast::{
    Argument, ArrayExpressionElement, BindingPattern, CallExpression,
    ChainElement, Class, ClassElement, Expression, ForStatementInit, ForStatementLeft,
    FormalParameters, FunctionBody, ObjectPropertyKind, Statement, VariableDeclaration,
    VariableDeclarator,
};
use oxc_span::GetSpan;
use vellum_carton::{CompactString, FxHashSet, SmallVec};
use vellum_relief::{DiagnosticCode, EventDetail, SemanticItem, Visibility};

use super::extract::{
    collect_binding_names, declaration_of, member_path, span_text, template_text,
};
use super::{ScriptWalker, UNRESOLVED_EVENT_NAME};
use crate::table::Declaration;

/// Walk a nested statement.
pub(super) fn walk_statement(w: &mut ScriptWalker<'_, '_>, stmt: &Statement<'_>) {
    w.in_statement(stmt.span().start, |w| walk_statement_inner(w, stmt));
}

fn walk_statement_inner(w: &mut ScriptWalker<'_, '_>, stmt: &Statement<'_>) {
    match stmt {
        Statement::ExpressionStatement(expr_stmt) => {
            walk_expression(w, &expr_stmt.expression);
        }
        Statement::VariableDeclaration(var_decl) => {
            walk_variable_declaration(w, var_decl);
        }
        Statement::FunctionDeclaration(func) => {
            if let Some(id) = &func.id {
                w.record_local(CompactString::new(id.name.as_str()), Declaration::Function);
            }
            walk_function(w, &func.params, func.body.as_deref());
        }
        Statement::ClassDeclaration(class) => {
            if let Some(id) = &class.id {
                w.record_local(CompactString::new(id.name.as_str()), Declaration::Opaque);
            }
            walk_class(w, class);
        }
        Statement::ReturnStatement(ret) => {
            if let Some(arg) = &ret.argument {
                walk_expression(w, arg);
            }
        }
        Statement::ThrowStatement(throw) => {
            walk_expression(w, &throw.argument);
        }
        Statement::BlockStatement(block) => {
            for stmt in block.body.iter() {
                walk_statement(w, stmt);
            }
        }
        Statement::IfStatement(if_stmt) => {
            walk_expression(w, &if_stmt.test);
            walk_statement(w, &if_stmt.consequent);
            if let Some(alt) = &if_stmt.alternate {
                walk_statement(w, alt);
            }
        }
        Statement::ForStatement(for_stmt) => {
            if let Some(init) = &for_stmt.init {
                match init {
                    ForStatementInit::VariableDeclaration(var_decl) => {
                        walk_variable_declaration(w, var_decl);
                    }
                    _ => {
                        if let Some(expr) = init.as_expression() {
                            walk_expression(w, expr);
                        }
                    }
                }
            }
            if let Some(test) = &for_stmt.test {
                walk_expression(w, test);
            }
            if let Some(update) = &for_stmt.update {
                walk_expression(w, update);
            }
            walk_statement(w, &for_stmt.body);
        }
        Statement::ForInStatement(for_in) => {
            if let ForStatementLeft::VariableDeclaration(var_decl) = &for_in.left {
                walk_variable_declaration(w, var_decl);
            }
            walk_expression(w, &for_in.right);
            walk_statement(w, &for_in.body);
        }
        Statement::ForOfStatement(for_of) => {
            if let ForStatementLeft::VariableDeclaration(var_decl) = &for_of.left {
                walk_variable_declaration(w, var_decl);
            }
            walk_expression(w, &for_of.right);
            walk_statement(w, &for_of.body);
        }
        Statement::WhileStatement(while_stmt) => {
            walk_expression(w, &while_stmt.test);
            walk_statement(w, &while_stmt.body);
        }
        Statement::DoWhileStatement(do_while) => {
            walk_statement(w, &do_while.body);
            walk_expression(w, &do_while.test);
        }
        Statement::SwitchStatement(switch_stmt) => {
            walk_expression(w, &switch_stmt.discriminant);
            for case in switch_stmt.cases.iter() {
                if let Some(test) = &case.test {
                    walk_expression(w, test);
                }
                for stmt in case.consequent.iter() {
                    walk_statement(w, stmt);
                }
            }
        }
        Statement::TryStatement(try_stmt) => {
            for stmt in try_stmt.block.body.iter() {
                walk_statement(w, stmt);
            }
            if let Some(handler) = &try_stmt.handler {
                for stmt in handler.body.body.iter() {
                    walk_statement(w, stmt);
                }
            }
            if let Some(finalizer) = &try_stmt.finalizer {
                for stmt in finalizer.body.iter() {
                    walk_statement(w, stmt);
                }
            }
        }
        Statement::LabeledStatement(labeled) => {
            walk_statement(w, &labeled.body);
        }
        Statement::WithStatement(with_stmt) => {
            walk_expression(w, &with_stmt.object);
            walk_statement(w, &with_stmt.body);
        }
        _ => {}
    }
}

/// Register dispatchers and record nested bindings, then walk initializers.
fn walk_variable_declaration(w: &mut ScriptWalker<'_, '_>, var_decl: &VariableDeclaration<'_>) {
    for declarator in var_decl.declarations.iter() {
        register_dispatcher_binding(w, declarator);

        let mut names = SmallVec::<[_; 4]>::new();
        collect_binding_names(&declarator.id, &mut names);
        let is_simple = matches!(declarator.id, BindingPattern::BindingIdentifier(_));
        for (name, _) in names {
            let declaration = match &declarator.init {
                Some(init) if is_simple => declaration_of(init),
                _ => Declaration::Opaque,
            };
            w.record_local(name, declaration);
        }

        if let Some(init) = &declarator.init {
            walk_expression(w, init);
        }
    }
}

/// `const d = createEventDispatcher()`, `const fire = d` and
/// `const make = createEventDispatcher` at any depth.
pub(super) fn register_dispatcher_binding(
    w: &mut ScriptWalker<'_, '_>,
    declarator: &VariableDeclarator<'_>,
) {
    let BindingPattern::BindingIdentifier(id) = &declarator.id else {
        return;
    };
    let Some(init) = &declarator.init else {
        return;
    };
    let name = id.name.as_str();
    let table = &mut w.state.table;

    match init.without_parentheses() {
        Expression::CallExpression(call) => {
            if let Expression::Identifier(callee) = &call.callee {
                if table.is_dispatcher_factory(callee.name.as_str()) {
                    tracing::debug!(name, "registered event dispatcher");
                    table.register_dispatcher(name);
                }
            }
        }
        Expression::Identifier(target) => {
            let target = target.name.as_str();
            if table.is_dispatcher(target) {
                table.register_dispatcher(name);
            }
            if table.is_dispatcher_factory(target) {
                table.register_dispatcher_factory(name);
            }
        }
        _ => {}
    }
}

/// Walk a function body in a fresh frame holding its parameters.
pub(super) fn walk_function(
    w: &mut ScriptWalker<'_, '_>,
    params: &FormalParameters<'_>,
    body: Option<&FunctionBody<'_>>,
) {
    w.enter_frame();

    let mut names = SmallVec::<[_; 4]>::new();
    for param in params.items.iter() {
        collect_binding_names(&param.pattern, &mut names);
    }
    if let Some(rest) = &params.rest {
        collect_binding_names(&rest.rest.argument, &mut names);
    }
    for (name, _) in names {
        w.record_local(name, Declaration::Opaque);
    }

    if let Some(body) = body {
        for stmt in body.statements.iter() {
            walk_statement(w, stmt);
        }
    }

    w.exit_frame();
}

fn walk_class(w: &mut ScriptWalker<'_, '_>, class: &Class<'_>) {
    for element in class.body.body.iter() {
        match element {
            ClassElement::MethodDefinition(method) => {
                walk_function(w, &method.value.params, method.value.body.as_deref());
            }
            ClassElement::PropertyDefinition(prop) => {
                if let Some(value) = &prop.value {
                    walk_expression(w, value);
                }
            }
            _ => {}
        }
    }
}

/// Walk a nested expression.
pub(super) fn walk_expression(w: &mut ScriptWalker<'_, '_>, expr: &Expression<'_>) {
    match expr {
        Expression::CallExpression(call) => walk_call(w, call),
        Expression::NewExpression(new_expr) => {
            walk_expression(w, &new_expr.callee);
            walk_arguments(w, &new_expr.arguments);
        }
        Expression::ArrowFunctionExpression(arrow) => {
            walk_function(w, &arrow.params, Some(&*arrow.body));
        }
        Expression::FunctionExpression(func) => {
            walk_function(w, &func.params, func.body.as_deref());
        }
        Expression::ClassExpression(class) => walk_class(w, class),
        Expression::StaticMemberExpression(member) => {
            walk_expression(w, &member.object);
        }
        Expression::ComputedMemberExpression(member) => {
            walk_expression(w, &member.object);
            walk_expression(w, &member.expression);
        }
        Expression::ChainExpression(chain) => match &chain.expression {
            ChainElement::CallExpression(call) => walk_call(w, call),
            ChainElement::TSNonNullExpression(expr) => walk_expression(w, &expr.expression),
            ChainElement::StaticMemberExpression(member) => walk_expression(w, &member.object),
            ChainElement::ComputedMemberExpression(member) => {
                walk_expression(w, &member.object);
                walk_expression(w, &member.expression);
            }
            ChainElement::PrivateFieldExpression(field) => walk_expression(w, &field.object),
        },
        Expression::ConditionalExpression(cond) => {
            walk_expression(w, &cond.test);
            walk_expression(w, &cond.consequent);
            walk_expression(w, &cond.alternate);
        }
        Expression::LogicalExpression(logical) => {
            walk_expression(w, &logical.left);
            walk_expression(w, &logical.right);
        }
        Expression::BinaryExpression(binary) => {
            walk_expression(w, &binary.left);
            walk_expression(w, &binary.right);
        }
        Expression::ArrayExpression(arr) => {
            for elem in arr.elements.iter() {
                match elem {
                    ArrayExpressionElement::SpreadElement(spread) => {
                        walk_expression(w, &spread.argument);
                    }
                    ArrayExpressionElement::Elision(_) => {}
                    _ => {
                        if let Some(expr) = elem.as_expression() {
                            walk_expression(w, expr);
                        }
                    }
                }
            }
        }
        Expression::ObjectExpression(obj) => {
            for prop in obj.properties.iter() {
                match prop {
                    ObjectPropertyKind::ObjectProperty(p) => walk_expression(w, &p.value),
                    ObjectPropertyKind::SpreadProperty(spread) => {
                        walk_expression(w, &spread.argument);
                    }
                }
            }
        }
        Expression::TemplateLiteral(template) => {
            for expr in template.expressions.iter() {
                walk_expression(w, expr);
            }
        }
        Expression::TaggedTemplateExpression(tagged) => {
            walk_expression(w, &tagged.tag);
            for expr in tagged.quasi.expressions.iter() {
                walk_expression(w, expr);
            }
        }
        Expression::AwaitExpression(await_expr) => walk_expression(w, &await_expr.argument),
        Expression::YieldExpression(yield_expr) => {
            if let Some(arg) = &yield_expr.argument {
                walk_expression(w, arg);
            }
        }
        Expression::UnaryExpression(unary) => walk_expression(w, &unary.argument),
        Expression::SequenceExpression(seq) => {
            for expr in seq.expressions.iter() {
                walk_expression(w, expr);
            }
        }
        Expression::ParenthesizedExpression(paren) => walk_expression(w, &paren.expression),
        Expression::AssignmentExpression(assign) => walk_expression(w, &assign.right),
        Expression::TSAsExpression(ts_as) => walk_expression(w, &ts_as.expression),
        Expression::TSSatisfiesExpression(ts_satisfies) => {
            walk_expression(w, &ts_satisfies.expression);
        }
        Expression::TSNonNullExpression(ts_non_null) => {
            walk_expression(w, &ts_non_null.expression);
        }
        _ => {}
    }
}

fn walk_call(w: &mut ScriptWalker<'_, '_>, call: &CallExpression<'_>) {
    if is_dispatch_callee(w, &call.callee) {
        emit_dispatched_event(w, call);
    }
    walk_expression(w, &call.callee);
    walk_arguments(w, &call.arguments);
}

fn walk_arguments(w: &mut ScriptWalker<'_, '_>, arguments: &[Argument<'_>]) {
    for arg in arguments.iter() {
        match arg {
            Argument::SpreadElement(spread) => walk_expression(w, &spread.argument),
            _ => {
                if let Some(expr) = arg.as_expression() {
                    walk_expression(w, expr);
                }
            }
        }
    }
}

/// A dispatcher called directly, through an alias, or as the last property
/// of a member chain (`this.dispatch(...)`).
fn is_dispatch_callee(w: &ScriptWalker<'_, '_>, callee: &Expression<'_>) -> bool {
    match callee.without_parentheses() {
        Expression::Identifier(id) => w.state.table.is_dispatcher(id.name.as_str()),
        Expression::StaticMemberExpression(member) => {
            w.state.table.is_dispatcher(member.property.name.as_str())
        }
        _ => false,
    }
}

fn emit_dispatched_event(w: &mut ScriptWalker<'_, '_>, call: &CallExpression<'_>) {
    let first = call.arguments.first().and_then(|arg| arg.as_expression());
    let span = first.map_or(call.span, |expr| expr.span());
    let location = w.ctx.location(span.start, span.end);

    let mut name = first.and_then(|expr| event_name(w, expr));

    let mut candidates = SmallVec::<[u32; 2]>::new();
    candidates.push(call.span.start);
    if let Some(start) = w.statement_start {
        candidates.push(start);
    }
    let doc = w.doc_comment(&candidates, Visibility::Public);

    if let Some(keyword) = doc.keyword("event") {
        match keyword.description.split_whitespace().next() {
            Some(documented) => name = Some(CompactString::new(documented)),
            None => w.state.report(
                DiagnosticCode::EmptyEventKeyword,
                "`@event` keyword on a dispatch call has no event name".to_string(),
                Some(location),
            ),
        }
    }

    let name = match name {
        Some(name) => name,
        None => {
            let source = w.ctx.source;
            let argument = first.map_or("", |expr| span_text(source, expr.span()));
            w.state.report(
                DiagnosticCode::UnresolvedEventName,
                format!("cannot resolve dispatched event name `{}`", argument),
                Some(location),
            );
            CompactString::const_new(UNRESOLVED_EVENT_NAME)
        }
    };

    let item = SemanticItem::new(name, EventDetail::default())
        .with_doc(doc)
        .with_location(location);
    w.state.emit(item);
}

/// Event name from a dispatch call's first argument.
fn event_name(w: &ScriptWalker<'_, '_>, expr: &Expression<'_>) -> Option<CompactString> {
    match expr {
        Expression::StringLiteral(s) => Some(CompactString::new(s.value.as_str())),
        Expression::TemplateLiteral(t) => template_text(t).map(CompactString::new),
        _ => w.resolve_path(&member_path(expr)?),
    }
}

/// Free identifiers of an expression in first-appearance order.
pub(super) fn collect_dependencies(expr: &Expression<'_>) -> Vec<CompactString> {
    let mut collector = DependencyCollector::default();
    collector.expression(expr);
    collector.names
}

#[derive(Default)]
struct DependencyCollector {
    names: Vec<CompactString>,
    seen: FxHashSet<CompactString>,
    /// Parameters and locals of enclosing functions.
    bound: Vec<CompactString>,
}

impl DependencyCollector {
    fn push(&mut self, name: &str) {
        if self.bound.iter().any(|b| b.as_str() == name) || self.seen.contains(name) {
            return;
        }
        let name = CompactString::new(name);
        self.seen.insert(name.clone());
        self.names.push(name);
    }

    fn expression(&mut self, expr: &Expression<'_>) {
        match expr {
            Expression::Identifier(id) => self.push(id.name.as_str()),
            // Property names are not references
            Expression::StaticMemberExpression(member) => self.expression(&member.object),
            Expression::ComputedMemberExpression(member) => {
                self.expression(&member.object);
                self.expression(&member.expression);
            }
            Expression::PrivateFieldExpression(field) => self.expression(&field.object),
            Expression::ObjectExpression(obj) => {
                for prop in obj.properties.iter() {
                    match prop {
                        ObjectPropertyKind::ObjectProperty(p) => {
                            if p.computed {
                                if let Some(key) = p.key.as_expression() {
                                    self.expression(key);
                                }
                            }
                            self.expression(&p.value);
                        }
                        ObjectPropertyKind::SpreadProperty(spread) => {
                            self.expression(&spread.argument);
                        }
                    }
                }
            }
            Expression::ArrayExpression(arr) => {
                for elem in arr.elements.iter() {
                    match elem {
                        ArrayExpressionElement::SpreadElement(spread) => {
                            self.expression(&spread.argument);
                        }
                        ArrayExpressionElement::Elision(_) => {}
                        _ => {
                            if let Some(e) = elem.as_expression() {
                                self.expression(e);
                            }
                        }
                    }
                }
            }
            Expression::BinaryExpression(binary) => {
                self.expression(&binary.left);
                self.expression(&binary.right);
            }
            Expression::LogicalExpression(logical) => {
                self.expression(&logical.left);
                self.expression(&logical.right);
            }
            Expression::ConditionalExpression(cond) => {
                self.expression(&cond.test);
                self.expression(&cond.consequent);
                self.expression(&cond.alternate);
            }
            Expression::UnaryExpression(unary) => self.expression(&unary.argument),
            Expression::CallExpression(call) => {
                self.expression(&call.callee);
                self.arguments(&call.arguments);
            }
            Expression::NewExpression(new_expr) => {
                self.expression(&new_expr.callee);
                self.arguments(&new_expr.arguments);
            }
            Expression::ArrowFunctionExpression(arrow) => {
                self.function(&arrow.params, Some(&*arrow.body));
            }
            Expression::FunctionExpression(func) => {
                self.function(&func.params, func.body.as_deref());
            }
            Expression::SequenceExpression(seq) => {
                for e in seq.expressions.iter() {
                    self.expression(e);
                }
            }
            Expression::AssignmentExpression(assign) => self.expression(&assign.right),
            Expression::TemplateLiteral(template) => {
                for e in template.expressions.iter() {
                    self.expression(e);
                }
            }
            Expression::TaggedTemplateExpression(tagged) => {
                self.expression(&tagged.tag);
                for e in tagged.quasi.expressions.iter() {
                    self.expression(e);
                }
            }
            Expression::ParenthesizedExpression(paren) => self.expression(&paren.expression),
            Expression::AwaitExpression(await_expr) => self.expression(&await_expr.argument),
            Expression::ChainExpression(chain) => match &chain.expression {
                ChainElement::CallExpression(call) => {
                    self.expression(&call.callee);
                    self.arguments(&call.arguments);
                }
                ChainElement::TSNonNullExpression(non_null) => {
                    self.expression(&non_null.expression);
                }
                ChainElement::StaticMemberExpression(member) => self.expression(&member.object),
                ChainElement::ComputedMemberExpression(member) => {
                    self.expression(&member.object);
                    self.expression(&member.expression);
                }
                ChainElement::PrivateFieldExpression(field) => self.expression(&field.object),
            },
            Expression::TSAsExpression(as_expr) => self.expression(&as_expr.expression),
            Expression::TSSatisfiesExpression(satisfies) => {
                self.expression(&satisfies.expression);
            }
            Expression::TSNonNullExpression(non_null) => self.expression(&non_null.expression),
            _ => {}
        }
    }

    /// Walk a function body with its parameters bound.
    fn function(&mut self, params: &FormalParameters<'_>, body: Option<&FunctionBody<'_>>) {
        let depth = self.bound.len();
        for param in params.items.iter() {
            self.bind_pattern(&param.pattern);
        }
        if let Some(rest) = &params.rest {
            self.bind_pattern(&rest.rest.argument);
        }
        if let Some(body) = body {
            for stmt in body.statements.iter() {
                self.statement(stmt);
            }
        }
        self.bound.truncate(depth);
    }

    fn bind_pattern(&mut self, pattern: &BindingPattern<'_>) {
        let mut names = SmallVec::<[_; 4]>::new();
        collect_binding_names(pattern, &mut names);
        self.bound.extend(names.into_iter().map(|(name, _)| name));
    }

    fn statement(&mut self, stmt: &Statement<'_>) {
        match stmt {
            Statement::ExpressionStatement(expr_stmt) => self.expression(&expr_stmt.expression),
            Statement::ReturnStatement(ret) => {
                if let Some(argument) = &ret.argument {
                    self.expression(argument);
                }
            }
            Statement::VariableDeclaration(decl) => {
                for declarator in decl.declarations.iter() {
                    if let Some(init) = &declarator.init {
                        self.expression(init);
                    }
                    self.bind_pattern(&declarator.id);
                }
            }
            Statement::IfStatement(if_stmt) => {
                self.expression(&if_stmt.test);
                self.statement(&if_stmt.consequent);
                if let Some(alternate) = &if_stmt.alternate {
                    self.statement(alternate);
                }
            }
            Statement::BlockStatement(block) => {
                // Block-scoped names go out of scope with the block
                let depth = self.bound.len();
                for stmt in block.body.iter() {
                    self.statement(stmt);
                }
                self.bound.truncate(depth);
            }
            _ => {}
        }
    }

    fn arguments(&mut self, arguments: &[Argument<'_>]) {
        for arg in arguments.iter() {
            match arg {
                Argument::SpreadElement(spread) => self.expression(&spread.argument),
                _ => {
                    if let Some(e) = arg.as_expression() {
                        self.expression(e);
                    }
                }
            }
        }
    }
}
