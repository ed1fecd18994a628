//! Extraction helpers: comments, binding names, parameters and literals.

use oxc_ast::ast::{
    BindingPattern, Expression, FormalParameters, ObjectPropertyKind,
    TemplateLiteral,
};
use oxc_span::{GetSpan, Span};
use vellum_carton::{CompactString, FxHashMap, SmallVec};
use vellum_relief::{DocComment, MethodParam, TypedExpression};

use crate::comment::parse_param_keyword;
use crate::table::{Declaration, MemberPath};

/// Comment ending right before `pos`, ignoring whitespace in between.
///
/// Returns the last block comment, or the run of consecutive `//` lines
/// directly above.
pub fn leading_comment(source: &str, pos: u32) -> Option<&str> {
    let before = source.get(..pos as usize)?.trim_end();

    if before.ends_with("*/") {
        let start = before.rfind("/*")?;
        return Some(&before[start..]);
    }

    let mut start = None;
    let mut rest = before;
    loop {
        let line_start = rest.rfind('\n').map_or(0, |i| i + 1);
        if !rest[line_start..].trim_start().starts_with("//") {
            break;
        }
        start = Some(line_start);
        if line_start == 0 {
            break;
        }
        rest = &rest[..line_start - 1];
    }

    start.map(|s| before[s..].trim())
}

/// Names bound by a pattern, with their spans.
pub(super) fn collect_binding_names(
    pattern: &BindingPattern<'_>,
    names: &mut SmallVec<[(CompactString, Span); 4]>,
) {
    match pattern {
        BindingPattern::BindingIdentifier(id) => {
            names.push((CompactString::new(id.name.as_str()), id.span));
        }
        BindingPattern::ObjectPattern(obj) => {
            for prop in obj.properties.iter() {
                collect_binding_names(&prop.value, names);
            }
            if let Some(rest) = &obj.rest {
                collect_binding_names(&rest.argument, names);
            }
        }
        BindingPattern::ArrayPattern(arr) => {
            for elem in arr.elements.iter().flatten() {
                collect_binding_names(elem, names);
            }
            if let Some(rest) = &arr.rest {
                collect_binding_names(&rest.argument, names);
            }
        }
        BindingPattern::AssignmentPattern(assign) => {
            collect_binding_names(&assign.left, names);
        }
    }
}

/// Method parameters from the AST, completed by `@param` keywords.
pub(super) fn method_params(
    params: &FormalParameters<'_>,
    source: &str,
    doc: &DocComment,
) -> Vec<MethodParam> {
    let mut out: Vec<MethodParam> = params
        .items
        .iter()
        .map(|param| param_from_pattern(&param.pattern, source))
        .collect();

    if let Some(rest) = &params.rest {
        let mut param = param_from_pattern(&rest.rest.argument, source);
        param.repeated = true;
        out.push(param);
    }

    for keyword in doc.keywords_named("param") {
        let documented = parse_param_keyword(&keyword.description);
        if documented.name.is_empty() {
            continue;
        }

        match out.iter_mut().find(|p| p.name == documented.name) {
            Some(param) => {
                if let Some(type_expr) = documented.type_expr {
                    param.type_expr = type_expr;
                }
                param.optional |= documented.optional;
                param.repeated |= documented.repeated;
                if param.default_value.is_none() {
                    param.default_value = documented.default_value;
                }
                param.description = documented.description;
            }
            // Documented but not declared, e.g. a property of a destructured argument
            None => out.push(MethodParam {
                name: documented.name,
                type_expr: documented
                    .type_expr
                    .unwrap_or_else(TypedExpression::any),
                optional: documented.optional,
                default_value: documented.default_value,
                description: documented.description,
                repeated: documented.repeated,
            }),
        }
    }

    out
}

fn param_from_pattern(pattern: &BindingPattern<'_>, source: &str) -> MethodParam {
    match pattern {
        BindingPattern::BindingIdentifier(id) => MethodParam::new(id.name.as_str()),
        BindingPattern::AssignmentPattern(assign) => {
            let mut param = param_from_pattern(&assign.left, source);
            param.optional = true;
            param.default_value = Some(span_text(source, assign.right.span()).to_string());
            param
        }
        _ => MethodParam::new(span_text(source, pattern.span())),
    }
}

#[inline]
pub(super) fn span_text(source: &str, span: Span) -> &str {
    source
        .get(span.start as usize..span.end as usize)
        .unwrap_or_default()
}

/// Text of a template literal without substitutions.
pub(super) fn template_text<'t>(template: &'t TemplateLiteral<'_>) -> Option<&'t str> {
    if !template.expressions.is_empty() {
        return None;
    }
    let quasi = template.quasis.first()?;
    Some(
        quasi
            .value
            .cooked
            .as_ref()
            .map_or(quasi.value.raw.as_str(), |cooked| cooked.as_str()),
    )
}

/// Identifier or static member chain as a path, `a.b['c']` → `[a, b, c]`.
pub(super) fn member_path(expr: &Expression<'_>) -> Option<MemberPath> {
    match expr {
        Expression::Identifier(id) => {
            let mut path = MemberPath::new();
            path.push(CompactString::new(id.name.as_str()));
            Some(path)
        }
        Expression::StaticMemberExpression(member) => {
            let mut path = member_path(&member.object)?;
            path.push(CompactString::new(member.property.name.as_str()));
            Some(path)
        }
        Expression::ComputedMemberExpression(member) => {
            let key = match &member.expression {
                Expression::StringLiteral(s) => s.value.as_str(),
                Expression::TemplateLiteral(t) => template_text(t)?,
                _ => return None,
            };
            let mut path = member_path(&member.object)?;
            path.push(CompactString::new(key));
            Some(path)
        }
        Expression::ParenthesizedExpression(paren) => member_path(&paren.expression),
        _ => None,
    }
}

/// What an initializer declares, for later name resolution.
pub(super) fn declaration_of(expr: &Expression<'_>) -> Declaration {
    match expr {
        Expression::StringLiteral(s) => Declaration::StringLiteral(CompactString::new(s.value.as_str())),
        Expression::TemplateLiteral(t) => match template_text(t) {
            Some(text) => Declaration::StringLiteral(CompactString::new(text)),
            None => Declaration::Opaque,
        },
        Expression::ObjectExpression(obj) => {
            let mut properties = FxHashMap::default();
            for prop in obj.properties.iter() {
                if let ObjectPropertyKind::ObjectProperty(p) = prop {
                    if p.computed {
                        continue;
                    }
                    if let Some(key) = p.key.static_name() {
                        properties.insert(CompactString::new(key.as_ref()), declaration_of(&p.value));
                    }
                }
            }
            Declaration::Object(properties)
        }
        Expression::Identifier(_)
        | Expression::StaticMemberExpression(_)
        | Expression::ComputedMemberExpression(_) => {
            member_path(expr).map_or(Declaration::Opaque, Declaration::Alias)
        }
        Expression::ArrowFunctionExpression(_) | Expression::FunctionExpression(_) => {
            Declaration::Function
        }
        Expression::ParenthesizedExpression(paren) => declaration_of(&paren.expression),
        Expression::TSAsExpression(ts_as) => declaration_of(&ts_as.expression),
        Expression::TSSatisfiesExpression(ts_satisfies) => declaration_of(&ts_satisfies.expression),
        _ => Declaration::Opaque,
    }
}

/// Type of a literal initializer: `string`, `number`, `boolean`,
/// `function`, else `any`.
pub(super) fn infer_type(expr: &Expression<'_>) -> TypedExpression {
    let name = match expr {
        Expression::StringLiteral(_) | Expression::TemplateLiteral(_) => "string",
        Expression::NumericLiteral(_) | Expression::BigIntLiteral(_) => "number",
        Expression::UnaryExpression(unary)
            if unary.operator.as_str() == "-"
                && matches!(unary.argument, Expression::NumericLiteral(_)) =>
        {
            "number"
        }
        Expression::BooleanLiteral(_) => "boolean",
        Expression::ArrowFunctionExpression(_) | Expression::FunctionExpression(_) => "function",
        _ => "any",
    };
    TypedExpression::named(name)
}

/// Source text of a literal initializer.
pub(super) fn literal_source(expr: &Expression<'_>, source: &str) -> Option<String> {
    let is_literal = match expr {
        Expression::StringLiteral(_)
        | Expression::NumericLiteral(_)
        | Expression::BigIntLiteral(_)
        | Expression::BooleanLiteral(_)
        | Expression::NullLiteral(_) => true,
        Expression::TemplateLiteral(t) => t.expressions.is_empty(),
        Expression::UnaryExpression(unary) => {
            unary.operator.as_str() == "-"
                && matches!(unary.argument, Expression::NumericLiteral(_))
        }
        _ => false,
    };
    is_literal.then(|| span_text(source, expr.span()).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_block_comment() {
        let source = "let a;\n/** The b value */\nlet b;";
        let pos = source.find("let b").unwrap() as u32;
        assert_eq!(leading_comment(source, pos), Some("/** The b value */"));
        assert_eq!(leading_comment(source, 0), None);
    }

    #[test]
    fn test_leading_line_comments() {
        let source = "let a; // trailing\n// first\n// second\nlet b;";
        let pos = source.find("let b").unwrap() as u32;
        assert_eq!(leading_comment(source, pos), Some("// first\n// second"));
    }

    #[test]
    fn test_trailing_comment_is_not_leading() {
        let source = "let a; // about a\nlet b;";
        let pos = source.find("let b").unwrap() as u32;
        assert_eq!(leading_comment(source, pos), None);
    }

    #[test]
    fn test_code_between_comment_and_target() {
        let source = "/** doc */ let a;\nlet b;";
        let pos = source.find("let b").unwrap() as u32;
        assert_eq!(leading_comment(source, pos), None);
    }
}
