//! Documentation comment grammar.
//!
//! Turns raw comments into [`DocComment`]s and parses the `{type}`,
//! `@param` and `@returns` mini-grammars used inside them.

use once_cell::sync::Lazy;
use regex::Regex;
use vellum_carton::CompactString;
use vellum_relief::{DocComment, Keyword, MethodReturn, TypedExpression, Visibility};

// A `{type}` value may follow the keyword name directly, e.g. `@type{string}`
static KEYWORD_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@([A-Za-z_][\w-]*)(?:\s*(\{.*)|\s+(.*))?$").expect("valid keyword regex")
});

/// Parse a comment into visibility, description and keywords.
///
/// Accepts block (`/** */`, `/* */`), line (`//`) and markup (`<!-- -->`)
/// comments. Text before the first keyword is the description unless an
/// explicit `@description` keyword is present.
pub fn parse_comment(text: &str, default_visibility: Visibility) -> DocComment {
    let body = strip_delimiters(text);

    let mut description: Vec<&str> = Vec::new();
    let mut keywords: Vec<Keyword> = Vec::new();
    let mut in_keyword = false;

    for line in body.lines().map(clean_line) {
        if let Some(caps) = KEYWORD_LINE.captures(line) {
            let name = caps.get(1).map_or("", |m| m.as_str());
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map_or("", |m| m.as_str().trim());
            keywords.push(Keyword::new(name, value));
            in_keyword = true;
        } else if in_keyword {
            if let Some(keyword) = keywords.last_mut() {
                if !line.is_empty() {
                    if !keyword.description.is_empty() {
                        keyword.description.push('\n');
                    }
                    keyword.description.push_str(line);
                }
            }
        } else {
            description.push(line);
        }
    }

    let description = match keywords.iter().find(|k| k.name == "description") {
        Some(keyword) => keyword.description.clone(),
        None => description.join("\n").trim().to_string(),
    };

    let visibility = keywords
        .iter()
        .find_map(|k| Visibility::from_name(&k.name))
        .unwrap_or(default_visibility);

    DocComment {
        visibility,
        description,
        keywords,
    }
}

fn strip_delimiters(text: &str) -> &str {
    let text = text.trim();
    if let Some(inner) = text.strip_prefix("<!--") {
        return inner.strip_suffix("-->").unwrap_or(inner);
    }
    if let Some(inner) = text.strip_prefix("/*") {
        let inner = inner.strip_prefix('*').unwrap_or(inner);
        return inner.strip_suffix("*/").unwrap_or(inner);
    }
    text
}

fn clean_line(line: &str) -> &str {
    let line = line.trim();
    let line = line.strip_prefix("//").unwrap_or(line);
    let line = match line.strip_prefix('*') {
        Some(rest) if !rest.starts_with('*') => rest,
        _ => line,
    };
    line.trim()
}

/// Parse a leading `{...}` type annotation.
///
/// Returns `None` when the text does not start with a balanced `{...}`.
pub fn parse_type_keyword(text: &str) -> Option<TypedExpression> {
    let (inner, _) = split_type_annotation(text.trim())?;
    Some(parse_type_expression(inner))
}

/// Split `{inner} rest` into `(inner, rest)`.
fn split_type_annotation(text: &str) -> Option<(&str, &str)> {
    if !text.starts_with('{') {
        return None;
    }

    let mut depth = 0u32;
    let mut quote: Option<char> = None;
    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => {
                // An unmatched quote must not swallow the closing brace.
                if text[i + 1..].contains(c) {
                    quote = Some(c);
                }
            }
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((text[1..i].trim(), &text[i + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse the content of a type annotation, without braces.
pub fn parse_type_expression(text: &str) -> TypedExpression {
    let text = text.trim();

    if let Some(inner) = strip_enclosing_parens(text) {
        return parse_type_expression(inner);
    }

    let alternatives = split_union(text);
    if alternatives.len() > 1 {
        return TypedExpression::Union {
            text: text.to_string(),
            types: alternatives
                .into_iter()
                .map(|alt| match alt {
                    Alternative::Parsed(part) => parse_type_expression(part),
                    Alternative::Raw(part) => TypedExpression::Type {
                        text: part.to_string(),
                        type_name: part.to_string(),
                    },
                })
                .collect(),
        };
    }

    parse_single_type(text)
}

fn parse_single_type(text: &str) -> TypedExpression {
    if text.len() >= 2 && text.starts_with('\'') && text.ends_with('\'') {
        let value = &text[1..text.len() - 1];
        return TypedExpression::Const {
            text: text.to_string(),
            type_name: "string".into(),
            value: value.to_string(),
        };
    }

    let type_name = match text {
        "*" | "any" | "" => "any",
        other => other,
    };
    TypedExpression::Type {
        text: text.to_string(),
        type_name: type_name.to_string(),
    }
}

/// `(a|b)` when the parentheses wrap the whole text.
fn strip_enclosing_parens(text: &str) -> Option<&str> {
    let inner = text.strip_prefix('(')?.strip_suffix(')')?;
    let mut depth = 0i32;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    (depth == 0).then_some(inner)
}

enum Alternative<'a> {
    Parsed(&'a str),
    /// Remainder after an unterminated quote, kept verbatim.
    Raw(&'a str),
}

/// Split on `|` outside quotes and brackets.
fn split_union(text: &str) -> Vec<Alternative<'_>> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut chars = text.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '\'' | '"' => match text[i + 1..].find(c) {
                Some(len) => {
                    // Skip to the closing quote.
                    let close = i + 1 + len;
                    for (j, _) in chars.by_ref() {
                        if j == close {
                            break;
                        }
                    }
                }
                None => {
                    let rest = text[start..].trim();
                    if !rest.is_empty() {
                        parts.push(Alternative::Raw(rest));
                    }
                    return parts;
                }
            },
            '(' | '<' | '[' | '{' => depth += 1,
            ')' | '>' | ']' | '}' => depth -= 1,
            '|' if depth == 0 => {
                parts.push(Alternative::Parsed(text[start..i].trim()));
                start = i + 1;
            }
            _ => {}
        }
    }

    parts.push(Alternative::Parsed(text[start..].trim()));
    parts
}

/// A parsed `@param` keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamKeyword {
    /// Empty when the keyword names no parameter.
    pub name: CompactString,
    pub type_expr: Option<TypedExpression>,
    pub optional: bool,
    pub default_value: Option<String>,
    pub description: String,
    pub repeated: bool,
}

/// Parse `{type} [name=default] - description`.
///
/// Every part is optional. A `...` prefix on the type or the name marks a
/// rest parameter.
pub fn parse_param_keyword(text: &str) -> ParamKeyword {
    let mut rest = text.trim();
    let mut repeated = false;
    let mut type_expr = None;

    if let Some((inner, after)) = split_type_annotation(rest) {
        let inner = match inner.strip_prefix("...") {
            Some(stripped) => {
                repeated = true;
                stripped
            }
            None => inner,
        };
        type_expr = Some(parse_type_expression(inner));
        rest = after.trim_start();
    }

    let mut name = "";
    let mut optional = false;
    let mut default_value = None;

    if let Some(bracketed) = rest.strip_prefix('[') {
        if let Some(close) = bracketed.find(']') {
            let inner = &bracketed[..close];
            optional = true;
            match inner.split_once('=') {
                Some((n, default)) => {
                    name = n.trim();
                    default_value = Some(default.trim().to_string());
                }
                None => name = inner.trim(),
            }
            rest = bracketed[close + 1..].trim_start();
        }
    } else if !rest.starts_with('-') {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        name = &rest[..end];
        rest = rest[end..].trim_start();
    }

    if let Some(stripped) = name.strip_prefix("...") {
        repeated = true;
        name = stripped;
    }

    ParamKeyword {
        name: CompactString::new(name),
        type_expr,
        optional,
        default_value,
        description: strip_hyphen(rest).to_string(),
        repeated,
    }
}

/// Parse `{type} - description`.
pub fn parse_return_keyword(text: &str) -> MethodReturn {
    let text = text.trim();
    let (type_expr, rest) = match split_type_annotation(text) {
        Some((inner, after)) => (parse_type_expression(inner), after),
        None => (TypedExpression::any(), text),
    };

    MethodReturn {
        type_expr,
        description: strip_hyphen(rest).to_string(),
    }
}

fn strip_hyphen(text: &str) -> &str {
    let text = text.trim();
    text.strip_prefix('-').unwrap_or(text).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_debug_snapshot;

    #[test]
    fn test_parse_comment_description_and_keywords() {
        let doc = parse_comment(
            "/**\n * The total cost.\n * Updated on change.\n * @type {number}\n * @public\n */",
            Visibility::Private,
        );
        assert_eq!(doc.description, "The total cost.\nUpdated on change.");
        assert_eq!(doc.visibility, Visibility::Public);
        assert_eq!(doc.keywords.len(), 2);
        assert_eq!(doc.keywords[0].name, "type");
        assert_eq!(doc.keywords[0].description, "{number}");
        assert_eq!(doc.keywords[1].name, "public");
    }

    #[test]
    fn test_parse_comment_default_visibility() {
        let doc = parse_comment("// just text", Visibility::Protected);
        assert_eq!(doc.visibility, Visibility::Protected);
        assert_eq!(doc.description, "just text");
        assert!(doc.keywords.is_empty());
    }

    #[test]
    fn test_parse_comment_first_visibility_wins() {
        let doc = parse_comment("/** @private\n @public */", Visibility::Public);
        assert_eq!(doc.visibility, Visibility::Private);
    }

    #[test]
    fn test_parse_comment_continuation_and_description_keyword() {
        let doc = parse_comment(
            "<!--\n  Ignored text\n  @description Card layout\n  @slot header\n    Title area\n-->",
            Visibility::Public,
        );
        assert_eq!(doc.description, "Card layout");
        let slot = doc.keyword("slot").unwrap();
        assert_eq!(slot.description, "header\nTitle area");
    }

    #[test]
    fn test_parse_comment_line_comments() {
        let doc = parse_comment("// first\n// second\n// @event change", Visibility::Public);
        assert_eq!(doc.description, "first\nsecond");
        assert_eq!(doc.keyword("event").unwrap().description, "change");
    }

    #[test]
    fn test_parse_comment_type_without_space() {
        let doc = parse_comment(
            "/**\n * @type{string}\n * @returns{boolean} whether it worked\n */",
            Visibility::Private,
        );
        assert_eq!(doc.description, "");
        assert_eq!(doc.keywords.len(), 2);
        assert_eq!(doc.keywords[0].name, "type");
        assert_eq!(doc.keywords[0].description, "{string}");
        assert_eq!(doc.keywords[1].name, "returns");
        assert_eq!(doc.keywords[1].description, "{boolean} whether it worked");
    }

    #[test]
    fn test_parse_type_keyword_union_of_consts() {
        let ty = parse_type_keyword("{'a'|'b'}").unwrap();
        assert_eq!(
            ty,
            TypedExpression::Union {
                text: "'a'|'b'".into(),
                types: vec![TypedExpression::constant("a"), TypedExpression::constant("b")],
            }
        );
    }

    #[test]
    fn test_parse_type_keyword_simple() {
        assert_eq!(
            parse_type_keyword("{string} the label"),
            Some(TypedExpression::named("string"))
        );
        assert!(parse_type_keyword("{*}").unwrap().is_any());
        assert!(parse_type_keyword("{any}").unwrap().is_any());
        assert_eq!(parse_type_keyword("string"), None);
        assert_eq!(parse_type_keyword("{string"), None);
    }

    #[test]
    fn test_parse_type_keyword_parens_and_nested() {
        let ty = parse_type_keyword("{('small' | 'large' | Array<number|string>)}").unwrap();
        assert_debug_snapshot!(ty, @r#"
        Union {
            text: "'small' | 'large' | Array<number|string>",
            types: [
                Const {
                    text: "'small'",
                    type_name: "string",
                    value: "small",
                },
                Const {
                    text: "'large'",
                    type_name: "string",
                    value: "large",
                },
                Type {
                    text: "Array<number|string>",
                    type_name: "Array<number|string>",
                },
            ],
        }
        "#);
    }

    #[test]
    fn test_parse_type_keyword_unterminated_quote() {
        let ty = parse_type_keyword("{'a'|'b|c}").unwrap();
        assert_eq!(
            ty,
            TypedExpression::Union {
                text: "'a'|'b|c".into(),
                types: vec![
                    TypedExpression::constant("a"),
                    TypedExpression::Type {
                        text: "'b|c".into(),
                        type_name: "'b|c".into(),
                    },
                ],
            }
        );
    }

    #[test]
    fn test_parse_param_keyword() {
        let param = parse_param_keyword("{string} name - the user name");
        assert_eq!(param.name, "name");
        assert_eq!(param.type_expr, Some(TypedExpression::named("string")));
        assert!(!param.optional);
        assert_eq!(param.description, "the user name");

        let param = parse_param_keyword("{number} [count=1] how many");
        assert_eq!(param.name, "count");
        assert!(param.optional);
        assert_eq!(param.default_value.as_deref(), Some("1"));
        assert_eq!(param.description, "how many");

        let param = parse_param_keyword("{...number} values");
        assert!(param.repeated);
        assert_eq!(param.name, "values");

        let param = parse_param_keyword("- only a description");
        assert_eq!(param.name, "");
        assert_eq!(param.type_expr, None);
        assert_eq!(param.description, "only a description");
    }

    #[test]
    fn test_parse_return_keyword() {
        let ret = parse_return_keyword("{boolean} - whether it worked");
        assert_eq!(ret.type_expr, TypedExpression::named("boolean"));
        assert_eq!(ret.description, "whether it worked");

        let ret = parse_return_keyword("nothing useful");
        assert!(ret.type_expr.is_any());
        assert_eq!(ret.description, "nothing useful");
    }
}
