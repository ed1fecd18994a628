//! Small text helpers.

/// Check if a name starts with an upper-case letter, the convention for
/// imported sub-components.
#[inline]
pub fn is_component_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

/// Check if text contains only whitespace.
#[inline]
pub fn is_blank(text: &str) -> bool {
    text.bytes().all(|b| b.is_ascii_whitespace())
}

/// Trim whitespace and a single pair of surrounding mustache braces.
///
/// `"{ total }"` becomes `"total"`; text without braces is only trimmed.
pub fn strip_mustache(value: &str) -> &str {
    let trimmed = value.trim();
    match trimmed.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        Some(inner) => inner.trim(),
        None => trimmed,
    }
}

/// Leading identifier of an expression such as `user.name` or `items[0]`.
pub fn root_identifier(expr: &str) -> &str {
    let expr = expr.trim_start();
    let end = expr
        .char_indices()
        .find(|(i, c)| !(is_identifier_char(*c) && !(*i == 0 && c.is_ascii_digit())))
        .map(|(i, _)| i)
        .unwrap_or(expr.len());
    &expr[..end]
}

/// Check if a character may appear in an ECMAScript identifier.
#[inline]
pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// File stem of a path (`src/Button.svelte` → `Button`).
pub fn file_stem(path: &str) -> &str {
    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match file.find('.') {
        Some(0) | None => file,
        Some(dot) => &file[..dot],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_component_name() {
        assert!(is_component_name("Button"));
        assert!(!is_component_name("button"));
        assert!(!is_component_name("_Button"));
        assert!(!is_component_name(""));
    }

    #[test]
    fn test_strip_mustache() {
        assert_eq!(strip_mustache("{totalCost}"), "totalCost");
        assert_eq!(strip_mustache("  { el }  "), "el");
        assert_eq!(strip_mustache("plain"), "plain");
        assert_eq!(strip_mustache("{unbalanced"), "{unbalanced");
    }

    #[test]
    fn test_root_identifier() {
        assert_eq!(root_identifier("user.name"), "user");
        assert_eq!(root_identifier("items[0]"), "items");
        assert_eq!(root_identifier("$store"), "$store");
        assert_eq!(root_identifier("0abc"), "");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("src/components/Button.svelte"), "Button");
        assert_eq!(file_stem("C:\\ui\\Card.svelte"), "Card");
        assert_eq!(file_stem("Plain"), "Plain");
        assert_eq!(file_stem(".hidden"), ".hidden");
    }
}
