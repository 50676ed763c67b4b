//! `{{name}}` placeholder substitution for email templates.

use crate::types::AvailableVariables;
use std::collections::HashMap;

/// How substituted values are written into the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    None,
    Html,
}

/// Replace every `{{ name }}` whose name is declared in `declared` and present in
/// `values`. Anything else, including an unterminated `{{`, is copied through.
pub fn render(
    template: &str,
    values: &HashMap<String, String>,
    declared: &AvailableVariables,
    escape: Escape,
) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("}}") else {
            out.push_str(&rest[open..]);
            return out;
        };

        let name = after_open[..close].trim();
        match values.get(name).filter(|_| declared.contains(name)) {
            Some(value) => match escape {
                Escape::None => out.push_str(value),
                Escape::Html => push_html_escaped(&mut out, value),
            },
            None => out.push_str(&rest[open..open + 2 + close + 2]),
        }
        rest = &after_open[close + 2..];
    }

    out.push_str(rest);
    out
}

/// Placeholder names used in `template`, in order of first appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("}}") else {
            break;
        };
        let name = after_open[..close].trim();
        if !found.contains(&name) {
            found.push(name);
        }
        rest = &after_open[close + 2..];
    }
    found
}

fn push_html_escaped(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}
