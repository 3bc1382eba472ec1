//! Template rendering by placeholder substitution
//!
//! Supports both `${KEY}` and `$KEY` spellings. Substitution is a single pass
//! over the original template: a substituted value is never rescanned, so a
//! value containing `$OTHER` comes through literally. The bare `$KEY` form
//! consumes a maximal `[A-Za-z0-9_]+` identifier, so `USER` never rewrites
//! part of `$USERNAME`. Unresolved placeholders stay verbatim; there is no
//! escape syntax for a literal `$`.

use std::collections::HashMap;
use std::env;

use chrono::{DateTime, Datelike, Utc};

/// Automatic variables available to every render call.
pub fn default_variables(now: DateTime<Utc>) -> HashMap<String, String> {
    HashMap::from([
        ("DATE".to_string(), now.format("%Y-%m-%d").to_string()),
        (
            "TIMESTAMP".to_string(),
            now.format("%Y%m%dT%H%MZ").to_string(),
        ),
        (
            "USER".to_string(),
            env::var("USER").unwrap_or_else(|_| "user".to_string()),
        ),
        ("YEAR".to_string(), now.year().to_string()),
    ])
}

/// Merge defaults with caller overrides (caller wins) and substitute.
pub fn render(template: &str, overrides: &HashMap<String, String>) -> String {
    let mut variables = default_variables(Utc::now());
    variables.extend(
        overrides
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );

    substitute(template, &variables)
}

/// Single-pass placeholder substitution over `template`.
pub fn substitute(template: &str, variables: &HashMap<String, String>) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(dollar) = rest.find('$') {
        output.push_str(&rest[..dollar]);
        rest = &rest[dollar..];

        if let Some((value, consumed)) = resolve_placeholder(rest, variables) {
            output.push_str(value);
            rest = &rest[consumed..];
        } else {
            output.push('$');
            rest = &rest[1..];
        }
    }

    output.push_str(rest);
    output
}

/// Given input starting at `$`, return the resolved value and the byte length
/// of the placeholder, or `None` when it does not name a known variable.
fn resolve_placeholder<'a>(
    input: &str,
    variables: &'a HashMap<String, String>,
) -> Option<(&'a str, usize)> {
    let after_dollar = &input[1..];

    if let Some(braced) = after_dollar.strip_prefix('{') {
        let close = braced.find('}')?;
        let key = &braced[..close];
        let value = variables.get(key)?;
        return Some((value.as_str(), 1 + 1 + close + 1));
    }

    let end = after_dollar
        .find(|character: char| !character.is_ascii_alphanumeric() && character != '_')
        .unwrap_or(after_dollar.len());
    if end == 0 {
        return None;
    }

    let key = &after_dollar[..end];
    let value = variables.get(key)?;
    Some((value.as_str(), 1 + end))
}
