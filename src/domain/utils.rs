//! Domain-specific shared validations and formatting utilities

use crate::{errors::AppError, library::Namespace};

pub const DEFAULT_SUMMARY_CHARS: usize = 500;
pub const MAX_SUMMARY_CHARS: usize = 10_000;
pub const SUMMARY_TRUNCATION_MARKER: &str = "\n\n[truncated]";

pub fn normalize_namespace(namespace: &str) -> Result<Namespace, AppError> {
    match namespace.trim().to_ascii_lowercase().as_str() {
        "practices" => Ok(Namespace::Practices),
        "templates" => Ok(Namespace::Templates),
        _ => Err(AppError::bad_request(
            "invalid_namespace",
            "namespace must be one of: practices, templates",
        )),
    }
}

pub fn normalize_summary_limit(max_chars: Option<u32>) -> Result<usize, AppError> {
    let Some(value) = max_chars else {
        return Ok(DEFAULT_SUMMARY_CHARS);
    };

    let value = value as usize;
    if value == 0 || value > MAX_SUMMARY_CHARS {
        return Err(AppError::bad_request(
            "invalid_max_chars",
            "max_chars must be between 1 and 10000",
        ));
    }

    Ok(value)
}

pub fn normalize_keyword(keyword: &str) -> Result<String, AppError> {
    let normalized = keyword.trim();
    if normalized.is_empty() {
        return Err(AppError::bad_request(
            "keyword_required",
            "keyword is required and must not be empty",
        ));
    }

    Ok(normalized.to_string())
}

/// First markdown heading line with the `#` markers stripped, or the document
/// name when the content carries no heading.
pub fn extract_title(name: &str, content: &str) -> String {
    content
        .lines()
        .map(str::trim_start)
        .find(|line| line.starts_with('#'))
        .map(|line| line.trim_start_matches('#').trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| name.to_string())
}

pub fn format_size(bytes: usize) -> String {
    const KIB: usize = 1024;
    const MIB: usize = 1024 * 1024;

    if bytes >= MIB {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// First `max_chars` characters of `content`, marked when shortened. The cut
/// lands on a character boundary.
pub fn summarize(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        None => content.to_string(),
        Some((boundary, _)) => format!("{}{}", &content[..boundary], SUMMARY_TRUNCATION_MARKER),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        extract_title, format_size, normalize_keyword, normalize_namespace,
        normalize_summary_limit, summarize, DEFAULT_SUMMARY_CHARS, SUMMARY_TRUNCATION_MARKER,
    };
    use crate::library::Namespace;

    #[test]
    fn normalizes_namespace_case_and_whitespace() {
        let namespace = normalize_namespace(" Practices ").expect("valid namespace");
        assert_eq!(namespace, Namespace::Practices);
        let namespace = normalize_namespace("templates").expect("valid namespace");
        assert_eq!(namespace, Namespace::Templates);
    }

    #[test]
    fn rejects_unknown_or_empty_namespace() {
        let error = normalize_namespace("notes").expect_err("expected invalid namespace");
        assert!(error.to_string().contains("practices, templates"));
        normalize_namespace("").expect_err("expected invalid namespace");
    }

    #[test]
    fn summary_limit_defaults_and_bounds() {
        assert_eq!(
            normalize_summary_limit(None).expect("default"),
            DEFAULT_SUMMARY_CHARS
        );
        assert_eq!(normalize_summary_limit(Some(10)).expect("valid"), 10);
        normalize_summary_limit(Some(0)).expect_err("expected invalid limit");
        normalize_summary_limit(Some(10_001)).expect_err("expected invalid limit");
    }

    #[test]
    fn rejects_blank_keyword() {
        let error = normalize_keyword("   ").expect_err("expected missing keyword");
        assert!(error.to_string().contains("keyword"));
        assert_eq!(normalize_keyword(" ci ").expect("keyword"), "ci");
    }

    #[test]
    fn extracts_first_heading_or_falls_back_to_name() {
        assert_eq!(extract_title("x", "# My Title\nbody"), "My Title");
        assert_eq!(extract_title("x", "intro\n\n## Section Two\n"), "Section Two");
        assert_eq!(extract_title("release-checklist", "plain text"), "release-checklist");
        assert_eq!(extract_title("empty-heading", "#\nbody"), "empty-heading");
    }

    #[test]
    fn formats_sizes_humanly() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn summarize_truncates_on_char_boundary() {
        assert_eq!(summarize("short", 500), "short");
        assert_eq!(summarize("exact", 5), "exact");

        let summary = summarize("éééééé", 3);
        assert_eq!(summary, format!("ééé{SUMMARY_TRUNCATION_MARKER}"));
    }
}
