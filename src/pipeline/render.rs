//! Title and HTML fragment rendering for routed messages.
//!
//! Every piece of user text passes through [`escape_html`] before it is
//! embedded; the page-creation call rejects malformed markup.

use chrono::{DateTime, FixedOffset};

use crate::pipeline::types::Category;

/// Timestamp format used in page titles.
pub const TITLE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Placeholder payload for empty input.
const EMPTY_PAYLOAD: &str = "(empty)";

/// Escape `& < > " '` for embedding in HTML text or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Collapse runs of whitespace (including newlines) to single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `[PREFIX] payload (YYYY-MM-DD HH:MM:SS)` with the payload escaped.
pub fn render_title(category: Category, payload: &str, at: &DateTime<FixedOffset>) -> String {
    let payload = collapse_whitespace(payload);
    let payload = if payload.is_empty() {
        EMPTY_PAYLOAD.to_string()
    } else {
        escape_html(&payload)
    };
    format!(
        "[{}] {} ({})",
        category.prefix(),
        payload,
        at.format(TITLE_TIMESTAMP_FORMAT)
    )
}

/// Escaped text with line breaks kept as `<br/>`.
fn render_body(text: &str) -> String {
    text.trim()
        .lines()
        .map(|line| escape_html(line.trim_end()))
        .collect::<Vec<_>>()
        .join("<br/>")
}

/// Build the page body fragment for a category.
///
/// `magnitude` is the extracted step count; it is ignored for other
/// categories.
pub fn render_html(category: Category, text: &str, magnitude: Option<&str>) -> String {
    let body = render_body(text);

    match category {
        Category::Steps => format!(
            "<p>{}: <b>{}</b></p>\n<p>{}</p>",
            category.label(),
            escape_html(magnitude.unwrap_or("0")),
            body
        ),
        Category::Ingredients => {
            let items: Vec<String> = text
                .split([',', '\n'])
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| format!("<li>{}</li>", escape_html(item)))
                .collect();
            format!(
                "<p><b>{}</b></p>\n<ul>{}</ul>\n<p>{}</p>",
                category.label(),
                items.concat(),
                body
            )
        }
        Category::Journal => format!("<p>{body}</p>"),
        _ => format!("<p><b>{}</b></p>\n<p>{}</p>", category.label(), body),
    }
}
