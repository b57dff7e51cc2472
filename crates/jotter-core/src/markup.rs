//! Helpers for the rich-text markup stored in note titles and bodies.
//!
//! Notes keep their formatting as the markup produced by the editable regions.
//! Everything here treats that markup as untrusted input.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Tags kept by [`sanitize_markup`]. Attributes are always dropped.
const ALLOWED_TAGS: &[&str] = &[
    "b",
    "blockquote",
    "br",
    "div",
    "em",
    "i",
    "li",
    "ol",
    "p",
    "s",
    "span",
    "strike",
    "strong",
    "u",
    "ul",
];

/// Tags whose whole content is discarded by [`sanitize_markup`].
const DROPPED_CONTAINERS: &[&str] = &[
    "iframe", "noscript", "object", "script", "style", "template", "textarea",
];

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("Invalid regex"))
}

fn tag_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^<\s*(/)?\s*([a-zA-Z][a-zA-Z0-9]*)").expect("Invalid regex"))
}

fn entity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);").expect("Invalid regex")
    })
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex"))
}

/// Strip markup tags and collapse whitespace.
///
/// Tags become spaces, common character references are decoded, runs of
/// whitespace collapse to one space and the result is trimmed.
///
/// # Examples
///
/// ```
/// use jotter_core::markup::strip_html;
///
/// assert_eq!(strip_html("<b>Milk</b><div>and&nbsp;eggs</div>"), "Milk and eggs");
/// assert_eq!(strip_html("<br><div> </div>"), "");
/// ```
#[must_use]
pub fn strip_html(markup: &str) -> String {
    let without_tags = tag_regex().replace_all(markup, " ");
    let decoded = decode_entities(&without_tags);
    whitespace_regex()
        .replace_all(&decoded, " ")
        .trim()
        .to_string()
}

/// Whether the markup contains any visible, non-whitespace text.
#[must_use]
pub fn has_meaningful_text(markup: &str) -> bool {
    !strip_html(markup).is_empty()
}

/// Stripped text truncated to `max_chars` characters.
#[must_use]
pub fn plain_preview(markup: &str, max_chars: usize) -> String {
    strip_html(markup).chars().take(max_chars).collect()
}

/// Decode the handful of character references the editable regions emit.
///
/// Unknown named references are left untouched.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    entity_regex()
        .replace_all(text, |caps: &Captures<'_>| {
            let entity = &caps[1];
            decode_entity(entity).map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix('#') {
        let code = if let Some(hex) = numeric.strip_prefix(['x', 'X']) {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            numeric.parse::<u32>().ok()?
        };
        return char::from_u32(code);
    }

    match entity {
        "nbsp" => Some('\u{a0}'),
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => None,
    }
}

/// Reduce stored markup to a safe subset before it is rendered as markup.
///
/// Only the inline and list tags the formatting toolbar can produce survive,
/// and always without attributes. Script-like containers are removed together
/// with their content; every other tag is dropped while its text is kept.
/// Stray angle brackets in text are escaped.
///
/// # Examples
///
/// ```
/// use jotter_core::markup::sanitize_markup;
///
/// assert_eq!(
///     sanitize_markup(r#"<b onclick="x()">hi</b><script>alert(1)</script>"#),
///     "<b>hi</b>"
/// );
/// ```
#[must_use]
pub fn sanitize_markup(markup: &str) -> String {
    let mut output = String::with_capacity(markup.len());
    let mut dropped_depth = 0usize;
    let mut cursor = 0usize;

    for tag in tag_regex().find_iter(markup) {
        if dropped_depth == 0 {
            push_escaped_text(&mut output, &markup[cursor..tag.start()]);
        }
        cursor = tag.end();

        let Some(caps) = tag_name_regex().captures(tag.as_str()) else {
            continue;
        };
        let is_closing = caps.get(1).is_some();
        let name = caps[2].to_ascii_lowercase();

        if DROPPED_CONTAINERS.contains(&name.as_str()) {
            if is_closing {
                dropped_depth = dropped_depth.saturating_sub(1);
            } else if !tag.as_str().ends_with("/>") {
                dropped_depth += 1;
            }
            continue;
        }

        if dropped_depth > 0 || !ALLOWED_TAGS.contains(&name.as_str()) {
            continue;
        }

        if name == "br" {
            if !is_closing {
                output.push_str("<br>");
            }
        } else if is_closing {
            output.push_str("</");
            output.push_str(&name);
            output.push('>');
        } else {
            output.push('<');
            output.push_str(&name);
            output.push('>');
        }
    }

    if dropped_depth == 0 {
        push_escaped_text(&mut output, &markup[cursor..]);
    }
    output
}

fn push_escaped_text(output: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(ch),
        }
    }
}

/// Escape plain text so it can be placed inside markup verbatim.
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#39;"),
            _ => output.push(ch),
        }
    }
    output
}
