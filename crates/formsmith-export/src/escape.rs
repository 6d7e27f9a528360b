// crates/formsmith-export/src/escape.rs
// ============================================================================
// Module: formsmith Escaping
// Description: Escaping helpers for HTML and inline script contexts.
// Purpose: Keep user strings inert in every artifact syntax.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Two contexts matter:
//! - HTML text and quoted attribute values: `& < > " '` become entities.
//! - JavaScript inside `<script>` blocks: values are JSON encoded and then
//!   `<`, `>`, `&`, U+2028, and U+2029 are written as `\uXXXX` escapes, so
//!   neither `</script>` nor `<!--` can appear in the emitted text.
//!
//! Escaping never drops or truncates input.

use serde::Serialize;
use serde_json::Value;

use crate::ExportError;

/// Escapes text for HTML element content.
#[must_use]
pub fn html_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Escapes text for a double-quoted HTML attribute value.
#[must_use]
pub fn html_attr(value: &str) -> String {
    html_text(value)
}

/// Encodes a string as a script-safe JavaScript string literal.
#[must_use]
pub fn js_string(value: &str) -> String {
    harden(&Value::String(value.to_string()).to_string())
}

/// Encodes a value as pretty, script-safe JSON for inline scripts.
///
/// # Errors
///
/// Returns [`ExportError::Json`] when serialization fails.
pub fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ExportError> {
    let text = serde_json::to_string_pretty(value).map_err(|err| ExportError::Json(err.to_string()))?;
    Ok(harden(&text))
}

/// Rewrites characters that can terminate or confuse an inline script.
///
/// Only valid on JSON text, where these characters occur inside strings.
fn harden(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for ch in json.chars() {
        match ch {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            other => out.push(other),
        }
    }
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions.")]

    use super::*;

    #[test]
    fn html_text_escapes_markup_characters() {
        assert_eq!(
            html_text(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn js_string_cannot_close_a_script_block() {
        let literal = js_string("</script><!-- \"x\" & y\u{2028}");
        assert!(!literal.contains("</script"));
        assert!(!literal.contains("<!--"));
        assert_eq!(literal, r#""\u003c/script\u003e\u003c!-- \"x\" \u0026 y\u2028""#);
        let decoded: String = serde_json::from_str(&literal).unwrap();
        assert_eq!(decoded, "</script><!-- \"x\" & y\u{2028}");
    }

    #[test]
    fn script_json_stays_parseable() {
        let value = serde_json::json!({ "label": "a</script>b" });
        let text = script_json(&value).unwrap();
        let back: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, value);
    }
}
