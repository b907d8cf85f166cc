// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTML escaping for values interpolated into the operator's HTML email.
//!
//! Escaping is one-pass only: feeding already-escaped text back in escapes
//! its `&` again.

use crate::validator::ContactRequest;
use serde::Serialize;

/// Contact submission safe to interpolate into HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SanitizedSubmission {
    pub name: String,
    /// Trimmed only; used verbatim as the reply-to address.
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Escape the five HTML-significant characters. `&` goes first so the
/// entities produced for the others are left intact.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Trim every field and escape all but the email address.
pub fn sanitize(request: &ContactRequest) -> SanitizedSubmission {
    let field = |value: &Option<String>| value.as_deref().unwrap_or_default().trim().to_string();

    SanitizedSubmission {
        name: escape_html(&field(&request.name)),
        email: field(&request.email),
        subject: escape_html(&field(&request.subject)),
        message: escape_html(&field(&request.message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_all_significant_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_single_pass_does_not_double_escape() {
        assert_eq!(escape_html("<"), "&lt;");
        assert_eq!(escape_html("\"'"), "&quot;&#39;");
    }

    #[test]
    fn test_not_idempotent() {
        let once = escape_html("a & b");
        assert_eq!(once, "a &amp; b");
        assert_eq!(escape_html(&once), "a &amp;amp; b");
    }

    #[test]
    fn test_sanitize_trims_and_leaves_email_unescaped() {
        let request = ContactRequest::new(
            "  <b>Mallory</b> ",
            "  o'brien@example.com ",
            " Hello <script> ",
            "line one\nline & two\n",
        );

        let sanitized = sanitize(&request);
        assert_eq!(sanitized.name, "&lt;b&gt;Mallory&lt;/b&gt;");
        assert_eq!(sanitized.email, "o'brien@example.com");
        assert_eq!(sanitized.subject, "Hello &lt;script&gt;");
        assert_eq!(sanitized.message, "line one\nline &amp; two");
    }

    #[test]
    fn test_sanitize_missing_fields_become_empty() {
        let sanitized = sanitize(&ContactRequest::default());
        assert!(sanitized.name.is_empty());
        assert!(sanitized.email.is_empty());
    }
}
