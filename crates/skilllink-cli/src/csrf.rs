//! Anti-forgery token retrieval.
//!
//! The backend hands out its CSRF token two ways: a `csrftoken` cookie and a
//! hidden `csrfmiddlewaretoken` input embedded in server-rendered forms.

use std::sync::LazyLock;

use regex::Regex;

/// Cookie carrying the token.
pub const COOKIE_NAME: &str = "csrftoken";
/// Request header the backend checks on state-changing requests.
pub const HEADER_NAME: &str = "X-CSRFToken";
/// Hidden form input carrying the token.
pub const FORM_FIELD: &str = "csrfmiddlewaretoken";

static INPUT_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<input\b[^>]*\bname\s*=\s*["']csrfmiddlewaretoken["'][^>]*>"#)
        .expect("static regex is valid")
});

static VALUE_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\bvalue\s*=\s*["']([^"']*)["']"#).expect("static regex is valid")
});

/// Extract the token from a `Cookie:` style header (`a=1; csrftoken=xyz`).
pub fn from_cookie_header(header: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().strip_prefix(COOKIE_NAME)?.strip_prefix('='))
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Extract the token from the hidden input of a server-rendered form.
pub fn from_form_html(html: &str) -> Option<String> {
    let tag = INPUT_TAG_RE.find(html)?;
    VALUE_ATTR_RE
        .captures(tag.as_str())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|value| !value.is_empty())
}
