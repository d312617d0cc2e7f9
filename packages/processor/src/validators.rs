//! Attribute value validators.
//!
//! Pure predicates over `(value, strictness)` used by the schema's
//! attribute specifications. `Strict` applies the full predicate, `Loose`
//! accepts any non-empty value, `Legacy` accepts everything.

use regex::Regex;
use std::sync::LazyLock;

use crate::config::Strictness;

/// Language tag: primary subtag plus optional subtags (`en`, `en-US`,
/// `x-custom`).
#[allow(clippy::expect_used)]
static LANGUAGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{1,8}(-[A-Za-z0-9]{1,8})*$").expect("valid regex"));

/// Non-negative integer token.
#[allow(clippy::expect_used)]
static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("valid regex"));

/// CSS-ish length: integer with optional `%` or unit suffix.
#[allow(clippy::expect_used)]
static LENGTH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(%|px|em)?$").expect("valid regex"));

fn lenient(value: &str, strictness: Strictness) -> Option<bool> {
    match strictness {
        Strictness::Legacy => Some(true),
        Strictness::Loose => Some(!value.is_empty()),
        // `None` is resolved at processor construction; treat a leak as Loose.
        Strictness::None => Some(!value.is_empty()),
        Strictness::Strict => None,
    }
}

/// Validate a language tag (`lang` / `xml:lang`).
#[must_use]
pub fn is_language_tag(value: &str, strictness: Strictness) -> bool {
    lenient(value, strictness).unwrap_or_else(|| LANGUAGE_PATTERN.is_match(value))
}

/// Validate a non-negative integer token (`rowspan`, `colspan`).
#[must_use]
pub fn is_number(value: &str, strictness: Strictness) -> bool {
    lenient(value, strictness).unwrap_or_else(|| NUMBER_PATTERN.is_match(value))
}

/// Validate a URI reference (`xlink:href`).
///
/// Deliberately shallow: rejects embedded whitespace and markup characters,
/// everything else is the collaborator's business.
#[must_use]
pub fn is_uri(value: &str, strictness: Strictness) -> bool {
    lenient(value, strictness).unwrap_or_else(|| {
        !value.is_empty() && !value.chars().any(|c| c.is_whitespace() || c == '<' || c == '>')
    })
}

/// Validate a length value (`width`, `height`).
#[must_use]
pub fn is_length(value: &str, strictness: Strictness) -> bool {
    lenient(value, strictness).unwrap_or_else(|| LENGTH_PATTERN.is_match(value))
}

/// Validate membership in an enumerated token set (`dir`, `xlink:type`).
#[must_use]
pub fn is_token_of(allowed: &[&str], value: &str, strictness: Strictness) -> bool {
    lenient(value, strictness).unwrap_or_else(|| allowed.contains(&value))
}
