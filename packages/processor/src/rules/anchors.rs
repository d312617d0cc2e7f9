//! Anchor mapping rules: content links and link-target encoding.
//!
//! Data-side anchors carry `xlink:href`/`xlink:show`/`xlink:role`; view-side
//! anchors carry `href`/`target`/`title`. The `(show, role) ⇄ target`
//! codec is bijective by construction for the documented token set; the
//! non-bijective edges (unknown `show`, role-as-target) are handled with
//! diagnostics, never hard errors.

use regex::Regex;
use std::sync::LazyLock;

use crate::config::MAX_CONTENT_ID;
use crate::filter::{Direction, FilterRules, RuleOutcome};

/// Content reference in either surface syntax: short `content/<id>` or
/// scheme `content:<id>`. Anchored so `content/42#postfix` is no match.
#[allow(clippy::expect_used)]
static CONTENT_LINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^content[/:](\d+)$").expect("valid regex"));

/// Parse a content ID out of a URI in either surface syntax.
///
/// Digits only; the value must fit the safe-integer bound. Malformed or
/// out-of-range input yields no match, never zero.
#[must_use]
pub fn parse_content_id(uri: &str) -> Option<u64> {
    let caps = CONTENT_LINK_PATTERN.captures(uri)?;
    let id: u64 = caps[1].parse().ok()?;
    (id <= MAX_CONTENT_ID).then_some(id)
}

/// Canonical data-side content URI.
#[must_use]
pub fn data_content_link(id: u64) -> String {
    format!("content/{id}")
}

/// Canonical view-side content URI.
#[must_use]
pub fn view_content_link(id: u64) -> String {
    format!("content:{id}")
}

/// Normalize a URI for the data side; non-content URIs pass through
/// unchanged (assumed external).
#[must_use]
pub fn to_data_uri(uri: &str) -> String {
    match parse_content_id(uri) {
        Some(id) => data_content_link(id),
        None => uri.to_string(),
    }
}

/// Normalize a URI for the view side; non-content URIs pass through
/// unchanged.
#[must_use]
pub fn to_view_uri(uri: &str) -> String {
    match parse_content_id(uri) {
        Some(id) => view_content_link(id),
        None => uri.to_string(),
    }
}

const SHOW_TOKENS: [(&str, &str); 5] = [
    ("replace", "_self"),
    ("new", "_blank"),
    ("embed", "_embed"),
    ("none", "_none"),
    ("other", "_other"),
];

/// Encode `(xlink:show, xlink:role)` into a view-side `target` value.
///
/// `None` means "emit no target attribute". Lossy edges: an unrecognized
/// `show` warns and falls back to role-only encoding (or nothing), and
/// `show="other"` with a role collapses to the role verbatim.
#[must_use]
pub fn format_target(show: Option<&str>, role: Option<&str>) -> Option<String> {
    match (show, role) {
        (None, None) => None,
        (None, Some(role)) => Some(format!("_role_{role}")),
        (Some("other"), Some(role)) => Some(role.to_string()),
        (Some(show), role) => {
            let Some((_, token)) = SHOW_TOKENS.iter().find(|(name, _)| *name == show) else {
                tracing::warn!(show = %show, "Unrecognized xlink:show value; dropping it from target");
                return role.map(|r| format!("_role_{r}"));
            };
            match role {
                None => Some((*token).to_string()),
                Some(role) => Some(format!("{token}_{role}")),
            }
        }
    }
}

/// Decode a view-side `target` value back into `(xlink:show, xlink:role)`.
#[must_use]
pub fn parse_target(target: &str) -> (Option<String>, Option<String>) {
    if target.is_empty() {
        return (None, None);
    }
    for (show, token) in SHOW_TOKENS {
        if target == token {
            return (Some(show.to_string()), None);
        }
        if let Some(role) = target.strip_prefix(&format!("{token}_")) {
            if !role.is_empty() {
                return (Some(show.to_string()), Some(role.to_string()));
            }
        }
    }
    if let Some(role) = target.strip_prefix("_role_") {
        if !role.is_empty() {
            return (None, Some(role.to_string()));
        }
    }
    if target == "_role" {
        tracing::warn!("Bare '_role' target carries no role; dropping it");
        return (None, None);
    }
    // Role-as-target: re-expand to show="other".
    (Some("other".to_string()), Some(target.to_string()))
}

/// Register the anchor rules for both directions.
pub fn register(rules: &mut FilterRules) {
    rules
        .rule_set_mut(Direction::ToData)
        .add_element("a", |ctx| {
            // Already-data anchors carry xlink:href instead of href; they
            // pass through so applying the pass twice is a no-op.
            let href = ctx
                .remove_attribute("href")
                .or_else(|| ctx.attribute("xlink:href").map(str::to_string))
                .unwrap_or_default();
            if href.is_empty() {
                tracing::debug!("Anchor without href; keeping its content only");
                return RuleOutcome::ReplaceByChildren;
            }
            ctx.set_attribute("xlink:href", to_data_uri(&href));
            let target = ctx.remove_attribute("target").unwrap_or_default();
            let (show, role) = parse_target(&target);
            if let Some(show) = show {
                ctx.set_attribute("xlink:show", show);
            }
            if let Some(role) = role {
                ctx.set_attribute("xlink:role", role);
            }
            if let Some(title) = ctx.remove_attribute("title") {
                ctx.set_attribute("xlink:title", title);
            }
            RuleOutcome::Keep
        });

    rules
        .rule_set_mut(Direction::ToView)
        .add_element("a", |ctx| {
            let href = ctx.remove_attribute("xlink:href").unwrap_or_default();
            if href.is_empty() {
                tracing::debug!("Anchor without xlink:href; keeping its content only");
                return RuleOutcome::ReplaceByChildren;
            }
            ctx.set_attribute("href", to_view_uri(&href));
            let show = ctx.remove_attribute("xlink:show");
            let role = ctx.remove_attribute("xlink:role");
            if let Some(target) = format_target(show.as_deref(), role.as_deref()) {
                ctx.set_attribute("target", target);
            }
            if let Some(title) = ctx.remove_attribute("xlink:title") {
                ctx.set_attribute("title", title);
            }
            ctx.remove_attribute("xlink:type");
            ctx.remove_attribute("xlink:actuate");
            RuleOutcome::Keep
        });
}
