//! Per-element mapping rule modules.
//!
//! Each module registers its default rules for both directions into a
//! [`FilterRules`] value; [`defaults`] assembles the complete generation
//! rule set that the processor then merges with caller overrides.

pub mod anchors;
pub mod headings;
pub mod images;
pub mod language;
pub mod lists;
pub mod marks;
pub mod tables;

use crate::config::Compatibility;
use crate::filter::FilterRules;

/// Build the default rule set for the selected schema generation.
#[must_use]
pub fn defaults(compatibility: Compatibility) -> FilterRules {
    let mut rules = FilterRules::default();
    language::register(&mut rules);
    anchors::register(&mut rules);
    images::register(&mut rules);
    headings::register(&mut rules);
    lists::register(&mut rules);
    tables::register(&mut rules);
    marks::register(&mut rules, compatibility);
    rules
}

/// Split a `class` attribute value into tokens.
pub(crate) fn class_tokens(value: &str) -> Vec<&str> {
    value.split_whitespace().collect()
}

/// Add a token to a class value, keeping existing tokens.
pub(crate) fn add_class_token(value: Option<&str>, token: &str) -> String {
    match value {
        Some(existing) if !existing.trim().is_empty() => {
            if class_tokens(existing).contains(&token) {
                existing.to_string()
            } else {
                format!("{existing} {token}")
            }
        }
        _ => token.to_string(),
    }
}

/// Remove tokens from a class value; `None` when nothing is left.
pub(crate) fn remove_class_tokens(value: &str, tokens: &[&str]) -> Option<String> {
    let kept: Vec<&str> = class_tokens(value)
        .into_iter()
        .filter(|t| !tokens.contains(t))
        .collect();
    if kept.is_empty() {
        None
    } else {
        Some(kept.join(" "))
    }
}
