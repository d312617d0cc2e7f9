//! Image mapping rules.
//!
//! Data-side images reference their blob through `xlink:href`; the view
//! side carries those references in `data-xlink-*` attributes and always
//! gets the fixed placeholder `src` so the editor can render the element
//! without resolving anything.

use super::anchors::{to_data_uri, to_view_uri};
use crate::config::IMAGE_PLACEHOLDER_SRC;
use crate::filter::{Direction, FilterRules, RuleOutcome};

/// Register the image rules for both directions.
pub fn register(rules: &mut FilterRules) {
    rules
        .rule_set_mut(Direction::ToData)
        .add_element("img", |ctx| {
            ctx.remove_attribute("src");
            // Already-data images carry xlink:href instead of the
            // data-xlink-* form; they pass through unchanged.
            let href = ctx
                .remove_attribute("data-xlink-href")
                .or_else(|| ctx.attribute("xlink:href").map(str::to_string))
                .unwrap_or_default();
            if href.is_empty() {
                tracing::debug!("Image without a blob reference; dropping it");
                return RuleOutcome::ReplaceByChildren;
            }
            ctx.set_attribute("xlink:href", to_data_uri(&href));
            if let Some(role) = ctx.remove_attribute("data-xlink-role") {
                ctx.set_attribute("xlink:role", role);
            }
            if let Some(title) = ctx.remove_attribute("data-xlink-title") {
                ctx.set_attribute("xlink:title", title);
            }
            RuleOutcome::Keep
        });

    rules
        .rule_set_mut(Direction::ToView)
        .add_element("img", |ctx| {
            let href = ctx.remove_attribute("xlink:href").unwrap_or_default();
            if href.is_empty() {
                tracing::debug!("Image without xlink:href; dropping it");
                return RuleOutcome::ReplaceByChildren;
            }
            ctx.set_attribute("data-xlink-href", to_view_uri(&href));
            if let Some(role) = ctx.remove_attribute("xlink:role") {
                ctx.set_attribute("data-xlink-role", role);
            }
            if let Some(title) = ctx.remove_attribute("xlink:title") {
                ctx.set_attribute("data-xlink-title", title);
            }
            ctx.remove_attribute("xlink:type");
            ctx.remove_attribute("xlink:show");
            ctx.remove_attribute("xlink:actuate");
            // Forced display marker, always present on the view side.
            ctx.set_attribute("src", IMAGE_PLACEHOLDER_SRC);
            RuleOutcome::Keep
        });
}
