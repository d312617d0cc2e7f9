//! List clean-up rules.
//!
//! Deleting list content with backspace can leave the editor with a list
//! element that has no items; such lists are removed entirely on `to_data`
//! instead of being stored as invalid markup.

use crate::filter::{Direction, ElementContext, FilterRules, RuleOutcome};

fn drop_itemless_list(ctx: &mut ElementContext<'_>) -> RuleOutcome {
    if ctx.has_child_element("li") {
        RuleOutcome::Keep
    } else {
        tracing::debug!(element = %ctx.name(), "Removing list without items");
        RuleOutcome::Remove
    }
}

/// Register the list rules.
pub fn register(rules: &mut FilterRules) {
    let set = rules.rule_set_mut(Direction::ToData);
    set.add_element("ul", drop_itemless_list);
    set.add_element("ol", drop_itemless_list);
}
