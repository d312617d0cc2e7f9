//! Rule configuration merger.
//!
//! Combines a caller-supplied override configuration with the module
//! defaults into one effective rule set per direction. When both sides
//! define a rule for the same element the default runs first and the custom
//! rule second, so overrides refine what the default already set; a
//! conflicting rename is resolved last-writer-wins by the engine, which
//! emits the diagnostic.

use super::{FilterRuleSet, FilterRules};

/// Merge `custom` over `defaults`, default-then-custom per key.
#[must_use]
pub fn merge(custom: FilterRules, defaults: FilterRules) -> FilterRules {
    FilterRules {
        to_data: merge_set(custom.to_data, defaults.to_data),
        to_view: merge_set(custom.to_view, defaults.to_view),
    }
}

fn merge_set(custom: FilterRuleSet, defaults: FilterRuleSet) -> FilterRuleSet {
    let mut merged = defaults;
    for (name, rules) in custom.elements {
        merged.elements.entry(name).or_default().extend(rules);
    }
    merged.generic_before.extend(custom.generic_before);
    merged.generic_after.extend(custom.generic_after);
    merged.text.extend(custom.text);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{Direction, FilterEngine, RuleOutcome};
    use crate::tree::Fragment;

    #[test]
    fn test_custom_rule_runs_after_default() {
        let mut defaults = FilterRules::default();
        defaults.to_data.add_element("p", |ctx| {
            ctx.set_attribute("class", "default");
            RuleOutcome::Keep
        });

        let mut custom = FilterRules::default();
        custom.to_data.add_element("p", |ctx| {
            // Default already ran: its attribute is visible and refinable.
            assert_eq!(ctx.attribute("class"), Some("default"));
            ctx.set_attribute("class", "custom");
            RuleOutcome::Keep
        });

        let merged = merge(custom, defaults);
        let mut frag = Fragment::new("div");
        let p = frag.new_element("p");
        frag.append_child(frag.root(), p);

        FilterEngine::new(merged.rule_set(Direction::ToData), Direction::ToData).run(&mut frag);
        assert_eq!(frag.attribute(p, "class"), Some("custom"));
    }

    #[test]
    fn test_merge_keeps_unrelated_defaults() {
        let mut defaults = FilterRules::default();
        defaults.to_view.add_element("em", |_| RuleOutcome::Remove);

        let custom = FilterRules::default();
        let merged = merge(custom, defaults);
        assert!(merged.rule_set(Direction::ToView).has_element("em"));
    }
}
