//! Language attribute mapping.
//!
//! The data side uses `xml:lang`, the view side `lang`. Mapped through the
//! generic `$` hook so it applies to every element, independent of whatever
//! named rule runs on it. An element carrying both keeps the side-native
//! attribute.

use crate::filter::{Direction, FilterRules, RuleOutcome};

/// Register the language rules for both directions.
pub fn register(rules: &mut FilterRules) {
    rules.rule_set_mut(Direction::ToData).add_generic_before(|ctx| {
        if let Some(lang) = ctx.remove_attribute("lang") {
            if ctx.attribute("xml:lang").is_none() {
                ctx.set_attribute("xml:lang", lang);
            }
        }
        RuleOutcome::Keep
    });

    rules.rule_set_mut(Direction::ToView).add_generic_before(|ctx| {
        if let Some(lang) = ctx.remove_attribute("xml:lang") {
            if ctx.attribute("lang").is_none() {
                ctx.set_attribute("lang", lang);
            }
        }
        RuleOutcome::Keep
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Compatibility;
    use crate::filter::FilterEngine;
    use crate::rules::defaults;
    use crate::tree::Fragment;

    fn run(direction: Direction, frag: &mut Fragment) {
        let rules = defaults(Compatibility::Latest);
        FilterEngine::new(rules.rule_set(direction), direction).run(frag);
    }

    #[test]
    fn test_lang_mapped_symmetrically() {
        let mut frag = Fragment::new("div");
        let p = frag.new_element("p");
        frag.append_child(frag.root(), p);
        frag.set_attribute(p, "xml:lang", "nl-NL");

        run(Direction::ToView, &mut frag);
        assert_eq!(frag.attribute(p, "lang"), Some("nl-NL"));
        assert_eq!(frag.attribute(p, "xml:lang"), None);

        run(Direction::ToData, &mut frag);
        assert_eq!(frag.attribute(p, "xml:lang"), Some("nl-NL"));
        assert_eq!(frag.attribute(p, "lang"), None);
    }

    #[test]
    fn test_language_mapped_alongside_named_rules() {
        // Independent of the heading rule running on the same element.
        let mut frag = Fragment::new("div");
        let h = frag.new_element("h1");
        frag.append_child(frag.root(), h);
        frag.set_attribute(h, "lang", "de");

        run(Direction::ToData, &mut frag);
        assert_eq!(frag.name(h), Some("p"));
        assert_eq!(frag.attribute(h, "xml:lang"), Some("de"));
        assert_eq!(frag.attribute(h, "lang"), None);
    }
}
