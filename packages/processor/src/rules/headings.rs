//! Heading mapping rules.
//!
//! The data grammar has no heading elements; headings are stored as
//! `<p class="p--heading-N">` and restored by class lookup on the way back.

use super::{add_class_token, class_tokens, remove_class_tokens};
use crate::filter::{Direction, FilterRules, RuleOutcome};

/// Heading classes in a fixed order; when several are present at once the
/// first match wins.
const HEADING_CLASSES: [&str; 6] = [
    "p--heading-1",
    "p--heading-2",
    "p--heading-3",
    "p--heading-4",
    "p--heading-5",
    "p--heading-6",
];

/// Register the heading rules for both directions.
pub fn register(rules: &mut FilterRules) {
    for level in 1..=6 {
        rules
            .rule_set_mut(Direction::ToData)
            .add_element(format!("h{level}"), move |ctx| {
                let class = add_class_token(ctx.attribute("class"), HEADING_CLASSES[level - 1]);
                ctx.set_attribute("class", class);
                RuleOutcome::Rename("p".to_string())
            });
    }

    rules
        .rule_set_mut(Direction::ToView)
        .add_element("p", |ctx| {
            let Some(class) = ctx.attribute("class").map(str::to_string) else {
                return RuleOutcome::Keep;
            };
            let present: Vec<&str> = HEADING_CLASSES
                .iter()
                .copied()
                .filter(|h| class_tokens(&class).contains(h))
                .collect();
            let Some(first) = present.first() else {
                return RuleOutcome::Keep;
            };
            if present.len() > 1 {
                tracing::warn!(
                    classes = %present.join(" "),
                    "Multiple heading classes on one paragraph; keeping the first"
                );
            }
            // Strip every heading class, not only the winning one.
            match remove_class_tokens(&class, &HEADING_CLASSES) {
                Some(rest) => ctx.set_attribute("class", rest),
                None => {
                    ctx.remove_attribute("class");
                }
            }
            let level = first
                .rsplit('-')
                .next()
                .unwrap_or("1");
            RuleOutcome::Rename(format!("h{level}"))
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Compatibility;
    use crate::filter::FilterEngine;
    use crate::rules::defaults;
    use crate::tree::Fragment;
    use crate::view::serialize_view;

    fn run(direction: Direction, frag: &mut Fragment) {
        let rules = defaults(Compatibility::Latest);
        FilterEngine::new(rules.rule_set(direction), direction).run(frag);
    }

    #[test]
    fn test_heading_to_data_and_back() {
        let mut frag = Fragment::new("div");
        let h = frag.new_element("h3");
        frag.append_child(frag.root(), h);
        let t = frag.new_text("Title");
        frag.append_child(h, t);

        run(Direction::ToData, &mut frag);
        assert_eq!(frag.name(h), Some("p"));
        assert_eq!(frag.attribute(h, "class"), Some("p--heading-3"));

        run(Direction::ToView, &mut frag);
        assert_eq!(serialize_view(&frag), "<div><h3>Title</h3></div>");
    }

    #[test]
    fn test_other_classes_survive_the_round_trip() {
        let mut frag = Fragment::new("div");
        let h = frag.new_element("h2");
        frag.append_child(frag.root(), h);
        frag.set_attribute(h, "class", "intro");

        run(Direction::ToData, &mut frag);
        assert_eq!(frag.attribute(h, "class"), Some("intro p--heading-2"));

        run(Direction::ToView, &mut frag);
        assert_eq!(frag.name(h), Some("h2"));
        assert_eq!(frag.attribute(h, "class"), Some("intro"));
    }

    #[test]
    fn test_heading_class_collision_resolved_deterministically() {
        // Hand-edited source may carry several heading classes at once.
        let mut frag = Fragment::new("div");
        let p = frag.new_element("p");
        frag.append_child(frag.root(), p);
        frag.set_attribute(p, "class", "p--heading-4 p--heading-2");

        run(Direction::ToView, &mut frag);
        // First match in the fixed ordering wins; all heading classes gone.
        assert_eq!(frag.name(p), Some("h2"));
        assert_eq!(frag.attribute(p, "class"), None);
    }

    #[test]
    fn test_plain_paragraph_untouched() {
        let mut frag = Fragment::new("div");
        let p = frag.new_element("p");
        frag.append_child(frag.root(), p);
        frag.set_attribute(p, "class", "note");

        run(Direction::ToView, &mut frag);
        assert_eq!(frag.name(p), Some("p"));
        assert_eq!(frag.attribute(p, "class"), Some("note"));
    }
}
