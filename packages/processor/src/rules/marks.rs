//! Inline mark mapping rules: strike, underline, inline code.
//!
//! The data grammar has no dedicated mark elements; marks are stored as
//! `<span>` with a class token. The view mapping `span → s/u/code` and the
//! data mapping `del → span` are registered independently and compose
//! through the engine's restart-on-rename.

use super::{add_class_token, class_tokens, remove_class_tokens};
use crate::config::Compatibility;
use crate::filter::{Direction, FilterRuleSet, FilterRules, RuleOutcome};

/// `(view elements, data class token)` per mark. The first view element is
/// the canonical one emitted on `to_view`.
const STRIKE_ELEMENTS: [&str; 3] = ["s", "del", "strike"];

fn to_span(set: &mut FilterRuleSet, view_name: &str, token: &'static str) {
    set.add_element(view_name, move |ctx| {
        let class = add_class_token(ctx.attribute("class"), token);
        ctx.set_attribute("class", class);
        RuleOutcome::Rename("span".to_string())
    });
}

/// Register the mark rules. The legacy generation predates inline code
/// spans, so `code` is only mapped under `latest`.
pub fn register(rules: &mut FilterRules, compatibility: Compatibility) {
    let with_code = compatibility == Compatibility::Latest;

    let to_data = rules.rule_set_mut(Direction::ToData);
    for name in STRIKE_ELEMENTS {
        to_span(to_data, name, "strike");
    }
    to_span(to_data, "u", "underline");
    if with_code {
        to_span(to_data, "code", "code");
    }

    rules
        .rule_set_mut(Direction::ToView)
        .add_element("span", move |ctx| {
            let Some(class) = ctx.attribute("class").map(str::to_string) else {
                return RuleOutcome::Keep;
            };
            let mut marks: Vec<(&str, &str)> = vec![("strike", "s"), ("underline", "u")];
            if with_code {
                marks.push(("code", "code"));
            }
            for (token, element) in marks {
                if class_tokens(&class).contains(&token) {
                    match remove_class_tokens(&class, &[token]) {
                        Some(rest) => ctx.set_attribute("class", rest),
                        None => {
                            ctx.remove_attribute("class");
                        }
                    }
                    return RuleOutcome::Rename(element.to_string());
                }
            }
            RuleOutcome::Keep
        });
}
