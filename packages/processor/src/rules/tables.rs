//! Table mapping rules.
//!
//! The data grammar knows only `table`/`tbody`/`tr`/`td`. Header cells are
//! stored as `<td class="td--header">`, header/footer sections are
//! flattened, and rows that end up directly under `<table>` are wrapped
//! into a `tbody` after the children have been processed.

use super::{add_class_token, class_tokens, remove_class_tokens};
use crate::filter::{Direction, FilterRules, RuleOutcome};

/// Class token marking a header cell on the data side.
const HEADER_CELL_CLASS: &str = "td--header";

/// Register the table rules for both directions.
pub fn register(rules: &mut FilterRules) {
    let to_data = rules.rule_set_mut(Direction::ToData);

    to_data.add_element("th", |ctx| {
        let class = add_class_token(ctx.attribute("class"), HEADER_CELL_CLASS);
        ctx.set_attribute("class", class);
        RuleOutcome::Rename("td".to_string())
    });

    // Section elements disappear; their rows are re-homed by the table
    // hook below.
    to_data.add_element("thead", |_| RuleOutcome::ReplaceByChildren);
    to_data.add_element("tfoot", |_| RuleOutcome::ReplaceByChildren);

    // Runs after the children, when the sections are already dissolved.
    to_data.add_generic_after(|ctx| {
        if ctx.name() != "table" {
            return RuleOutcome::Keep;
        }
        let node = ctx.node();
        let frag = ctx.fragment_mut();
        let children = frag.children(node);
        let stray: Vec<_> = children
            .iter()
            .copied()
            .filter(|c| frag.name(*c) == Some("tr"))
            .collect();
        if stray.is_empty() {
            return RuleOutcome::Keep;
        }
        let tbody_pos = children.iter().position(|c| frag.name(*c) == Some("tbody"));
        let tbody = match tbody_pos {
            Some(pos) => children[pos],
            None => {
                let index = children
                    .iter()
                    .position(|c| frag.name(*c) == Some("tr"))
                    .unwrap_or(0);
                let tbody = frag.new_element("tbody");
                frag.insert_child(node, index, tbody);
                tbody
            }
        };
        // Keep document order: rows that sat before the tbody (flattened
        // header sections) go to its front, later rows to its back.
        let mut front = 0;
        for (position, tr) in children.iter().enumerate() {
            if !stray.contains(tr) {
                continue;
            }
            frag.detach(*tr);
            if tbody_pos.is_some_and(|pos| position < pos) {
                frag.insert_child(tbody, front, *tr);
                front += 1;
            } else {
                frag.append_child(tbody, *tr);
            }
        }
        RuleOutcome::Keep
    });

    rules
        .rule_set_mut(Direction::ToView)
        .add_element("td", |ctx| {
            let Some(class) = ctx.attribute("class").map(str::to_string) else {
                return RuleOutcome::Keep;
            };
            if !class_tokens(&class).contains(&HEADER_CELL_CLASS) {
                return RuleOutcome::Keep;
            }
            match remove_class_tokens(&class, &[HEADER_CELL_CLASS]) {
                Some(rest) => ctx.set_attribute("class", rest),
                None => {
                    ctx.remove_attribute("class");
                }
            }
            RuleOutcome::Rename("th".to_string())
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

    fn build_row(frag: &mut Fragment, section: crate::tree::NodeId, cell: &str, text: &str) {
        let tr = frag.new_element("tr");
        frag.append_child(section, tr);
        let td = frag.new_element(cell);
        frag.append_child(tr, td);
        let t = frag.new_text(text);
        frag.append_child(td, t);
    }

    #[test]
    fn test_thead_flattened_and_th_mapped() {
        let mut frag = Fragment::new("div");
        let table = frag.new_element("table");
        frag.append_child(frag.root(), table);
        let thead = frag.new_element("thead");
        frag.append_child(table, thead);
        build_row(&mut frag, thead, "th", "Name");
        let tbody = frag.new_element("tbody");
        frag.append_child(table, tbody);
        build_row(&mut frag, tbody, "td", "Ada");

        run(Direction::ToData, &mut frag);
        assert_eq!(
            serialize_view(&frag),
            "<div><table><tbody><tr><td class=\"td--header\">Name</td></tr>\
             <tr><td>Ada</td></tr></tbody></table></div>"
        );
    }

    #[test]
    fn test_rows_without_section_get_wrapped() {
        let mut frag = Fragment::new("div");
        let table = frag.new_element("table");
        frag.append_child(frag.root(), table);
        build_row(&mut frag, table, "td", "loose");

        run(Direction::ToData, &mut frag);
        assert_eq!(
            serialize_view(&frag),
            "<div><table><tbody><tr><td>loose</td></tr></tbody></table></div>"
        );
    }

    #[test]
    fn test_header_cell_restored_on_to_view() {
        let mut frag = Fragment::new("div");
        let table = frag.new_element("table");
        frag.append_child(frag.root(), table);
        let tbody = frag.new_element("tbody");
        frag.append_child(table, tbody);
        build_row(&mut frag, tbody, "td", "Name");
        let tr = frag.children(tbody)[0];
        let td = frag.children(tr)[0];
        frag.set_attribute(td, "class", "wide td--header");

        run(Direction::ToView, &mut frag);
        assert_eq!(frag.name(td), Some("th"));
        assert_eq!(frag.attribute(td, "class"), Some("wide"));
    }
}
