//! Latest-generation RichText schema.
//!
//! Element grammar of the RichText 1.0 dialect: a `<div>` root holding
//! block elements, with XHTML-like inline content and XLink attributes on
//! anchors and images.

use super::{AttributeSpec, ElementSpec, RichTextSchema};
use crate::config::Strictness;
use crate::error::Result;
use crate::validators;

const BLOCK: [&str; 6] = ["p", "ul", "ol", "pre", "blockquote", "table"];
const INLINE: [&str; 8] = ["a", "br", "img", "em", "strong", "sub", "sup", "span"];
/// Inline content of `<a>`: no nested anchors.
const ANCHOR_INLINE: [&str; 7] = ["br", "img", "em", "strong", "sub", "sup", "span"];
/// `<pre>` content: no images inside preformatted text.
const PRE_INLINE: [&str; 7] = ["a", "br", "em", "strong", "sub", "sup", "span"];

fn flow() -> Vec<String> {
    BLOCK.iter().chain(INLINE.iter()).map(|s| (*s).to_string()).collect()
}

/// Attach the attributes common to every element. The `dir` attribute only
/// exists in the latest generation.
fn with_common(spec: ElementSpec, with_dir: bool) -> ElementSpec {
    let spec = spec
        .with_attribute("class", AttributeSpec::any())
        .with_attribute("lang", AttributeSpec::new(validators::is_language_tag))
        .with_attribute("xml:lang", AttributeSpec::new(validators::is_language_tag));
    if with_dir {
        spec.with_attribute(
            "dir",
            AttributeSpec::new(|v, s| validators::is_token_of(&["ltr", "rtl"], v, s)),
        )
    } else {
        spec
    }
}

fn with_xlink(spec: ElementSpec) -> ElementSpec {
    spec.with_attribute(
        "xlink:type",
        AttributeSpec::new(|v, s| validators::is_token_of(&["simple"], v, s))
            .repair_with("simple"),
    )
    .with_attribute("xlink:href", AttributeSpec::new(validators::is_uri))
    .with_attribute("xlink:role", AttributeSpec::any())
    .with_attribute("xlink:title", AttributeSpec::any())
}

fn with_cell_alignment(spec: ElementSpec) -> ElementSpec {
    spec.with_attribute(
        "align",
        AttributeSpec::new(|v, s| {
            validators::is_token_of(&["left", "center", "right", "justify"], v, s)
        }),
    )
    .with_attribute(
        "valign",
        AttributeSpec::new(|v, s| {
            validators::is_token_of(&["top", "middle", "bottom", "baseline"], v, s)
        }),
    )
}

/// Element specifications shared by both generations.
pub(super) fn base_specs(with_dir: bool) -> Vec<ElementSpec> {
    let inline_marked = |name: &str| {
        with_common(
            ElementSpec::new(name).with_children(INLINE).with_text(),
            with_dir,
        )
    };

    vec![
        with_common(ElementSpec::new("div").with_children(BLOCK), with_dir),
        with_common(
            ElementSpec::new("p").with_children(INLINE).with_text(),
            with_dir,
        ),
        with_common(
            ElementSpec::new("ul").with_children(["li"]).require_content(),
            with_dir,
        ),
        with_common(
            ElementSpec::new("ol").with_children(["li"]).require_content(),
            with_dir,
        ),
        with_common(
            ElementSpec::new("li").with_children(flow()).with_text(),
            with_dir,
        ),
        with_common(
            ElementSpec::new("pre")
                .with_children(PRE_INLINE)
                .with_text()
                .with_attribute(
                    "xml:space",
                    AttributeSpec::new(|v, s| validators::is_token_of(&["preserve"], v, s))
                        .default_value("preserve"),
                ),
            with_dir,
        ),
        with_common(
            ElementSpec::new("blockquote")
                .with_children(BLOCK)
                .with_attribute("cite", AttributeSpec::new(validators::is_uri)),
            with_dir,
        ),
        with_xlink(with_common(
            ElementSpec::new("a")
                .with_children(ANCHOR_INLINE)
                .with_text()
                .with_attribute(
                    "xlink:show",
                    AttributeSpec::new(|v, s| {
                        validators::is_token_of(&["new", "replace", "embed", "other", "none"], v, s)
                    }),
                )
                .with_attribute(
                    "xlink:actuate",
                    AttributeSpec::new(|v, s| {
                        validators::is_token_of(&["onRequest", "onLoad"], v, s)
                    }),
                ),
            with_dir,
        )),
        ElementSpec::new("br").with_attribute("class", AttributeSpec::any()),
        with_xlink(with_common(
            ElementSpec::new("img")
                .with_attribute("alt", AttributeSpec::any().default_value(""))
                .with_attribute("height", AttributeSpec::new(validators::is_length))
                .with_attribute("width", AttributeSpec::new(validators::is_length))
                .with_attribute(
                    "xlink:show",
                    AttributeSpec::new(|v, s| validators::is_token_of(&["embed"], v, s))
                        .repair_with("embed"),
                )
                .with_attribute(
                    "xlink:actuate",
                    AttributeSpec::new(|v, s| validators::is_token_of(&["onLoad"], v, s))
                        .default_value("onLoad"),
                ),
            with_dir,
        )),
        inline_marked("em"),
        inline_marked("strong"),
        inline_marked("sub"),
        inline_marked("sup"),
        inline_marked("span"),
        with_common(
            ElementSpec::new("table")
                .with_children(["tbody", "tr"])
                .require_content()
                .with_attribute("summary", AttributeSpec::any())
                .with_attribute("width", AttributeSpec::new(validators::is_length))
                .with_attribute("border", AttributeSpec::new(validators::is_number))
                .with_attribute("cellspacing", AttributeSpec::new(validators::is_length))
                .with_attribute("cellpadding", AttributeSpec::new(validators::is_length)),
            with_dir,
        ),
        with_cell_alignment(with_common(
            ElementSpec::new("tbody").with_children(["tr"]).require_content(),
            with_dir,
        )),
        with_cell_alignment(with_common(
            ElementSpec::new("tr").with_children(["td"]).require_content(),
            with_dir,
        )),
        with_cell_alignment(with_common(
            ElementSpec::new("td")
                .with_children(flow())
                .with_text()
                .with_attribute("abbr", AttributeSpec::any())
                .with_attribute(
                    "rowspan",
                    AttributeSpec::new(validators::is_number).repair_with("1"),
                )
                .with_attribute(
                    "colspan",
                    AttributeSpec::new(validators::is_number).repair_with("1"),
                ),
            with_dir,
        )),
    ]
}

/// Build the latest-generation schema.
///
/// # Errors
/// Propagates schema definition errors (none expected for the built-in
/// tables; covered by tests).
pub fn latest_schema(strictness: Strictness) -> Result<RichTextSchema> {
    RichTextSchema::register_all(strictness, base_specs(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Fragment;

    #[test]
    fn test_latest_schema_is_well_formed() {
        // Every declared child registered: construction must not fail.
        let schema = latest_schema(Strictness::Strict).expect("built-in schema is valid");
        assert!(schema.element("div").is_some());
        assert!(schema.element("td").is_some());
    }

    #[test]
    fn test_div_is_the_only_root() {
        let schema = latest_schema(Strictness::Strict).expect("built-in schema is valid");
        for name in ["p", "ul", "li", "a", "span", "table", "td"] {
            let frag = Fragment::new(name);
            assert!(
                !schema.is_element_allowed_at_parent(&frag, frag.root()),
                "<{name}> must not be a root"
            );
        }
        let frag = Fragment::new("div");
        assert!(schema.is_element_allowed_at_parent(&frag, frag.root()));
    }

    #[test]
    fn test_nested_anchor_disallowed() {
        let schema = latest_schema(Strictness::Strict).expect("built-in schema is valid");
        let mut frag = Fragment::new("div");
        let p = frag.new_element("p");
        frag.append_child(frag.root(), p);
        let outer = frag.new_element("a");
        frag.append_child(p, outer);
        let inner = frag.new_element("a");
        frag.append_child(outer, inner);

        assert!(schema.is_element_allowed_at_parent(&frag, outer));
        assert!(!schema.is_element_allowed_at_parent(&frag, inner));
    }

    #[test]
    fn test_dir_attribute_present_in_latest() {
        let schema = latest_schema(Strictness::Strict).expect("built-in schema is valid");
        let p = schema.element("p").expect("p registered");
        assert!(p.attributes.contains_key("dir"));
    }
}
