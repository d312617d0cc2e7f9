//! View-side markup serialization.
//!
//! Renders a fragment as the editor's HTML-ish markup: no namespace
//! declarations, void elements without closing tags.

use crate::tree::{Fragment, NodeId};
use crate::xml::{escape_attr, escape_text};

/// Elements that never carry content and are written without a closing tag.
const VOID_ELEMENTS: [&str; 2] = ["br", "img"];

/// Serialize a fragment as view markup, root element included.
#[must_use]
pub fn serialize_view(frag: &Fragment) -> String {
    let mut out = String::new();
    write_node(frag, frag.root(), &mut out);
    out
}

fn write_node(frag: &Fragment, node: NodeId, out: &mut String) {
    let Some(name) = frag.name(node) else {
        if let Some(text) = frag.text(node) {
            out.push_str(&escape_text(text));
        }
        return;
    };

    out.push('<');
    out.push_str(name);
    for (attr, value) in frag.attributes(node) {
        out.push_str(&format!(" {attr}=\"{}\"", escape_attr(value)));
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&name) {
        return;
    }
    for child in frag.children(node) {
        write_node(frag, child, out);
    }
    out.push_str(&format!("</{name}>"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_markup() {
        let mut frag = Fragment::new("div");
        let p = frag.new_element("p");
        frag.append_child(frag.root(), p);
        let t = frag.new_text("hello");
        frag.append_child(p, t);
        assert_eq!(serialize_view(&frag), "<div><p>hello</p></div>");
    }

    #[test]
    fn test_void_elements_have_no_closing_tag() {
        let mut frag = Fragment::new("div");
        let p = frag.new_element("p");
        frag.append_child(frag.root(), p);
        let br = frag.new_element("br");
        frag.append_child(p, br);
        let img = frag.new_element("img");
        frag.set_attribute(img, "src", "x.png");
        frag.append_child(p, img);
        assert_eq!(
            serialize_view(&frag),
            "<div><p><br><img src=\"x.png\"></p></div>"
        );
    }

    #[test]
    fn test_empty_non_void_element_keeps_closing_tag() {
        let mut frag = Fragment::new("div");
        let p = frag.new_element("p");
        frag.append_child(frag.root(), p);
        assert_eq!(serialize_view(&frag), "<div><p></p></div>");
    }

    #[test]
    fn test_attribute_and_text_escaping() {
        let mut frag = Fragment::new("div");
        let a = frag.new_element("a");
        frag.set_attribute(a, "href", "https://e.org/?a=1&b=\"2\"");
        frag.append_child(frag.root(), a);
        let t = frag.new_text("a < b");
        frag.append_child(a, t);
        assert_eq!(
            serialize_view(&frag),
            "<div><a href=\"https://e.org/?a=1&amp;b=&quot;2&quot;\">a &lt; b</a></div>"
        );
    }
}
