//! Data-side XML parsing and serialization.
//!
//! Parsing goes through `roxmltree`; custom named entities supplied by the
//! host are declared in an internal DTD subset prepended to the document
//! before parsing. Serialization writes the fixed namespaced `<div>` root
//! and escapes character data; named entities re-encode as character
//! references, which is the documented lossy part of the round trip.

use std::collections::BTreeMap;

use roxmltree::{Document, ParsingOptions};

use crate::config::{RICHTEXT_NAMESPACE, XLINK_NAMESPACE};
use crate::error::{Result, RichTextError};
use crate::tree::{Fragment, NodeId};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Parse a data-side document into an owned fragment.
///
/// # Errors
/// Returns `XmlParse` for malformed XML and `MissingRoot` when the root
/// element is not a `<div>`.
pub fn parse_data(xml: &str, entities: &BTreeMap<String, String>) -> Result<Fragment> {
    let prepared;
    let source = if entities.is_empty() {
        xml
    } else {
        prepared = declare_entities(xml, entities);
        &prepared
    };

    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(source, options)?;
    let root = doc.root_element();
    if root.tag_name().name() != "div" {
        return Err(RichTextError::MissingRoot);
    }

    let mut frag = Fragment::new("div");
    let frag_root = frag.root();
    copy_attributes(&mut frag, frag_root, root);
    for child in root.children() {
        copy_node(&mut frag, frag_root, child);
    }
    Ok(frag)
}

/// Prepend an internal DTD subset declaring the host's named entities.
fn declare_entities(xml: &str, entities: &BTreeMap<String, String>) -> String {
    let mut subset = String::from("<!DOCTYPE div [");
    for (name, value) in entities {
        let value = value.replace('&', "&#38;").replace('"', "&#34;");
        subset.push_str(&format!("<!ENTITY {name} \"{value}\">"));
    }
    subset.push_str("]>");

    // Keep an XML declaration, if any, ahead of the DOCTYPE.
    if let Some(decl_end) = xml.find("?>").filter(|_| xml.trim_start().starts_with("<?xml")) {
        let (decl, rest) = xml.split_at(decl_end + 2);
        format!("{decl}{subset}{rest}")
    } else {
        format!("{subset}{xml}")
    }
}

fn copy_node(frag: &mut Fragment, parent: NodeId, node: roxmltree::Node<'_, '_>) {
    if node.is_element() {
        let element = frag.new_element(node.tag_name().name());
        copy_attributes(frag, element, node);
        frag.append_child(parent, element);
        for child in node.children() {
            copy_node(frag, element, child);
        }
    } else if node.is_text() {
        if let Some(text) = node.text() {
            let t = frag.new_text(text);
            frag.append_child(parent, t);
        }
    }
    // Comments and processing instructions are not part of the dialect.
}

fn copy_attributes(frag: &mut Fragment, element: NodeId, node: roxmltree::Node<'_, '_>) {
    for attr in node.attributes() {
        let name = match attr.namespace() {
            Some(XLINK_NAMESPACE) => format!("xlink:{}", attr.name()),
            Some(XML_NAMESPACE) => format!("xml:{}", attr.name()),
            _ => attr.name().to_string(),
        };
        frag.set_attribute(element, name, attr.value());
    }
}

/// Serialize a fragment as a data-side document with the mandatory
/// namespace declarations on the root.
#[must_use]
pub fn serialize_data(frag: &Fragment) -> String {
    let mut out = String::new();
    write_element(frag, frag.root(), true, &mut out);
    out
}

fn write_element(frag: &Fragment, node: NodeId, is_root: bool, out: &mut String) {
    let Some(name) = frag.name(node) else {
        if let Some(text) = frag.text(node) {
            out.push_str(&escape_text(text));
        }
        return;
    };

    out.push('<');
    out.push_str(name);
    if is_root {
        out.push_str(&format!(
            " xmlns=\"{RICHTEXT_NAMESPACE}\" xmlns:xlink=\"{XLINK_NAMESPACE}\""
        ));
    }
    for (attr, value) in frag.attributes(node) {
        out.push_str(&format!(" {attr}=\"{}\"", escape_attr(value)));
    }

    let children = frag.children(node);
    if children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in children {
        write_element(frag, child, false, out);
    }
    out.push_str(&format!("</{name}>"));
}

pub(crate) fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub(crate) fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
