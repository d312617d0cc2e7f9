//! RichText schema registry.
//!
//! Declares, per element, the allowed children, text permission, emptiness
//! rule and attribute specifications, and derives the parent→child relation
//! once at construction. The registry drives the final-adjustment pass that
//! guarantees `to_data` output conforms to the document grammar.

mod latest;
mod legacy;

pub use latest::latest_schema;
pub use legacy::legacy_schema;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::config::{Compatibility, Strictness};
use crate::error::{Result, RichTextError};
use crate::tree::{Fragment, NodeId};

/// Validator predicate for one attribute value class.
pub type ValueValidator = Arc<dyn Fn(&str, Strictness) -> bool + Send + Sync>;

/// Handler for an invalid attribute value. `None` removes the attribute,
/// `Some(v)` keeps or replaces the value.
pub type InvalidValueHandler = Arc<dyn Fn(&str, Strictness) -> Option<String> + Send + Sync>;

/// Handler supplying a default for a missing attribute.
pub type MissingAttributeHandler = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Specification of a single attribute on an element.
#[derive(Clone)]
pub struct AttributeSpec {
    validate: ValueValidator,
    on_invalid: InvalidValueHandler,
    on_missing: MissingAttributeHandler,
}

impl AttributeSpec {
    /// Create a specification with the given validator. The default
    /// invalid-value handler removes the attribute; there is no default
    /// for a missing attribute.
    #[must_use]
    pub fn new(validate: impl Fn(&str, Strictness) -> bool + Send + Sync + 'static) -> Self {
        Self {
            validate: Arc::new(validate),
            on_invalid: Arc::new(|_, _| None),
            on_missing: Arc::new(|| None),
        }
    }

    /// Specification accepting any value (CDATA attributes like `class`).
    #[must_use]
    pub fn any() -> Self {
        Self::new(|_, _| true)
    }

    /// Replace the invalid-value handler.
    #[must_use]
    pub fn on_invalid(
        mut self,
        handler: impl Fn(&str, Strictness) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.on_invalid = Arc::new(handler);
        self
    }

    /// Repair invalid values by overwriting with a fixed replacement.
    #[must_use]
    pub fn repair_with(self, replacement: &'static str) -> Self {
        self.on_invalid(move |_, _| Some(replacement.to_string()))
    }

    /// Supply a fixed default when the attribute is missing.
    #[must_use]
    pub fn default_value(mut self, value: &'static str) -> Self {
        self.on_missing = Arc::new(move || Some(value.to_string()));
        self
    }

    /// Whether `value` passes validation under `strictness`.
    #[must_use]
    pub fn is_valid(&self, value: &str, strictness: Strictness) -> bool {
        (self.validate)(value, strictness)
    }

    /// Invoke the invalid-value handler.
    #[must_use]
    pub fn handle_invalid(&self, value: &str, strictness: Strictness) -> Option<String> {
        (self.on_invalid)(value, strictness)
    }

    /// Invoke the missing-attribute handler.
    #[must_use]
    pub fn handle_missing(&self) -> Option<String> {
        (self.on_missing)()
    }
}

impl std::fmt::Debug for AttributeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeSpec").finish_non_exhaustive()
    }
}

/// Declarative specification of one element in the schema.
#[derive(Debug, Clone)]
pub struct ElementSpec {
    /// Element local name.
    pub name: String,

    /// Whether the element may stay in the document with no children.
    pub may_be_empty: bool,

    /// Whether text nodes are allowed directly inside.
    pub may_contain_text: bool,

    /// Allowed child element names.
    pub nested_element_names: Vec<String>,

    /// Attribute specifications keyed by attribute name. Ordered so the
    /// attribute passes and appended defaults are deterministic.
    pub attributes: BTreeMap<String, AttributeSpec>,
}

impl ElementSpec {
    /// Create a specification for `name`: empty allowed, no text, no
    /// children, no attributes.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            may_be_empty: true,
            may_contain_text: false,
            nested_element_names: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Set the allowed child element names.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.nested_element_names = children.into_iter().map(Into::into).collect();
        self
    }

    /// Allow text nodes directly inside.
    #[must_use]
    pub fn with_text(mut self) -> Self {
        self.may_contain_text = true;
        self
    }

    /// Require at least one child node; empty instances are removed.
    #[must_use]
    pub fn require_content(mut self) -> Self {
        self.may_be_empty = false;
        self
    }

    /// Add an attribute specification.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, spec: AttributeSpec) -> Self {
        self.attributes.insert(name.into(), spec);
        self
    }
}

/// Action decided by a hierarchy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HierarchyAction {
    Keep,
    /// Element disallowed at its parent: drop it, promote its children.
    ReplaceByChildren,
    /// Element must not be empty but is: delete the subtree.
    Remove,
}

/// Immutable schema for one processor instance.
///
/// Constructed once at initialization and shared read-only afterwards.
pub struct RichTextSchema {
    strictness: Strictness,
    elements: HashMap<String, ElementSpec>,
    /// Derived: for every element name that occurs as a child, the set of
    /// element names it may appear under. Declared roots have no entry.
    parents: HashMap<String, HashSet<String>>,
}

impl RichTextSchema {
    /// Build a schema from element specifications.
    ///
    /// # Errors
    /// Returns [`RichTextError::SchemaDefinition`] if any declared child
    /// name is not itself registered. This is a configuration bug and must
    /// abort initialization rather than surface at runtime.
    pub fn register_all(
        strictness: Strictness,
        specs: impl IntoIterator<Item = ElementSpec>,
    ) -> Result<Self> {
        let mut elements = HashMap::new();
        for spec in specs {
            elements.insert(spec.name.clone(), spec);
        }

        let mut parents: HashMap<String, HashSet<String>> = HashMap::new();
        for spec in elements.values() {
            for child in &spec.nested_element_names {
                if !elements.contains_key(child) {
                    return Err(RichTextError::SchemaDefinition {
                        element: spec.name.clone(),
                        unknown_child: child.clone(),
                    });
                }
                parents
                    .entry(child.clone())
                    .or_default()
                    .insert(spec.name.clone());
            }
        }

        Ok(Self {
            strictness,
            elements,
            parents,
        })
    }

    /// Build the schema generation selected by `compatibility`.
    ///
    /// # Errors
    /// Propagates schema definition errors from `register_all`.
    pub fn for_compatibility(
        strictness: Strictness,
        compatibility: Compatibility,
    ) -> Result<Self> {
        let strictness = strictness.resolve(compatibility);
        match compatibility {
            Compatibility::Latest => latest_schema(strictness),
            Compatibility::Legacy => legacy_schema(strictness),
        }
    }

    /// The strictness this schema validates under.
    #[must_use]
    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Look up an element specification.
    #[must_use]
    pub fn element(&self, name: &str) -> Option<&ElementSpec> {
        self.elements.get(name)
    }

    /// Whether the element at `node` is allowed under its current parent.
    ///
    /// An element without a parent is allowed only if it is a declared root
    /// (no parent names recorded for it). An element with a parent is
    /// allowed only if the parent's name is among its recorded parents.
    #[must_use]
    pub fn is_element_allowed_at_parent(&self, frag: &Fragment, node: NodeId) -> bool {
        let Some(name) = frag.name(node) else {
            return false;
        };
        if !self.elements.contains_key(name) {
            return false;
        }
        match frag.parent(node).and_then(|p| frag.name(p)) {
            None => !self.parents.contains_key(name),
            Some(parent_name) => self
                .parents
                .get(name)
                .is_some_and(|allowed| allowed.contains(parent_name)),
        }
    }

    /// Whether the text node at `node` is allowed under its parent.
    #[must_use]
    pub fn is_text_allowed_at_parent(&self, frag: &Fragment, node: NodeId) -> bool {
        frag.parent(node)
            .and_then(|p| frag.name(p))
            .and_then(|name| self.elements.get(name))
            .is_some_and(|spec| spec.may_contain_text)
    }

    fn check_hierarchy(&self, frag: &Fragment, node: NodeId) -> HierarchyAction {
        if !self.is_element_allowed_at_parent(frag, node) {
            return HierarchyAction::ReplaceByChildren;
        }
        let may_be_empty = frag
            .name(node)
            .and_then(|name| self.elements.get(name))
            .is_none_or(|spec| spec.may_be_empty);
        if !may_be_empty && frag.is_empty_element(node) {
            return HierarchyAction::Remove;
        }
        HierarchyAction::Keep
    }

    /// Repair the attribute set of the element at `node`: strip undeclared
    /// attributes, repair or drop invalid values, apply missing-value
    /// defaults.
    pub fn adjust_attributes(&self, frag: &mut Fragment, node: NodeId) {
        let Some(spec) = frag.name(node).and_then(|n| self.elements.get(n)) else {
            return;
        };

        // Pass (a): delete attributes outside the specification.
        let declared: Vec<String> = frag
            .attributes(node)
            .iter()
            .map(|(name, _)| name.clone())
            .collect();
        for attr in &declared {
            if !spec.attributes.contains_key(attr) {
                tracing::debug!(attr = %attr, element = %spec.name, "Stripping undeclared attribute");
                frag.remove_attribute(node, attr);
            }
        }

        // Pass (b): validate remaining values.
        for (attr, attr_spec) in &spec.attributes {
            let Some(value) = frag.attribute(node, attr).map(str::to_string) else {
                continue;
            };
            if attr_spec.is_valid(&value, self.strictness) {
                continue;
            }
            match attr_spec.handle_invalid(&value, self.strictness) {
                Some(replacement) => {
                    if replacement != value {
                        tracing::debug!(
                            attr = %attr,
                            element = %spec.name,
                            "Replacing invalid attribute value"
                        );
                    }
                    frag.set_attribute(node, attr.clone(), replacement);
                }
                None => {
                    tracing::debug!(attr = %attr, element = %spec.name, "Dropping invalid attribute");
                    frag.remove_attribute(node, attr);
                }
            }
        }

        // Pass (c): defaults for declared attributes still absent.
        for (attr, attr_spec) in &spec.attributes {
            if frag.attribute(node, attr).is_none() {
                if let Some(default) = attr_spec.handle_missing() {
                    frag.set_attribute(node, attr.clone(), default);
                }
            }
        }
    }

    /// Final clean-up pass: enforce hierarchy and attribute rules over the
    /// whole fragment.
    ///
    /// Per element the ordering is fixed: hierarchy check before its
    /// children, hierarchy check again afterwards (children may have emptied
    /// it), attribute adjustment only for surviving elements.
    pub fn final_adjust(&self, frag: &mut Fragment) {
        for child in frag.children(frag.root()) {
            self.visit(frag, child);
        }
        self.adjust_attributes(frag, frag.root());
    }

    fn visit(&self, frag: &mut Fragment, node: NodeId) {
        if frag.is_text(node) {
            if !self.is_text_allowed_at_parent(frag, node) {
                tracing::debug!("Removing text node at disallowed position");
                frag.detach(node);
            }
            return;
        }

        match self.check_hierarchy(frag, node) {
            HierarchyAction::Remove => {
                frag.detach(node);
                return;
            }
            HierarchyAction::ReplaceByChildren => {
                tracing::debug!(
                    element = frag.name(node).unwrap_or(""),
                    "Promoting children of disallowed element"
                );
                let promoted = frag.children(node);
                frag.replace_by_children(node);
                for child in promoted {
                    self.visit(frag, child);
                }
                return;
            }
            HierarchyAction::Keep => {}
        }

        for child in frag.children(node) {
            self.visit(frag, child);
        }

        // Children may have emptied the element or moved out from under it.
        match self.check_hierarchy(frag, node) {
            HierarchyAction::Remove => {
                tracing::debug!(
                    element = frag.name(node).unwrap_or(""),
                    "Removing emptied element"
                );
                frag.detach(node);
                return;
            }
            HierarchyAction::ReplaceByChildren => {
                let promoted = frag.children(node);
                frag.replace_by_children(node);
                for child in promoted {
                    self.visit(frag, child);
                }
                return;
            }
            HierarchyAction::Keep => {}
        }

        self.adjust_attributes(frag, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators;

    fn tiny_schema(strictness: Strictness) -> RichTextSchema {
        RichTextSchema::register_all(
            strictness,
            [
                ElementSpec::new("div").with_children(["p", "ul"]),
                ElementSpec::new("p")
                    .with_text()
                    .with_attribute("class", AttributeSpec::any())
                    .with_attribute(
                        "xml:lang",
                        AttributeSpec::new(validators::is_language_tag),
                    ),
                ElementSpec::new("ul").with_children(["li"]).require_content(),
                ElementSpec::new("li").with_children(["p"]).with_text(),
            ],
        )
        .expect("valid schema")
    }

    #[test]
    fn test_register_all_rejects_unknown_child() {
        let result = RichTextSchema::register_all(
            Strictness::Strict,
            [ElementSpec::new("div").with_children(["ghost"])],
        );
        assert!(matches!(
            result,
            Err(RichTextError::SchemaDefinition { element, unknown_child })
                if element == "div" && unknown_child == "ghost"
        ));
    }

    #[test]
    fn test_root_allowed_only_without_recorded_parents() {
        let schema = tiny_schema(Strictness::Strict);
        let frag = Fragment::new("div");
        assert!(schema.is_element_allowed_at_parent(&frag, frag.root()));

        let orphan = Fragment::new("p");
        assert!(!schema.is_element_allowed_at_parent(&orphan, orphan.root()));
    }

    #[test]
    fn test_text_allowed_only_where_declared() {
        let schema = tiny_schema(Strictness::Strict);
        let mut frag = Fragment::new("div");
        let p = frag.new_element("p");
        frag.append_child(frag.root(), p);
        let inside_p = frag.new_text("ok");
        frag.append_child(p, inside_p);
        let inside_div = frag.new_text("stray");
        frag.append_child(frag.root(), inside_div);

        assert!(schema.is_text_allowed_at_parent(&frag, inside_p));
        assert!(!schema.is_text_allowed_at_parent(&frag, inside_div));
    }

    #[test]
    fn test_final_adjust_removes_empty_required_nonempty() {
        let schema = tiny_schema(Strictness::Strict);
        let mut frag = Fragment::new("div");
        let ul = frag.new_element("ul");
        frag.append_child(frag.root(), ul);

        schema.final_adjust(&mut frag);
        assert!(frag.is_empty_element(frag.root()));
    }

    #[test]
    fn test_final_adjust_list_with_stray_text_collapses() {
        // Text directly inside <ul> is disallowed; removing it empties the
        // list, which in turn must not be empty.
        let schema = tiny_schema(Strictness::Strict);
        let mut frag = Fragment::new("div");
        let ul = frag.new_element("ul");
        frag.append_child(frag.root(), ul);
        let text = frag.new_text("loose text");
        frag.append_child(ul, text);

        schema.final_adjust(&mut frag);
        assert!(frag.is_empty_element(frag.root()));
    }

    #[test]
    fn test_final_adjust_promotes_children_of_disallowed_element() {
        let schema = tiny_schema(Strictness::Strict);
        let mut frag = Fragment::new("div");
        // <li> is not allowed directly under <div>; its <p> child is.
        let li = frag.new_element("li");
        frag.append_child(frag.root(), li);
        let p = frag.new_element("p");
        frag.append_child(li, p);
        let text = frag.new_text("promoted");
        frag.append_child(p, text);

        schema.final_adjust(&mut frag);
        let children = frag.children(frag.root());
        assert_eq!(children, vec![p]);
        assert_eq!(frag.collect_text(frag.root()), "promoted");
    }

    #[test]
    fn test_adjust_attributes_three_passes() {
        let schema = tiny_schema(Strictness::Strict);
        let mut frag = Fragment::new("div");
        let p = frag.new_element("p");
        frag.append_child(frag.root(), p);
        frag.set_attribute(p, "class", "note");
        frag.set_attribute(p, "xml:lang", "not a language");
        frag.set_attribute(p, "onclick", "alert(1)");

        schema.adjust_attributes(&mut frag, p);
        assert_eq!(frag.attribute(p, "class"), Some("note"));
        // Invalid value with the default handler: attribute removed.
        assert_eq!(frag.attribute(p, "xml:lang"), None);
        // Undeclared attribute stripped.
        assert_eq!(frag.attribute(p, "onclick"), None);
    }

    #[test]
    fn test_legacy_strictness_keeps_invalid_values() {
        let schema = tiny_schema(Strictness::Legacy);
        let mut frag = Fragment::new("div");
        let p = frag.new_element("p");
        frag.append_child(frag.root(), p);
        frag.set_attribute(p, "xml:lang", "not a language");

        schema.adjust_attributes(&mut frag, p);
        assert_eq!(frag.attribute(p, "xml:lang"), Some("not a language"));
    }

    #[test]
    fn test_missing_attribute_default_applied() {
        let schema = RichTextSchema::register_all(
            Strictness::Strict,
            [ElementSpec::new("div").with_attribute(
                "xml:space",
                AttributeSpec::new(|v, _| v == "preserve").default_value("preserve"),
            )],
        )
        .expect("valid schema");

        let mut frag = Fragment::new("div");
        let root = frag.root();
        schema.adjust_attributes(&mut frag, root);
        assert_eq!(frag.attribute(root, "xml:space"), Some("preserve"));
    }

    #[test]
    fn test_generation_schemas_construct() {
        assert!(RichTextSchema::for_compatibility(Strictness::None, Compatibility::Latest).is_ok());
        let legacy =
            RichTextSchema::for_compatibility(Strictness::None, Compatibility::Legacy)
                .expect("legacy schema");
        // None resolves to Legacy under the legacy generation.
        assert_eq!(legacy.strictness(), Strictness::Legacy);
    }
}
