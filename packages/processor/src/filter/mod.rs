//! Generic direction-aware filter rule engine.
//!
//! Rules are keyed by element local name and return a [`RuleOutcome`] that
//! the engine commits after the rule returns. Structural intents are never
//! observed mid-pass by sibling rules; a rename or node replacement
//! restarts processing of the same node under its new identity, which lets
//! independently authored rule modules compose without manual ordering
//! (e.g. `<del>` → `<span class="strike">` in one module, `<span
//! class="strike">` → `<s>` in another).

mod merge;

pub use merge::merge;

use std::collections::HashMap;
use std::sync::Arc;

use crate::tree::{Fragment, NodeId};

/// Transformation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// View representation to data XML.
    ToData,
    /// Data XML to view representation.
    ToView,
}

/// Structural decision returned by an element rule, committed by the engine.
pub enum RuleOutcome {
    /// Leave the node in place (attribute edits already applied through the
    /// context are kept).
    Keep,
    /// Rename the element and restart rule processing under the new name.
    Rename(String),
    /// Delete the node and its whole subtree.
    Remove,
    /// Delete the element but promote its children into its position.
    ReplaceByChildren,
    /// Replace the node with a newly built fragment; processing restarts at
    /// the replacement.
    ReplaceWith(Fragment),
}

/// Decision returned by a text rule. Text nodes can only be kept or
/// removed; renaming and replacement do not apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOutcome {
    Keep,
    Remove,
}

/// Pass-scoped view of one element handed to a rule.
///
/// Wraps the tree node for the duration of a single rule invocation;
/// structural changes go through the returned [`RuleOutcome`], attribute
/// and name inspection plus attribute edits happen here.
pub struct ElementContext<'a> {
    frag: &'a mut Fragment,
    node: NodeId,
    direction: Direction,
}

impl<'a> ElementContext<'a> {
    fn new(frag: &'a mut Fragment, node: NodeId, direction: Direction) -> Self {
        Self {
            frag,
            node,
            direction,
        }
    }

    /// Direction of the running pass.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Element local name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.frag.name(self.node).unwrap_or_default()
    }

    /// Attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.frag.attribute(self.node, name)
    }

    /// Ordered attribute list.
    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        self.frag.attributes(self.node)
    }

    /// Set or overwrite an attribute.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.frag.set_attribute(self.node, name, value);
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.frag.remove_attribute(self.node, name)
    }

    /// Name of the parent element, if any.
    #[must_use]
    pub fn parent_name(&self) -> Option<&str> {
        self.frag.parent(self.node).and_then(|p| self.frag.name(p))
    }

    /// Whether the element has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frag.is_empty_element(self.node)
    }

    /// Whether a child element with the given name exists.
    #[must_use]
    pub fn has_child_element(&self, name: &str) -> bool {
        self.frag.has_child_element(self.node, name)
    }

    /// Number of child nodes.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.frag.children(self.node).len()
    }

    /// The wrapped node id.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Direct tree access for rules that need to restructure children
    /// (e.g. wrapping stray table rows). Structural changes to the node
    /// itself still go through the returned [`RuleOutcome`].
    pub fn fragment_mut(&mut self) -> &mut Fragment {
        self.frag
    }
}

/// Rule applied to elements.
pub type ElementRule = Arc<dyn Fn(&mut ElementContext<'_>) -> RuleOutcome + Send + Sync>;

/// Rule applied to text nodes (the node's parent is reachable through the
/// fragment).
pub type TextRule = Arc<dyn Fn(&Fragment, NodeId) -> TextOutcome + Send + Sync>;

/// Rule set for one direction.
#[derive(Default, Clone)]
pub struct FilterRuleSet {
    /// Named rules keyed by element local name.
    elements: HashMap<String, Vec<ElementRule>>,
    /// Generic hook run before a node's named rules and children (`$`).
    generic_before: Vec<ElementRule>,
    /// Generic hook run after a node's children (`$$`).
    generic_after: Vec<ElementRule>,
    /// Text node rules.
    text: Vec<TextRule>,
}

impl FilterRuleSet {
    /// Register a named rule for an element.
    pub fn add_element(
        &mut self,
        name: impl Into<String>,
        rule: impl Fn(&mut ElementContext<'_>) -> RuleOutcome + Send + Sync + 'static,
    ) {
        self.elements
            .entry(name.into())
            .or_default()
            .push(Arc::new(rule));
    }

    /// Register a generic before-children hook (`$`).
    pub fn add_generic_before(
        &mut self,
        rule: impl Fn(&mut ElementContext<'_>) -> RuleOutcome + Send + Sync + 'static,
    ) {
        self.generic_before.push(Arc::new(rule));
    }

    /// Register a generic after-children hook (`$$`).
    pub fn add_generic_after(
        &mut self,
        rule: impl Fn(&mut ElementContext<'_>) -> RuleOutcome + Send + Sync + 'static,
    ) {
        self.generic_after.push(Arc::new(rule));
    }

    /// Register a text rule.
    pub fn add_text(
        &mut self,
        rule: impl Fn(&Fragment, NodeId) -> TextOutcome + Send + Sync + 'static,
    ) {
        self.text.push(Arc::new(rule));
    }

    /// Whether a named rule exists for `name`.
    #[must_use]
    pub fn has_element(&self, name: &str) -> bool {
        self.elements.contains_key(name)
    }
}

/// Rule sets for both directions.
#[derive(Default, Clone)]
pub struct FilterRules {
    pub to_data: FilterRuleSet,
    pub to_view: FilterRuleSet,
}

impl FilterRules {
    /// Rule set for `direction`.
    #[must_use]
    pub fn rule_set(&self, direction: Direction) -> &FilterRuleSet {
        match direction {
            Direction::ToData => &self.to_data,
            Direction::ToView => &self.to_view,
        }
    }

    /// Mutable rule set for `direction`.
    pub fn rule_set_mut(&mut self, direction: Direction) -> &mut FilterRuleSet {
        match direction {
            Direction::ToData => &mut self.to_data,
            Direction::ToView => &mut self.to_view,
        }
    }
}

/// Cap on rename/replacement restarts per node. Legitimate mark
/// compositions need two or three; hitting the cap means two rules toggle
/// between names, which is a rule-module misconfiguration.
const MAX_RESTARTS: usize = 16;

enum Flow {
    /// Continue with the next rule in the chain.
    Next,
    /// Restart the whole state machine at `NodeId`.
    Restart(NodeId),
    /// Node was removed or dissolved; processing of it is finished.
    Done,
}

/// Tree walker applying one direction's rule set.
pub struct FilterEngine<'a> {
    rules: &'a FilterRuleSet,
    direction: Direction,
}

impl<'a> FilterEngine<'a> {
    /// Create an engine over `rules` for `direction`.
    #[must_use]
    pub fn new(rules: &'a FilterRuleSet, direction: Direction) -> Self {
        Self { rules, direction }
    }

    /// Run the rule set over the whole fragment, root included.
    pub fn run(&self, frag: &mut Fragment) {
        let root = frag.root();
        self.process(frag, root);
    }

    /// State machine for one node.
    fn process(&self, frag: &mut Fragment, node: NodeId) {
        if frag.is_text(node) {
            for rule in &self.rules.text {
                if rule(frag, node) == TextOutcome::Remove {
                    frag.detach(node);
                    return;
                }
            }
            return;
        }

        let mut current = node;
        let mut restarts = 0usize;
        let mut last_rename: Option<String> = None;

        'restart: loop {
            let Some(name) = frag.name(current).map(str::to_string) else {
                return;
            };

            // Generic `$` hook, then the named rules, before children.
            let named = self.rules.elements.get(&name).cloned().unwrap_or_default();
            let pre_chain: Vec<ElementRule> = self
                .rules
                .generic_before
                .iter()
                .chain(named.iter())
                .cloned()
                .collect();
            for rule in &pre_chain {
                let outcome = rule(&mut ElementContext::new(frag, current, self.direction));
                match self.commit(frag, current, &name, outcome, &mut last_rename, true) {
                    Flow::Next => {}
                    Flow::Done => return,
                    Flow::Restart(next) => {
                        current = next;
                        restarts += 1;
                        if restarts > MAX_RESTARTS {
                            tracing::warn!(
                                element = %name,
                                "Rename/replace restart limit reached; rule modules toggle between names"
                            );
                            return;
                        }
                        continue 'restart;
                    }
                }
            }

            // Depth-first, pre-order: children observe the committed parent
            // state. Siblings cannot detach each other, so the snapshot
            // stays valid.
            for child in frag.children(current) {
                self.process(frag, child);
            }

            // Generic `$$` hook after the children.
            let post_chain = self.rules.generic_after.clone();
            for rule in &post_chain {
                let outcome = rule(&mut ElementContext::new(frag, current, self.direction));
                match self.commit(frag, current, &name, outcome, &mut last_rename, false) {
                    Flow::Next => {}
                    Flow::Done => return,
                    Flow::Restart(next) => {
                        current = next;
                        restarts += 1;
                        if restarts > MAX_RESTARTS {
                            tracing::warn!(
                                element = %name,
                                "Rename/replace restart limit reached; rule modules toggle between names"
                            );
                            return;
                        }
                        continue 'restart;
                    }
                }
            }

            return;
        }
    }

    /// Commit a rule outcome. `children_pending` distinguishes the
    /// pre-children chain (promoted children still need processing) from
    /// the post-children chain.
    fn commit(
        &self,
        frag: &mut Fragment,
        node: NodeId,
        keyed_name: &str,
        outcome: RuleOutcome,
        last_rename: &mut Option<String>,
        children_pending: bool,
    ) -> Flow {
        let is_root = frag.parent(node).is_none();
        match outcome {
            RuleOutcome::Keep => Flow::Next,
            RuleOutcome::Rename(new_name) => {
                if let Some(prev) = last_rename.as_deref() {
                    if prev != new_name && new_name != keyed_name {
                        tracing::warn!(
                            keyed = %keyed_name,
                            previous = %prev,
                            new = %new_name,
                            "Conflicting renames within one pass; last writer wins"
                        );
                    }
                }
                frag.set_name(node, new_name.clone());
                *last_rename = Some(new_name);
                Flow::Restart(node)
            }
            RuleOutcome::Remove => {
                if is_root {
                    tracing::debug!("Ignoring Remove outcome on fragment root");
                    return Flow::Next;
                }
                frag.detach(node);
                Flow::Done
            }
            RuleOutcome::ReplaceByChildren => {
                if is_root {
                    tracing::debug!("Ignoring ReplaceByChildren outcome on fragment root");
                    return Flow::Next;
                }
                let promoted = frag.children(node);
                frag.replace_by_children(node);
                if children_pending {
                    for child in promoted {
                        self.process(frag, child);
                    }
                }
                Flow::Done
            }
            RuleOutcome::ReplaceWith(replacement) => {
                if is_root {
                    tracing::debug!("Ignoring ReplaceWith outcome on fragment root");
                    return Flow::Next;
                }
                let copy = frag.graft(&replacement, replacement.root());
                frag.replace_with(node, copy);
                Flow::Restart(copy)
            }
        }
    }
}
