//! Configuration types and constants for the processor.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, RichTextError};

/// RichText namespace declared on every data-side root element.
pub const RICHTEXT_NAMESPACE: &str = "http://www.coremedia.com/2003/richtext-1.0";

/// XLink namespace declared on every data-side root element.
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// Largest content ID accepted by the content-link parser.
///
/// Bounded to 2^53 - 1 so IDs stay exact for hosts that index content
/// through double-precision numbers.
pub const MAX_CONTENT_ID: u64 = 9_007_199_254_740_991;

/// Fixed `src` marker carried by every image on the view side.
///
/// The editor never loads image data through the processor; it resolves the
/// `data-xlink-href` reference itself and only needs a well-formed
/// placeholder to render the element at all.
pub const IMAGE_PLACEHOLDER_SRC: &str =
    "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// How aggressively invalid attribute values are repaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Full value validation; invalid values go through the repair handler.
    #[default]
    Strict,
    /// Any non-empty value is accepted.
    Loose,
    /// Everything is accepted, including empty values.
    Legacy,
    /// No preference. Resolves to `Legacy` under the legacy schema
    /// generation and to `Loose` under the latest one.
    None,
}

impl Strictness {
    /// Resolve `Strictness::None` against the selected schema generation.
    #[must_use]
    pub fn resolve(self, compatibility: Compatibility) -> Strictness {
        match (self, compatibility) {
            (Strictness::None, Compatibility::Legacy) => Strictness::Legacy,
            (Strictness::None, Compatibility::Latest) => Strictness::Loose,
            (other, _) => other,
        }
    }
}

/// Which schema/rule-module generation a processor instance runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Compatibility {
    /// Current schema generation.
    #[default]
    Latest,
    /// Previous schema generation kept for stored documents.
    Legacy,
}

/// Processor configuration, read once at construction.
///
/// The `entities` map declares custom named entities that may appear in
/// data-side documents; they are expanded before XML parsing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProcessorConfig {
    /// Invalid-attribute-value handling level.
    #[serde(default)]
    pub strictness: Strictness,

    /// Schema generation selector.
    #[serde(default)]
    pub compatibility: Compatibility,

    /// Custom named entities (name without `&`/`;` to replacement text).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub entities: BTreeMap<String, String>,
}

impl ProcessorConfig {
    /// Validate entity names: XML name start character followed by name
    /// characters, no markup.
    ///
    /// # Errors
    /// Returns `InvalidConfig` for an unusable entity name.
    pub fn validate(&self) -> Result<()> {
        for name in self.entities.keys() {
            let mut chars = name.chars();
            let valid_start = chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
            let valid_rest =
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
            if !valid_start || !valid_rest {
                return Err(RichTextError::InvalidConfig(format!(
                    "invalid entity name '{name}'"
                )));
            }
        }
        Ok(())
    }
}
