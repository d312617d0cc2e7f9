//! Legacy-generation RichText schema.
//!
//! Kept for documents stored before the latest grammar revision. Identical
//! to the latest generation except that the `dir` attribute does not exist
//! yet; strictness `None` resolves to `Legacy` here (see
//! [`crate::config::Strictness::resolve`]).

use super::latest::base_specs;
use super::RichTextSchema;
use crate::config::Strictness;
use crate::error::Result;

/// Build the legacy-generation schema.
///
/// # Errors
/// Propagates schema definition errors (none expected for the built-in
/// tables; covered by tests).
pub fn legacy_schema(strictness: Strictness) -> Result<RichTextSchema> {
    RichTextSchema::register_all(strictness, base_specs(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_schema_is_well_formed() {
        let schema = legacy_schema(Strictness::Legacy).expect("built-in schema is valid");
        assert!(schema.element("div").is_some());
    }

    #[test]
    fn test_legacy_has_no_dir_attribute() {
        let schema = legacy_schema(Strictness::Legacy).expect("built-in schema is valid");
        let p = schema.element("p").expect("p registered");
        assert!(!p.attributes.contains_key("dir"));
        assert!(p.attributes.contains_key("xml:lang"));
    }
}
