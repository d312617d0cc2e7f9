//! Error types for the processor.
//!
//! Only configuration-time problems and unparseable input surface as errors.
//! Structural or attribute violations found while filtering are repaired
//! locally and reported through `tracing` diagnostics instead.

use thiserror::Error;

/// Main error type for the processor library.
#[derive(Debug, Error)]
pub enum RichTextError {
    /// Schema definition references an element that was never registered.
    /// This is a configuration bug and aborts processor construction.
    #[error("Schema definition error: element <{element}> declares unknown child <{unknown_child}>")]
    SchemaDefinition {
        element: String,
        unknown_child: String,
    },

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// Parsed document has no usable root element.
    #[error("Document has no root <div> element")]
    MissingRoot,

    /// Invalid processor configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A `check` run found a document that normalization would change.
    #[error("Document is not normalized: {0}")]
    NotNormalized(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be read as YAML.
    #[error("Configuration parsing failed: {0}")]
    ConfigParse(#[from] serde_yaml_ng::Error),
}

/// Result type alias for processor operations.
pub type Result<T> = std::result::Result<T, RichTextError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_definition_display() {
        let err = RichTextError::SchemaDefinition {
            element: "p".to_string(),
            unknown_child: "widget".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Schema definition error: element <p> declares unknown child <widget>"
        );
    }

    #[test]
    fn test_invalid_config_display() {
        let err = RichTextError::InvalidConfig("strictness 'SOMETIMES'".to_string());
        assert!(err.to_string().contains("SOMETIMES"));
    }
}
