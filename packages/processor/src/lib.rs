//! RichText Processor - Convert between editor markup and the RichText dialect.
//!
//! This crate converts documents bidirectionally between an editor's
//! HTML-like view representation and the constrained, namespaced RichText
//! XML dialect, validating and repairing the result against a pluggable
//! schema.
//!
//! # Example
//!
//! ```
//! use richtext_processor::{ProcessorConfig, RichTextProcessor};
//!
//! let processor = RichTextProcessor::new(ProcessorConfig::default()).unwrap();
//! let markup = processor.to_view_markup(
//!     "<div xmlns=\"http://www.coremedia.com/2003/richtext-1.0\">\
//!      <p class=\"p--heading-1\">Title</p></div>",
//! );
//! assert_eq!(markup, "<div><h1>Title</h1></div>");
//! ```
//!
//! # Architecture
//!
//! The processor is organized into several modules:
//!
//! - [`config`]: Configuration, strictness and compatibility settings
//! - [`error`]: Error types and Result alias
//! - [`tree`]: Owned mutable document fragments
//! - [`validators`]: Attribute value validators
//! - [`schema`]: Element/attribute schema and final adjustment
//! - [`filter`]: Direction-aware filter rule engine
//! - [`rules`]: Built-in mapping rule modules
//! - [`xml`]: Data-side parsing and serialization
//! - [`view`]: View-side markup serialization
//! - [`processor`]: Main processor service
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod processor;
pub mod rules;
pub mod schema;
pub mod tree;
pub mod validators;
pub mod view;
pub mod xml;

// Re-export the main service
pub use processor::RichTextProcessor;

// Re-export commonly used items
pub use config::{Compatibility, ProcessorConfig, Strictness};
pub use error::{Result, RichTextError};
pub use filter::{Direction, FilterRules, RuleOutcome};
pub use tree::{Fragment, NodeId};
