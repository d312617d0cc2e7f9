//! Bidirectional processor tying the rule engine and the schema together.

use std::sync::Arc;

use tracing::warn;

use crate::config::ProcessorConfig;
use crate::error::Result;
use crate::filter::{merge, Direction, FilterEngine, FilterRules, TextOutcome};
use crate::rules;
use crate::schema::RichTextSchema;
use crate::tree::Fragment;
use crate::{view, xml};

/// Converts between the view representation and the data dialect.
///
/// `to_view` maps data documents to view fragments; `to_data` maps view
/// fragments back, then runs the schema's final adjustment so the output
/// is always valid against the configured schema generation.
pub struct RichTextProcessor {
    config: ProcessorConfig,
    schema: Arc<RichTextSchema>,
    rules: FilterRules,
}

impl RichTextProcessor {
    /// Create a processor with the built-in rule modules.
    ///
    /// # Errors
    /// Returns `InvalidConfig` or `SchemaDefinition` when the configuration
    /// or the schema tables are inconsistent.
    pub fn new(config: ProcessorConfig) -> Result<Self> {
        Self::with_rules(config, FilterRules::default())
    }

    /// Create a processor with `custom` rules layered over the built-in
    /// modules. Custom rules run after the defaults for the same element,
    /// so they see (and may override) the defaults' outcome.
    ///
    /// # Errors
    /// Returns `InvalidConfig` or `SchemaDefinition` when the configuration
    /// or the schema tables are inconsistent.
    pub fn with_rules(config: ProcessorConfig, custom: FilterRules) -> Result<Self> {
        config.validate()?;
        let schema = Arc::new(RichTextSchema::for_compatibility(
            config.strictness,
            config.compatibility,
        )?);
        let mut rules = merge(custom, rules::defaults(config.compatibility));

        // Text placed where the schema forbids it is dropped during the
        // data-bound pass rather than left for the final adjustment.
        let text_schema = Arc::clone(&schema);
        rules
            .rule_set_mut(Direction::ToData)
            .add_text(move |frag, node| {
                if text_schema.is_text_allowed_at_parent(frag, node) {
                    TextOutcome::Keep
                } else {
                    TextOutcome::Remove
                }
            });

        Ok(Self {
            config,
            schema,
            rules,
        })
    }

    /// The configuration this processor was built with.
    #[must_use]
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Parse a data document and map it to a view fragment.
    ///
    /// Malformed input is reported and replaced by an empty fragment: the
    /// editor always gets something it can display.
    #[must_use]
    pub fn to_view(&self, data: &str) -> Fragment {
        let mut frag = match xml::parse_data(data, &self.config.entities) {
            Ok(frag) => frag,
            Err(e) => {
                warn!("unreadable document, rendering empty: {e}");
                return Fragment::new("div");
            }
        };
        FilterEngine::new(self.rules.rule_set(Direction::ToView), Direction::ToView)
            .run(&mut frag);
        frag
    }

    /// Parse a data document and render it as view markup.
    #[must_use]
    pub fn to_view_markup(&self, data: &str) -> String {
        view::serialize_view(&self.to_view(data))
    }

    /// Map a view fragment to a schema-valid data document.
    ///
    /// # Errors
    /// Currently infallible in practice; the `Result` covers future rule
    /// modules that can fail.
    pub fn to_data(&self, view: &Fragment) -> Result<String> {
        let mut frag = view.clone();
        FilterEngine::new(self.rules.rule_set(Direction::ToData), Direction::ToData)
            .run(&mut frag);
        self.schema.final_adjust(&mut frag);
        Ok(xml::serialize_data(&frag))
    }

    /// Full round trip: parse a data document, map it to the view and back.
    ///
    /// # Errors
    /// Propagates `to_data` failures.
    pub fn normalize(&self, data: &str) -> Result<String> {
        self.to_data(&self.to_view(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Compatibility, RICHTEXT_NAMESPACE, Strictness, XLINK_NAMESPACE};
    use crate::filter::{ElementContext, RuleOutcome};
    use pretty_assertions::assert_eq;

    fn processor() -> RichTextProcessor {
        RichTextProcessor::new(ProcessorConfig::default()).expect("default config is valid")
    }

    fn data_doc(body: &str) -> String {
        format!(
            "<div xmlns=\"{RICHTEXT_NAMESPACE}\" xmlns:xlink=\"{XLINK_NAMESPACE}\">{body}</div>"
        )
    }

    #[test]
    fn test_to_view_maps_marks_and_headings() {
        let p = processor();
        let markup = p.to_view_markup(&data_doc(
            "<p class=\"p--heading-2\">Title</p><p><span class=\"strike\">old</span></p>",
        ));
        assert_eq!(
            markup,
            "<div><h2>Title</h2><p><s>old</s></p></div>"
        );
    }

    #[test]
    fn test_to_view_content_link() {
        let p = processor();
        let markup =
            p.to_view_markup(&data_doc("<p><a xlink:href=\"content/42\">doc</a></p>"));
        assert_eq!(markup, "<div><p><a href=\"content:42\">doc</a></p></div>");
    }

    #[test]
    fn test_malformed_data_renders_empty() {
        let p = processor();
        assert_eq!(p.to_view_markup("<div><p></div>"), "<div></div>");
    }

    #[test]
    fn test_to_data_applies_final_adjustment() {
        let p = processor();
        // <ul> with only text collapses: text is stripped, the now-empty
        // list is removed, leaving an empty root.
        let mut frag = Fragment::new("div");
        let ul = frag.new_element("ul");
        frag.append_child(frag.root(), ul);
        let t = frag.new_text("loose");
        frag.append_child(ul, t);

        let data = p.to_data(&frag).expect("to_data");
        assert_eq!(
            data,
            format!("<div xmlns=\"{RICHTEXT_NAMESPACE}\" xmlns:xlink=\"{XLINK_NAMESPACE}\"/>")
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let p = processor();
        let input = data_doc(
            "<p class=\"p--heading-1\">T</p><p><a xlink:href=\"content/7\" xlink:show=\"new\">x</a></p>",
        );
        let once = p.normalize(&input).expect("first pass");
        let twice = p.normalize(&once).expect("second pass");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_custom_rule_runs_after_defaults() {
        let mut custom = FilterRules::default();
        custom
            .to_view
            .add_element("p", |_ctx: &mut ElementContext<'_>| {
                RuleOutcome::Rename("article-p".to_string())
            });
        let p = RichTextProcessor::with_rules(ProcessorConfig::default(), custom)
            .expect("valid config");
        let markup = p.to_view_markup(&data_doc("<p>x</p>"));
        assert_eq!(markup, "<div><article-p>x</article-p></div>");
    }

    #[test]
    fn test_legacy_compatibility_keeps_code_spans() {
        let config = ProcessorConfig {
            compatibility: Compatibility::Legacy,
            strictness: Strictness::None,
            ..ProcessorConfig::default()
        };
        let p = RichTextProcessor::new(config).expect("valid config");
        let markup = p.to_view_markup(&data_doc("<p><span class=\"code\">x</span></p>"));
        assert_eq!(markup, "<div><p><span class=\"code\">x</span></p></div>");
    }
}
