use std::sync::Arc;

use crate::{
    ir::{Normalizer, QueryIr},
    parser::{ClauseParser, Lexer},
    renderer::{DocumentQuery, PipelineRenderer, QueryArtifact, Renderer, SqlRenderer, Target},
    translator::{ActiveSource, NoActiveSource, TranslateError, TranslatorConfig},
};

/// Natural-language request to SQL text or aggregation pipeline.
///
/// Holds no per-request state: every call lexes, parses, normalizes and
/// renders from scratch, so one translator can serve concurrent callers.
/// The only shared input is the active source, read once per call.
#[derive(Clone)]
pub struct Translator {
    config: TranslatorConfig,
    active_source: Arc<dyn ActiveSource>,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(TranslatorConfig::default(), Arc::new(NoActiveSource))
    }
}

impl Translator {
    pub fn new(config: TranslatorConfig, active_source: Arc<dyn ActiveSource>) -> Self {
        Self { config, active_source }
    }

    /// Default configuration reading the given active source.
    pub fn with_active_source(active_source: impl ActiveSource + 'static) -> Self {
        Self::new(TranslatorConfig::default(), Arc::new(active_source))
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Lex, parse and normalize `text`.
    pub fn build_ir(&self, text: &str) -> Result<QueryIr, TranslateError> {
        let tokens = Lexer::new(text).tokenize();
        let raw = ClauseParser::new(tokens, &self.config).parse()?;
        Normalizer::normalize(raw, self.active_source.as_ref())
    }

    pub fn translate(&self, text: &str, target: Target) -> Result<QueryArtifact, TranslateError> {
        tracing::debug!(%target, text, "translating request");

        let ir = self.build_ir(text)?;
        let artifact = match target {
            Target::Sql => QueryArtifact::Sql(SqlRenderer.render(&ir)),
            Target::Document => QueryArtifact::Pipeline(PipelineRenderer.render(&ir)),
        };

        tracing::debug!(%target, query = %artifact, "translated request");
        Ok(artifact)
    }

    /// Translate for the configured default target.
    pub fn translate_default(&self, text: &str) -> Result<QueryArtifact, TranslateError> {
        self.translate(text, self.config.default_target)
    }

    pub fn translate_sql(&self, text: &str) -> Result<String, TranslateError> {
        let ir = self.build_ir(text)?;
        Ok(SqlRenderer.render(&ir))
    }

    pub fn translate_pipeline(&self, text: &str) -> Result<DocumentQuery, TranslateError> {
        let ir = self.build_ir(text)?;
        Ok(PipelineRenderer.render(&ir))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        renderer::{QueryArtifact, Target},
        translator::{SharedActiveSource, TranslateError, Translator, TranslatorConfig},
    };

    #[test]
    pub fn test_default_translator_needs_a_named_source() {
        let translator = Translator::default();
        assert_eq!(translator.translate_sql("show name"), Err(TranslateError::UnresolvedSource));
        assert_eq!(translator.translate_sql("show name from people").as_deref(), Ok("SELECT name FROM people"));
    }

    #[test]
    pub fn test_translate_default_uses_configured_target() {
        let config = TranslatorConfig::for_target(Target::Document);
        let translator = Translator::new(config, Arc::new(Some("orders".to_string())));

        let artifact = translator.translate_default("show count").expect("translate");
        assert_eq!(artifact.target(), Target::Document);
        assert_eq!(artifact.as_pipeline().map(|q| q.collection.as_str()), Some("orders"));
    }

    #[test]
    pub fn test_translate_reads_source_per_call() {
        let source = SharedActiveSource::new();
        let translator = Translator::with_active_source(source.clone());
        assert!(translator.translate("show name", Target::Sql).is_err());

        source.set("first_upload");
        assert_eq!(
            translator.translate("show name", Target::Sql),
            Ok(QueryArtifact::Sql("SELECT name FROM first_upload".to_string()))
        );

        source.set("second_upload");
        assert_eq!(translator.translate_sql("show name").as_deref(), Ok("SELECT name FROM second_upload"));
    }

    #[test]
    pub fn test_strict_policy_surfaces_malformed_limit() {
        let translator = Translator::new(TranslatorConfig::strict(), Arc::new(Some("t".to_string())));
        let result = translator.translate_sql("show name limit lots");
        assert!(matches!(result, Err(TranslateError::MalformedLimit { .. })));
    }
}
