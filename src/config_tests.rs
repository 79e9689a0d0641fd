//! Unit tests for configuration module
//!
//! These tests validate configuration parsing, defaults, and validation.

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::config::*;
    use crate::errors::GuideRagError;

    // ====== Default Value Tests ======

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();

        assert_eq!(config.embedding_dimension(), 384);
        assert!(!config.embedding_model().is_empty());
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.memory.max_conversation_turns, 6);
        assert_eq!(config.memory.recent_turns_with_summary, 4);
        assert_eq!(config.llm_timeout().as_secs(), 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retrieval_defaults() {
        let config = RetrievalConfig::default();

        assert!((config.similarity_threshold - 0.30).abs() < f32::EPSILON);
        assert!((config.duplicate_threshold - 0.85).abs() < f32::EPSILON);
        assert_eq!(config.diversity_threshold, 2);
        assert!((config.high_confidence - 0.78).abs() < f32::EPSILON);
        assert!((config.medium_confidence - 0.68).abs() < f32::EPSILON);
    }

    #[test]
    fn test_llm_defaults() {
        let config = LlmConfig::default();

        assert!((config.temperature - default_llm_temperature()).abs() < f32::EPSILON);
        assert_eq!(config.max_tokens, 1200);
        assert!((config.summary_temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.summary_max_tokens, 300);
    }

    // ====== Parsing Tests ======

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
[llm]
provider = "openai"
endpoint = "https://api.openai.com/v1"
api_key = "sk-test"
model = "gpt-4o-mini"

[retrieval]
top_k = 8
"#,
        )
        .unwrap();

        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.retrieval.top_k, 8);
        assert_eq!(config.retrieval.diversity_threshold, 2);
        assert_eq!(config.ingest.chunk_size, 500);
        assert_eq!(config.vector_store.snapshot_path, "data/index.json");
    }

    #[test]
    fn test_empty_toml_is_valid() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.memory.session_ttl_hours, 24);
        assert_eq!(config.session_ttl().as_secs(), 24 * 3600);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[memory]\nmax_conversation_turns = 10").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.memory.max_conversation_turns, 10);
    }

    #[test]
    fn test_malformed_toml() {
        let err = AppConfig::from_toml_str("[retrieval\ntop_k = 3").unwrap_err();
        assert!(matches!(err, GuideRagError::TomlParsing(_)));
    }

    // ====== Validation Tests ======

    #[test]
    fn test_zero_top_k_rejected() {
        let err = AppConfig::from_toml_str("[retrieval]\ntop_k = 0").unwrap_err();
        assert!(matches!(err, GuideRagError::ConfigError(_)));
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let mut config = AppConfig::default();
        config.retrieval.duplicate_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_confidence_bands_rejected() {
        let mut config = AppConfig::default();
        config.retrieval.medium_confidence = 0.9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk() {
        let mut config = AppConfig::default();
        config.ingest.chunk_overlap = config.ingest.chunk_size;
        assert!(config.validate().is_err());
    }
}
