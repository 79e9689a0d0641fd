//! Unit tests for error handling
//!
//! Tests error types, conversions, and error message formatting.

#[cfg(test)]
mod tests {
    use std::io;

    use crate::errors::GuideRagError;

    // ====== Error Type Tests ======

    #[test]
    fn test_custom_error() {
        let error = GuideRagError::Custom("Test error message".to_string());
        assert_eq!(format!("{error}"), "Test error message");
    }

    #[test]
    fn test_config_error() {
        let error = GuideRagError::ConfigError("Invalid configuration".to_string());
        assert!(matches!(error, GuideRagError::ConfigError(_)));
        assert!(format!("{error}").contains("configuration"));
    }

    #[test]
    fn test_invalid_input_is_not_collaborator_failure() {
        let error = GuideRagError::InvalidInput("query cannot be empty".to_string());
        assert!(!error.is_collaborator_failure());
        assert!(format!("{error}").starts_with("Invalid input"));
    }

    #[test]
    fn test_collaborator_failures() {
        let errors = vec![
            GuideRagError::EmbeddingError("model offline".to_string()),
            GuideRagError::VectorStoreError("index unreachable".to_string()),
            GuideRagError::LlmError("503".to_string()),
            GuideRagError::Timeout("answer generation".to_string()),
            GuideRagError::HttpError("connection refused".to_string()),
        ];

        for error in &errors {
            assert!(error.is_collaborator_failure(), "{error:?}");
        }
    }

    // ====== Error Conversion Tests ======

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let err: GuideRagError = io_err.into();

        match err {
            GuideRagError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("Expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let err: GuideRagError = json_err.into();
        assert!(matches!(err, GuideRagError::Serialization(_)));
    }

    #[test]
    fn test_error_from_toml() {
        let toml_err = toml::from_str::<toml::Value>("key = = 1").unwrap_err();
        let err: GuideRagError = toml_err.into();
        assert!(matches!(err, GuideRagError::TomlParsing(_)));
    }

    // ====== Result Type Tests ======

    #[test]
    fn test_result_and_then() {
        let result: crate::Result<i32> = Ok(42);
        let chained = result.and_then(|v| {
            if v > 40 {
                Ok(v + 10)
            } else {
                Err(GuideRagError::Custom("Too small".to_string()))
            }
        });
        assert_eq!(chained.unwrap(), 52);
    }
}
