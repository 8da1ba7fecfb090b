use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{renderer::Target, translator::TranslateError};

/// What the clause parser does when LIMIT/OFFSET is not followed by a row
/// count.
///
/// - `Revert`: the clause reverts to SELECT and the token is read as a
///   select expression (`top 5 product_id` style input relies on this).
/// - `Strict`: translation fails with `TranslateError::MalformedLimit`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitPolicy {
    #[default]
    Revert,
    Strict,
}

/// Translator configuration.
///
/// - `limit_policy` selects the malformed LIMIT/OFFSET behaviour.
/// - `count_alias` is the alias given to the COUNT expression synthesized
///   by "having more than N" requests.
/// - `default_target` is used by `Translator::translate_default`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub limit_policy: LimitPolicy,
    pub count_alias: String,
    pub default_target: Target,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            limit_policy: LimitPolicy::default(),
            count_alias: "count".to_string(),
            default_target: Target::default(),
        }
    }
}

impl TranslatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration with the strict limit policy.
    pub fn strict() -> Self {
        Self { limit_policy: LimitPolicy::Strict, ..Self::default() }
    }

    /// Default configuration rendering to the given target.
    pub fn for_target(target: Target) -> Self {
        Self { default_target: target, ..Self::default() }
    }

    pub fn with_count_alias(mut self, alias: &str) -> Self {
        self.count_alias = alias.to_string();
        self
    }

    /// Read a JSON configuration file. Missing keys keep their defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, TranslateError> {
        let path = path.as_ref();
        let path_lossy = path.to_string_lossy();

        let content = fs::read_to_string(path)
            .map_err(|e| TranslateError::InvalidConfig(format!("could not read {}: {}", path_lossy, e)))?;

        let config = serde_json::from_str::<Self>(&content)
            .map_err(|e| TranslateError::InvalidConfig(format!("{} is not a valid configuration: {}", path_lossy, e)))?;

        tracing::debug!(path = %path_lossy, ?config, "loaded translator configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::{renderer::Target, translator::{LimitPolicy, TranslateError, TranslatorConfig}};

    #[test]
    pub fn test_default_config() {
        let config = TranslatorConfig::new();
        assert_eq!(config.limit_policy, LimitPolicy::Revert);
        assert_eq!(config.count_alias, "count");
        assert_eq!(config.default_target, Target::Sql);
    }

    #[test]
    pub fn test_load_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "limit_policy": "strict", "default_target": "document" }}"#).unwrap();

        let config = TranslatorConfig::load_from_file(file.path()).expect("load config");

        assert_eq!(config.limit_policy, LimitPolicy::Strict);
        assert_eq!(config.default_target, Target::Document);
        assert_eq!(config.count_alias, "count");
    }

    #[test]
    pub fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = TranslatorConfig::load_from_file(dir.path().join("missing.json"));

        assert!(matches!(result, Err(TranslateError::InvalidConfig(_))));
    }

    #[test]
    pub fn test_load_from_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "not json").unwrap();

        let result = TranslatorConfig::load_from_file(file.path());

        match result {
            Err(TranslateError::InvalidConfig(message)) => assert!(message.contains("not a valid configuration")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
