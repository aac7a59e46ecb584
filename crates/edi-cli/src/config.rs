//! YAML configuration file for the `edi` binary

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Top-level configuration file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default)]
    pub comparison: ComparisonSettings,
}

/// `comparison:` section; unset keys leave the rule set's own config alone
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComparisonSettings {
    pub case_sensitive: Option<bool>,
    pub ignore_trailing_whitespace: Option<bool>,
    pub fail_on_first_error: Option<bool>,
    pub detect_unexpected_segments: Option<bool>,
    pub validate_segment_order: Option<bool>,
    #[serde(default)]
    pub extra: BTreeMap<String, Value>,
}

impl CliConfig {
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }
}

impl ComparisonSettings {
    /// Entries to layer over the rule set's config, extras first
    pub fn entries(&self) -> Vec<(String, Value)> {
        let flags = [
            (edi_comparison::context::CASE_SENSITIVE, self.case_sensitive),
            (
                edi_comparison::context::IGNORE_TRAILING_WHITESPACE,
                self.ignore_trailing_whitespace,
            ),
            (edi_comparison::context::FAIL_ON_FIRST_ERROR, self.fail_on_first_error),
            (
                edi_comparison::context::DETECT_UNEXPECTED_SEGMENTS,
                self.detect_unexpected_segments,
            ),
            (
                edi_comparison::context::VALIDATE_SEGMENT_ORDER,
                self.validate_segment_order,
            ),
        ];

        let mut entries: Vec<(String, Value)> = self
            .extra
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.extend(
            flags
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key.to_string(), Value::Bool(v)))),
        );
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_set_flags_are_emitted() {
        let config = CliConfig::from_yaml(
            "comparison:\n  case_sensitive: false\n  extra:\n    owner: ACME\n",
        )
        .unwrap();
        let entries = config.comparison.entries();

        assert_eq!(entries.len(), 2);
        assert!(entries.contains(&("case_sensitive".to_string(), Value::Bool(false))));
        assert!(entries.contains(&("owner".to_string(), Value::String("ACME".into()))));
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = CliConfig::from_yaml("  \n").unwrap();
        assert!(config.comparison.entries().is_empty());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(CliConfig::from_yaml("color: neon").is_err());
        assert!(CliConfig::from_yaml("comparison:\n  strictness: high\n").is_err());
    }
}
