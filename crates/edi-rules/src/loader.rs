//! Rule-definition loader
//!
//! Reads YAML or JSON rule files into a validated [`RuleSet`]. Source
//! references are carried through as text and never resolved here.

use crate::model::{ComparisonRule, FieldRule, RuleSet, ValidationType};
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, trace};

/// Serializable rule-set format for loading from files
#[derive(Debug, Deserialize)]
struct RuleSetFile {
    #[serde(default)]
    message_type: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    rules: Vec<RuleFile>,
    #[serde(default)]
    config: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    segment: Option<String>,
    #[serde(default = "default_true")]
    required: bool,
    #[serde(default)]
    multiple_occurrences: bool,
    #[serde(default)]
    order_matters: bool,
    #[serde(default)]
    expected_count: Option<usize>,
    #[serde(default)]
    fields: Vec<FieldRuleFile>,
}

#[derive(Debug, Deserialize)]
struct FieldRuleFile {
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    validation: Option<String>,
    #[serde(default)]
    expected_value: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default)]
    date_format_field: Option<String>,
    #[serde(default)]
    custom_validator: Option<String>,
    #[serde(default = "default_true")]
    required: bool,
}

fn default_true() -> bool {
    true
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Loads and shape-checks rule definitions
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleLoader;

impl RuleLoader {
    /// Create a new rule loader
    pub fn new() -> Self {
        Self
    }

    /// Load a rule set from a file; `.json` files are read as JSON,
    /// everything else as YAML
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the file does not exist, [`Error::Io`]
    /// when it cannot be read, and the errors of [`Self::load_from_yaml`] /
    /// [`Self::load_from_json`] for its content.
    pub fn load_from_file(&self, path: &Path) -> Result<RuleSet> {
        if !path.exists() {
            return Err(Error::NotFound(path.display().to_string()));
        }

        trace!("Loading rules from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let rule_set = if is_json {
            self.load_from_json(&content)?
        } else {
            self.load_from_yaml(&content)?
        };

        info!(
            path = %path.display(),
            rules = rule_set.rule_count(),
            "Loaded rule set"
        );
        Ok(rule_set)
    }

    /// Load a rule set from YAML text
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] for empty or malformed YAML and
    /// [`Error::Validation`] when the rule tree has the wrong shape.
    pub fn load_from_yaml(&self, yaml: &str) -> Result<RuleSet> {
        if yaml.trim().is_empty() {
            return Err(Error::InvalidFormat("rule content is empty".to_string()));
        }
        let file: RuleSetFile = serde_yaml::from_str(yaml)
            .map_err(|e| Error::InvalidFormat(format!("YAML parse error: {e}")))?;
        Self::convert(file)
    }

    /// Load a rule set from JSON text
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] for malformed JSON and
    /// [`Error::Validation`] when the rule tree has the wrong shape.
    pub fn load_from_json(&self, json: &str) -> Result<RuleSet> {
        let file: RuleSetFile = serde_json::from_str(json)
            .map_err(|e| Error::InvalidFormat(format!("JSON parse error: {e}")))?;
        Self::convert(file)
    }

    fn convert(file: RuleSetFile) -> Result<RuleSet> {
        if file.rules.is_empty() {
            return Err(Error::Validation(
                "RuleSet must contain at least one rule".to_string(),
            ));
        }

        let mut rules = Vec::with_capacity(file.rules.len());
        for (i, rule) in file.rules.into_iter().enumerate() {
            let Some(segment) = non_blank(rule.segment) else {
                return Err(Error::Validation(format!(
                    "Rule at index {i} must specify a segment"
                )));
            };

            let mut fields = Vec::with_capacity(rule.fields.len());
            for (j, field) in rule.fields.into_iter().enumerate() {
                let Some(position) = non_blank(field.position) else {
                    return Err(Error::Validation(format!(
                        "Field rule at index {j} in segment {segment} must specify a position"
                    )));
                };

                fields.push(FieldRule {
                    position,
                    name: field.name,
                    validation: field
                        .validation
                        .as_deref()
                        .map(ValidationType::parse_lenient)
                        .unwrap_or_default(),
                    expected_value: field.expected_value,
                    source: field.source,
                    pattern: field.pattern,
                    date_format_field: field.date_format_field,
                    custom_validator: field.custom_validator,
                    required: field.required,
                });
            }

            debug!(segment = %segment, fields = fields.len(), "Converted rule");
            rules.push(ComparisonRule {
                segment,
                required: rule.required,
                multiple_occurrences: rule.multiple_occurrences,
                order_matters: rule.order_matters,
                expected_count: rule.expected_count,
                fields,
            });
        }

        Ok(RuleSet {
            message_type: file.message_type,
            description: file.description,
            rules,
            config: file.config,
        })
    }
}
