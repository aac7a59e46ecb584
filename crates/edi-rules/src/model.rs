//! Rule model definitions
//!
//! Pure data: the loader builds these, the comparison engine reads them.

use serde::Serialize;
use std::collections::BTreeMap;

/// How a present field's value is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationType {
    /// String equality against a literal or resolved source value
    #[default]
    ExactMatch,
    /// Full-string regex match against `pattern`
    PatternMatch,
    /// Digit-count check driven by a sibling format-code field
    DateFormat,
    /// Presence only
    Exists,
    /// Delegated to a named external validator
    Custom,
}

impl ValidationType {
    /// Lenient parse as rule files spell it (`exact`, `PATTERN_MATCH`, `regex`, ...).
    /// Unrecognised text falls back to [`ValidationType::ExactMatch`].
    pub fn parse_lenient(value: &str) -> Self {
        let normalized: String = value
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "patternmatch" | "pattern" | "regex" => Self::PatternMatch,
            "dateformat" | "date" => Self::DateFormat,
            "exists" => Self::Exists,
            "custom" => Self::Custom,
            _ => Self::ExactMatch,
        }
    }
}

/// Expectation for a single field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldRule {
    /// Exact field position within the segment (e.g. `BGM.0001`)
    pub position: String,
    pub name: Option<String>,
    pub validation: ValidationType,
    /// Literal expected value
    pub expected_value: Option<String>,
    /// Dynamic expected value reference, resolved per comparison
    pub source: Option<String>,
    pub pattern: Option<String>,
    /// Sibling field holding the date format code (`102`, `103`)
    pub date_format_field: Option<String>,
    /// Registered name of the validator used for [`ValidationType::Custom`]
    pub custom_validator: Option<String>,
    pub required: bool,
}

impl FieldRule {
    /// New required rule for `position`
    pub fn new(position: impl Into<String>, validation: ValidationType) -> Self {
        Self {
            position: position.into(),
            name: None,
            validation,
            expected_value: None,
            source: None,
            pattern: None,
            date_format_field: None,
            custom_validator: None,
            required: true,
        }
    }

    /// Exact match against a literal value
    pub fn exact(position: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::new(position, ValidationType::ExactMatch).with_expected_value(expected)
    }

    /// Presence check
    pub fn exists(position: impl Into<String>) -> Self {
        Self::new(position, ValidationType::Exists)
    }

    /// Full-string regex match
    pub fn pattern(position: impl Into<String>, pattern: impl Into<String>) -> Self {
        let mut rule = Self::new(position, ValidationType::PatternMatch);
        rule.pattern = Some(pattern.into());
        rule
    }

    /// Date check driven by the format code held in `format_field`
    pub fn date(position: impl Into<String>, format_field: impl Into<String>) -> Self {
        let mut rule = Self::new(position, ValidationType::DateFormat);
        rule.date_format_field = Some(format_field.into());
        rule
    }

    /// Custom validator hook by name
    pub fn custom(position: impl Into<String>, validator: impl Into<String>) -> Self {
        let mut rule = Self::new(position, ValidationType::Custom);
        rule.custom_validator = Some(validator.into());
        rule
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_expected_value(mut self, expected: impl Into<String>) -> Self {
        self.expected_value = Some(expected.into());
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// Expectation for every occurrence of one segment tag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRule {
    pub segment: String,
    pub required: bool,
    pub multiple_occurrences: bool,
    pub order_matters: bool,
    pub expected_count: Option<usize>,
    pub fields: Vec<FieldRule>,
}

impl ComparisonRule {
    /// Required, single-occurrence rule without field rules
    pub fn new(segment: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            required: true,
            multiple_occurrences: false,
            order_matters: false,
            expected_count: None,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    #[must_use]
    pub fn repeatable(mut self) -> Self {
        self.multiple_occurrences = true;
        self
    }

    #[must_use]
    pub fn ordered(mut self) -> Self {
        self.order_matters = true;
        self
    }

    #[must_use]
    pub fn with_expected_count(mut self, count: usize) -> Self {
        self.expected_count = Some(count);
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldRule) -> Self {
        self.fields.push(field);
        self
    }
}

/// Full expectation set for one message type
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RuleSet {
    pub message_type: Option<String>,
    pub description: Option<String>,
    pub rules: Vec<ComparisonRule>,
    /// Free-form settings (e.g. `case_sensitive`) forwarded to the comparison context
    pub config: BTreeMap<String, serde_json::Value>,
}

impl RuleSet {
    pub fn new(rules: Vec<ComparisonRule>) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_message_type(mut self, message_type: impl Into<String>) -> Self {
        self.message_type = Some(message_type.into());
        self
    }

    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    /// First rule declared for `segment_tag`
    pub fn rule_for_segment(&self, segment_tag: &str) -> Option<&ComparisonRule> {
        self.rules.iter().find(|r| r.segment == segment_tag)
    }

    pub fn has_rule_for_segment(&self, segment_tag: &str) -> bool {
        self.rule_for_segment(segment_tag).is_some()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}
