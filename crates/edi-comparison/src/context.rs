//! Per-comparison inputs: test data, inbound message and flags

use edi_ir::Message;
use edi_rules::{RuleSet, SourceRef};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Config key: compare `EXACT_MATCH` values case-sensitively (default true)
pub const CASE_SENSITIVE: &str = "case_sensitive";
/// Config key: trim both values before an `EXACT_MATCH` comparison (default false)
pub const IGNORE_TRAILING_WHITESPACE: &str = "ignore_trailing_whitespace";
/// Config key: callers should stop at the first difference (default false)
pub const FAIL_ON_FIRST_ERROR: &str = "fail_on_first_error";
/// Config key: report segments no rule covers (default false)
pub const DETECT_UNEXPECTED_SEGMENTS: &str = "detect_unexpected_segments";
/// Config key: check that segments follow rule declaration order (default false)
pub const VALIDATE_SEGMENT_ORDER: &str = "validate_segment_order";

/// Read-only inputs for one comparison scenario
///
/// Built once, then shared by reference; the inbound message sits behind an
/// [`Arc`] so several contexts can point at the same parsed document.
#[derive(Debug, Clone, Default)]
pub struct ComparisonContext {
    test_data: BTreeMap<String, Value>,
    inbound: Option<Arc<Message>>,
    config: BTreeMap<String, Value>,
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl ComparisonContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context seeded with a rule set's own `config` map
    pub fn for_rule_set(rule_set: &RuleSet) -> Self {
        Self::new().with_config(rule_set.config.clone())
    }

    /// Add every entry of `test_data`, replacing existing keys
    #[must_use]
    pub fn with_test_data<K: Into<String>>(
        mut self,
        test_data: impl IntoIterator<Item = (K, Value)>,
    ) -> Self {
        self.test_data
            .extend(test_data.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    #[must_use]
    pub fn with_test_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.test_data.insert(key.into(), value.into());
        self
    }

    /// Reference message for `inbound.*` sources
    #[must_use]
    pub fn with_inbound(mut self, message: impl Into<Arc<Message>>) -> Self {
        self.inbound = Some(message.into());
        self
    }

    /// Add every entry of `config`, replacing existing keys
    #[must_use]
    pub fn with_config<K: Into<String>>(
        mut self,
        config: impl IntoIterator<Item = (K, Value)>,
    ) -> Self {
        self.config
            .extend(config.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    #[must_use]
    pub fn with_flag(mut self, key: impl Into<String>, enabled: bool) -> Self {
        self.config.insert(key.into(), Value::Bool(enabled));
        self
    }

    pub fn test_data_value(&self, key: &str) -> Option<&Value> {
        self.test_data.get(key)
    }

    /// Test data value rendered as text; `null` counts as absent
    pub fn test_data_string(&self, key: &str) -> Option<String> {
        self.test_data.get(key).and_then(scalar_to_string)
    }

    pub fn has_test_data(&self, key: &str) -> bool {
        self.test_data.contains_key(key)
    }

    pub fn inbound(&self) -> Option<&Message> {
        self.inbound.as_deref()
    }

    /// Value at `field_path` (e.g. `BGM.0002`) in the first inbound segment
    /// with the path's tag
    pub fn inbound_field_value(&self, field_path: &str) -> Option<&str> {
        let tag_end = field_path.find(['.', '['])?;
        self.inbound()?
            .first_segment(&field_path[..tag_end])?
            .field_value(field_path)
    }

    pub fn config_value(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }

    /// Boolean flag; any non-boolean value falls back to `default`
    pub fn config_bool(&self, key: &str, default: bool) -> bool {
        match self.config.get(key) {
            Some(Value::Bool(value)) => *value,
            _ => default,
        }
    }

    pub fn config(&self) -> &BTreeMap<String, Value> {
        &self.config
    }

    /// Resolve a field rule's `source` to the expected value
    ///
    /// `testData.<key>` reads the test data map, `inbound.<tag>.<position>`
    /// reads the inbound message, anything else is returned verbatim.
    pub fn resolve_source(&self, source: &str) -> Option<String> {
        match SourceRef::parse(source) {
            SourceRef::TestData(key) => self.test_data_string(key),
            SourceRef::Inbound { position, .. } => {
                self.inbound_field_value(position).map(str::to_string)
            }
            SourceRef::Literal(value) => Some(value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edi_ir::{Field, FileFormat, Segment};
    use serde_json::json;

    fn inbound_booking() -> Message {
        let bgm = Segment::new(
            "BGM",
            vec![
                Field::new("BGM.0001", "340").unwrap(),
                Field::new("BGM.0002", "INBOUND-77").unwrap(),
            ],
        )
        .unwrap();
        let nad = Segment::new("NAD", vec![Field::new("NAD.C001.0001", "SHIP1").unwrap()])
            .unwrap();
        Message::new(FileFormat::Edifact, vec![bgm, nad])
    }

    #[test]
    fn test_resolve_test_data() {
        let context = ComparisonContext::new()
            .with_test_value("bookingNumber", "BOOKING123")
            .with_test_value("quantity", 12)
            .with_test_value("cleared", Value::Null);

        assert_eq!(
            context.resolve_source("testData.bookingNumber").as_deref(),
            Some("BOOKING123")
        );
        assert_eq!(
            context.resolve_source("testData.quantity").as_deref(),
            Some("12")
        );
        assert_eq!(context.resolve_source("testData.cleared"), None);
        assert!(context.has_test_data("cleared"));
        assert_eq!(context.resolve_source("testData.unknown"), None);
    }

    #[test]
    fn test_resolve_inbound() {
        let context = ComparisonContext::new().with_inbound(inbound_booking());

        assert_eq!(
            context.resolve_source("inbound.BGM.0002").as_deref(),
            Some("INBOUND-77")
        );
        assert_eq!(
            context.resolve_source("inbound.NAD.C001.0001").as_deref(),
            Some("SHIP1")
        );
        assert_eq!(context.resolve_source("inbound.DTM.0001"), None);
        assert_eq!(context.inbound_field_value("BGM"), None);
    }

    #[test]
    fn test_inbound_missing() {
        let context = ComparisonContext::new();
        assert!(context.inbound().is_none());
        assert_eq!(context.resolve_source("inbound.BGM.0002"), None);
    }

    #[test]
    fn test_literal_source() {
        let context = ComparisonContext::new();
        assert_eq!(context.resolve_source("340").as_deref(), Some("340"));
    }

    #[test]
    fn test_config_bool_accepts_only_booleans() {
        let context = ComparisonContext::new()
            .with_flag(CASE_SENSITIVE, false)
            .with_config([("ignore_trailing_whitespace", json!("true"))]);

        assert!(!context.config_bool(CASE_SENSITIVE, true));
        // string "true" is not a boolean
        assert!(!context.config_bool(IGNORE_TRAILING_WHITESPACE, false));
        assert!(context.config_bool(VALIDATE_SEGMENT_ORDER, true));
    }

    #[test]
    fn test_for_rule_set_copies_config() {
        let rules = RuleSet::new(vec![]).with_config(CASE_SENSITIVE, json!(false));
        let context = ComparisonContext::for_rule_set(&rules);
        assert!(!context.config_bool(CASE_SENSITIVE, true));
    }
}
