//! Comparison engine
//!
//! Walks every rule of a [`RuleSet`] against a parsed [`Message`] and
//! collects every discrepancy. The walk never stops early: a cardinality
//! problem on a segment does not suppress field findings on its instances,
//! and one failing field does not hide the next.
//!
//! Unexpected segments, segment order and custom validators are checked by
//! separate passes ([`crate::audit`], [`crate::custom`]) whose findings a
//! caller appends with [`ComparisonResult::with_additional_differences`].

use crate::context::{CASE_SENSITIVE, ComparisonContext, IGNORE_TRAILING_WHITESPACE};
use crate::difference::{Difference, DifferenceType};
use crate::result::ComparisonResult;
use edi_ir::{Message, Segment};
use edi_rules::{ComparisonRule, FieldRule, RuleSet, ValidationType};
use regex::Regex;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, trace};

/// EDIFACT date/time format code for `CCYYMMDD`
const DATE_CODE_CCYYMMDD: &str = "102";
/// EDIFACT date/time format code for `CCYYMMDDHHMM`
const DATE_CODE_CCYYMMDDHHMM: &str = "103";

/// Flags read from the context once per run
#[derive(Debug, Clone, Copy)]
struct MatchOptions {
    case_sensitive: bool,
    trim: bool,
}

impl MatchOptions {
    fn from_context(context: &ComparisonContext) -> Self {
        Self {
            case_sensitive: context.config_bool(CASE_SENSITIVE, true),
            trim: context.config_bool(IGNORE_TRAILING_WHITESPACE, false),
        }
    }

    fn matches(self, expected: &str, actual: &str) -> bool {
        let (expected, actual) = if self.trim {
            (expected.trim(), actual.trim())
        } else {
            (expected, actual)
        };

        if self.case_sensitive {
            expected == actual
        } else {
            expected
                .chars()
                .flat_map(char::to_lowercase)
                .eq(actual.chars().flat_map(char::to_lowercase))
        }
    }
}

/// State of a single `compare()` run
struct Run<'r> {
    context: &'r ComparisonContext,
    options: MatchOptions,
    /// Compiled patterns, scoped to this run only
    patterns: HashMap<&'r str, Result<Regex, String>>,
    differences: Vec<Difference>,
}

impl<'r> Run<'r> {
    fn compare_rule(&mut self, rule: &'r ComparisonRule, actual: &Message) -> usize {
        let instances = actual.segments_by_tag(&rule.segment);
        trace!(segment = %rule.segment, instances = instances.len(), "Applying rule");

        if instances.is_empty() {
            if rule.required {
                self.differences.push(
                    Difference::new(DifferenceType::MissingSegment, &rule.segment)
                        .with_description(format!(
                            "Required segment {} is missing",
                            rule.segment
                        )),
                );
            }
            return 0;
        }

        let count = instances.len();
        match rule.expected_count {
            Some(expected) if count != expected => {
                self.differences.push(
                    Difference::new(DifferenceType::SegmentCountMismatch, &rule.segment)
                        .with_expected(expected.to_string())
                        .with_actual(count.to_string())
                        .with_description(format!(
                            "Segment {} should appear {expected} times but found {count}",
                            rule.segment
                        )),
                );
            }
            Some(_) => {}
            None if !rule.multiple_occurrences && count > 1 => {
                self.differences.push(
                    Difference::new(DifferenceType::SegmentCountMismatch, &rule.segment)
                        .with_expected("1")
                        .with_actual(count.to_string())
                        .with_description(format!(
                            "Segment {} should appear only once but found {count}",
                            rule.segment
                        )),
                );
            }
            None => {}
        }

        for segment in &instances {
            for field_rule in &rule.fields {
                self.compare_field(&rule.segment, field_rule, segment);
            }
        }
        count
    }

    fn compare_field(&mut self, tag: &str, field_rule: &'r FieldRule, segment: &Segment) {
        let Some(field) = segment.field_by_position(&field_rule.position) else {
            if field_rule.required {
                self.differences.push(
                    Difference::new(DifferenceType::MissingField, tag)
                        .with_field(&field_rule.position, field_rule.name.as_deref())
                        .with_line_number(segment.line_number())
                        .with_description(format!(
                            "Required field {} is missing",
                            field_rule.position
                        )),
                );
            }
            return;
        };

        let actual = field.value();
        let difference = match field_rule.validation {
            ValidationType::ExactMatch => self.check_exact(tag, field_rule, actual),
            ValidationType::PatternMatch => self.check_pattern(tag, field_rule, actual),
            ValidationType::DateFormat => check_date(tag, field_rule, actual, segment),
            // presence is all EXISTS asks for; CUSTOM belongs to the custom validation pass
            ValidationType::Exists | ValidationType::Custom => None,
        };

        if let Some(difference) = difference {
            self.differences.push(
                difference
                    .with_field(&field_rule.position, field_rule.name.as_deref())
                    .with_line_number(segment.line_number()),
            );
        }
    }

    fn check_exact(&self, tag: &str, field_rule: &FieldRule, actual: &str) -> Option<Difference> {
        let expected = match (&field_rule.expected_value, &field_rule.source) {
            (Some(literal), _) => literal.clone(),
            (None, Some(source)) => match self.context.resolve_source(source) {
                Some(resolved) => resolved,
                None => {
                    return Some(
                        Difference::new(DifferenceType::ValueMismatch, tag)
                            .with_actual(actual)
                            .with_description(format!(
                                "Source reference '{source}' could not be resolved"
                            )),
                    );
                }
            },
            (None, None) => return None,
        };

        if self.options.matches(&expected, actual) {
            None
        } else {
            Some(
                Difference::new(DifferenceType::ValueMismatch, tag)
                    .with_expected(expected)
                    .with_actual(actual),
            )
        }
    }

    fn check_pattern(&mut self, tag: &str, field_rule: &'r FieldRule, actual: &str) -> Option<Difference> {
        let pattern = field_rule.pattern.as_deref()?;
        let compiled = self
            .patterns
            .entry(pattern)
            .or_insert_with(|| Regex::new(&format!("^(?:{pattern})$")).map_err(|e| e.to_string()));

        match compiled {
            Ok(regex) if regex.is_match(actual) => None,
            Ok(_) => Some(
                Difference::new(DifferenceType::PatternMismatch, tag)
                    .with_expected(format!("Pattern: {pattern}"))
                    .with_actual(actual)
                    .with_description(format!("Value does not match pattern {pattern}")),
            ),
            Err(error) => Some(
                Difference::new(DifferenceType::PatternMismatch, tag)
                    .with_actual(actual)
                    .with_description(format!("Invalid pattern: {error}")),
            ),
        }
    }
}

fn check_date(tag: &str, field_rule: &FieldRule, actual: &str, segment: &Segment) -> Option<Difference> {
    if actual.is_empty() {
        return None;
    }

    let format_code = field_rule
        .date_format_field
        .as_deref()
        .and_then(|position| segment.field_value(position));

    let (digits, expected) = match format_code {
        Some(DATE_CODE_CCYYMMDD) => (8, "CCYYMMDD format (8 digits)"),
        Some(DATE_CODE_CCYYMMDDHHMM) => (12, "CCYYMMDDHHMM format (12 digits)"),
        // other codes are not checked
        _ => return None,
    };

    let valid = actual.len() == digits && actual.bytes().all(|b| b.is_ascii_digit());
    (!valid).then(|| {
        Difference::new(DifferenceType::DateFormatInvalid, tag)
            .with_expected(expected)
            .with_actual(actual)
    })
}

/// Applies a rule set to parsed messages
///
/// Holds only shared references, so one engine (or many) can run on
/// several threads over the same rule set and context.
#[derive(Debug, Clone, Copy)]
pub struct ComparisonEngine<'a> {
    rule_set: &'a RuleSet,
    context: &'a ComparisonContext,
}

impl<'a> ComparisonEngine<'a> {
    pub fn new(rule_set: &'a RuleSet, context: &'a ComparisonContext) -> Self {
        Self { rule_set, context }
    }

    pub fn rule_set(&self) -> &'a RuleSet {
        self.rule_set
    }

    pub fn context(&self) -> &'a ComparisonContext {
        self.context
    }

    /// Compare `actual` against every rule and collect all differences
    pub fn compare(&self, actual: &Message) -> ComparisonResult {
        let started = Instant::now();
        let mut run = Run {
            context: self.context,
            options: MatchOptions::from_context(self.context),
            patterns: HashMap::new(),
            differences: Vec::new(),
        };

        let mut segments_compared = 0;
        let mut fields_compared = 0;
        for rule in &self.rule_set.rules {
            let instances = run.compare_rule(rule, actual);
            segments_compared += instances;
            fields_compared += instances * rule.fields.len();
        }

        let result = ComparisonResult::new(
            run.differences,
            segments_compared,
            fields_compared,
            started.elapsed(),
        );

        debug!(
            rules = self.rule_set.rule_count(),
            differences = result.difference_count(),
            segments_compared,
            fields_compared,
            "Comparison finished"
        );
        result
    }
}

/// Compare `actual` against `rule_set` with the given context
pub fn compare(
    rule_set: &RuleSet,
    actual: &Message,
    context: &ComparisonContext,
) -> ComparisonResult {
    ComparisonEngine::new(rule_set, context).compare(actual)
}
