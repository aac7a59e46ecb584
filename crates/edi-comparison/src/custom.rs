//! Named validators for `CUSTOM` field rules
//!
//! The comparison engine never evaluates `CUSTOM` rules. Business-specific
//! checks are registered here by name and enforced by
//! [`CustomValidationPass`], whose findings callers merge into the result.

use crate::context::ComparisonContext;
use crate::difference::{Difference, DifferenceType};
use edi_ir::{Message, Segment};
use edi_rules::{RuleSet, ValidationType};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Predicate over a field value, its segment and the comparison context
pub type ValidatorFn = Arc<dyn Fn(&str, &Segment, &ComparisonContext) -> bool + Send + Sync>;

/// Registry of named custom validators
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: HashMap<String, ValidatorFn>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the validator called `name`
    pub fn register(
        &mut self,
        name: impl Into<String>,
        validator: impl Fn(&str, &Segment, &ComparisonContext) -> bool + Send + Sync + 'static,
    ) -> &mut Self {
        self.validators.insert(name.into(), Arc::new(validator));
        self
    }

    pub fn get(&self, name: &str) -> Option<ValidatorFn> {
        self.validators.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("validators", &self.names())
            .finish()
    }
}

/// Applies registered validators to every `CUSTOM` field rule
///
/// Missing fields are left to the comparison engine, which already reports
/// them as `MISSING_FIELD`.
#[derive(Debug, Clone, Copy)]
pub struct CustomValidationPass<'a> {
    registry: &'a ValidatorRegistry,
    context: &'a ComparisonContext,
}

impl<'a> CustomValidationPass<'a> {
    pub fn new(registry: &'a ValidatorRegistry, context: &'a ComparisonContext) -> Self {
        Self { registry, context }
    }

    /// Run every `CUSTOM` rule of `rule_set` against `message`
    pub fn run(&self, rule_set: &RuleSet, message: &Message) -> Vec<Difference> {
        let mut differences = Vec::new();

        for rule in &rule_set.rules {
            let custom_rules: Vec<_> = rule
                .fields
                .iter()
                .filter(|f| f.validation == ValidationType::Custom)
                .collect();
            if custom_rules.is_empty() {
                continue;
            }

            for segment in message.segments_by_tag(&rule.segment) {
                for field_rule in &custom_rules {
                    let Some(field) = segment.field_by_position(&field_rule.position) else {
                        continue;
                    };

                    let failure = match field_rule.custom_validator.as_deref() {
                        None => Some(format!(
                            "No custom validator named for field {}",
                            field_rule.position
                        )),
                        Some(name) => match self.registry.get(name) {
                            None => Some(format!("Custom validator '{name}' is not registered")),
                            Some(validator) => {
                                let passed = validator(field.value(), segment, self.context);
                                trace!(validator = name, position = %field_rule.position, passed, "Custom validation");
                                (!passed).then(|| {
                                    format!("Custom validator '{name}' rejected the value")
                                })
                            }
                        },
                    };

                    if let Some(description) = failure {
                        differences.push(
                            Difference::new(DifferenceType::CustomValidationFailed, &rule.segment)
                                .with_field(&field_rule.position, field_rule.name.as_deref())
                                .with_actual(field.value())
                                .with_line_number(segment.line_number())
                                .with_description(description),
                        );
                    }
                }
            }
        }

        differences
    }
}
