//! Message-wide structure checks run after the rule walk
//!
//! Both checks are opt-in through context flags. `order_matters` on a single
//! rule enables the order check for that rule's segments even when the
//! global flag is off.

use crate::context::{ComparisonContext, DETECT_UNEXPECTED_SEGMENTS, VALIDATE_SEGMENT_ORDER};
use crate::difference::{Difference, DifferenceType};
use edi_ir::Message;
use edi_rules::RuleSet;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct StructuralAudit<'a> {
    rule_set: &'a RuleSet,
    context: &'a ComparisonContext,
}

impl<'a> StructuralAudit<'a> {
    pub fn new(rule_set: &'a RuleSet, context: &'a ComparisonContext) -> Self {
        Self { rule_set, context }
    }

    /// Report uncovered segments and segments out of rule order
    pub fn run(&self, message: &Message) -> Vec<Difference> {
        let detect_unexpected = self.context.config_bool(DETECT_UNEXPECTED_SEGMENTS, false);
        let validate_all_order = self.context.config_bool(VALIDATE_SEGMENT_ORDER, false);

        // first rule index per tag
        let mut ranks: HashMap<&str, usize> = HashMap::new();
        for (index, rule) in self.rule_set.rules.iter().enumerate() {
            ranks.entry(rule.segment.as_str()).or_insert(index);
        }

        let mut differences = Vec::new();
        let mut highest: Option<(usize, &str)> = None;

        for segment in message.segments() {
            let Some(&rank) = ranks.get(segment.tag()) else {
                if detect_unexpected {
                    differences.push(
                        Difference::new(DifferenceType::UnexpectedSegment, segment.tag())
                            .with_actual(segment.tag())
                            .with_line_number(segment.line_number())
                            .with_description(format!(
                                "Segment {} is not covered by any rule",
                                segment.tag()
                            )),
                    );
                }
                continue;
            };

            match highest {
                Some((seen, after)) if rank < seen => {
                    let checked =
                        validate_all_order || self.rule_set.rules[rank].order_matters;
                    if checked {
                        differences.push(
                            Difference::new(DifferenceType::SegmentOrderMismatch, segment.tag())
                                .with_line_number(segment.line_number())
                                .with_description(format!(
                                    "Segment {} appears after {after}",
                                    segment.tag()
                                )),
                        );
                    }
                }
                _ => highest = Some((rank, segment.tag())),
            }
        }

        debug!(
            findings = differences.len(),
            detect_unexpected, validate_all_order, "Structural audit finished"
        );
        differences
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edi_ir::{Field, FileFormat, Segment};
    use edi_rules::ComparisonRule;

    fn message(tags: &[&str]) -> Message {
        let segments = tags
            .iter()
            .enumerate()
            .map(|(i, tag)| {
                Segment::new(*tag, vec![Field::new(format!("{tag}.0001"), "X").unwrap()])
                    .unwrap()
                    .with_sequence_number(i)
                    .with_line_number(i + 1)
            })
            .collect();
        Message::new(FileFormat::Edifact, segments)
    }

    fn rules() -> RuleSet {
        RuleSet::new(vec![
            ComparisonRule::new("BGM"),
            ComparisonRule::new("DTM"),
            ComparisonRule::new("NAD").repeatable(),
        ])
    }

    #[test]
    fn test_flags_off_reports_nothing() {
        let rules = rules();
        let context = ComparisonContext::new();
        let audit = StructuralAudit::new(&rules, &context);
        assert!(audit.run(&message(&["UNH", "NAD", "BGM", "DTM"])).is_empty());
    }

    #[test]
    fn test_unexpected_segments() {
        let rules = rules();
        let context = ComparisonContext::new().with_flag(DETECT_UNEXPECTED_SEGMENTS, true);
        let diffs = StructuralAudit::new(&rules, &context).run(&message(&["BGM", "FTX", "DTM"]));

        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DifferenceType::UnexpectedSegment);
        assert_eq!(diffs[0].segment_tag, "FTX");
        assert_eq!(diffs[0].line_number, Some(2));
    }

    #[test]
    fn test_segment_order_global_flag() {
        let rules = rules();
        let context = ComparisonContext::new().with_flag(VALIDATE_SEGMENT_ORDER, true);
        let audit = StructuralAudit::new(&rules, &context);

        assert!(audit.run(&message(&["BGM", "DTM", "NAD", "NAD"])).is_empty());

        let diffs = audit.run(&message(&["BGM", "NAD", "DTM"]));
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DifferenceType::SegmentOrderMismatch);
        assert_eq!(diffs[0].segment_tag, "DTM");
        assert_eq!(
            diffs[0].description.as_deref(),
            Some("Segment DTM appears after NAD")
        );
    }

    #[test]
    fn test_segment_order_per_rule() {
        let rules = RuleSet::new(vec![
            ComparisonRule::new("BGM").ordered(),
            ComparisonRule::new("DTM"),
            ComparisonRule::new("NAD"),
        ]);
        let context = ComparisonContext::new();
        let audit = StructuralAudit::new(&rules, &context);

        // DTM is not order-sensitive on its own
        assert!(audit.run(&message(&["NAD", "DTM"])).is_empty());
        assert_eq!(audit.run(&message(&["DTM", "BGM"])).len(), 1);
    }
}
