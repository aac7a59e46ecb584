//! Outcome of one comparison run

use crate::difference::{Difference, DifferenceType};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Duration;

fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

/// Differences and counters produced by one `compare()` call
///
/// Success is defined solely by an empty difference list.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    success: bool,
    differences: Vec<Difference>,
    segments_compared: usize,
    fields_compared: usize,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    elapsed: Duration,
    compared_at: DateTime<Utc>,
}

impl ComparisonResult {
    pub fn new(
        differences: Vec<Difference>,
        segments_compared: usize,
        fields_compared: usize,
        elapsed: Duration,
    ) -> Self {
        Self {
            success: differences.is_empty(),
            differences,
            segments_compared,
            fields_compared,
            elapsed,
            compared_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn has_differences(&self) -> bool {
        !self.differences.is_empty()
    }

    /// Differences in rule, then instance, then field order
    pub fn differences(&self) -> &[Difference] {
        &self.differences
    }

    pub fn difference_count(&self) -> usize {
        self.differences.len()
    }

    pub fn differences_of_kind(&self, kind: DifferenceType) -> Vec<&Difference> {
        self.differences.iter().filter(|d| d.kind == kind).collect()
    }

    pub fn differences_for_segment(&self, segment_tag: &str) -> Vec<&Difference> {
        self.differences
            .iter()
            .filter(|d| d.segment_tag == segment_tag)
            .collect()
    }

    /// The difference a fail-fast caller would stop at
    pub fn first_difference(&self) -> Option<&Difference> {
        self.differences.first()
    }

    /// Number of differences per type, in type declaration order
    pub fn counts_by_kind(&self) -> BTreeMap<DifferenceType, usize> {
        let mut counts = BTreeMap::new();
        for diff in &self.differences {
            *counts.entry(diff.kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn segments_compared(&self) -> usize {
        self.segments_compared
    }

    pub fn fields_compared(&self) -> usize {
        self.fields_compared
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn compared_at(&self) -> DateTime<Utc> {
        self.compared_at
    }

    /// Copy with findings of a later pass appended after the existing ones
    #[must_use]
    pub fn with_additional_differences(
        mut self,
        differences: impl IntoIterator<Item = Difference>,
    ) -> Self {
        self.differences.extend(differences);
        self.success = self.differences.is_empty();
        self
    }

    /// Copy keeping only the first difference
    #[must_use]
    pub fn truncated_to_first(mut self) -> Self {
        self.differences.truncate(1);
        self
    }

    /// Plain-text status block with per-type counts
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let status = if self.is_success() { "SUCCESS" } else { "FAILED" };
        let _ = writeln!(out, "Comparison Result:");
        let _ = writeln!(out, "  Status: {status}");
        let _ = writeln!(out, "  Differences: {}", self.difference_count());
        let _ = writeln!(out, "  Segments compared: {}", self.segments_compared);
        let _ = writeln!(out, "  Fields compared: {}", self.fields_compared);
        let _ = writeln!(out, "  Time taken: {} ms", self.elapsed.as_millis());

        if self.has_differences() {
            let _ = writeln!(out, "\nDifferences by type:");
            for (kind, count) in self.counts_by_kind() {
                let _ = writeln!(out, "  {kind}: {count}");
            }
        }
        out
    }

    /// [`Self::summary`] followed by every difference, numbered from 1
    pub fn detailed_report(&self) -> String {
        let mut out = self.summary();
        if self.has_differences() {
            let _ = writeln!(out, "\nDetailed differences:");
            for (i, diff) in self.differences.iter().enumerate() {
                let _ = writeln!(out, "{}. {diff}", i + 1);
            }
        }
        out
    }
}
